//! # Block Store Benchmarks
//!
//! | Operation | Notes |
//! |-----------|-------|
//! | append | One new block per write, file grows |
//! | random_read | Header, payload and checksum validated per read |
//! | rewrite | Same-size rewrite at a fixed pointer |
//! | locking | Decorator cost over the bare store |

use block_store_tests::benchmarks::block_store::register_benchmarks;
use criterion::{criterion_group, criterion_main, Criterion};

fn block_store_benchmarks(c: &mut Criterion) {
    register_benchmarks(c);
}

criterion_group!(benches, block_store_benchmarks);
criterion_main!(benches);
