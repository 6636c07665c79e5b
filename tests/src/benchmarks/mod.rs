//! # Block Store Benchmarks
//!
//! Criterion benchmark bodies, registered from `benches/`.
