//! # Integrity Verification
//!
//! Reads a caller-supplied set of blocks and checks that every one of them
//! decodes and that no two of them share bytes on disk. The store does not
//! know which blocks are live, so the caller (typically the index built on
//! top of the store) enumerates them.

use crate::domain::{BlockPayload, BlockPointer, Result, StoreError};
use crate::ports::BlockStore;

/// Summary of a successful verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Distinct blocks checked.
    pub blocks: usize,
    /// Bytes occupied by the checked blocks, headers and trailers included.
    pub bytes: u64,
    /// End offset of the furthest checked block.
    pub end: u64,
}

/// Read every listed block and check the blocks do not overlap.
///
/// Corruption found while reading is returned as-is. Overlapping blocks
/// yield [`StoreError::Verification`].
pub fn verify_blocks<S, I>(store: &mut S, blocks: I) -> Result<VerificationReport>
where
    S: BlockStore + ?Sized,
    I: IntoIterator<Item = (BlockPointer, <S::Payload as BlockPayload>::Kind)>,
{
    let mut extents: Vec<(u64, u64, BlockPointer)> = Vec::new();
    for (pointer, kind) in blocks {
        let payload = store.read(pointer, kind)?;
        let (start, end) = payload
            .block()
            .and_then(|block| block.extent())
            .ok_or_else(|| StoreError::Verification {
                store: store.display_name().to_string(),
                message: format!("{} was read without an address", pointer),
            })?;
        extents.push((start, end, pointer));
    }

    extents.sort_unstable();
    extents.dedup_by_key(|(start, _, _)| *start);

    let mut report = VerificationReport::default();
    let mut previous: Option<(u64, BlockPointer)> = None;
    for (start, end, pointer) in extents {
        if let Some((previous_end, previous_pointer)) = previous {
            if previous_end > start {
                return Err(StoreError::Verification {
                    store: store.display_name().to_string(),
                    message: format!("{} overlaps with {}", previous_pointer, pointer),
                });
            }
        }
        report.blocks += 1;
        report.bytes += end - start;
        report.end = report.end.max(end);
        previous = Some((end, pointer));
    }

    #[cfg(feature = "tracing-log")]
    tracing::info!(
        "[block-store] ✅ Verified {} blocks ({} bytes) in {}",
        report.blocks,
        report.bytes,
        store.display_name()
    );

    Ok(report)
}
