use crate::error::SetupError;
use std::ops::Range;

/// Index range of the sorted app list owned by worker `index` (1-based) of
/// `count`.
///
/// Apps are split as evenly as possible and the first `total % count`
/// workers take one extra app, so 10 apps over 3 workers gives 4, 3, 3.
pub fn partition(total: usize, count: usize, index: usize) -> Result<Range<usize>, SetupError> {
    if count == 0 || index == 0 || index > count {
        return Err(SetupError::InvalidPartition { index, count });
    }

    let base = total / count;
    let extra = total % count;
    let worker = index - 1;

    let start = worker * base + worker.min(extra);
    let len = base + usize::from(worker < extra);
    Ok(start..start + len)
}
