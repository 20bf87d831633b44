//! 共享的索引与区间校验。
//!
//! 所有接受索引或 `(start, count)` 的操作都经过这里，越界时报错而不是截断。

use core::ops::Range;

use pooled_core::{Result, VecError};

/// 读写既有元素：要求 `index < len`。
pub(crate) fn check_index(operation: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(VecError::IndexOutOfRange {
            operation,
            index,
            len,
        })
    }
}

/// 插入位置：要求 `index <= len`。
pub(crate) fn check_insert(operation: &'static str, index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(VecError::IndexOutOfRange {
            operation,
            index,
            len,
        })
    }
}

/// 子区间：要求 `start <= len` 且 `count <= len - start`，返回对应的 `Range`。
///
/// `(len, 0)` 是合法的空区间，整体形式以 `(0, len)` 委托过来时空列表也能通过校验。
pub(crate) fn check_range(
    operation: &'static str,
    start: usize,
    count: usize,
    len: usize,
) -> Result<Range<usize>> {
    match start.checked_add(count) {
        Some(end) if end <= len => Ok(start..end),
        _ => Err(VecError::RangeOutOfBounds {
            operation,
            start,
            count,
            len,
        }),
    }
}
