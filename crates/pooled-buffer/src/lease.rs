use core::{
    fmt,
    ops::{Deref, DerefMut},
};

use crate::storage::Block;

/// `Lease` 持有写入器交出的块，并在生命周期结束时把它归还给所属池。
///
/// # 角色定位（Why）
/// - 写入器的视图型终结操作让调用方直接读取写入器持有的那块内存；
///   若只清空写入器的句柄而不归还，块会永久脱离池；
/// - 将归还动作放入 `Drop`，块在调用方用完后恰好归还一次，
///   写入器本身可以立即继续使用（下一次写入会重新租借）。
///
/// # 结构设计（How）
/// - `block` 为 `None` 表示写入器交出时没有存储，视图为空；
/// - `Drop` 时调用 [`Block::release`]：租借块清空后回到池，自有块直接析构。
struct Lease<T> {
    block: Option<Block<T>>,
}

impl<T> Lease<T> {
    fn data(&self) -> &[T] {
        match &self.block {
            Some(block) => block.data().as_slice(),
            None => &[],
        }
    }

    fn data_mut(&mut self) -> &mut [T] {
        match &mut self.block {
            Some(block) => block.data_mut().as_mut_slice(),
            None => &mut [],
        }
    }

    fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, |block| block.data().capacity())
    }

    fn is_pooled(&self) -> bool {
        self.block.as_ref().is_some_and(Block::is_leased)
    }
}

impl<T> Drop for Lease<T> {
    fn drop(&mut self) {
        if let Some(block) = self.block.take() {
            tracing::debug!(
                len = block.data().len(),
                pooled = block.is_leased(),
                "finalized view released"
            );
            block.release();
        }
    }
}

/// 写入器终结后得到的只读视图，与写入器曾持有的内存是同一块。
///
/// 视图析构时块归还缓冲池；需要脱离池长期保存时，使用 `to_vec()` 复制。
pub struct PooledSlice<T> {
    lease: Lease<T>,
}

impl<T> PooledSlice<T> {
    pub(crate) fn new(block: Option<Block<T>>) -> Self {
        Self {
            lease: Lease { block },
        }
    }

    /// 底层块是否借自缓冲池（析构时会归还）。
    pub fn is_pooled(&self) -> bool {
        self.lease.is_pooled()
    }
}

impl<T> Deref for PooledSlice<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.lease.data()
    }
}

impl<T> AsRef<[T]> for PooledSlice<T> {
    fn as_ref(&self) -> &[T] {
        self.lease.data()
    }
}

impl<T: fmt::Debug> fmt::Debug for PooledSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.lease.data()).finish()
    }
}

/// 写入器终结后得到的可变连续片段。
///
/// 与 [`PooledSlice`] 相同地别名写入器曾持有的块，但允许原地修改元素，
/// 并暴露底层块的容量；可通过 [`freeze`](Self::freeze) 降级为只读视图。
pub struct PooledSegment<T> {
    lease: Lease<T>,
}

impl<T> PooledSegment<T> {
    pub(crate) fn new(block: Option<Block<T>>) -> Self {
        Self {
            lease: Lease { block },
        }
    }

    /// 底层块的容量（不小于片段长度）。
    pub fn capacity(&self) -> usize {
        self.lease.capacity()
    }

    /// 底层块是否借自缓冲池（析构时会归还）。
    pub fn is_pooled(&self) -> bool {
        self.lease.is_pooled()
    }

    /// 转为只读视图，租约随之转移。
    pub fn freeze(mut self) -> PooledSlice<T> {
        PooledSlice::new(self.lease.block.take())
    }
}

impl<T> Deref for PooledSegment<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.lease.data()
    }
}

impl<T> DerefMut for PooledSegment<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.lease.data_mut()
    }
}

impl<T> AsRef<[T]> for PooledSegment<T> {
    fn as_ref(&self) -> &[T] {
        self.lease.data()
    }
}

impl<T> AsMut<[T]> for PooledSegment<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.lease.data_mut()
    }
}

impl<T: fmt::Debug> fmt::Debug for PooledSegment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledSegment")
            .field("items", &self.lease.data())
            .field("capacity", &self.capacity())
            .finish()
    }
}
