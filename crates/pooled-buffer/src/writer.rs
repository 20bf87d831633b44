use alloc::{sync::Arc, vec::Vec};
use core::{fmt, mem::MaybeUninit};

use bytes::{BufMut, buf::UninitSlice};
use pooled_core::{BlockPool, BufferWriter, Result, VecError};

use crate::{
    lease::{PooledSegment, PooledSlice},
    list::PooledList,
    shared::shared_pool,
    storage::{OwnershipMode, PooledStorage},
};

/// 写游标已到容量末端时，`bytes::BufMut::chunk_mut` 为下一段预留的字节数。
const CHUNK_HINT: usize = 64;

/// `PooledWriter` 是面向生产者的池化缓冲：预留区域、直接写入、提交长度。
///
/// # 设计动机（Why）
/// - 格式化器、编码器等生产者往往先写入临时缓冲再整体复制；
///   `PooledWriter` 通过 [`BufferWriter`] 协议把写游标之后的池化内存直接交给生产者，
///   省去中间复制；
/// - 写入完成后，终结操作把 `[0, len)` 以复制、只读视图、可变片段或列表的形式交给调用方。
///
/// # 行为逻辑（How）
/// - [`reserve`](Self::reserve) 在剩余空间不足时按统一的增长策略扩容，
///   返回从写游标开始的未初始化区域（`Vec::spare_capacity_mut`）；
/// - [`advance`](Self::advance) 校验提交量不超过剩余容量后移动写游标；
/// - 视图类终结操作交出整个块，块的归还由返回值的 `Drop` 负责；
///   写入器自身回到“无块”状态，下一次写入重新租借。
///
/// # 契约说明（What）
/// - **前置条件**：`advance(count)` 前，最近一次预留区域的前 `count` 个槽位必须已初始化；
/// - **后置条件**：所有终结操作之后写入器长度为 0；
/// - **释放**：`dispose` 与 `Drop` 只归还一次；视图析构与写入器释放之间不会重复归还同一块。
pub struct PooledWriter<T> {
    storage: PooledStorage<T>,
}

impl<T: Send + 'static> PooledWriter<T> {
    /// 创建空写入器，存储在首次预留时从元素类型的共享池租借。
    pub fn new() -> Self {
        Self::with_pool(shared_pool::<T>())
    }

    /// 创建写入器并立即从共享池租借至少 `capacity` 个槽位。
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut writer = Self::new();
        writer.storage.ensure_additional(capacity)?;
        Ok(writer)
    }
}

impl<T: Send + 'static> Default for PooledWriter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PooledWriter<T> {
    /// 创建绑定到指定池的空写入器。
    pub fn with_pool(pool: Arc<dyn BlockPool<T>>) -> Self {
        Self {
            storage: PooledStorage::pool_bound(pool),
        }
    }

    /// 包装调用方提供的块，块中已有元素视为已写入内容；块本身不会归还给池。
    pub fn from_block(block: Vec<T>, pool: Arc<dyn BlockPool<T>>) -> Self {
        Self {
            storage: PooledStorage::from_block(pool, block),
        }
    }

    /// 创建独占模式的空写入器。
    pub fn exclusive() -> Self {
        Self {
            storage: PooledStorage::exclusive(),
        }
    }

    /// 已写入的元素个数。
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// 写游标之后无需增长即可写入的槽位数。
    pub fn remaining(&self) -> usize {
        self.storage.spare()
    }

    pub fn mode(&self) -> OwnershipMode {
        self.storage.mode()
    }

    /// 已写入的内容。
    pub fn written(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// 预留至少 `size_hint` 个槽位（0 按 1 处理），返回从写游标开始的未初始化区域。
    pub fn reserve(&mut self, size_hint: usize) -> Result<&mut [MaybeUninit<T>]> {
        self.storage.ensure_additional(size_hint.max(1))?;
        Ok(self.storage.require_mut("reserve")?.spare_capacity_mut())
    }

    /// 提交 `count` 个已写入的槽位。
    ///
    /// 超出剩余容量时返回 [`VecError::AdvanceOutOfBounds`]，状态不变。
    ///
    /// # Safety
    /// 最近一次 [`reserve`](Self::reserve) 返回区域的前 `count` 个槽位必须已经初始化。
    pub unsafe fn advance(&mut self, count: usize) -> Result<()> {
        let available = self.storage.spare();
        if count > available {
            return Err(VecError::AdvanceOutOfBounds { count, available });
        }
        if count == 0 {
            return Ok(());
        }
        let data = self.storage.require_mut("advance")?;
        let len = data.len() + count;
        // SAFETY: `count <= capacity - len` 已校验；调用方保证这些槽位已初始化。
        unsafe { data.set_len(len) };
        Ok(())
    }

    /// 把已写入内容移动到新的 `Vec` 中；内部块保留，供后续写入复用。
    pub fn take_as_copy(&mut self) -> Vec<T> {
        self.storage
            .require_mut("take_as_copy")
            .map(|data| data.drain(..).collect())
            .unwrap_or_default()
    }

    /// 以只读视图交出已写入内容，视图析构时块归还池。
    pub fn take_as_view(&mut self) -> PooledSlice<T> {
        tracing::trace!(len = self.len(), "writer finalized into view");
        PooledSlice::new(self.storage.take_block())
    }

    /// 以可变片段交出已写入内容，片段析构时块归还池。
    pub fn take_as_segment(&mut self) -> PooledSegment<T> {
        tracing::trace!(len = self.len(), "writer finalized into segment");
        PooledSegment::new(self.storage.take_block())
    }

    /// 把存储原样交给列表，不复制元素；列表沿用写入器的池与模式。
    pub fn into_list(self) -> PooledList<T> {
        PooledList::from_storage(self.storage)
    }

    /// 丢弃已写入内容，保留当前块。
    pub fn clear(&mut self) {
        if let Ok(data) = self.storage.require_mut("clear") {
            data.clear();
        }
    }

    /// 释放存储并归零状态；重复调用为无操作。
    pub fn dispose(&mut self) {
        self.storage.dispose();
    }

    /// 单向转换为独占模式，见 [`OwnershipMode`]。
    pub fn make_exclusive(&mut self) -> Result<()> {
        self.storage.make_exclusive()
    }

    /// 追加单个元素。
    pub fn append(&mut self, value: T) -> Result<()> {
        BufferWriter::append(self, value)
    }
}

impl<T: Clone> PooledWriter<T> {
    /// 追加一段元素的克隆，只预留一次。
    pub fn append_range(&mut self, values: &[T]) -> Result<()> {
        self.append_slice(values)
    }
}

impl<T> BufferWriter<T> for PooledWriter<T> {
    fn reserve(&mut self, size_hint: usize) -> Result<&mut [MaybeUninit<T>]> {
        PooledWriter::reserve(self, size_hint)
    }

    unsafe fn advance(&mut self, count: usize) -> Result<()> {
        // SAFETY: 前置条件由调用方按 trait 契约保证。
        unsafe { PooledWriter::advance(self, count) }
    }
}

impl<T: fmt::Debug> fmt::Debug for PooledWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledWriter")
            .field("written", &self.written())
            .field("capacity", &self.capacity())
            .field("mode", &self.mode())
            .finish()
    }
}

unsafe impl BufMut for PooledWriter<u8> {
    fn remaining_mut(&self) -> usize {
        isize::MAX as usize - self.len()
    }

    unsafe fn advance_mut(&mut self, cnt: usize) {
        // SAFETY: `BufMut` 要求调用方已初始化 `chunk_mut` 返回区域的前 `cnt` 个字节。
        if let Err(err) = unsafe { self.advance(cnt) } {
            panic!("PooledWriter::advance_mut failed: {err}");
        }
    }

    /// 仍有剩余槽位时原样返回它们，只有写满后才增长。
    fn chunk_mut(&mut self) -> &mut UninitSlice {
        let hint = if self.remaining() == 0 { CHUNK_HINT } else { 1 };
        match self.reserve(hint) {
            Ok(region) => region.into(),
            Err(err) => panic!("PooledWriter::chunk_mut failed: {err}"),
        }
    }

    fn put_slice(&mut self, src: &[u8]) {
        self.append_slice(src)
            .unwrap_or_else(|err| panic!("PooledWriter::put_slice failed: {err}"));
    }
}

impl fmt::Write for PooledWriter<u8> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append_slice(s.as_bytes()).map_err(|err| {
            tracing::debug!(error = %err, "formatted write rejected");
            fmt::Error
        })
    }
}
