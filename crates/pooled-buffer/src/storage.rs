use alloc::{sync::Arc, vec::Vec};

use pooled_core::{BlockPool, Result, VecError};

/// 首次增长与独占转换时的最小容量。
pub(crate) const MIN_GROWTH_CAPACITY: usize = 16;

/// 序列的所有权模式。
///
/// - `PoolBound`：增长时从缓冲池租借新块，旧块归还池；
/// - `Exclusive`：增长时直接向分配器申请，块从不进入池。
///
/// 只支持 `PoolBound -> Exclusive` 的单向转换。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnershipMode {
    PoolBound,
    Exclusive,
}

/// 当前持有的内存块及其归属。
///
/// `Leased` 携带借出它的池，归还时无需再查询序列的模式；
/// `Owned` 为直接分配或调用方提供的块，释放时直接析构。
pub(crate) enum Block<T> {
    Leased {
        data: Vec<T>,
        home: Arc<dyn BlockPool<T>>,
    },
    Owned(Vec<T>),
}

impl<T> Block<T> {
    pub(crate) fn data(&self) -> &Vec<T> {
        match self {
            Block::Leased { data, .. } | Block::Owned(data) => data,
        }
    }

    pub(crate) fn data_mut(&mut self) -> &mut Vec<T> {
        match self {
            Block::Leased { data, .. } | Block::Owned(data) => data,
        }
    }

    pub(crate) fn is_leased(&self) -> bool {
        matches!(self, Block::Leased { .. })
    }

    /// 清空存活元素并释放块：租借块归还所属池，自有块直接析构。
    pub(crate) fn release(self) {
        match self {
            Block::Leased { mut data, home } => {
                data.clear();
                tracing::trace!(capacity = data.capacity(), "block returned to pool");
                home.release(data);
            }
            Block::Owned(data) => drop(data),
        }
    }
}

/// 块的来源：池或分配器。
enum Source<T> {
    Pool(Arc<dyn BlockPool<T>>),
    Heap,
}

/// `PooledStorage` 是列表与写入器共享的存储层，负责增长算法与块的生命周期。
///
/// # 设计动机（Why）
/// - 两种访问形态必须遵循同一套规则：惰性增长、容量翻倍、旧块恰好归还一次；
///   将这些规则收敛到一个类型中，前端只关心各自的算法；
/// - 以 `Option<Block<T>>` 表达“无存储”，满足“存储为空当且仅当容量为 0”。
///
/// # 架构关系（How）
/// - `block`：当前块，`data.len()` 即逻辑长度，`data.capacity()` 即容量；
/// - `source`：决定增长时从池租借还是直接分配；
/// - 增长时先获取新块，成功后才移动元素并释放旧块，失败时状态保持不变。
///
/// # 契约说明（What）
/// - **增长策略**：无块时新容量为 `max(n, 16)`，否则为 `max(len + n, capacity * 2)`；
/// - **释放语义**：`dispose` 与 `Drop` 都只释放一次；释放后实例可继续使用；
/// - **前置条件**：`grow` 只能在剩余空间不足时调用，否则触发调试断言。
pub(crate) struct PooledStorage<T> {
    block: Option<Block<T>>,
    source: Source<T>,
}

impl<T> PooledStorage<T> {
    pub(crate) fn pool_bound(pool: Arc<dyn BlockPool<T>>) -> Self {
        Self {
            block: None,
            source: Source::Pool(pool),
        }
    }

    pub(crate) fn exclusive() -> Self {
        Self {
            block: None,
            source: Source::Heap,
        }
    }

    /// 包装调用方提供的块：块中已有元素视为存活元素，块本身不会归还给池。
    pub(crate) fn from_block(pool: Arc<dyn BlockPool<T>>, block: Vec<T>) -> Self {
        Self {
            block: (block.capacity() > 0).then_some(Block::Owned(block)),
            source: Source::Pool(pool),
        }
    }

    pub(crate) fn mode(&self) -> OwnershipMode {
        match self.source {
            Source::Pool(_) => OwnershipMode::PoolBound,
            Source::Heap => OwnershipMode::Exclusive,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.block.as_ref().map_or(0, |block| block.data().len())
    }

    pub(crate) fn capacity(&self) -> usize {
        self.block.as_ref().map_or(0, |block| block.data().capacity())
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.block.is_some()
    }

    /// 当前块是否借自缓冲池。
    pub(crate) fn holds_leased_block(&self) -> bool {
        self.block.as_ref().is_some_and(Block::is_leased)
    }

    pub(crate) fn spare(&self) -> usize {
        self.capacity() - self.len()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        match self.block.as_ref() {
            Some(block) => block.data().as_slice(),
            None => &[],
        }
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        match self.block.as_mut() {
            Some(block) => block.data_mut().as_mut_slice(),
            None => &mut [],
        }
    }

    /// 取得存储的只读视图；无存储时返回 [`VecError::Uninitialized`]。
    pub(crate) fn require(&self, operation: &'static str) -> Result<&Vec<T>> {
        self.block
            .as_ref()
            .map(Block::data)
            .ok_or(VecError::Uninitialized { operation })
    }

    /// 取得存储的可变视图；无存储时返回 [`VecError::Uninitialized`]。
    pub(crate) fn require_mut(&mut self, operation: &'static str) -> Result<&mut Vec<T>> {
        self.block
            .as_mut()
            .map(Block::data_mut)
            .ok_or(VecError::Uninitialized { operation })
    }

    /// 保证写游标之后至少还有 `additional` 个槽位，不足时按增长策略扩容。
    ///
    /// 返回 `Ok` 后存储一定存在（`additional > 0` 时）。
    pub(crate) fn ensure_additional(&mut self, additional: usize) -> Result<()> {
        if additional == 0 || self.spare() >= additional {
            return Ok(());
        }
        self.grow(additional)
    }

    /// 按增长策略换到更大的块。
    fn grow(&mut self, additional: usize) -> Result<()> {
        debug_assert!(additional > 0, "growth requires a positive request");
        debug_assert!(
            self.spare() < additional,
            "growth requested while {} slots are still free",
            self.spare()
        );
        let len = self.len();
        let required = len
            .checked_add(additional)
            .ok_or(VecError::CapacityOverflow { len, additional })?;
        let old_capacity = self.capacity();
        let new_capacity = match self.block {
            None => additional.max(MIN_GROWTH_CAPACITY),
            Some(_) => required.max(old_capacity.saturating_mul(2)),
        };

        let mut fresh = self.allocate(new_capacity)?;
        debug_assert!(fresh.data().capacity() >= required);
        if let Some(mut old) = self.block.take() {
            fresh.data_mut().append(old.data_mut());
            old.release();
        }
        tracing::trace!(
            len,
            old_capacity,
            new_capacity = fresh.data().capacity(),
            mode = ?self.mode(),
            "storage grown"
        );
        self.block = Some(fresh);
        Ok(())
    }

    fn allocate(&self, capacity: usize) -> Result<Block<T>> {
        match &self.source {
            Source::Pool(pool) => Ok(Block::Leased {
                data: pool.acquire(capacity)?,
                home: Arc::clone(pool),
            }),
            Source::Heap => allocate_exclusive(capacity).map(Block::Owned),
        }
    }

    /// 单向转换为独占模式：按 `max(16, len)` 直接分配新块，移动存活元素，旧块归还池。
    ///
    /// 已是独占模式时为无操作。
    pub(crate) fn make_exclusive(&mut self) -> Result<()> {
        if self.mode() == OwnershipMode::Exclusive {
            return Ok(());
        }
        let len = self.len();
        let mut fresh = allocate_exclusive(len.max(MIN_GROWTH_CAPACITY))?;
        if let Some(mut old) = self.block.take() {
            fresh.append(old.data_mut());
            old.release();
        }
        tracing::debug!(len, capacity = fresh.capacity(), "storage converted to exclusive");
        self.block = Some(Block::Owned(fresh));
        self.source = Source::Heap;
        Ok(())
    }

    /// 交出当前块，存储回到“无块”状态；模式不变。
    pub(crate) fn take_block(&mut self) -> Option<Block<T>> {
        self.block.take()
    }

    /// 释放当前块；重复调用为无操作。
    pub(crate) fn dispose(&mut self) {
        if let Some(block) = self.block.take() {
            block.release();
        }
    }
}

impl<T> Drop for PooledStorage<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn allocate_exclusive<T>(capacity: usize) -> Result<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(capacity)
        .map_err(|_| VecError::AllocationFailed {
            requested: capacity,
        })?;
    Ok(data)
}
