use alloc::{sync::Arc, vec::Vec};
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use pooled_core::{BlockPool, PoolError, PoolSettings, PoolStats};
use spin::Mutex;

/// `SlabPool` 提供基于自由链表（Free List）的块池实现，
/// 复用 `Vec<T>` 的底层分配以减少增长路径上的堆分配次数。
///
/// # 模块角色（Why）
/// - 作为 [`BlockPool`] 的默认实现，为池化序列提供统一的块来源；
/// - 归还的块清空后进入自由链表，下一次租借优先复用容量足够的块；
/// - 通过 [`PoolSettings`] 限制缓存规模与借出总量，避免峰值负载后常驻过多内存。
///
/// # 核心机制（How）
/// - 自由链表为 `spin::Mutex<Vec<Vec<T>>>`，租借时线性查找首个满足容量的块；
/// - 未命中时按 [`PoolSettings::block_capacity_for`] 规整容量后通过 `try_reserve_exact` 分配，
///   分配失败转为 [`PoolError::AllocationFailed`]；
/// - 借出上限按实际交出的块容量（而非请求值）计费，检查与计数合并为一次 `fetch_update`，
///   并发租借不会越过上限；缓存块计费失败时放回自由链表；
/// - `PoolMetrics` 以原子计数跟踪分配、借出、归还与丢弃，`statistics` 据此生成快照。
///
/// # 契约说明（What）
/// - **线程安全**：共享状态由自旋锁与原子计数保护，可被多个序列实例并发使用；
/// - **后置条件**：`acquire` 返回的块 `len() == 0` 且 `capacity() >= min_capacity`；
/// - **归还语义**：`release` 总会清空块；超出缓存上限的块直接丢弃并计入 `discarded_blocks`。
///
/// # 设计权衡（Trade-offs）
/// - 自旋锁临界区只包含链表的查找与 `swap_remove`/`push`，不在锁内分配或析构元素；
/// - 线性查找在缓存块数较少（默认 32）时足够快，换来实现简单。
pub struct SlabPool<T> {
    free_list: Mutex<Vec<Vec<T>>>,
    settings: PoolSettings,
    metrics: PoolMetrics,
}

impl<T> SlabPool<T> {
    /// 使用默认设置创建空池。
    pub fn new() -> Self {
        Self::with_settings(PoolSettings::default())
    }

    /// 使用给定设置创建空池。
    pub fn with_settings(settings: PoolSettings) -> Self {
        Self {
            free_list: Mutex::new(Vec::new()),
            settings,
            metrics: PoolMetrics::default(),
        }
    }

    /// 创建可直接注入序列的共享句柄。
    pub fn shared(settings: PoolSettings) -> Arc<Self> {
        Arc::new(Self::with_settings(settings))
    }

    /// 当前生效的设置。
    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// 丢弃自由链表中缓存的全部块，返回释放的槽位数。
    pub fn shrink_to_fit(&self) -> usize {
        let drained: Vec<Vec<T>> = core::mem::take(&mut *self.free_list.lock());
        let reclaimed: usize = drained.iter().map(Vec::capacity).fold(0, usize::saturating_add);
        self.metrics.decrease_available(reclaimed);
        self.metrics.decrease_allocated(reclaimed);
        tracing::debug!(blocks = drained.len(), slots = reclaimed, "free list shrunk");
        reclaimed
    }

    fn take_cached(&self, min_capacity: usize) -> Option<Vec<T>> {
        let mut list = self.free_list.lock();
        let index = list.iter().position(|block| block.capacity() >= min_capacity)?;
        Some(list.swap_remove(index))
    }

    /// 以单次原子更新把 `capacity` 计入借出槽位；设置了上限且会超出时拒绝，计数不变。
    fn charge_lease(&self, capacity: usize) -> Result<(), PoolError> {
        let Some(limit) = self.settings.max_leased_capacity else {
            saturating_add(&self.metrics.leased_slots, capacity);
            return Ok(());
        };
        self.metrics
            .leased_slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |leased| {
                leased.checked_add(capacity).filter(|total| *total <= limit)
            })
            .map(|_| ())
            .map_err(|leased| {
                self.metrics.failed_acquisitions.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(requested = capacity, leased, limit, "pool exhausted");
                PoolError::Exhausted {
                    requested: capacity,
                    leased,
                    limit,
                }
            })
    }

    /// 租借失败时把取出的缓存块放回自由链表。
    fn restore_cached(&self, block: Vec<T>) {
        self.free_list.lock().push(block);
    }

    fn allocate(&self, min_capacity: usize, capacity: usize) -> Result<Vec<T>, PoolError> {
        let mut block = Vec::new();
        if block.try_reserve_exact(capacity).is_err() {
            self.metrics.failed_acquisitions.fetch_add(1, Ordering::Relaxed);
            return Err(PoolError::AllocationFailed {
                requested: min_capacity,
            });
        }
        self.metrics.pool_misses.fetch_add(1, Ordering::Relaxed);
        self.metrics.increase_allocated(block.capacity());
        tracing::debug!(min_capacity, capacity = block.capacity(), "pool miss, new block");
        Ok(block)
    }
}

impl<T> Default for SlabPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> BlockPool<T> for SlabPool<T> {
    fn acquire(&self, min_capacity: usize) -> Result<Vec<T>, PoolError> {
        let block = match self.take_cached(min_capacity) {
            Some(block) => {
                if let Err(err) = self.charge_lease(block.capacity()) {
                    self.restore_cached(block);
                    return Err(err);
                }
                self.metrics.decrease_available(block.capacity());
                block
            }
            None => {
                let capacity = self.settings.block_capacity_for(min_capacity);
                self.charge_lease(capacity)?;
                let block = match self.allocate(min_capacity, capacity) {
                    Ok(block) => block,
                    Err(err) => {
                        saturating_sub(&self.metrics.leased_slots, capacity);
                        return Err(err);
                    }
                };
                // 零大小类型的 `Vec` 容量恒为 `usize::MAX`，按实际容量补足计数。
                saturating_add(
                    &self.metrics.leased_slots,
                    block.capacity().saturating_sub(capacity),
                );
                block
            }
        };
        debug_assert!(block.is_empty());
        self.metrics.on_lease();
        tracing::trace!(min_capacity, capacity = block.capacity(), "block acquired");
        Ok(block)
    }

    fn release(&self, mut block: Vec<T>) {
        block.clear();
        let capacity = block.capacity();
        self.metrics.on_return(capacity);
        if capacity == 0 || capacity > self.settings.max_retained_capacity {
            self.discard(capacity);
            return;
        }
        let rejected = {
            let mut list = self.free_list.lock();
            if list.len() < self.settings.max_retained_blocks {
                list.push(block);
                None
            } else {
                Some(block)
            }
        };
        match rejected {
            Some(block) => {
                self.discard(capacity);
                drop(block);
            }
            None => self.metrics.increase_available(capacity),
        }
    }

    fn statistics(&self) -> PoolStats {
        let retained_blocks = self.free_list.lock().len();
        self.metrics.snapshot(retained_blocks)
    }
}

impl<T> SlabPool<T> {
    fn discard(&self, capacity: usize) {
        self.metrics.discarded_blocks.fetch_add(1, Ordering::Relaxed);
        self.metrics.decrease_allocated(capacity);
        tracing::debug!(capacity, "released block discarded");
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocated_slots: AtomicUsize,
    available_slots: AtomicUsize,
    leased_slots: AtomicUsize,
    active_leases: AtomicUsize,
    total_acquired: AtomicU64,
    total_released: AtomicU64,
    pool_misses: AtomicU64,
    discarded_blocks: AtomicU64,
    failed_acquisitions: AtomicU64,
}

impl PoolMetrics {
    fn increase_allocated(&self, capacity: usize) {
        saturating_add(&self.allocated_slots, capacity);
    }

    fn decrease_allocated(&self, capacity: usize) {
        saturating_sub(&self.allocated_slots, capacity);
    }

    fn increase_available(&self, capacity: usize) {
        saturating_add(&self.available_slots, capacity);
    }

    fn decrease_available(&self, capacity: usize) {
        saturating_sub(&self.available_slots, capacity);
    }

    fn on_lease(&self) {
        self.active_leases.fetch_add(1, Ordering::Relaxed);
        self.total_acquired.fetch_add(1, Ordering::Relaxed);
    }

    fn on_return(&self, capacity: usize) {
        saturating_sub(&self.leased_slots, capacity);
        saturating_sub(&self.active_leases, 1);
        self.total_released.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self, retained_blocks: usize) -> PoolStats {
        PoolStats {
            allocated_slots: self.allocated_slots.load(Ordering::Relaxed),
            available_slots: self.available_slots.load(Ordering::Relaxed),
            leased_slots: self.leased_slots.load(Ordering::Relaxed),
            active_leases: self.active_leases.load(Ordering::Relaxed),
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            pool_misses: self.pool_misses.load(Ordering::Relaxed),
            discarded_blocks: self.discarded_blocks.load(Ordering::Relaxed),
            failed_acquisitions: self.failed_acquisitions.load(Ordering::Relaxed),
            retained_blocks,
        }
    }
}

fn saturating_add(target: &AtomicUsize, value: usize) {
    let _ = target.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(value))
    });
}

fn saturating_sub(target: &AtomicUsize, value: usize) {
    let _ = target.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(value))
    });
}
