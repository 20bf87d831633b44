use crate::PoolError;

/// `BlockPool` 规定连续内存块的租借与归还接口。
///
/// # 设计背景（Why）
/// - 池化序列在每次增长时都需要一块更大的连续存储；若直接向分配器申请，
///   频繁构建变长序列的热路径会产生大量堆抖动；
/// - 将“租借/归还”抽象为 trait，序列实现只依赖这两个动作，
///   池可以是自由链表、分级缓存或测试探针。
///
/// # 逻辑解析（How）
/// - 内存块以 `Vec<T>` 表示：`capacity()` 即槽位数，`len()` 为 0 表示块内没有存活元素；
/// - `acquire` 返回一个空块，容量不小于 `min_capacity`；
/// - `release` 把块交还给池，池可缓存、丢弃或重新统计。
///
/// # 契约说明（What）
/// - **前置条件**：实现必须线程安全（`Send + Sync`），独立的序列实例会并发租借/归还；
/// - **后置条件**：
///   - `acquire` 成功时返回块满足 `capacity() >= min_capacity` 且 `len() == 0`；
///   - `release` 不得 panic（它会在 `Drop` 路径上被调用）；
///   - 调用方保证同一块只归还一次，归还前已清空元素。
///
/// # 设计考量（Trade-offs）
/// - 块的容量可能大于请求值（例如按 2 的幂取整），调用方不得假设精确容量；
/// - 池不做引用计数：块在租借期间由唯一所有者持有，所有权通过移动语义转移。
pub trait BlockPool<T>: Send + Sync {
    /// 租借一个至少具备 `min_capacity` 个槽位的空块。
    fn acquire(&self, min_capacity: usize) -> Result<Vec<T>, PoolError>;

    /// 归还此前租借的块。
    fn release(&self, block: Vec<T>);

    /// 返回池当前的统计快照；默认实现返回全零快照。
    fn statistics(&self) -> PoolStats {
        PoolStats::default()
    }
}

/// 池统计快照，单位均为“槽位”（元素个数）或“次数”。
///
/// # 契约说明（What）
/// - `allocated_slots`：池向分配器申请且尚未丢弃的总槽位数，包含借出与缓存部分；
/// - `available_slots`：自由链表中可直接复用的槽位数；
/// - `leased_slots`：当前借出的槽位数；
/// - `active_leases`：当前借出的块数；
/// - `total_acquired` / `total_released`：累计租借与归还次数，二者之差即 `active_leases`；
/// - `pool_misses`：自由链表未命中、需要新分配的次数；
/// - `discarded_blocks`：因超出缓存上限而直接丢弃的归还块；
/// - `failed_acquisitions`：租借失败次数；
/// - `retained_blocks`：自由链表当前长度。
///
/// 快照代表读取瞬间的状态，各字段间不保证原子一致。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub allocated_slots: usize,
    pub available_slots: usize,
    pub leased_slots: usize,
    pub active_leases: usize,
    pub total_acquired: u64,
    pub total_released: u64,
    pub pool_misses: u64,
    pub discarded_blocks: u64,
    pub failed_acquisitions: u64,
    pub retained_blocks: usize,
}
