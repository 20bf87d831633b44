//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 池化序列的所有失败都属于两类：调用方违反前置条件（越界、未初始化、提交超出预留），
//!   或缓冲池无法提供内存；两者都必须立即、显式地返回，绝不静默修正；
//! - 每个错误携带稳定错误码（`<域>.<语义>`），便于日志与告警按码聚合。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 [`thiserror::Error`]，兼容 `std::error::Error`；
//! - 失败的操作不修改容器状态（不存在“部分成功”）；
//! - 池错误经 [`VecError::Pool`] 原样向上传播，核心不重试、不替换内存来源。

use thiserror::Error;

/// 稳定错误码。
///
/// 码值一旦发布即视为契约，调整语义必须新增码值而非复用。
pub mod codes {
    /// 在没有底层存储的容器上执行了需要存储的操作。
    pub const VEC_UNINITIALIZED: &str = "vec.uninitialized";
    /// 单个索引越界。
    pub const VEC_INDEX_OUT_OF_RANGE: &str = "vec.index_out_of_range";
    /// `start`/`count` 描述的区间越界。
    pub const VEC_RANGE_OUT_OF_BOUNDS: &str = "vec.range_out_of_bounds";
    /// 提交的数量超出预留区域。
    pub const VEC_ADVANCE_OUT_OF_BOUNDS: &str = "vec.advance_out_of_bounds";
    /// 请求的容量无法表示。
    pub const VEC_CAPACITY_OVERFLOW: &str = "vec.capacity_overflow";
    /// 独占模式下直接分配失败。
    pub const VEC_ALLOCATION_FAILED: &str = "vec.allocation_failed";
    /// 缓冲池达到租借上限。
    pub const POOL_EXHAUSTED: &str = "pool.exhausted";
    /// 缓冲池向分配器申请内存失败。
    pub const POOL_ALLOCATION_FAILED: &str = "pool.allocation_failed";
    /// 池配置无法解析。
    pub const CONFIG_PARSE: &str = "config.parse";
    /// 池配置取值非法。
    pub const CONFIG_INVALID: &str = "config.invalid";
}

/// 缓冲池错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：池是外部协作者，它的失败必须原样交给调用方处理，
///   核心层既不重试也不改用其它来源；
/// - **契约 (What)**：`requested` 为本次租借请求的槽位数（元素个数，而非字节数）；
/// - **风险 (Trade-offs)**：`Exhausted` 频繁出现说明 `max_leased_capacity` 偏小，
///   或存在未归还的租约。
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PoolError {
    /// 已借出容量加上本次请求将超过配置的上限。
    #[error("pool exhausted: requested {requested} slots with {leased} leased of limit {limit}")]
    Exhausted {
        requested: usize,
        leased: usize,
        limit: usize,
    },

    /// 分配器拒绝了本次申请（容量不可表示或内存不足）。
    #[error("pool failed to allocate a block of {requested} slots")]
    AllocationFailed { requested: usize },
}

impl PoolError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            PoolError::Exhausted { .. } => codes::POOL_EXHAUSTED,
            PoolError::AllocationFailed { .. } => codes::POOL_ALLOCATION_FAILED,
        }
    }
}

/// 池化序列的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：区分“调用方缺陷”（前置条件违例）与“资源失败”（池/分配器），
///   让调用方可以只对后者做降级；
/// - **契约 (What)**：
///   - 所有变体 `Send + Sync + 'static`，可跨线程传播；
///   - 返回错误时容器状态保持调用前的样子；
///   - `operation` 字段记录触发失败的公开方法名，直接用于排障；
/// - **设计权衡 (Trade-offs)**：以 `usize` 表达索引，负数在类型层面不可表达；
///   `start + count` 溢出同样按区间越界上报。
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VecError {
    /// 容器尚未持有存储（从未分配或已释放）。
    #[error("`{operation}` requires storage but the container holds none")]
    Uninitialized { operation: &'static str },

    /// 索引不满足 `index < len`（插入类操作为 `index <= len`）。
    #[error("`{operation}`: index {index} out of range for length {len}")]
    IndexOutOfRange {
        operation: &'static str,
        index: usize,
        len: usize,
    },

    /// 区间 `[start, start + count)` 超出 `[0, len)`。
    #[error("`{operation}`: range start {start} count {count} out of bounds for length {len}")]
    RangeOutOfBounds {
        operation: &'static str,
        start: usize,
        count: usize,
        len: usize,
    },

    /// 提交数量超出写游标之后的可写空间。
    #[error("advance by {count} exceeds the {available} reserved slots")]
    AdvanceOutOfBounds { count: usize, available: usize },

    /// `len + additional` 无法用 `usize` 表示。
    #[error("capacity overflow: length {len} plus {additional} additional slots")]
    CapacityOverflow { len: usize, additional: usize },

    /// 独占模式下直接分配失败。
    #[error("failed to allocate an exclusive block of {requested} slots")]
    AllocationFailed { requested: usize },

    /// 缓冲池返回的错误，原样传播。
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl VecError {
    /// 返回稳定错误码；池错误沿用池自身的码值。
    pub fn code(&self) -> &'static str {
        match self {
            VecError::Uninitialized { .. } => codes::VEC_UNINITIALIZED,
            VecError::IndexOutOfRange { .. } => codes::VEC_INDEX_OUT_OF_RANGE,
            VecError::RangeOutOfBounds { .. } => codes::VEC_RANGE_OUT_OF_BOUNDS,
            VecError::AdvanceOutOfBounds { .. } => codes::VEC_ADVANCE_OUT_OF_BOUNDS,
            VecError::CapacityOverflow { .. } => codes::VEC_CAPACITY_OVERFLOW,
            VecError::AllocationFailed { .. } => codes::VEC_ALLOCATION_FAILED,
            VecError::Pool(err) => err.code(),
        }
    }

    /// 是否属于调用方前置条件违例（而非资源失败）。
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            VecError::Uninitialized { .. }
                | VecError::IndexOutOfRange { .. }
                | VecError::RangeOutOfBounds { .. }
                | VecError::AdvanceOutOfBounds { .. }
                | VecError::CapacityOverflow { .. }
        )
    }
}

/// 池配置错误。
#[derive(Debug, Error)]
pub enum PoolConfigError {
    /// TOML 文本无法映射为 [`PoolSettings`](crate::PoolSettings)。
    #[error("failed to parse pool settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// 字段取值非法，`field` 为出错字段名。
    #[error("invalid pool setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl PoolConfigError {
    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            PoolConfigError::Parse(_) => codes::CONFIG_PARSE,
            PoolConfigError::Invalid { .. } => codes::CONFIG_INVALID,
        }
    }
}
