use serde::{Deserialize, Serialize};

use crate::PoolConfigError;

/// 缓冲池的可调参数。
///
/// ### 设计目的（Why）
/// - 池的缓存策略（保留多少块、保留多大的块、是否限制借出总量）因负载而异，
///   集中到一个结构里，便于从配置文件加载并在构造池时一次性注入；
/// - 单位统一为“槽位”（元素个数），与元素类型的字节宽度无关。
///
/// ### 契约说明（What）
/// - `max_retained_blocks`：自由链表最多缓存的块数，默认 32；
/// - `max_retained_capacity`：容量大于此值的块归还时直接丢弃，默认 `1 << 20`；
/// - `max_leased_capacity`：同时借出的槽位上限，`None` 表示不限；超出时 `acquire` 返回
///   [`PoolError::Exhausted`](crate::PoolError::Exhausted)；
/// - `round_to_power_of_two`：新分配的块容量是否向上取整到 2 的幂，默认开启，以提高复用命中率。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    pub max_retained_blocks: usize,
    pub max_retained_capacity: usize,
    pub max_leased_capacity: Option<usize>,
    pub round_to_power_of_two: bool,
}

impl PoolSettings {
    /// 默认自由链表长度上限。
    pub const DEFAULT_MAX_RETAINED_BLOCKS: usize = 32;
    /// 默认可缓存块的容量上限。
    pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1 << 20;

    /// 从 TOML 文本解析并校验设置，缺省字段取默认值。
    ///
    /// ```
    /// use pooled_core::PoolSettings;
    ///
    /// let settings = PoolSettings::from_toml_str("max_retained_blocks = 4").unwrap();
    /// assert_eq!(settings.max_retained_blocks, 4);
    /// assert!(settings.round_to_power_of_two);
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, PoolConfigError> {
        let settings: Self = toml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 校验字段之间的约束。
    pub fn validate(&self) -> Result<(), PoolConfigError> {
        if self.max_leased_capacity == Some(0) {
            return Err(PoolConfigError::Invalid {
                field: "max_leased_capacity",
                reason: "a zero ceiling rejects every acquisition",
            });
        }
        if self.max_retained_blocks > 0 && self.max_retained_capacity == 0 {
            return Err(PoolConfigError::Invalid {
                field: "max_retained_capacity",
                reason: "retaining blocks requires a non-zero capacity ceiling",
            });
        }
        Ok(())
    }

    /// 把请求容量规整为实际分配的容量；取整溢出时退回原值。
    pub fn block_capacity_for(&self, min_capacity: usize) -> usize {
        if self.round_to_power_of_two {
            min_capacity.checked_next_power_of_two().unwrap_or(min_capacity)
        } else {
            min_capacity
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_retained_blocks: Self::DEFAULT_MAX_RETAINED_BLOCKS,
            max_retained_capacity: Self::DEFAULT_MAX_RETAINED_CAPACITY,
            max_leased_capacity: None,
            round_to_power_of_two: true,
        }
    }
}
