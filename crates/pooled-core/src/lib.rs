#![deny(unsafe_op_in_unsafe_fn)]
#![doc = "pooled-core: 池化可增长序列的核心契约。"]
#![doc = ""]
#![doc = "本 crate 只定义契约，不落地实体：缓冲池接口、写入器协议、比较器抽象、错误域与池配置。"]
#![doc = "具体实现位于 `pooled-buffer`，生产者（例如模板格式化器）只需依赖本 crate 的 [`BufferWriter`] 即可写入池化内存。"]

//! # 模块定位（Why）
//! - 池化序列的“列表”与“写入器”两种形态共享同一套增长、所有权与区间校验规则，
//!   这些规则的对外边界（错误码、池接口、写入协议）集中在此处，避免实现层与调用方各自定义；
//! - 生产者只依赖 `reserve`/`advance` 两个操作即可写入任意实现，不感知池化细节。
//!
//! # 结构概览（How）
//! - [`error`]：`VecError`、`PoolError`、`PoolConfigError` 与稳定错误码；
//! - [`pool`]：[`BlockPool`] 租借/归还契约与 [`PoolStats`] 快照；
//! - [`writer`]：[`BufferWriter`] 预留-写入-提交协议；
//! - [`compare`]：[`EqualityComparer`]/[`Comparer`] 及其默认实现；
//! - [`config`]：[`PoolSettings`]，支持 TOML 解析。

pub mod compare;
pub mod config;
pub mod error;
pub mod pool;
pub mod writer;

pub use compare::{Comparer, DefaultComparer, EqualityComparer};
pub use config::PoolSettings;
pub use error::{PoolConfigError, PoolError, VecError, codes};
pub use pool::{BlockPool, PoolStats};
pub use writer::BufferWriter;

/// 统一的结果别名，默认错误类型为 [`VecError`]。
pub type Result<T, E = VecError> = core::result::Result<T, E>;
