#![deny(unsafe_op_in_unsafe_fn)]

//! `pooled-buffer` 提供基于缓冲池的可增长序列实现。
//!
//! # 模块定位（Why）
//! - 为 `pooled-core` 定义的 [`BlockPool`] 与 [`BufferWriter`] 契约提供落地实体；
//! - 反复构建变长序列的调用方（解析器、格式化器、批量累积）通过本 crate
//!   复用池化内存块，减少增长路径上的堆分配。
//!
//! # 设计概要（How）
//! - `slab_pool`：[`SlabPool`] 以自由链表缓存归还的块，并以原子计数提供统计快照；
//! - `shared`：按元素类型惰性创建的进程级共享池，[`PooledList::new`] 等默认构造使用它；
//! - `storage`：列表与写入器共享的增长算法、所有权模式与释放纪律；
//! - `list` / `writer`：两种访问形态 [`PooledList`] 与 [`PooledWriter`]；
//! - `lease`：写入器视图型终结操作返回的 [`PooledSlice`] / [`PooledSegment`]，析构时归还块。
//!
//! # 线程模型（Consistency）
//! - 单个序列实例只有一个所有者，不做内部同步；
//! - 池可以被多个实例跨线程并发租借与归还。

extern crate alloc;

mod iter;
mod lease;
mod list;
mod range;
mod shared;
mod slab_pool;
mod storage;
mod writer;

pub use iter::Iter;
pub use lease::{PooledSegment, PooledSlice};
pub use list::PooledList;
pub use shared::{install_shared_pool, shared_pool, shared_slab_pool};
pub use slab_pool::SlabPool;
pub use storage::OwnershipMode;
pub use writer::PooledWriter;

pub use pooled_core::{
    BlockPool, BufferWriter, Comparer, DefaultComparer, EqualityComparer, PoolError, PoolSettings,
    PoolStats, Result, VecError,
};
