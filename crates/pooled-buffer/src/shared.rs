//! 进程级共享池注册表。
//!
//! 每种元素类型对应一个 [`SlabPool`]，以 `TypeId` 为键惰性创建。
//! 未显式指定池的序列（例如 [`PooledList::new`](crate::PooledList::new)）都从这里取池，
//! 因此同类型的不同实例可以互相复用对方归还的块。

use alloc::{boxed::Box, sync::Arc};
use core::any::{Any, TypeId};
use std::sync::LazyLock;

use dashmap::DashMap;
use pooled_core::{BlockPool, PoolSettings};

use crate::SlabPool;

// TypeId of element -> `Arc<SlabPool<T>>`.
static REGISTRY: LazyLock<DashMap<TypeId, Box<dyn Any + Send + Sync>>> =
    LazyLock::new(DashMap::new);

/// 返回元素类型 `T` 的共享池，首次访问时以默认设置创建。
pub fn shared_pool<T: Send + 'static>() -> Arc<dyn BlockPool<T>> {
    shared_slab_pool::<T>()
}

/// 返回元素类型 `T` 的共享池的具体类型句柄，便于读取统计或收缩缓存。
pub fn shared_slab_pool<T: Send + 'static>() -> Arc<SlabPool<T>> {
    let entry = REGISTRY
        .entry(TypeId::of::<T>())
        .or_insert_with(|| Box::new(SlabPool::<T>::shared(PoolSettings::default())));
    match entry.value().downcast_ref::<Arc<SlabPool<T>>>() {
        Some(pool) => Arc::clone(pool),
        None => unreachable!("shared pool registry is keyed by the element TypeId"),
    }
}

/// 替换元素类型 `T` 的共享池，返回被替换的旧池（若存在）。
///
/// 已借出的块仍持有旧池的句柄，归还时回到旧池；替换只影响之后的租借。
pub fn install_shared_pool<T: Send + 'static>(pool: Arc<SlabPool<T>>) -> Option<Arc<SlabPool<T>>> {
    let previous = REGISTRY.insert(TypeId::of::<T>(), Box::new(pool))?;
    match previous.downcast::<Arc<SlabPool<T>>>() {
        Ok(previous) => Some(*previous),
        Err(_) => unreachable!("shared pool registry is keyed by the element TypeId"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_element_type_shares_one_pool() {
        struct OnlyHere;
        let first = shared_slab_pool::<OnlyHere>();
        let second = shared_slab_pool::<OnlyHere>();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn installed_pool_replaces_default() {
        struct Installed;
        let custom = SlabPool::<Installed>::shared(PoolSettings {
            max_retained_blocks: 2,
            ..PoolSettings::default()
        });
        install_shared_pool(Arc::clone(&custom));
        let current = shared_slab_pool::<Installed>();
        assert!(Arc::ptr_eq(&current, &custom));
        assert_eq!(current.settings().max_retained_blocks, 2);
    }
}
