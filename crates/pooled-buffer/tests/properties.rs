//! 基于 `proptest` 的性质测试：以 `Vec` 为参照模型校验池化序列。
//!
//! - 追加/插入/删除后的内容与参照模型一致，容量只增不减；
//! - 插入后立即删除同一位置恢复原状；
//! - 区间校验与 `start + count <= len` 等价，越界从不截断；
//! - 写入器在部分提交下只保留提交的前缀；
//! - 任意操作序列结束后，池的租借与归还次数相等。

use std::sync::Arc;

use pooled_buffer::{BlockPool, DefaultComparer, PooledList, PooledWriter, SlabPool};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Add(i32),
    AddRange(Vec<i32>),
    Insert(usize, i32),
    RemoveAt(usize),
    RemoveRange(usize, usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Add),
        2 => prop::collection::vec(any::<i32>(), 0..40).prop_map(Op::AddRange),
        2 => (0usize..64, any::<i32>()).prop_map(|(index, value)| Op::Insert(index, value)),
        2 => (0usize..64).prop_map(Op::RemoveAt),
        1 => (0usize..64, 0usize..16).prop_map(|(start, count)| Op::RemoveRange(start, count)),
        1 => Just(Op::Clear),
    ]
}

fn fresh_pool() -> (Arc<SlabPool<i32>>, Arc<dyn BlockPool<i32>>) {
    let pool = Arc::new(SlabPool::new());
    let handle: Arc<dyn BlockPool<i32>> = pool.clone();
    (pool, handle)
}

proptest! {
    #[test]
    fn list_matches_vec_model(ops in prop::collection::vec(op_strategy(), 0..120)) {
        let (pool, handle) = fresh_pool();
        let mut list = PooledList::with_pool(handle);
        let mut model: Vec<i32> = Vec::new();
        let mut last_capacity = 0;

        for op in ops {
            match op {
                Op::Add(value) => {
                    list.add(value).expect("追加");
                    model.push(value);
                }
                Op::AddRange(values) => {
                    list.add_range(&values).expect("批量追加");
                    model.extend_from_slice(&values);
                }
                Op::Insert(index, value) => {
                    let result = list.insert(index, value);
                    prop_assert_eq!(result.is_ok(), index <= model.len());
                    if index <= model.len() {
                        model.insert(index, value);
                    }
                }
                Op::RemoveAt(index) => {
                    let result = list.remove_at(index);
                    if index < model.len() {
                        prop_assert_eq!(result, Ok(model.remove(index)));
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                Op::RemoveRange(start, count) => {
                    let result = list.remove_range(start, count);
                    let valid = list.is_initialized() && start + count <= model.len();
                    prop_assert_eq!(result.is_ok(), valid);
                    if valid {
                        model.drain(start..start + count);
                    }
                }
                Op::Clear => {
                    list.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(list.as_slice(), model.as_slice());
            prop_assert!(list.len() <= list.capacity());
            prop_assert!(list.capacity() >= last_capacity, "容量不应缩小");
            last_capacity = list.capacity();
        }

        drop(list);
        let stats = pool.statistics();
        prop_assert_eq!(stats.total_acquired, stats.total_released);
        prop_assert_eq!(stats.active_leases, 0);
    }

    #[test]
    fn insert_then_remove_restores_contents(
        values in prop::collection::vec(any::<i32>(), 0..64),
        position in any::<prop::sample::Index>(),
        extra in any::<i32>(),
    ) {
        let (_pool, handle) = fresh_pool();
        let mut list = PooledList::with_pool(handle);
        list.add_range(&values).expect("填充");
        let index = position.index(values.len() + 1);
        list.insert(index, extra).expect("插入");
        prop_assert_eq!(list.len(), values.len() + 1);
        prop_assert_eq!(list.remove_at(index), Ok(extra));
        prop_assert_eq!(list.as_slice(), values.as_slice());
    }

    #[test]
    fn range_validation_never_clamps(
        len in 1usize..32,
        start in 0usize..40,
        count in 0usize..40,
    ) {
        let (_pool, handle) = fresh_pool();
        let mut list = PooledList::with_pool(handle);
        let values: Vec<i32> = (0..len as i32).rev().collect();
        list.add_range(&values).expect("填充");

        let valid = start + count <= len;
        prop_assert_eq!(list.sort_in(start, count, DefaultComparer).is_ok(), valid);
        prop_assert_eq!(list.reverse_in(start, count).is_ok(), valid);
        prop_assert_eq!(list.index_of_in(&0, start, count, DefaultComparer).is_ok(), valid);
        prop_assert_eq!(list.binary_search_in(&0, start, count, DefaultComparer).is_ok(), valid);
        if !valid {
            prop_assert_eq!(list.as_slice(), values.as_slice());
        }
    }

    #[test]
    fn writer_keeps_only_committed_prefix(
        chunks in prop::collection::vec(
            (prop::collection::vec(any::<u8>(), 1..48), any::<prop::sample::Index>()),
            0..24,
        ),
    ) {
        let pool = SlabPool::<u8>::shared(Default::default());
        let mut writer = PooledWriter::with_pool(pool.clone() as Arc<dyn BlockPool<u8>>);
        let mut expected = Vec::new();

        for (chunk, commit) in chunks {
            let committed = commit.index(chunk.len() + 1);
            let region = writer.reserve(chunk.len()).expect("预留");
            prop_assert!(region.len() >= chunk.len());
            for (slot, byte) in region.iter_mut().zip(&chunk) {
                slot.write(*byte);
            }
            // SAFETY: 区域前 `chunk.len()` 个槽位已初始化，`committed` 不超过它。
            unsafe { writer.advance(committed) }.expect("提交");
            expected.extend_from_slice(&chunk[..committed]);
        }

        prop_assert_eq!(writer.written(), expected.as_slice());
        prop_assert_eq!(writer.take_as_copy(), expected);
        prop_assert_eq!(writer.len(), 0);
        drop(writer);
        prop_assert_eq!(pool.statistics().active_leases, 0);
    }
}
