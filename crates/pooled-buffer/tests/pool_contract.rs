//! `pool_contract` 集成测试：验证池化序列与缓冲池之间的租借/归还纪律。
//!
//! # 测试目标（Why）
//! - 每个借出的块必须恰好归还一次：增长、释放、独占转换、视图终结等所有路径都不能泄漏或重复归还；
//! - 归还的块必须已清空，空出的槽位不得残留旧值；
//! - 池的失败（耗尽）应原样传播，且序列状态不变。
//!
//! # 结构安排（How）
//! - `RecordingPool` 作为探针实现 `BlockPool`，以块地址记录“借出未还”的集合；
//! - 其余测试使用 `SlabPool` 的统计快照，覆盖耗尽与并发场景。

use std::{
    sync::{Arc, Mutex},
    thread,
};

use pooled_buffer::{
    BlockPool, OwnershipMode, PoolError, PoolSettings, PooledList, PooledWriter, SlabPool,
    VecError,
};

/// `RecordingPool`：记录每一次租借与归还的探针池。
///
/// # 行为描述（How）
/// - `acquire` 直接分配 `Vec::with_capacity(min)`，并把块地址加入 `outstanding`；
/// - `release` 从 `outstanding` 移除对应地址；找不到时计入 `foreign`（重复归还或归还了不属于池的块）；
/// - 同时记录归还时块是否仍含元素。
#[derive(Default)]
struct RecordingPool {
    ledger: Mutex<Ledger>,
}

#[derive(Clone, Debug, Default)]
struct Ledger {
    outstanding: Vec<usize>,
    acquired: usize,
    released: usize,
    foreign: usize,
    non_empty: usize,
}

impl RecordingPool {
    fn ledger(&self) -> Ledger {
        self.ledger.lock().expect("mutex poisoned").clone()
    }

    /// 断言所有借出的块都恰好归还了一次。
    fn assert_balanced(&self) {
        let ledger = self.ledger();
        assert!(ledger.outstanding.is_empty(), "存在未归还的块: {ledger:?}");
        assert_eq!(ledger.acquired, ledger.released, "{ledger:?}");
        assert_eq!(ledger.foreign, 0, "出现重复或越界归还: {ledger:?}");
        assert_eq!(ledger.non_empty, 0, "归还的块应已清空: {ledger:?}");
    }
}

impl<T: Send> BlockPool<T> for RecordingPool {
    fn acquire(&self, min_capacity: usize) -> Result<Vec<T>, PoolError> {
        let block = Vec::with_capacity(min_capacity);
        let mut ledger = self.ledger.lock().expect("mutex poisoned");
        ledger.outstanding.push(block.as_ptr() as usize);
        ledger.acquired += 1;
        Ok(block)
    }

    fn release(&self, block: Vec<T>) {
        let address = block.as_ptr() as usize;
        let mut ledger = self.ledger.lock().expect("mutex poisoned");
        ledger.released += 1;
        if !block.is_empty() {
            ledger.non_empty += 1;
        }
        match ledger.outstanding.iter().position(|&known| known == address) {
            Some(index) => {
                ledger.outstanding.swap_remove(index);
            }
            None => ledger.foreign += 1,
        }
    }
}

fn recording() -> (Arc<RecordingPool>, Arc<dyn BlockPool<u32>>) {
    let probe = Arc::new(RecordingPool::default());
    let pool: Arc<dyn BlockPool<u32>> = probe.clone();
    (probe, pool)
}

/// 多次增长后释放，所有中间块都应恰好归还一次。
#[test]
fn growth_returns_every_replaced_block_once() {
    let (probe, pool) = recording();
    let mut list = PooledList::with_pool(pool);
    for value in 0..200 {
        list.add(value).expect("追加");
    }
    let ledger = probe.ledger();
    assert!(ledger.acquired >= 4, "16 -> 32 -> ... -> 256 至少四次租借");
    assert_eq!(ledger.outstanding.len(), 1, "只有当前块在外");
    drop(list);
    probe.assert_balanced();
}

/// 重复 `dispose` 不会重复归还。
#[test]
fn double_dispose_releases_once() {
    let (probe, pool) = recording();
    let mut list = PooledList::with_pool(pool);
    list.add_range(&[1, 2, 3]).expect("填充");
    list.dispose();
    list.dispose();
    drop(list);
    assert_eq!(probe.ledger().released, 1);
    probe.assert_balanced();
}

/// 视图终结后释放写入器，再析构视图：块只归还一次。
#[test]
fn view_then_dispose_never_double_returns() {
    let (probe, pool) = recording();
    let mut writer = PooledWriter::with_pool(pool);
    writer.append_range(&[7, 8, 9]).expect("写入");
    let view = writer.take_as_view();
    writer.dispose();
    assert_eq!(probe.ledger().released, 0, "视图存活期间块不应归还");
    assert_eq!(&*view, &[7, 8, 9]);
    drop(view);
    drop(writer);
    probe.assert_balanced();
}

/// 片段终结后写入器继续写入，会重新租借新块。
#[test]
fn writer_reacquires_after_segment_finalizer() {
    let (probe, pool) = recording();
    let mut writer = PooledWriter::with_pool(pool);
    writer.append_range(&[1, 2]).expect("写入");
    let segment = writer.take_as_segment();
    assert_eq!(writer.capacity(), 0);
    writer.append(3).expect("再次写入");
    assert_eq!(probe.ledger().acquired, 2);
    drop(segment);
    drop(writer);
    probe.assert_balanced();
}

/// 复制终结保留块，块在写入器释放时归还。
#[test]
fn copy_finalizer_keeps_block_until_dispose() {
    let (probe, pool) = recording();
    let mut writer = PooledWriter::with_pool(pool);
    writer.append_range(&[4, 5, 6]).expect("写入");
    assert_eq!(writer.take_as_copy(), vec![4, 5, 6]);
    assert_eq!(probe.ledger().released, 0);
    writer.append(1).expect("复用同一块");
    assert_eq!(probe.ledger().acquired, 1);
    writer.dispose();
    probe.assert_balanced();
}

/// 写入器转为列表不复制也不重新租借，块由列表负责归还。
#[test]
fn into_list_transfers_the_lease() {
    let (probe, pool) = recording();
    let mut writer = PooledWriter::with_pool(pool);
    writer.append_range(&[1, 2, 3]).expect("写入");
    let mut list = writer.into_list();
    list.add(4).expect("列表继续追加");
    assert_eq!(list.as_slice(), &[1, 2, 3, 4]);
    assert_eq!(probe.ledger().acquired, 1);
    drop(list);
    probe.assert_balanced();
}

/// 独占转换归还原块，之后的增长不再经过池。
#[test]
fn exclusive_conversion_detaches_from_pool() {
    let (probe, pool) = recording();
    let mut list = PooledList::with_pool(pool);
    list.add_range(&[1, 2, 3]).expect("填充");
    list.make_exclusive().expect("转换");
    assert_eq!(list.mode(), OwnershipMode::Exclusive);
    assert!(!list.is_pooled());
    probe.assert_balanced();

    list.add_range(&[0; 100]).expect("独占增长");
    assert_eq!(probe.ledger().acquired, 1);
    assert_eq!(list.len(), 103);
}

/// 调用方提供的块不属于池，增长后不会被归还给池。
#[test]
fn caller_supplied_block_is_never_released_to_pool() {
    let (probe, pool) = recording();
    let mut block = Vec::with_capacity(4);
    block.extend([1u32, 2]);
    let mut list = PooledList::from_block(block, pool);
    assert_eq!(list.as_slice(), &[1, 2]);
    list.add_range(&[3, 4, 5]).expect("超出调用方块");
    assert_eq!(list.as_slice(), &[1, 2, 3, 4, 5]);
    drop(list);
    let ledger = probe.ledger();
    assert_eq!(ledger.acquired, 1);
    probe.assert_balanced();
}

/// 删除与释放都会析构元素，空出的槽位不保留旧值。
#[test]
fn vacated_slots_do_not_retain_values() {
    let probe = Arc::new(RecordingPool::default());
    let pool: Arc<dyn BlockPool<Arc<u32>>> = probe.clone();
    let tracked = Arc::new(0u32);
    let mut list = PooledList::with_pool(pool);
    for _ in 0..5 {
        list.add(Arc::clone(&tracked)).expect("追加");
    }
    assert_eq!(Arc::strong_count(&tracked), 6);

    drop(list.remove_at(0).expect("删除单个"));
    list.remove_range(0, 2).expect("删除区间");
    assert_eq!(Arc::strong_count(&tracked), 3);

    list.dispose();
    assert_eq!(Arc::strong_count(&tracked), 1);
    probe.assert_balanced();
}

/// 池耗尽时错误原样传播，列表内容与容量保持不变。
#[test]
fn pool_exhaustion_propagates_and_preserves_state() {
    let pool = SlabPool::<u32>::shared(PoolSettings {
        max_leased_capacity: Some(16),
        ..PoolSettings::default()
    });
    let mut list = PooledList::with_pool(pool.clone() as Arc<dyn BlockPool<u32>>);
    list.add_range(&[0; 16]).expect("首块在上限之内");
    let capacity = list.capacity();

    let err = list.add(99).expect_err("增长应因池耗尽失败");
    assert!(matches!(
        err,
        VecError::Pool(PoolError::Exhausted { limit: 16, .. })
    ));
    assert_eq!(err.code(), pooled_core::codes::POOL_EXHAUSTED);
    assert_eq!(list.len(), 16);
    assert_eq!(list.capacity(), capacity);
    assert_eq!(pool.statistics().failed_acquisitions, 1);
}

/// 多线程各自持有序列、共享同一个池时，统计最终保持平衡。
#[test]
fn shared_pool_is_safe_across_threads() {
    let pool = SlabPool::<u64>::shared(PoolSettings::default());
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for round in 0..50u64 {
                    let mut list = PooledList::with_pool(pool.clone() as Arc<dyn BlockPool<u64>>);
                    for value in 0..(round % 40) {
                        list.add(value * worker).expect("追加");
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("工作线程 panic");
    }
    let stats = pool.statistics();
    assert_eq!(stats.active_leases, 0);
    assert_eq!(stats.leased_slots, 0);
    assert_eq!(stats.total_acquired, stats.total_released);
    assert!(stats.pool_misses < stats.total_acquired, "归还的块应被复用");
}
