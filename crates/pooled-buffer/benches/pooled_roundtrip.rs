use criterion::{Criterion, black_box};
use pooled_buffer::{BlockPool, PooledList, PooledWriter, SlabPool};
use std::{env, sync::Arc, time::Duration};

/// 池化序列的往返基准：对比池化与独占两种模式下“构建 -> 终结 -> 释放”的成本。
///
/// # 设计背景（Why）
/// - 池化的收益来自增长路径上复用旧块；基准需要覆盖多次增长，否则与普通 `Vec` 无差别。
///
/// # 逻辑解析（How）
/// - `writer_roundtrip`：写入 4 KiB 后复制终结，写入器随迭代结束归还块；
/// - `list_roundtrip`：追加 1024 个元素后排序，比较池化与独占模式。
fn bench_writer_roundtrip(c: &mut Criterion) {
    let pool = SlabPool::<u8>::shared(Default::default());
    c.bench_function("writer_roundtrip/pooled", |b| {
        b.iter(|| {
            let mut writer = PooledWriter::with_pool(pool.clone() as Arc<dyn BlockPool<u8>>);
            for _ in 0..64 {
                writer.append_range(&[0xA5; 64]).unwrap();
            }
            black_box(writer.take_as_copy())
        });
    });
    c.bench_function("writer_roundtrip/exclusive", |b| {
        b.iter(|| {
            let mut writer = PooledWriter::<u8>::exclusive();
            for _ in 0..64 {
                writer.append_range(&[0xA5; 64]).unwrap();
            }
            black_box(writer.take_as_copy())
        });
    });
}

fn bench_list_roundtrip(c: &mut Criterion) {
    let pool = SlabPool::<u32>::shared(Default::default());
    c.bench_function("list_roundtrip/pooled", |b| {
        b.iter(|| {
            let mut list = PooledList::with_pool(pool.clone() as Arc<dyn BlockPool<u32>>);
            for value in (0..1024u32).rev() {
                list.add(value).unwrap();
            }
            list.sort().unwrap();
            black_box(list.binary_search(&512).unwrap())
        });
    });
    c.bench_function("list_roundtrip/exclusive", |b| {
        b.iter(|| {
            let mut list = PooledList::<u32>::exclusive();
            for value in (0..1024u32).rev() {
                list.add(value).unwrap();
            }
            list.sort().unwrap();
            black_box(list.binary_search(&512).unwrap())
        });
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_writer_roundtrip(&mut criterion);
    bench_list_roundtrip(&mut criterion);
    criterion.final_summary();
}
