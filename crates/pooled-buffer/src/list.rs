use alloc::{sync::Arc, vec::Vec};
use core::fmt;

use pooled_core::{BlockPool, Comparer, DefaultComparer, EqualityComparer, Result};

use crate::{
    iter::Iter,
    range::{check_index, check_insert, check_range},
    shared::shared_pool,
    storage::{OwnershipMode, PooledStorage},
};

/// `PooledList` 是支持随机访问的池化可增长序列。
///
/// # 设计动机（Why）
/// - 反复构建变长序列（解析结果、批量累积）时，每次增长都新分配一块内存会造成频繁的堆抖动；
///   `PooledList` 的存储从 [`BlockPool`] 租借，增长时旧块立即归还，供其他实例复用；
/// - 除常规的追加与索引外，还提供插入、删除、搜索、排序、反转及其子区间形式，
///   所有子区间操作共享同一套 `(start, count)` 校验。
///
/// # 行为逻辑（How）
/// - 存储、增长与释放由内部的 `PooledStorage` 负责：首次增长至少 16 个槽位，之后按容量翻倍；
/// - 读取类操作（`get`、`remove_at`、搜索、排序等）在尚无存储时返回
///   [`VecError::Uninitialized`](pooled_core::VecError::Uninitialized)；追加与插入则先增长；
/// - 删除操作把被移除的元素交还调用方或就地析构，不在空出的槽位中保留旧值。
///
/// # 契约说明（What）
/// - **所有权**：单一所有者，不做内部同步；块在任意时刻只有一个持有者；
/// - **释放**：[`dispose`](Self::dispose) 与 `Drop` 都只归还一次，`dispose` 之后实例仍可继续使用；
/// - **模式**：`PoolBound -> Exclusive` 可通过 [`make_exclusive`](Self::make_exclusive) 单向转换，反向不支持。
///
/// # 风险提示（Trade-offs）
/// - 搜索类操作在无存储时报错而不是返回“未找到”，调用方需要区分“空但已分配”与“从未分配”；
/// - 批量追加要求 `T: Clone`，以便单次增长后整体复制。
pub struct PooledList<T> {
    storage: PooledStorage<T>,
}

impl<T: Send + 'static> PooledList<T> {
    /// 创建空列表，存储在首次写入时从元素类型的共享池租借。
    pub fn new() -> Self {
        Self::with_pool(shared_pool::<T>())
    }

    /// 创建列表并立即从共享池租借至少 `capacity` 个槽位。
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_pool_capacity(shared_pool::<T>(), capacity)
    }
}

impl<T: Send + 'static> Default for PooledList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PooledList<T> {
    /// 创建绑定到指定池的空列表。
    pub fn with_pool(pool: Arc<dyn BlockPool<T>>) -> Self {
        Self {
            storage: PooledStorage::pool_bound(pool),
        }
    }

    /// 创建绑定到指定池的列表，并立即租借至少 `capacity` 个槽位。
    ///
    /// `capacity` 为 0 时不租借。
    pub fn with_pool_capacity(pool: Arc<dyn BlockPool<T>>, capacity: usize) -> Result<Self> {
        let mut list = Self::with_pool(pool);
        list.storage.ensure_additional(capacity)?;
        Ok(list)
    }

    /// 包装调用方提供的块。
    ///
    /// 块中已有的元素成为列表内容；块本身不归池所有，增长后直接析构，不会被归还。
    /// 后续增长仍从 `pool` 租借。
    pub fn from_block(block: Vec<T>, pool: Arc<dyn BlockPool<T>>) -> Self {
        Self {
            storage: PooledStorage::from_block(pool, block),
        }
    }

    /// 创建独占模式的空列表：块直接向分配器申请，从不进入池。
    pub fn exclusive() -> Self {
        Self {
            storage: PooledStorage::exclusive(),
        }
    }

    /// 创建独占模式的列表并立即分配至少 `capacity` 个槽位。
    pub fn exclusive_with_capacity(capacity: usize) -> Result<Self> {
        let mut list = Self::exclusive();
        list.storage.ensure_additional(capacity)?;
        Ok(list)
    }

    pub(crate) fn from_storage(storage: PooledStorage<T>) -> Self {
        Self { storage }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    pub fn mode(&self) -> OwnershipMode {
        self.storage.mode()
    }

    /// 是否已持有存储。
    pub fn is_initialized(&self) -> bool {
        self.storage.is_initialized()
    }

    /// 当前存储是否借自缓冲池。
    pub fn is_pooled(&self) -> bool {
        self.storage.holds_leased_block()
    }

    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.storage.as_slice())
    }

    /// 读取 `index` 处的元素，要求 `index < len`。
    pub fn get(&self, index: usize) -> Result<&T> {
        let data = self.storage.require("get")?;
        check_index("get", index, data.len())?;
        Ok(&data[index])
    }

    /// 可变借用 `index` 处的元素；借用持续到下一次对列表的访问。
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let data = self.storage.require_mut("get_mut")?;
        check_index("get_mut", index, data.len())?;
        Ok(&mut data[index])
    }

    /// 追加单个元素，容量不足时增长一次。
    pub fn add(&mut self, value: T) -> Result<()> {
        self.storage.ensure_additional(1)?;
        self.storage.require_mut("add")?.push(value);
        Ok(())
    }

    /// 逐个追加迭代器产出的元素，按 `size_hint` 的下界预先增长一次。
    pub fn add_iter<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        self.storage.ensure_additional(items.size_hint().0)?;
        for item in items {
            self.add(item)?;
        }
        Ok(())
    }

    /// 在 `index` 处插入元素，`index <= len`；尾部整体右移一位。
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_insert("insert", index, self.len())?;
        self.storage.ensure_additional(1)?;
        self.storage.require_mut("insert")?.insert(index, value);
        Ok(())
    }

    /// 移除并返回 `index` 处的元素，尾部整体左移一位。
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let data = self.storage.require_mut("remove_at")?;
        check_index("remove_at", index, data.len())?;
        Ok(data.remove(index))
    }

    /// 移除 `[start, start + count)` 中的元素并就地析构。
    pub fn remove_range(&mut self, start: usize, count: usize) -> Result<()> {
        let data = self.storage.require_mut("remove_range")?;
        let range = check_range("remove_range", start, count, data.len())?;
        data.drain(range);
        Ok(())
    }

    /// 从整个列表中查找首个与 `item` 相等的元素。
    pub fn index_of_by<C>(&self, item: &T, comparer: C) -> Result<Option<usize>>
    where
        C: EqualityComparer<T>,
    {
        self.index_of_in(item, 0, self.len(), comparer)
    }

    /// 在 `[start, start + count)` 内查找首个与 `item` 相等的元素，返回绝对下标。
    pub fn index_of_in<C>(
        &self,
        item: &T,
        start: usize,
        count: usize,
        comparer: C,
    ) -> Result<Option<usize>>
    where
        C: EqualityComparer<T>,
    {
        let data = self.storage.require("index_of")?;
        let range = check_range("index_of", start, count, data.len())?;
        Ok(data[range]
            .iter()
            .position(|candidate| comparer.equals(candidate, item))
            .map(|offset| start + offset))
    }

    pub fn last_index_of_by<C>(&self, item: &T, comparer: C) -> Result<Option<usize>>
    where
        C: EqualityComparer<T>,
    {
        self.last_index_of_in(item, 0, self.len(), comparer)
    }

    /// 在 `[start, start + count)` 内从后向前查找，返回最后一个匹配的绝对下标。
    pub fn last_index_of_in<C>(
        &self,
        item: &T,
        start: usize,
        count: usize,
        comparer: C,
    ) -> Result<Option<usize>>
    where
        C: EqualityComparer<T>,
    {
        let data = self.storage.require("last_index_of")?;
        let range = check_range("last_index_of", start, count, data.len())?;
        Ok(data[range]
            .iter()
            .rposition(|candidate| comparer.equals(candidate, item))
            .map(|offset| start + offset))
    }

    /// 在整个列表上二分查找，约定见 [`binary_search_in`](Self::binary_search_in)。
    pub fn binary_search_by<C>(&self, item: &T, comparer: C) -> Result<Result<usize, usize>>
    where
        C: Comparer<T>,
    {
        self.binary_search_in(item, 0, self.len(), comparer)
    }

    /// 在 `[start, start + count)` 内二分查找 `item`。
    ///
    /// 区间必须已按 `comparer` 升序排列，否则结果无意义。找到时返回 `Ok(index)`，
    /// 否则返回 `Err(insertion_point)`；两者都是相对整个列表的绝对下标。
    /// 存在多个相等元素时返回其中任意一个。
    pub fn binary_search_in<C>(
        &self,
        item: &T,
        start: usize,
        count: usize,
        comparer: C,
    ) -> Result<Result<usize, usize>>
    where
        C: Comparer<T>,
    {
        let data = self.storage.require("binary_search")?;
        let range = check_range("binary_search", start, count, data.len())?;
        Ok(data[range]
            .binary_search_by(|probe| comparer.compare(probe, item))
            .map(|offset| start + offset)
            .map_err(|offset| start + offset))
    }

    pub fn sort_by<C>(&mut self, comparer: C) -> Result<()>
    where
        C: Comparer<T>,
    {
        let len = self.len();
        self.sort_in(0, len, comparer)
    }

    /// 稳定排序 `[start, start + count)`，区间外的元素不动。
    pub fn sort_in<C>(&mut self, start: usize, count: usize, comparer: C) -> Result<()>
    where
        C: Comparer<T>,
    {
        let data = self.storage.require_mut("sort")?;
        let range = check_range("sort", start, count, data.len())?;
        data[range].sort_by(|left, right| comparer.compare(left, right));
        Ok(())
    }

    pub fn reverse(&mut self) -> Result<()> {
        let len = self.len();
        self.reverse_in(0, len)
    }

    /// 反转 `[start, start + count)`。
    pub fn reverse_in(&mut self, start: usize, count: usize) -> Result<()> {
        let data = self.storage.require_mut("reverse")?;
        let range = check_range("reverse", start, count, data.len())?;
        data[range].reverse();
        Ok(())
    }

    /// 析构全部元素，保留当前块以便复用。
    pub fn clear(&mut self) {
        if let Ok(data) = self.storage.require_mut("clear") {
            data.clear();
        }
    }

    /// 释放存储：租借块归还池，自有块直接析构；长度与容量归零。
    ///
    /// 重复调用为无操作，之后实例仍可继续使用。
    pub fn dispose(&mut self) {
        self.storage.dispose();
    }

    /// 单向转换为独占模式，见 [`OwnershipMode`]。
    pub fn make_exclusive(&mut self) -> Result<()> {
        self.storage.make_exclusive()
    }
}

impl<T: Clone> PooledList<T> {
    /// 追加一段元素的克隆，只增长一次。
    pub fn add_range(&mut self, values: &[T]) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        self.storage.ensure_additional(values.len())?;
        self.storage
            .require_mut("add_range")?
            .extend_from_slice(values);
        Ok(())
    }

    /// 在 `index` 处插入一段元素的克隆，尾部整体右移 `values.len()` 位。
    ///
    /// `values` 为空时不做任何事（即使尚无存储）。
    pub fn insert_range(&mut self, index: usize, values: &[T]) -> Result<()> {
        check_insert("insert_range", index, self.len())?;
        if values.is_empty() {
            return Ok(());
        }
        self.storage.ensure_additional(values.len())?;
        let data = self.storage.require_mut("insert_range")?;
        data.extend_from_slice(values);
        data[index..].rotate_right(values.len());
        Ok(())
    }

    /// 复制当前内容到一个普通的 `Vec`，与池无关。
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T: PartialEq> PooledList<T> {
    pub fn index_of(&self, item: &T) -> Result<Option<usize>> {
        self.index_of_by(item, DefaultComparer)
    }

    pub fn last_index_of(&self, item: &T) -> Result<Option<usize>> {
        self.last_index_of_by(item, DefaultComparer)
    }

    pub fn contains(&self, item: &T) -> Result<bool> {
        Ok(self.index_of(item)?.is_some())
    }

    /// 移除首个与 `item` 相等的元素，返回是否找到。
    pub fn remove(&mut self, item: &T) -> Result<bool> {
        match self.index_of(item)? {
            Some(index) => {
                self.remove_at(index)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<T: Ord> PooledList<T> {
    pub fn binary_search(&self, item: &T) -> Result<Result<usize, usize>> {
        self.binary_search_by(item, DefaultComparer)
    }

    pub fn sort(&mut self) -> Result<()> {
        self.sort_by(DefaultComparer)
    }
}

impl<T> Extend<T> for PooledList<T> {
    /// # Panics
    /// 增长失败（池耗尽、容量溢出）时 panic；需要处理错误时使用 [`PooledList::add_iter`]。
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        if let Err(err) = self.add_iter(items) {
            panic!("PooledList::extend failed: {err}");
        }
    }
}

impl<'a, T> IntoIterator for &'a PooledList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for PooledList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledList")
            .field("items", &self.as_slice())
            .field("capacity", &self.capacity())
            .field("mode", &self.mode())
            .finish()
    }
}
