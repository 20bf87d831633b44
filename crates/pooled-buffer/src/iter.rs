use core::iter::FusedIterator;

/// 池化序列的前向迭代器，按顺序产出 `[0, len)` 中元素的共享引用。
///
/// - 迭代器借用序列，存活期间序列无法被修改（由借用检查器保证，热路径无运行时检查）；
/// - 耗尽后持续返回 `None`；需要重新遍历时构造新的迭代器。
#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    items: &'a [T],
    position: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(items: &'a [T]) -> Self {
        Self { items, position: 0 }
    }

    /// 尚未产出的元素。
    pub fn as_slice(&self) -> &'a [T] {
        &self.items[self.position..]
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let item = self.items.get(self.position)?;
        self.position += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
