//! 元素比较抽象。
//!
//! 搜索与排序算法只依赖这里的两个 trait；调用方可以传入 [`DefaultComparer`]、
//! 自定义结构体，或直接传入闭包。默认实现委托给 `PartialEq`/`Ord`，
//! 单态化后即为元素类型自身的比较，无需在调用点检查类型。

use core::cmp::Ordering;

/// 判定两个元素是否相等。
pub trait EqualityComparer<T: ?Sized> {
    fn equals(&self, left: &T, right: &T) -> bool;
}

/// 给出两个元素的全序关系。
///
/// 二分查找与排序要求实现满足全序：自反、反对称、传递；
/// 违反时结果无意义但不会触发未定义行为。
pub trait Comparer<T: ?Sized> {
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

/// 默认比较器：相等性走 `PartialEq`，顺序走 `Ord`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DefaultComparer;

impl<T: PartialEq + ?Sized> EqualityComparer<T> for DefaultComparer {
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        left == right
    }
}

impl<T: Ord + ?Sized> Comparer<T> for DefaultComparer {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

impl<T: ?Sized, F> EqualityComparer<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn equals(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

impl<T: ?Sized, F> Comparer<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self(left, right)
    }
}

/// 反转任意比较器的顺序，常用于降序排序。
#[derive(Clone, Copy, Debug, Default)]
pub struct Reverse<C>(pub C);

impl<T: ?Sized, C: Comparer<T>> Comparer<T> for Reverse<C> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self.0.compare(left, right).reverse()
    }
}
