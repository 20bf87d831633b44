use core::mem::MaybeUninit;

use crate::{Result, VecError};

/// `BufferWriter` 描述“预留-写入-提交”的生产者协议。
///
/// # 设计背景（Why）
/// - 解析输出、格式化缓冲等生产者希望直接写入容器内存，
///   而不是先写入临时缓冲再整体复制；
/// - 协议只包含两个动作：`reserve` 暴露写游标之后的可写区域，
///   `advance` 宣告其中多少槽位已被初始化。任何生产者只依赖这两个动作即可构建。
///
/// # 逻辑解析（How）
/// - `reserve(size_hint)` 在剩余空间不足时先增长，再返回至少 `size_hint` 个未初始化槽位；
/// - 生产者通过 [`MaybeUninit::write`] 填充前缀，然后调用 `advance(count)`；
/// - `append`/`append_slice` 是基于上述两步的便捷封装。
///
/// # 契约说明（What）
/// - **输入参数**：`size_hint` 为 0 时按 1 处理；`count` 表示已初始化的前缀长度；
/// - **返回值**：`reserve` 返回的区域长度可能大于 `size_hint`，调用方不得假设精确长度；
/// - **前置条件**：`advance(count)` 之前，区域前 `count` 个槽位必须已初始化；
/// - **后置条件**：`advance` 成功后写游标前移 `count`；失败时状态不变。
///
/// # 风险提示（Trade-offs）
/// - `advance` 是 `unsafe fn`：实现无法验证槽位是否真的被写入，
///   若调用方提交未初始化的槽位，后续读取即为未定义行为；
/// - 区域借用与 `&mut self` 等长，调用方不可跨越下一次可变访问保留它。
pub trait BufferWriter<T> {
    /// 预留至少 `size_hint` 个可写槽位并返回从写游标开始的区域。
    fn reserve(&mut self, size_hint: usize) -> Result<&mut [MaybeUninit<T>]>;

    /// 提交 `count` 个已写入的槽位。
    ///
    /// # Safety
    /// 最近一次 [`reserve`](Self::reserve) 返回区域的前 `count` 个槽位必须已经初始化。
    unsafe fn advance(&mut self, count: usize) -> Result<()>;

    /// 追加单个元素。
    fn append(&mut self, value: T) -> Result<()> {
        let region = self.reserve(1)?;
        let Some(slot) = region.first_mut() else {
            return Err(VecError::AdvanceOutOfBounds {
                count: 1,
                available: 0,
            });
        };
        slot.write(value);
        // SAFETY: 区域首个槽位刚刚写入。
        unsafe { self.advance(1) }
    }

    /// 追加一段元素的克隆，只预留一次。
    fn append_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        if values.is_empty() {
            return Ok(());
        }
        let region = self.reserve(values.len())?;
        if region.len() < values.len() {
            return Err(VecError::AdvanceOutOfBounds {
                count: values.len(),
                available: region.len(),
            });
        }
        for (slot, value) in region.iter_mut().zip(values) {
            slot.write(value.clone());
        }
        // SAFETY: 上面的循环已初始化区域前 `values.len()` 个槽位。
        unsafe { self.advance(values.len()) }
    }
}
