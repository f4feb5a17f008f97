//! 转播处理上下文
//!
//! 封装"我正在处理批次中的第几场转播"这一信息

use std::fmt::Display;

use crate::utils::logging::truncate_text;

/// 转播处理上下文
#[derive(Debug, Clone)]
pub struct BroadcastCtx {
    /// 批次中的位置（从1开始）
    pub index: usize,

    /// 批次总数
    pub total: usize,

    /// 标题（仅用于日志显示）
    pub title: String,
}

impl BroadcastCtx {
    pub fn new(index: usize, total: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            total,
            title: title.into(),
        }
    }
}

impl Display for BroadcastCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[转播 {}/{} 「{}」]",
            self.index,
            self.total,
            truncate_text(&self.title, 30)
        )
    }
}
