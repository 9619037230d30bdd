//! 题目处理上下文
//!
//! 封装"正在处理第几题"这一信息，只用于日志

use std::fmt::Display;

/// 题目处理上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCtx {
    /// 本次会话中的第几题（从1开始）
    pub ordinal: usize,
}

impl QuestionCtx {
    pub fn new(ordinal: usize) -> Self {
        Self { ordinal }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[题目 #{}]", self.ordinal)
    }
}
