//! 流程层（Workflow Layer）
//!
//! ## 模块划分
//!
//! ### `quiz_loop` - 测验主循环
//! - 状态机 + 轮询，决定何时答题、何时结束
//!
//! ### `question_flow` - 单题流程
//! - 读题 → 问答案服务 → 选择 → 提交
//!
//! ### `observer` - 事件观察者
//! - 控制器通过注入的观察者汇报进度，不依赖全局日志对象

pub mod observer;
pub mod question_ctx;
pub mod question_flow;
pub mod quiz_loop;

pub use observer::{FinishReason, Phase, QuizEvent, QuizObserver, TracingObserver};
pub use question_ctx::QuestionCtx;
pub use question_flow::QuestionFlow;
pub use quiz_loop::{LoopSettings, QuizLoop, SessionSummary};
