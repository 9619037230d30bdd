//! # Slido Quiz Bot
//!
//! 自动参加 Slido 实时选择题测验的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 页面自动化接口（定位、读取、点击、填写）
//! - `ChromiumPage` - 唯一的 page owner，通过 JS 实现 `PageDriver`
//! - `Selectors` - 平台页面结构的全部选择器
//! - `CancelToken` - 会话取消与截止时间
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `SessionInitiator` - 填写名字加入会话
//! - `AnswerOracle` - 构造 prompt、调用模型链、校验索引
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义轮询状态机和"一道题"的处理流程
//! - `QuizLoop` - 检测结束信号 / 可答题信号
//! - `QuestionFlow` - 读题 → 答案服务 → 选择 → 提交
//! - `QuizObserver` - 注入的事件观察者
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_runner` - 持有浏览器，保证会话结束后释放
//! - `orchestrator/bench` - 离线评测模型链准确率
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ConfigError, DriverError, ModelError, OracleError, QuizError, QuizResult};
pub use infrastructure::{cancel_pair, CancelHandle, CancelToken, ChromiumPage, PageDriver, Selectors};
pub use models::{Progress, QuizQuestion};
pub use orchestrator::{run_bench, BenchReport, SessionRunner};
pub use services::{format_prompt, AnswerOracle, SessionInitiator};
pub use workflow::{LoopSettings, QuizLoop, QuizObserver, SessionSummary, TracingObserver};
