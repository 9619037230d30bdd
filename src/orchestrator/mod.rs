//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源管理和运行模式，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session_runner` - 在线答题
//! - 启动/连接浏览器，持有页面
//! - 附加会话截止时间，运行 `QuizLoop`
//! - 结束后释放页面
//!
//! ### `bench` - 离线评测
//! - 用带答案的题目文件评估模型链
//!
//! ## 层次关系
//!
//! ```text
//! session_runner (持有 ChromiumPage)
//!     ↓
//! workflow::QuizLoop (轮询 + 状态机)
//!     ↓
//! workflow::QuestionFlow (处理单个题目)
//!     ↓
//! services (能力层：session_initiator / answer_oracle)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod bench;
pub mod session_runner;

pub use bench::{load_fixtures, run_bench, BenchReport};
pub use session_runner::SessionRunner;
