//! 会话事件观察者
//!
//! 控制器不直接写日志，而是把事件交给注入的观察者

use std::fmt;

use tracing::{debug, info};

use crate::models::{Progress, QuizQuestion};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingName,
    AwaitingQuestion,
    QuestionActive,
    Finished,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::AwaitingName => "AwaitingName",
            Phase::AwaitingQuestion => "AwaitingQuestion",
            Phase::QuestionActive => "QuestionActive",
            Phase::Finished => "Finished",
        };
        f.write_str(name)
    }
}

/// 结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// 排行榜出现
    TerminalSignal,
    /// 计数器显示最后一题已答
    CounterComplete,
}

/// 会话事件
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    Joined { participant_name: String },
    PhaseChanged { from: Phase, to: Phase },
    QuestionDetected { ordinal: usize, question: QuizQuestion },
    AnswerChosen { ordinal: usize, index: usize, choice: String },
    Submitted { ordinal: usize },
    ProgressRead { progress: Progress },
    Finished { reason: FinishReason, questions_answered: usize },
}

/// 事件回调
pub trait QuizObserver: Send + Sync {
    fn on_event(&self, event: &QuizEvent);
}

/// 把事件写入 tracing 日志
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl QuizObserver for TracingObserver {
    fn on_event(&self, event: &QuizEvent) {
        match event {
            QuizEvent::Joined { participant_name } => {
                info!("✓ 已加入会话: {}", participant_name);
            }
            QuizEvent::PhaseChanged { from, to } => {
                debug!("状态切换: {} → {}", from, to);
            }
            QuizEvent::QuestionDetected { ordinal, question } => {
                info!(
                    "{} 📝 {} ({} 个选项)",
                    QuestionCtx::new(*ordinal),
                    truncate_text(question.question(), 60),
                    question.choice_count()
                );
            }
            QuizEvent::AnswerChosen { ordinal, index, choice } => {
                info!("{} 🤖 选择 {}. {}", QuestionCtx::new(*ordinal), index, choice);
            }
            QuizEvent::Submitted { ordinal } => {
                info!("{} ✓ 已提交", QuestionCtx::new(*ordinal));
            }
            QuizEvent::ProgressRead { progress } => {
                info!("📊 进度: {}", progress);
            }
            QuizEvent::Finished {
                reason,
                questions_answered,
            } => {
                let why = match reason {
                    FinishReason::TerminalSignal => "排行榜已出现",
                    FinishReason::CounterComplete => "最后一题已作答",
                };
                info!("🏁 测验结束（{}），共回答 {} 题", why, questions_answered);
            }
        }
    }
}
