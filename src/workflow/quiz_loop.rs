//! 测验主循环 - 流程层
//!
//! 状态机：`AwaitingName → AwaitingQuestion ⇄ QuestionActive → Finished`
//!
//! 每个轮询周期按优先级检查：
//! 1. 排行榜可见 → 结束（优先于一切，避免测验结束后还去答题）
//! 2. 上一题后计数器显示已答完 → 结束
//! 3. Send 按钮可见且可用 → 处理一道题
//! 4. 都没有 → 继续等待，超过等待上限报 `ElementNotFound`

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::Config;
use crate::error::{QuizError, QuizResult};
use crate::infrastructure::{CancelToken, ElementState, PageDriver, Selector, Selectors};
use crate::models::{Progress, QuizQuestion};
use crate::services::{AnswerOracle, SessionInitiator};
use crate::workflow::observer::{FinishReason, Phase, QuizEvent, QuizObserver};
use crate::workflow::question_ctx::QuestionCtx;
use crate::workflow::question_flow::QuestionFlow;

/// 轮询参数
#[derive(Debug, Clone)]
pub struct LoopSettings {
    /// 两次轮询之间的间隔
    pub poll_interval: Duration,
    /// 等待下一题出现的上限，从进入 `AwaitingQuestion` 开始计时
    pub question_wait: Duration,
    /// 单个元素（输入框、题干、选项）的等待上限
    pub element_wait: Duration,
    pub max_ticks: u64,
    /// 同一道题在提交后重复出现的最多次数
    pub max_stuck_ticks: u32,
    pub trust_question_counter: bool,
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            question_wait: config.question_wait(),
            element_wait: config.element_wait(),
            max_ticks: config.max_ticks,
            max_stuck_ticks: config.max_stuck_ticks,
            trust_question_counter: config.trust_question_counter,
        }
    }
}

/// 会话结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub questions_answered: usize,
    pub ticks: u64,
    pub last_progress: Option<Progress>,
    pub finish_reason: FinishReason,
}

/// 一个轮询周期看到的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Terminal,
    CounterComplete,
    Actionable,
    Idle,
}

/// 循环内部状态
struct LoopState {
    phase: Phase,
    started: Instant,
    awaiting_since: Instant,
    ticks: u64,
    stuck_ticks: u32,
    answered: usize,
    last_submitted: Option<QuizQuestion>,
    last_progress: Option<Progress>,
    finish_pending: bool,
}

/// 测验控制器
///
/// 会话期间独占页面；答案服务和观察者由调用方注入
pub struct QuizLoop<'a> {
    driver: &'a dyn PageDriver,
    oracle: &'a AnswerOracle,
    observer: &'a dyn QuizObserver,
    selectors: Selectors,
    settings: LoopSettings,
    cancel: CancelToken,
}

impl<'a> QuizLoop<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        oracle: &'a AnswerOracle,
        observer: &'a dyn QuizObserver,
        settings: LoopSettings,
        cancel: CancelToken,
    ) -> Self {
        Self {
            driver,
            oracle,
            observer,
            selectors: Selectors::default(),
            settings,
            cancel,
        }
    }

    /// 加入会话并答题直到结束
    pub async fn run(&self, participant_name: &str) -> QuizResult<SessionSummary> {
        let now = Instant::now();
        let mut state = LoopState {
            phase: Phase::AwaitingName,
            started: now,
            awaiting_since: now,
            ticks: 0,
            stuck_ticks: 0,
            answered: 0,
            last_submitted: None,
            last_progress: None,
            finish_pending: false,
        };

        let initiator = SessionInitiator::new(&self.selectors, self.settings.element_wait);
        self.cancel
            .run(initiator.join(self.driver, participant_name))
            .await?;
        self.observer.on_event(&QuizEvent::Joined {
            participant_name: participant_name.to_string(),
        });
        self.enter_awaiting(&mut state);

        let flow = QuestionFlow::new(
            self.driver,
            self.oracle,
            self.observer,
            &self.selectors,
            self.settings.element_wait,
        );

        loop {
            self.cancel.check()?;

            state.ticks += 1;
            if state.ticks > self.settings.max_ticks {
                return Err(QuizError::StuckState {
                    ticks: state.ticks - 1,
                    elapsed: state.started.elapsed(),
                    reason: format!("no finish signal after {} ticks", self.settings.max_ticks),
                });
            }

            let signal = self.read_signal(&state).await?;
            match signal {
                Signal::Terminal => return Ok(self.finish(&mut state, FinishReason::TerminalSignal)),
                Signal::CounterComplete => {
                    return Ok(self.finish(&mut state, FinishReason::CounterComplete))
                }
                Signal::Actionable => {
                    self.transition(&mut state, Phase::QuestionActive);
                    self.handle_question(&flow, &mut state).await?;
                }
                Signal::Idle => {
                    if state.awaiting_since.elapsed() >= self.settings.question_wait {
                        return Err(QuizError::element_not_found(
                            &self.selectors.send_button,
                            self.settings.question_wait,
                        ));
                    }
                }
            }

            let interval = self.settings.poll_interval;
            self.cancel
                .run(async move {
                    sleep(interval).await;
                    Ok(())
                })
                .await?;
        }
    }

    async fn read_signal(&self, state: &LoopState) -> QuizResult<Signal> {
        if self.probe(&self.selectors.leaderboard).await?.is_visible() {
            return Ok(Signal::Terminal);
        }
        if state.finish_pending {
            return Ok(Signal::CounterComplete);
        }
        if self.probe(&self.selectors.send_button).await?.is_actionable() {
            return Ok(Signal::Actionable);
        }
        Ok(Signal::Idle)
    }

    /// 处理一次可答题信号
    ///
    /// 提交过的题目再次出现（计数器也没前进）时不重复作答，只累计卡住次数
    async fn handle_question(&self, flow: &QuestionFlow<'_>, state: &mut LoopState) -> QuizResult<()> {
        let question = self.cancel.run(flow.extract()).await?;

        if state.last_submitted.as_ref() == Some(&question) && !self.counter_advanced(state).await? {
            state.stuck_ticks += 1;
            debug!(
                "同一题目提交后仍在页面上 ({}/{})",
                state.stuck_ticks, self.settings.max_stuck_ticks
            );
            if state.stuck_ticks > self.settings.max_stuck_ticks {
                return Err(QuizError::StuckState {
                    ticks: state.ticks,
                    elapsed: state.started.elapsed(),
                    reason: format!(
                        "question \"{}\" still actionable after submission",
                        question.question()
                    ),
                });
            }
            self.transition(state, Phase::AwaitingQuestion);
            return Ok(());
        }
        state.stuck_ticks = 0;

        let ctx = QuestionCtx::new(state.answered + 1);
        self.observer.on_event(&QuizEvent::QuestionDetected {
            ordinal: ctx.ordinal,
            question: question.clone(),
        });

        self.cancel.run(flow.answer(ctx, &question)).await?;
        state.answered += 1;
        state.last_submitted = Some(question);

        if let Some(progress) = self.read_progress().await? {
            if let Some(previous) = state.last_progress {
                if progress.answered < previous.answered {
                    return Err(QuizError::UnexpectedPageState(format!(
                        "question counter went backwards: {} → {}",
                        previous, progress
                    )));
                }
            }
            self.observer.on_event(&QuizEvent::ProgressRead { progress });
            state.last_progress = Some(progress);
            if self.settings.trust_question_counter && progress.is_complete() {
                state.finish_pending = true;
            }
        }

        self.enter_awaiting(state);
        Ok(())
    }

    /// 计数器是否比上次记录的更大
    async fn counter_advanced(&self, state: &LoopState) -> QuizResult<bool> {
        let current = self.read_progress().await?;
        Ok(match (current, state.last_progress) {
            (Some(current), Some(previous)) => current.answered > previous.answered,
            _ => false,
        })
    }

    /// 读取 `answered/total` 计数器，页面上没有时为 None
    async fn read_progress(&self) -> QuizResult<Option<Progress>> {
        let selector = &self.selectors.question_counter;
        let text = self
            .cancel
            .run(async {
                self.driver
                    .text(selector)
                    .await
                    .map_err(|e| QuizError::page("reading question counter", e))
            })
            .await?;

        match text {
            Some(text) if !text.trim().is_empty() => text
                .parse::<Progress>()
                .map(Some)
                .map_err(|e| QuizError::UnexpectedPageState(e.to_string())),
            _ => Ok(None),
        }
    }

    async fn probe(&self, selector: &Selector) -> QuizResult<ElementState> {
        self.cancel
            .run(async {
                self.driver
                    .probe(selector)
                    .await
                    .map_err(|e| QuizError::page("probing page signals", e))
            })
            .await
    }

    fn enter_awaiting(&self, state: &mut LoopState) {
        self.transition(state, Phase::AwaitingQuestion);
        state.awaiting_since = Instant::now();
    }

    fn transition(&self, state: &mut LoopState, to: Phase) {
        if state.phase != to {
            self.observer.on_event(&QuizEvent::PhaseChanged {
                from: state.phase,
                to,
            });
            state.phase = to;
        }
    }

    fn finish(&self, state: &mut LoopState, reason: FinishReason) -> SessionSummary {
        self.transition(state, Phase::Finished);
        self.observer.on_event(&QuizEvent::Finished {
            reason,
            questions_answered: state.answered,
        });
        SessionSummary {
            questions_answered: state.answered,
            ticks: state.ticks,
            last_progress: state.last_progress,
            finish_reason: reason,
        }
    }
}
