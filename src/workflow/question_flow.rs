//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 读取题干和选项 → `QuizQuestion`
//! 2. 答案服务选出索引
//! 3. 点击文本完全一致的选项
//! 4. 提交

use std::time::Duration;

use tracing::debug;

use crate::error::{QuizError, QuizResult};
use crate::infrastructure::{wait_visible, PageDriver, Selector, Selectors, WaitOutcome};
use crate::models::{QuestionError, QuizQuestion};
use crate::services::AnswerOracle;
use crate::workflow::observer::{QuizEvent, QuizObserver};
use crate::workflow::question_ctx::QuestionCtx;

/// 题目处理流程
///
/// - 不持有任何资源（page 由调用方借出）
/// - 不关心轮询和结束条件
pub struct QuestionFlow<'a> {
    driver: &'a dyn PageDriver,
    oracle: &'a AnswerOracle,
    observer: &'a dyn QuizObserver,
    selectors: &'a Selectors,
    element_wait: Duration,
}

impl<'a> QuestionFlow<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        oracle: &'a AnswerOracle,
        observer: &'a dyn QuizObserver,
        selectors: &'a Selectors,
        element_wait: Duration,
    ) -> Self {
        Self {
            driver,
            oracle,
            observer,
            selectors,
            element_wait,
        }
    }

    /// 从页面读取当前题目
    ///
    /// 题干去掉首尾空白；选项保持页面上的原文和顺序，之后按原文匹配单选框
    pub async fn extract(&self) -> QuizResult<QuizQuestion> {
        let title = &self.selectors.question_title;

        let outcome = wait_visible(self.driver, title, self.element_wait)
            .await
            .map_err(|e| QuizError::page("waiting for question prompt", e))?;
        if outcome == WaitOutcome::TimedOut {
            return Err(QuizError::QuestionExtraction(format!(
                "prompt `{}` not visible within {:?}",
                title, self.element_wait
            )));
        }

        let question = self
            .driver
            .text(title)
            .await
            .map_err(|e| QuizError::page("reading question prompt", e))?
            .map(|text| text.trim().to_string())
            .unwrap_or_default();
        if question.is_empty() {
            return Err(QuizError::QuestionExtraction(format!("prompt `{}` is empty", title)));
        }

        let labels = &self.selectors.answer_labels;
        let choices = self
            .driver
            .all_texts(labels)
            .await
            .map_err(|e| QuizError::page("reading answer choices", e))?;

        debug!("题干: {}，选项: {:?}", question, choices);

        QuizQuestion::new(question, choices).map_err(|e| match e {
            QuestionError::NoChoices => QuizError::NoChoices {
                selector: labels.to_string(),
            },
            other => QuizError::QuestionExtraction(other.to_string()),
        })
    }

    /// 回答一道已读取的题目，返回选中的索引
    ///
    /// 答案服务失败时不会点击任何元素
    pub async fn answer(&self, ctx: QuestionCtx, question: &QuizQuestion) -> QuizResult<usize> {
        let index = self.oracle.resolve_answer(question).await?;
        let choice = question.choice(index).ok_or_else(|| {
            QuizError::UnexpectedPageState(format!("{} index {} has no matching choice", ctx, index))
        })?;

        self.observer.on_event(&QuizEvent::AnswerChosen {
            ordinal: ctx.ordinal,
            index,
            choice: choice.to_string(),
        });

        let radio = self.selectors.answer_radio(choice);
        self.click_when_visible(&radio, "selecting answer").await?;
        self.click_when_visible(&self.selectors.submit_button, "submitting answer")
            .await?;

        self.observer.on_event(&QuizEvent::Submitted { ordinal: ctx.ordinal });
        Ok(index)
    }

    async fn click_when_visible(&self, selector: &Selector, context: &str) -> QuizResult<()> {
        let outcome = wait_visible(self.driver, selector, self.element_wait)
            .await
            .map_err(|e| QuizError::page(context, e))?;
        if outcome == WaitOutcome::TimedOut {
            return Err(QuizError::element_not_found(selector, self.element_wait));
        }

        self.driver
            .click(selector)
            .await
            .map_err(|e| QuizError::page(context, e))
    }
}
