//! 加入会话 - 业务能力层
//!
//! 填写参与者名字并确认加入，只执行一次，不做重试

use std::time::Duration;

use tracing::debug;

use crate::error::{QuizError, QuizResult};
use crate::infrastructure::{wait_visible, PageDriver, Selector, Selectors, WaitOutcome};

/// 会话加入器
pub struct SessionInitiator {
    name_input: Selector,
    join_button: Selector,
    wait: Duration,
}

impl SessionInitiator {
    /// `wait`: 名字输入框和加入按钮各自的等待上限
    pub fn new(selectors: &Selectors, wait: Duration) -> Self {
        Self {
            name_input: selectors.name_input.clone(),
            join_button: selectors.join_button.clone(),
            wait,
        }
    }

    /// 以 `participant_name` 加入会话
    ///
    /// # 错误
    /// - `InvalidInput`: 名字为空（不会碰页面）
    /// - `ElementNotFound`: 输入框或加入按钮在等待时间内没有出现
    /// - `UnexpectedPageState`: 其他页面交互失败
    pub async fn join(&self, driver: &dyn PageDriver, participant_name: &str) -> QuizResult<()> {
        if participant_name.trim().is_empty() {
            return Err(QuizError::InvalidInput(
                "participant name cannot be empty".to_string(),
            ));
        }

        self.wait_for(driver, &self.name_input).await?;
        debug!("名字输入框已出现");

        driver
            .fill(&self.name_input, participant_name)
            .await
            .map_err(|e| QuizError::page("filling participant name", e))?;
        driver
            .click(&self.name_input)
            .await
            .map_err(|e| QuizError::page("focusing participant name", e))?;

        self.wait_for(driver, &self.join_button).await?;
        driver
            .click(&self.join_button)
            .await
            .map_err(|e| QuizError::page("clicking join button", e))?;

        debug!("已提交名字: {}", participant_name);
        Ok(())
    }

    async fn wait_for(&self, driver: &dyn PageDriver, selector: &Selector) -> QuizResult<()> {
        let outcome = wait_visible(driver, selector, self.wait)
            .await
            .map_err(|e| QuizError::page("waiting for join form", e))?;

        match outcome {
            WaitOutcome::Visible => Ok(()),
            WaitOutcome::TimedOut => Err(QuizError::element_not_found(selector, self.wait)),
        }
    }
}
