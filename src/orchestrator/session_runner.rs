//! 会话运行器 - 编排层
//!
//! ## 职责
//!
//! 1. **资源获取**：启动或连接浏览器，打开测验页面
//! 2. **运行会话**：把页面交给 `QuizLoop`，附加会话截止时间
//! 3. **资源释放**：无论成功、失败还是取消，都关闭页面
//!
//! 唯一持有浏览器的模块；下层只借用 `&dyn PageDriver`

use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::error::{ConfigError, QuizError, QuizResult};
use crate::infrastructure::{CancelToken, PageDriver};
use crate::services::AnswerOracle;
use crate::utils::logging::{log_session_summary, log_startup};
use crate::workflow::{LoopSettings, QuizLoop, QuizObserver, SessionSummary, TracingObserver};

/// 关闭页面的时间上限，浏览器卡死时不再等待
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(10);

/// 会话运行器
pub struct SessionRunner {
    config: Config,
    oracle: AnswerOracle,
    observer: Box<dyn QuizObserver>,
}

impl SessionRunner {
    /// 按配置创建（包括模型链）
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let oracle = AnswerOracle::from_config(&config)?;
        Ok(Self::with_oracle(config, oracle))
    }

    /// 使用已经构建好的答案服务
    pub fn with_oracle(config: Config, oracle: AnswerOracle) -> Self {
        Self {
            config,
            oracle,
            observer: Box::new(TracingObserver),
        }
    }

    /// 替换默认的日志观察者
    pub fn with_observer(mut self, observer: Box<dyn QuizObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 打开浏览器并运行一次完整会话
    ///
    /// 会话截止时间从启动浏览器之前开始计算
    pub async fn run(&self, cancel: CancelToken) -> QuizResult<SessionSummary> {
        log_startup(&self.config);
        let cancel = self.session_token(cancel);

        let page = cancel
            .run(async {
                browser::open_page(&self.config)
                    .await
                    .map_err(|e| QuizError::page("opening browser", e))
            })
            .await?;

        self.run_session(&page, cancel).await
    }

    /// 在给定页面上运行会话，结束后关闭页面
    pub async fn run_with_driver(&self, driver: &dyn PageDriver, cancel: CancelToken) -> QuizResult<SessionSummary> {
        let cancel = self.session_token(cancel);
        self.run_session(driver, cancel).await
    }

    fn session_token(&self, cancel: CancelToken) -> CancelToken {
        match self.config.session_timeout() {
            Some(timeout) => {
                info!("⏱️ 会话截止时间: {:?}", timeout);
                cancel.with_timeout(timeout)
            }
            None => cancel,
        }
    }

    async fn run_session(&self, driver: &dyn PageDriver, cancel: CancelToken) -> QuizResult<SessionSummary> {
        let result = self.drive(driver, cancel).await;

        match timeout(CLOSE_TIMEOUT, driver.close()).await {
            Ok(Ok(())) => info!("✓ 浏览器资源已释放"),
            Ok(Err(e)) => warn!("⚠️ 关闭页面失败: {}", e),
            Err(_) => warn!("⚠️ 关闭页面超过 {:?}，放弃等待", CLOSE_TIMEOUT),
        }

        match &result {
            Ok(summary) => log_session_summary(summary),
            Err(e) => error!("❌ 会话失败 [{}]: {}", e.kind(), e),
        }
        result
    }

    async fn drive(&self, driver: &dyn PageDriver, cancel: CancelToken) -> QuizResult<SessionSummary> {
        info!("📄 打开测验页面: {}", self.config.quiz_url);
        cancel
            .run(async {
                driver
                    .navigate(&self.config.quiz_url)
                    .await
                    .map_err(|e| QuizError::page("navigating to quiz", e))
            })
            .await?;

        let quiz = QuizLoop::new(
            driver,
            &self.oracle,
            self.observer.as_ref(),
            LoopSettings::from_config(&self.config),
            cancel,
        );
        quiz.run(&self.config.participant_name).await
    }
}
