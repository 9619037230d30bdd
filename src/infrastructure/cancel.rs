//! 会话取消
//!
//! `CancelHandle` 由外部持有（Ctrl-C、上层调度），`CancelToken` 交给控制器，
//! 可以附带一个会话截止时间

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{QuizError, QuizResult};

/// 取消句柄
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<Option<String>>,
}

/// 取消令牌
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<Option<String>>,
    deadline: Option<Instant>,
}

/// 创建一对句柄和令牌
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(None);
    (CancelHandle { tx }, CancelToken { rx, deadline: None })
}

impl CancelHandle {
    /// 发出取消信号，重复调用只保留第一次的原因
    pub fn cancel(&self, reason: impl Into<String>) {
        let reason = reason.into();
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
    }
}

impl CancelToken {
    /// 永不取消的令牌
    pub fn never() -> Self {
        let (_handle, token) = cancel_pair();
        token
    }

    /// 从现在起 `timeout` 后自动取消
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// 当前是否已取消（截止时间到也算）
    pub fn check(&self) -> QuizResult<()> {
        let current = self.rx.borrow().clone();
        if let Some(reason) = current {
            return Err(QuizError::Cancelled { reason });
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(deadline_error());
            }
        }
        Ok(())
    }

    /// 等待取消发生，返回对应的错误
    pub async fn cancelled(&self) -> QuizError {
        let mut rx = self.rx.clone();
        let signal = async move {
            loop {
                let current = rx.borrow_and_update().clone();
                if let Some(reason) = current {
                    return QuizError::Cancelled { reason };
                }
                if rx.changed().await.is_err() {
                    // 句柄全部丢弃，之后不会再有取消
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                err = signal => err,
                _ = tokio::time::sleep_until(deadline) => deadline_error(),
            },
            None => signal.await,
        }
    }

    /// 在取消前完成 `fut`，否则返回 `QuizError::Cancelled`
    pub async fn run<F, T>(&self, fut: F) -> QuizResult<T>
    where
        F: Future<Output = QuizResult<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            err = self.cancelled() => Err(err),
            result = fut => result,
        }
    }
}

fn deadline_error() -> QuizError {
    QuizError::Cancelled {
        reason: "session deadline reached".to_string(),
    }
}
