//! 页面自动化接口 - 基础设施层
//!
//! 控制器只通过 `PageDriver` 接触页面，真实浏览器和测试用的假页面都实现它

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::{sleep, Instant};

use crate::error::DriverError;

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// CSS 选择器
    Css(String),
    /// CSS 选择器 + 去除首尾空白后的文本完全相等
    CssWithText { css: String, text: String },
    /// CSS 选择器 + aria-label 完全相等
    CssWithLabel { css: String, label: String },
}

impl Selector {
    pub fn css(css: impl Into<String>) -> Self {
        Selector::Css(css.into())
    }

    pub fn with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Selector::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    pub fn with_label(css: impl Into<String>, label: impl Into<String>) -> Self {
        Selector::CssWithLabel {
            css: css.into(),
            label: label.into(),
        }
    }

    /// 传给页面脚本的形式
    pub fn to_query(&self) -> SelectorQuery<'_> {
        match self {
            Selector::Css(css) => SelectorQuery {
                css,
                text: None,
                label: None,
            },
            Selector::CssWithText { css, text } => SelectorQuery {
                css,
                text: Some(text),
                label: None,
            },
            Selector::CssWithLabel { css, label } => SelectorQuery {
                css,
                text: None,
                label: Some(label),
            },
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "{}", css),
            Selector::CssWithText { css, text } => write!(f, "{}:text({:?})", css, text),
            Selector::CssWithLabel { css, label } => write!(f, "{}[aria-label={:?}]", css, label),
        }
    }
}

/// 序列化后嵌入 JS 的选择器
#[derive(Debug, Serialize)]
pub struct SelectorQuery<'a> {
    pub css: &'a str,
    pub text: Option<&'a str>,
    pub label: Option<&'a str>,
}

/// 元素当前状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementState {
    /// 不存在
    Absent,
    /// 存在但不可见
    Hidden,
    /// 可见
    Visible { enabled: bool },
}

impl ElementState {
    pub fn is_visible(self) -> bool {
        matches!(self, ElementState::Visible { .. })
    }

    /// 可见且可用
    pub fn is_actionable(self) -> bool {
        matches!(self, ElementState::Visible { enabled: true })
    }
}

/// 页面自动化能力
///
/// 只暴露定位、读取、点击、填写，不认识题目
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到指定 URL
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// 查询第一个匹配元素的状态
    async fn probe(&self, selector: &Selector) -> Result<ElementState, DriverError>;

    /// 第一个匹配元素的文本，元素不存在时为 None
    async fn text(&self, selector: &Selector) -> Result<Option<String>, DriverError>;

    /// 所有匹配元素的文本，按页面顺序
    async fn all_texts(&self, selector: &Selector) -> Result<Vec<String>, DriverError>;

    /// 点击第一个匹配元素
    async fn click(&self, selector: &Selector) -> Result<(), DriverError>;

    /// 填写输入框
    async fn fill(&self, selector: &Selector, value: &str) -> Result<(), DriverError>;

    /// 释放页面（以及自己启动的浏览器）
    async fn close(&self) -> Result<(), DriverError>;
}

/// 等待结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Visible,
    TimedOut,
}

/// 等待元素可见
///
/// 轮询间隔从 100ms 开始翻倍，最多 1 秒；超时返回 `WaitOutcome::TimedOut`，
/// 由调用方决定超时的含义
pub async fn wait_visible(
    driver: &dyn PageDriver,
    selector: &Selector,
    timeout: Duration,
) -> Result<WaitOutcome, DriverError> {
    let start = Instant::now();
    let mut poll_interval = Duration::from_millis(100);
    let max_interval = Duration::from_secs(1);

    loop {
        if driver.probe(selector).await?.is_visible() {
            return Ok(WaitOutcome::Visible);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitOutcome::TimedOut);
        }

        sleep(poll_interval.min(timeout - elapsed)).await;
        poll_interval = (poll_interval * 2).min(max_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 第 n 次查询后变为可见
    struct AppearsAfter {
        probes: AtomicUsize,
        visible_after: usize,
    }

    #[async_trait]
    impl PageDriver for AppearsAfter {
        async fn navigate(&self, _url: &str) -> Result<(), DriverError> {
            Ok(())
        }

        async fn probe(&self, _selector: &Selector) -> Result<ElementState, DriverError> {
            let n = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.visible_after {
                Ok(ElementState::Visible { enabled: true })
            } else {
                Ok(ElementState::Absent)
            }
        }

        async fn text(&self, _selector: &Selector) -> Result<Option<String>, DriverError> {
            Ok(None)
        }

        async fn all_texts(&self, _selector: &Selector) -> Result<Vec<String>, DriverError> {
            Ok(Vec::new())
        }

        async fn click(&self, _selector: &Selector) -> Result<(), DriverError> {
            Ok(())
        }

        async fn fill(&self, _selector: &Selector, _value: &str) -> Result<(), DriverError> {
            Ok(())
        }

        async fn close(&self) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_visible_polls_until_visible() {
        let driver = AppearsAfter {
            probes: AtomicUsize::new(0),
            visible_after: 4,
        };
        let outcome = wait_visible(&driver, &Selector::css("#x"), Duration::from_secs(30))
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::Visible);
        assert_eq!(driver.probes.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_visible_times_out() {
        let driver = AppearsAfter {
            probes: AtomicUsize::new(0),
            visible_after: usize::MAX,
        };
        let start = Instant::now();
        let outcome = wait_visible(&driver, &Selector::css("#x"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::with_text("button", "Send").to_string(), "button:text(\"Send\")");
        assert_eq!(
            Selector::with_label("input[type='radio']", "Paris").to_string(),
            "input[type='radio'][aria-label=\"Paris\"]"
        );
    }

    #[test]
    fn test_element_state() {
        assert!(ElementState::Visible { enabled: false }.is_visible());
        assert!(!ElementState::Visible { enabled: false }.is_actionable());
        assert!(!ElementState::Hidden.is_visible());
    }
}
