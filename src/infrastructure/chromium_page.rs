//! Chromium 页面 - 基础设施层
//!
//! 持有唯一的 page 资源，通过执行 JS 实现 `PageDriver`

use async_trait::async_trait;
use chromiumoxide::{Browser, Page};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::page_driver::{ElementState, PageDriver, Selector};
use crate::error::DriverError;

/// 所有脚本共用的元素查找函数
const FIND_PRELUDE: &str = r#"
    const __matches = (q) => Array.from(document.querySelectorAll(q.css)).filter((el) =>
        (q.text === null || (el.textContent || '').trim() === q.text) &&
        (q.label === null || el.getAttribute('aria-label') === q.label));
    const __first = (q) => __matches(q)[0] || null;
"#;

/// 元素状态查询结果
#[derive(Debug, Deserialize)]
struct ProbeResult {
    state: String,
    #[serde(default)]
    enabled: bool,
}

/// 文本查询结果，顶层返回 null 时 CDP 不带 value，所以包一层
#[derive(Debug, Deserialize)]
struct TextResult {
    text: Option<String>,
}

/// Chromium 页面
///
/// 职责：
/// - 持有 Page，以及用来释放资源的 Browser
/// - 只暴露 `PageDriver` 能力
/// - 不认识题目和会话流程
pub struct ChromiumPage {
    page: Page,
    browser: Mutex<Option<Browser>>,
    /// 自己启动的浏览器在关闭时一并退出；连接到的已有浏览器只关页面
    owns_browser: bool,
}

impl ChromiumPage {
    /// 包装一个自己启动的浏览器
    pub fn launched(browser: Browser, page: Page) -> Self {
        Self {
            page,
            browser: Mutex::new(Some(browser)),
            owns_browser: true,
        }
    }

    /// 包装一个连接到的已有浏览器
    pub fn attached(browser: Browser, page: Page) -> Self {
        Self {
            page,
            browser: Mutex::new(Some(browser)),
            owns_browser: false,
        }
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue, DriverError> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T, DriverError> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 针对选择器生成脚本
    fn script(selector: &Selector, body: &str) -> Result<String, DriverError> {
        let query = serde_json::to_string(&selector.to_query())?;
        Ok(format!(
            "(() => {{\n{}\n    const q = {};\n{}\n}})()",
            FIND_PRELUDE, query, body
        ))
    }

    fn missing(selector: &Selector) -> DriverError {
        DriverError::ElementMissing {
            selector: selector.to_string(),
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        debug!("导航到: {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn probe(&self, selector: &Selector) -> Result<ElementState, DriverError> {
        let js = Self::script(
            selector,
            r#"
    const el = __first(q);
    if (!el) return { state: 'absent' };
    const style = window.getComputedStyle(el);
    const shown = style.display !== 'none' && style.visibility !== 'hidden' && el.getClientRects().length > 0;
    if (!shown) return { state: 'hidden' };
    const enabled = !el.disabled && el.getAttribute('aria-disabled') !== 'true';
    return { state: 'visible', enabled };
"#,
        )?;

        let result: ProbeResult = self.eval_as(js).await?;
        Ok(match result.state.as_str() {
            "visible" => ElementState::Visible {
                enabled: result.enabled,
            },
            "hidden" => ElementState::Hidden,
            _ => ElementState::Absent,
        })
    }

    async fn text(&self, selector: &Selector) -> Result<Option<String>, DriverError> {
        let js = Self::script(
            selector,
            r#"
    const el = __first(q);
    return { text: el ? (el.textContent || '') : null };
"#,
        )?;
        let result: TextResult = self.eval_as(js).await?;
        Ok(result.text)
    }

    async fn all_texts(&self, selector: &Selector) -> Result<Vec<String>, DriverError> {
        let js = Self::script(
            selector,
            r#"
    return __matches(q).map((el) => el.textContent || '');
"#,
        )?;
        self.eval_as(js).await
    }

    async fn click(&self, selector: &Selector) -> Result<(), DriverError> {
        let js = Self::script(
            selector,
            r#"
    const el = __first(q);
    if (!el) return false;
    el.scrollIntoView({ block: 'center' });
    el.click();
    return true;
"#,
        )?;

        let clicked: bool = self.eval_as(js).await?;
        if clicked {
            Ok(())
        } else {
            Err(Self::missing(selector))
        }
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<(), DriverError> {
        let value = serde_json::to_string(value)?;
        let js = Self::script(
            selector,
            &format!(
                r#"
    const el = __first(q);
    if (!el) return false;
    el.focus();
    // React 受控输入框需要走原生 setter
    const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set;
    setter.call(el, {});
    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
    return true;
"#,
                value
            ),
        )?;

        let filled: bool = self.eval_as(js).await?;
        if filled {
            Ok(())
        } else {
            Err(Self::missing(selector))
        }
    }

    async fn close(&self) -> Result<(), DriverError> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };

        if self.owns_browser {
            debug!("关闭浏览器");
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        } else {
            debug!("关闭页面，保留已连接的浏览器");
            self.page.clone().close().await?;
        }
        Ok(())
    }
}
