pub mod connection;
pub mod launch;

use tracing::info;

use crate::config::Config;
use crate::error::DriverError;
use crate::infrastructure::ChromiumPage;

pub use connection::connect_to_browser;
pub use launch::launch_browser;

/// 按配置启动或连接浏览器
pub async fn open_page(config: &Config) -> Result<ChromiumPage, DriverError> {
    match config.browser_debug_port {
        Some(port) => {
            let (browser, page) = connect_to_browser(port).await?;
            Ok(ChromiumPage::attached(browser, page))
        }
        None => {
            let (browser, page) = launch_browser(config.headless, config.chrome_executable.as_deref()).await?;
            info!("✓ 浏览器已就绪");
            Ok(ChromiumPage::launched(browser, page))
        }
    }
}
