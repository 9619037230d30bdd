use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::DriverError;

/// 启动浏览器
///
/// `headless` 为 false 时打开可见窗口，方便观察答题过程
pub async fn launch_browser(headless: bool, chrome_executable: Option<&str>) -> Result<(Browser, Page), DriverError> {
    info!("🚀 启动浏览器 (无头模式: {})...", headless);

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = chrome_executable {
        debug!("浏览器路径: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder
        .args(vec![
            "--disable-gpu",           // 容器里没有 GPU
            "--no-sandbox",            // 容器里通常以 root 运行
            "--disable-dev-shm-usage", // 防止共享内存不足
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            DriverError::Unavailable(format!("invalid browser config: {}", e))
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        e
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        e
    })?;

    Ok((browser, page))
}
