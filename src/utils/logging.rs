//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::workflow::SessionSummary;

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先；否则默认 `slido_quiz_bot=info`，`verbose` 时为 debug。
/// 重复调用不会报错（测试里会多次初始化）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slido_quiz_bot={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 会话开始 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🔗 测验地址: {}", config.quiz_url);
    info!("👤 参与者: {}", config.participant_name);
    info!("🤖 模型: {}", config.model_chain().join(" → "));
    info!("{}", "=".repeat(60));
}

/// 记录会话结果
pub fn log_session_summary(summary: &SessionSummary) {
    info!("\n{}", "=".repeat(60));
    info!(
        "🏁 会话结束 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✓ 已回答: {} 题", summary.questions_answered);
    if let Some(progress) = summary.last_progress {
        info!("📊 最后进度: {}", progress);
    }
    info!("🔄 轮询次数: {}", summary.ticks);
    info!("{}", "=".repeat(60));
}

/// 截断文本用于日志显示，按字符而不是字节截断
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("What is the capital", 7), "What is...");
        assert_eq!(truncate_text("法国的首都是哪里", 4), "法国的首...");
    }
}
