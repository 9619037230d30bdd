use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use slido_quiz_bot::orchestrator::{load_fixtures, run_bench};
use slido_quiz_bot::utils::logging;
use slido_quiz_bot::{cancel_pair, AnswerOracle, Config, ConfigError, QuizError, SessionRunner};

#[derive(Debug, Parser)]
#[command(name = "slido_quiz_bot")]
#[command(about = "Join a Slido quiz and answer every question with an LLM", long_about = None)]
struct Args {
    /// Quiz URL to join
    #[arg(short, long, required_unless_present = "bench")]
    url: Option<String>,

    /// Participant display name [default: "Alan Turing"]
    #[arg(short, long)]
    name: Option<String>,

    /// TOML config file (defaults, then this file, then env vars, then flags)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the browser without a window
    #[arg(long, conflicts_with = "visible")]
    headless: bool,

    /// Run the browser with a visible window
    #[arg(long)]
    visible: bool,

    /// Attach to a running browser on this remote-debugging port instead of launching one
    #[arg(long)]
    debug_port: Option<u16>,

    /// Primary model name
    #[arg(long)]
    model: Option<String>,

    /// Fallback model, tried in the given order (repeatable)
    #[arg(long = "fallback-model")]
    fallback_models: Vec<String>,

    /// Abort the session after this many seconds
    #[arg(long)]
    session_timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Evaluate the model chain against a fixtures file instead of joining a quiz
    #[arg(long, value_name = "FIXTURES_TOML")]
    bench: Option<PathBuf>,
}

impl Args {
    /// 命令行参数覆盖配置
    fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.quiz_url = url.clone();
        }
        if let Some(name) = &self.name {
            config.participant_name = name.clone();
        }
        if self.headless {
            config.headless = true;
        }
        if self.visible {
            config.headless = false;
        }
        if let Some(port) = self.debug_port {
            config.browser_debug_port = Some(port);
        }
        if let Some(model) = &self.model {
            config.llm_model_name = model.clone();
        }
        if !self.fallback_models.is_empty() {
            config.llm_fallback_models = self.fallback_models.clone();
        }
        if let Some(secs) = self.session_timeout {
            config.session_timeout_secs = Some(secs);
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {:#}", error_kind(&e), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    logging::init(config.verbose_logging);

    if let Some(path) = &args.bench {
        return bench(&config, path).await;
    }

    let runner = SessionRunner::new(config)?;

    let (handle, token) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到 Ctrl-C，正在取消会话...");
            handle.cancel("interrupted by Ctrl-C");
        }
    });

    runner.run(token).await?;
    Ok(())
}

async fn bench(config: &Config, path: &Path) -> Result<()> {
    let questions = load_fixtures(path).await?;
    let oracle = AnswerOracle::from_config(config)?;
    let delay = Duration::from_secs(config.bench_delay_secs);

    tokio::select! {
        _ = run_bench(&oracle, &questions, delay) => Ok(()),
        _ = tokio::signal::ctrl_c() => Err(QuizError::Cancelled {
            reason: "interrupted by Ctrl-C".to_string(),
        }
        .into()),
    }
}

/// 诊断信息里的错误分类
fn error_kind(e: &anyhow::Error) -> &'static str {
    if let Some(quiz) = e.downcast_ref::<QuizError>() {
        quiz.kind()
    } else if e.downcast_ref::<ConfigError>().is_some() {
        "ConfigError"
    } else {
        "Error"
    }
}
