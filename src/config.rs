use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认参与者名字
pub const DEFAULT_PARTICIPANT_NAME: &str = "Alan Turing";

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件 → 环境变量 → 命令行参数
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 测验 URL
    pub quiz_url: String,
    /// 参与者名字
    pub participant_name: String,
    /// 是否无头运行
    pub headless: bool,
    /// 已有浏览器的调试端口，设置后不再启动新浏览器
    pub browser_debug_port: Option<u16>,
    /// 浏览器可执行文件路径
    pub chrome_executable: Option<String>,
    // --- LLM 配置 ---
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 主模型失败后依次尝试的备用模型
    pub llm_fallback_models: Vec<String>,
    pub llm_temperature: f32,
    pub llm_max_output_tokens: u32,
    pub llm_timeout_secs: u64,
    // --- 轮询配置 ---
    pub poll_interval_ms: u64,
    /// 等待下一道题出现的上限
    pub question_wait_secs: u64,
    /// 等待单个元素可见的上限
    pub element_wait_secs: u64,
    pub max_ticks: u64,
    pub max_stuck_ticks: u32,
    pub session_timeout_secs: Option<u64>,
    /// 计数器显示 answered == total 时结束
    pub trust_question_counter: bool,
    // --- 评测模式 ---
    pub bench_delay_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz_url: String::new(),
            participant_name: DEFAULT_PARTICIPANT_NAME.to_string(),
            // 容器里通常会设置 HOSTNAME
            headless: std::env::var_os("HOSTNAME").is_some(),
            browser_debug_port: None,
            chrome_executable: None,
            llm_api_key: None,
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            llm_model_name: "gemini-1.5-pro-latest".to_string(),
            llm_fallback_models: vec!["gemini-1.5-flash-latest".to_string()],
            llm_temperature: 1.0,
            llm_max_output_tokens: 2,
            llm_timeout_secs: 30,
            poll_interval_ms: 1000,
            question_wait_secs: 120,
            element_wait_secs: 30,
            max_ticks: 20_000,
            max_stuck_ticks: 10,
            session_timeout_secs: None,
            trust_question_counter: true,
            bench_delay_secs: 25,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：可选的 TOML 文件，然后是环境变量
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var("SLIDO_BOT_CONFIG").ok();
        let path = path.or(env_path.as_deref().map(Path::new));

        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };

        base.apply_env(|name| std::env::var(name).ok())
    }

    /// 只使用默认值和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|name| std::env::var(name).ok())
    }

    /// 从 TOML 文件读取，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖当前配置
    ///
    /// `lookup` 便于测试时注入变量表
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QUIZ_URL") {
            self.quiz_url = v;
        }
        if let Some(v) = lookup("PARTICIPANT_NAME") {
            self.participant_name = v;
        }
        if let Some(v) = parse_var(&lookup, "HEADLESS", "bool")? {
            self.headless = v;
        }
        if let Some(v) = parse_var(&lookup, "BROWSER_DEBUG_PORT", "port number")? {
            self.browser_debug_port = Some(v);
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }
        if let Some(v) = lookup("LLM_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")) {
            self.llm_api_key = Some(v);
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = lookup("LLM_FALLBACK_MODELS") {
            self.llm_fallback_models = v
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = parse_var(&lookup, "LLM_TEMPERATURE", "float")? {
            self.llm_temperature = v;
        }
        if let Some(v) = parse_var(&lookup, "LLM_MAX_OUTPUT_TOKENS", "integer")? {
            self.llm_max_output_tokens = v;
        }
        if let Some(v) = parse_var(&lookup, "LLM_TIMEOUT_SECS", "integer")? {
            self.llm_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "POLL_INTERVAL_MS", "integer")? {
            self.poll_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "QUESTION_WAIT_SECS", "integer")? {
            self.question_wait_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "ELEMENT_WAIT_SECS", "integer")? {
            self.element_wait_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_TICKS", "integer")? {
            self.max_ticks = v;
        }
        if let Some(v) = parse_var(&lookup, "MAX_STUCK_TICKS", "integer")? {
            self.max_stuck_ticks = v;
        }
        if let Some(v) = parse_var(&lookup, "SESSION_TIMEOUT_SECS", "integer")? {
            self.session_timeout_secs = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "TRUST_QUESTION_COUNTER", "bool")? {
            self.trust_question_counter = v;
        }
        if let Some(v) = parse_var(&lookup, "BENCH_DELAY_SECS", "integer")? {
            self.bench_delay_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "VERBOSE_LOGGING", "bool")? {
            self.verbose_logging = v;
        }
        Ok(self)
    }

    /// 主模型在前，备用模型按配置顺序在后，去重
    pub fn model_chain(&self) -> Vec<String> {
        let mut chain = vec![self.llm_model_name.clone()];
        for model in &self.llm_fallback_models {
            if !chain.contains(model) {
                chain.push(model.clone());
            }
        }
        chain
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn question_wait(&self) -> Duration {
        Duration::from_secs(self.question_wait_secs)
    }

    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_var<F, T>(lookup: &F, var_name: &str, expected_type: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type,
            }),
    }
}
