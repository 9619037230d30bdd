use std::time::Duration;

use thiserror::Error;

/// 会话级错误
///
/// 任何一个变体都会让本次会话终止，调用方决定是否整体重来。
#[derive(Debug, Error)]
pub enum QuizError {
    /// 调用方传入的数据不合法（例如空的参与者名字）
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 期待的页面元素在等待预算内没有出现
    #[error("element `{selector}` not visible within {timeout:?}")]
    ElementNotFound { selector: String, timeout: Duration },

    /// 其他页面交互失败
    #[error("unexpected page state: {0}")]
    UnexpectedPageState(String),

    /// 题干为空或不存在
    #[error("question text could not be retrieved: {0}")]
    QuestionExtraction(String),

    /// 页面上没有任何选项
    #[error("no answer choices found under `{selector}`")]
    NoChoices { selector: String },

    /// 答案服务失败
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// 轮询没有进展
    #[error("quiz loop stuck after {ticks} ticks ({elapsed:?}): {reason}")]
    StuckState {
        ticks: u64,
        elapsed: Duration,
        reason: String,
    },

    /// 外部取消或会话截止时间到
    #[error("session cancelled: {reason}")]
    Cancelled { reason: String },
}

impl QuizError {
    /// 错误分类名，用于进程退出时的诊断信息
    pub fn kind(&self) -> &'static str {
        match self {
            QuizError::InvalidInput(_) => "InvalidInput",
            QuizError::ElementNotFound { .. } => "ElementNotFound",
            QuizError::UnexpectedPageState(_) => "UnexpectedPageState",
            QuizError::QuestionExtraction(_) => "QuestionExtractionError",
            QuizError::NoChoices { .. } => "NoChoicesError",
            QuizError::Oracle(_) => "OracleError",
            QuizError::StuckState { .. } => "StuckStateError",
            QuizError::Cancelled { .. } => "CancelledError",
        }
    }

    /// 创建元素未找到错误
    pub fn element_not_found(selector: impl ToString, timeout: Duration) -> Self {
        QuizError::ElementNotFound {
            selector: selector.to_string(),
            timeout,
        }
    }

    /// 将驱动层错误归类为页面状态异常
    pub fn page(context: &str, source: DriverError) -> Self {
        QuizError::UnexpectedPageState(format!("{}: {}", context, source))
    }
}

/// 答案服务错误
#[derive(Debug, Error)]
pub enum OracleError {
    /// 主模型和所有备用模型都调用失败
    #[error("All models failed to generate a valid answer.")]
    AllModelsFailed,

    /// 模型返回的内容不是整数
    #[error("Failed to convert model response to integer for model {model}: '{response}'")]
    Unparseable { model: String, response: String },

    /// 模型返回的索引越界
    #[error("model {model} returned index {index}, expected 0..{choice_count}")]
    IndexOutOfRange {
        model: String,
        index: usize,
        choice_count: usize,
    },

    /// 没有配置任何模型
    #[error("no answer models configured")]
    NoModels,
}

/// 单个模型调用的错误
///
/// 只在答案服务内部流转，触发下一个备用模型
#[derive(Debug, Error)]
pub enum ModelError {
    /// API 调用失败
    #[error("request to model {model} failed: {source}")]
    Request {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 请求超时
    #[error("model {model} did not answer within {timeout:?}")]
    Timeout { model: String, timeout: Duration },

    /// 返回内容为空
    #[error("model {model} returned empty content")]
    EmptyContent { model: String },
}

impl ModelError {
    /// 创建 API 调用失败错误
    pub fn request(model: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        ModelError::Request {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

/// 浏览器驱动错误
#[derive(Debug, Error)]
pub enum DriverError {
    /// CDP 调用失败
    #[error("browser command failed: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// 脚本返回值无法解析
    #[error("unexpected script result: {0}")]
    ScriptResult(#[from] serde_json::Error),

    /// 执行动作时元素不存在
    #[error("element `{selector}` not found")]
    ElementMissing { selector: String },

    /// 浏览器已关闭或配置失败
    #[error("browser unavailable: {0}")]
    Unavailable(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// 环境变量解析失败
    #[error("environment variable {var_name}: value '{value}' is not a valid {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: &'static str,
    },

    /// 缺少 API key
    #[error("no LLM API key configured (set LLM_API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,
}

/// 会话结果类型
pub type QuizResult<T> = Result<T, QuizError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_models_failed_message() {
        let err = QuizError::from(OracleError::AllModelsFailed);
        assert_eq!(err.to_string(), "All models failed to generate a valid answer.");
        assert_eq!(err.kind(), "OracleError");
    }

    #[test]
    fn test_unparseable_names_model() {
        let err = OracleError::Unparseable {
            model: "gemini-1.5-pro-latest".to_string(),
            response: "invalid".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to convert model response to integer for model gemini-1.5-pro-latest: 'invalid'"
        );
    }

    #[test]
    fn test_element_not_found_names_selector() {
        let err = QuizError::element_not_found("button", Duration::from_secs(120));
        assert_eq!(err.kind(), "ElementNotFound");
        assert!(err.to_string().contains("`button`"));
    }
}
