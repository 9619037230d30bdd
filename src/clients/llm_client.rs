//! LLM 客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Gemini 的 OpenAI 兼容端点、Azure 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::debug;

use crate::config::Config;
use crate::error::{ConfigError, ModelError};

/// 输出约束
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFormat {
    /// 不限制
    Text,
    /// 只允许 `0..choice_count` 中的一个数字
    IndexEnum { choice_count: usize },
}

impl ResponseFormat {
    /// 允许的输出，`Text` 时为 None
    pub fn allowed_tokens(&self) -> Option<Vec<String>> {
        match self {
            ResponseFormat::Text => None,
            ResponseFormat::IndexEnum { choice_count } => Some((0..*choice_count).map(|i| i.to_string()).collect()),
        }
    }
}

/// 单次生成的参数
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub response_format: ResponseFormat,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            response_format: ResponseFormat::Text,
            max_output_tokens: 2,
            temperature: 1.0,
        }
    }
}

/// 答案生成服务
///
/// 给定 prompt 返回原始文本，不做任何解析
#[async_trait]
pub trait AnswerModel: Send + Sync {
    /// 模型名，用于日志和错误信息
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, ModelError>;
}

/// OpenAI 兼容接口上的一个模型
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout: Duration,
}

impl OpenAiModel {
    /// 创建使用指定模型的客户端
    pub fn new(config: &Config, model_name: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = config.llm_api_key.as_deref().ok_or(ConfigError::MissingApiKey)?;

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&config.llm_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: model_name.into(),
            timeout: config.llm_timeout(),
        })
    }

    /// 按配置创建主模型 + 备用模型链
    pub fn chain(config: &Config) -> Result<Vec<Box<dyn AnswerModel>>, ConfigError> {
        config
            .model_chain()
            .into_iter()
            .map(|name| Self::new(config, name).map(|m| Box::new(m) as Box<dyn AnswerModel>))
            .collect()
    }
}

/// 输出约束对应的系统消息
fn format_instruction(format: &ResponseFormat) -> Option<String> {
    format.allowed_tokens().map(|tokens| {
        format!(
            "Reply with exactly one of the following values and nothing else: {}",
            tokens.join(", ")
        )
    })
}

#[async_trait]
impl AnswerModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String, ModelError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", prompt.len());

        let model = self.model_name.as_str();
        let mut messages = Vec::new();

        if let Some(instruction) = format_instruction(&config.response_format) {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(instruction.as_str())
                .build()
                .map_err(|e| ModelError::request(model, e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| ModelError::request(model, e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .temperature(config.temperature)
            .max_tokens(config.max_output_tokens)
            .build()
            .map_err(|e| ModelError::request(model, e))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ModelError::Timeout {
                model: model.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|e| ModelError::request(model, e))?;

        debug!("LLM API 调用成功");

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ModelError::EmptyContent {
                model: model.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            llm_api_key: Some("test-key".to_string()),
            llm_model_name: "primary".to_string(),
            llm_fallback_models: vec!["backup-a".to_string(), "primary".to_string(), "backup-b".to_string()],
            ..Config::default()
        }
    }

    #[test]
    fn test_allowed_tokens() {
        assert_eq!(ResponseFormat::Text.allowed_tokens(), None);
        assert_eq!(
            ResponseFormat::IndexEnum { choice_count: 3 }.allowed_tokens(),
            Some(vec!["0".to_string(), "1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn test_format_instruction_lists_indices() {
        let instruction = format_instruction(&ResponseFormat::IndexEnum { choice_count: 2 }).unwrap();
        assert!(instruction.ends_with("0, 1"));
        assert!(format_instruction(&ResponseFormat::Text).is_none());
    }

    #[test]
    fn test_chain_order_and_dedup() {
        let chain = OpenAiModel::chain(&test_config()).unwrap();
        let names: Vec<&str> = chain.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["primary", "backup-a", "backup-b"]);
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config {
            llm_api_key: None,
            ..Config::default()
        };
        assert!(matches!(OpenAiModel::new(&config, "m"), Err(ConfigError::MissingApiKey)));
    }

    /// 测试 LLM API 连通性
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_live_generate -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_generate() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().unwrap();
        let model = OpenAiModel::new(&config, config.llm_model_name.clone()).unwrap();
        let generation = GenerationConfig {
            response_format: ResponseFormat::IndexEnum { choice_count: 4 },
            max_output_tokens: 2,
            temperature: 0.0,
        };

        let answer = model
            .generate(
                "Question: What is the capital of France?\nChoices:\n0. Berlin\n1. Madrid\n2. Paris\n3. Rome\nChoose the best answer (provide the number):",
                &generation,
            )
            .await
            .unwrap();
        println!("LLM 响应: {}", answer);
        assert_eq!(answer, "2");
    }
}
