//! 答案服务 - 业务能力层
//!
//! 只负责"给定题目选出一个索引"，不碰页面
//!
//! 调用顺序：主模型 → 备用模型（按配置顺序，每个最多一次）。
//! 只有调用失败才会换下一个模型；模型返回了内容但不是合法索引时直接报错。

use tracing::{debug, info, warn};

use crate::clients::{AnswerModel, GenerationConfig, OpenAiModel, ResponseFormat};
use crate::config::Config;
use crate::error::{ConfigError, OracleError};
use crate::models::QuizQuestion;

/// 构造发给模型的 prompt
///
/// ```text
/// Question: <题干>
/// Choices:
/// 0. <选项0>
/// 1. <选项1>
/// Choose the best answer (provide the number):
/// ```
pub fn format_prompt(question: &QuizQuestion) -> String {
    let mut prompt = format!("Question: {}\nChoices:\n", question.question());
    for (index, choice) in question.answer_choices().iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", index, choice));
    }
    prompt.push_str("Choose the best answer (provide the number):");
    prompt
}

/// 解析模型输出
///
/// 去掉首尾空白后必须全部是 ASCII 数字，且落在 `0..choice_count` 内
pub fn parse_index(model: &str, response: &str, choice_count: usize) -> Result<usize, OracleError> {
    let trimmed = response.trim();
    let unparseable = || OracleError::Unparseable {
        model: model.to_string(),
        response: response.to_string(),
    };

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unparseable());
    }
    let index: usize = trimmed.parse().map_err(|_| unparseable())?;

    if index >= choice_count {
        return Err(OracleError::IndexOutOfRange {
            model: model.to_string(),
            index,
            choice_count,
        });
    }
    Ok(index)
}

/// 答案服务
///
/// 职责：
/// - 构造 prompt
/// - 按顺序调用模型，调用失败时换备用模型
/// - 校验返回的索引
pub struct AnswerOracle {
    models: Vec<Box<dyn AnswerModel>>,
    max_output_tokens: u32,
    temperature: f32,
}

impl AnswerOracle {
    /// 用给定的模型链创建，第一个是主模型
    pub fn new(
        models: Vec<Box<dyn AnswerModel>>,
        max_output_tokens: u32,
        temperature: f32,
    ) -> Result<Self, OracleError> {
        if models.is_empty() {
            return Err(OracleError::NoModels);
        }
        Ok(Self {
            models,
            max_output_tokens,
            temperature,
        })
    }

    /// 按配置创建 OpenAI 兼容模型链
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let models = OpenAiModel::chain(config)?;
        Ok(Self {
            models,
            max_output_tokens: config.llm_max_output_tokens,
            temperature: config.llm_temperature,
        })
    }

    fn generation_config(&self, question: &QuizQuestion) -> GenerationConfig {
        GenerationConfig {
            response_format: ResponseFormat::IndexEnum {
                choice_count: question.choice_count(),
            },
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
        }
    }

    /// 为题目选出答案索引
    ///
    /// # 错误
    /// - `AllModelsFailed`: 所有模型都调用失败
    /// - `Unparseable`: 某个模型返回了非数字内容
    /// - `IndexOutOfRange`: 某个模型返回的数字不在选项范围内
    pub async fn resolve_answer(&self, question: &QuizQuestion) -> Result<usize, OracleError> {
        let prompt = format_prompt(question);
        let generation = self.generation_config(question);

        debug!("prompt:\n{}", prompt);

        for (attempt, model) in self.models.iter().enumerate() {
            if attempt > 0 {
                info!("🔁 切换到备用模型: {}", model.name());
            }

            match model.generate(&prompt, &generation).await {
                Ok(response) => {
                    debug!("模型 {} 返回: '{}'", model.name(), response);
                    let index = parse_index(model.name(), &response, question.choice_count())?;
                    debug!("选择索引: {} (0-based)", index);
                    return Ok(index);
                }
                Err(e) => {
                    warn!("⚠️ 模型 {} 调用失败: {}", model.name(), e);
                }
            }
        }

        Err(OracleError::AllModelsFailed)
    }
}
