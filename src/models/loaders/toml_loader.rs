use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::models::quiz_question::QuizQuestion;

/// 评测题目文件
///
/// ```toml
/// [[questions]]
/// question = "What is the capital of France?"
/// answer_choices = ["Berlin", "Madrid", "Paris", "Rome"]
/// correct_answer_index = 2
/// ```
#[derive(Debug, Deserialize)]
struct QuestionFile {
    #[serde(default)]
    questions: Vec<QuizQuestion>,
}

/// 解析 TOML 内容，每道题都经过 `QuizQuestion` 的校验
pub fn parse_questions(content: &str) -> Result<Vec<QuizQuestion>> {
    let file: QuestionFile = toml::from_str(content).context("无法解析题目文件")?;
    Ok(file.questions)
}

/// 从 TOML 文件加载评测题目
pub async fn load_questions(path: &Path) -> Result<Vec<QuizQuestion>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取题目文件: {}", path.display()))?;

    let questions = parse_questions(&content).with_context(|| format!("题目文件无效: {}", path.display()))?;
    tracing::info!(
        "成功加载 {} 道题目: {}",
        questions.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(questions)
}
