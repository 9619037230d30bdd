//! 离线评测 - 编排层
//!
//! 用带标准答案的题目文件评估模型链的准确率，不打开浏览器

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::models::{load_questions, QuizQuestion};
use crate::services::AnswerOracle;
use crate::utils::logging::truncate_text;

/// 评测结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BenchReport {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    /// 答案服务报错的题数
    pub failed: usize,
}

impl BenchReport {
    /// 正确率，没有题目时为 0
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// 加载评测题目，每道题都必须带 `correct_answer_index`
pub async fn load_fixtures(path: &Path) -> Result<Vec<QuizQuestion>> {
    let questions = load_questions(path).await?;
    if let Some(position) = questions.iter().position(|q| q.correct_answer_index().is_none()) {
        bail!("第 {} 道题缺少 correct_answer_index: {}", position + 1, path.display());
    }
    Ok(questions)
}

/// 逐题调用答案服务并统计正确率
///
/// 单题失败只记录，不中断评测；题与题之间等待 `delay` 以避开限流
pub async fn run_bench(oracle: &AnswerOracle, questions: &[QuizQuestion], delay: Duration) -> BenchReport {
    let mut report = BenchReport {
        total: questions.len(),
        ..Default::default()
    };

    for (i, question) in questions.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay).await;
        }

        let label = format!("[{}/{}]", i + 1, questions.len());
        info!("{} {}", label, truncate_text(question.question(), 60));

        match oracle.resolve_answer(question).await {
            Ok(index) => {
                let chosen = question.choice(index).unwrap_or_default();
                if question.correct_answer_index() == Some(index) {
                    report.correct += 1;
                    info!("{} ✅ {}. {}", label, index, chosen);
                } else {
                    report.wrong += 1;
                    info!(
                        "{} ❌ {}. {}（正确答案: {}）",
                        label,
                        index,
                        chosen,
                        question.correct_answer().unwrap_or_default()
                    );
                }
            }
            Err(e) => {
                report.failed += 1;
                warn!("{} ⚠️ 答案服务失败: {}", label, e);
            }
        }
    }

    info!(
        "📊 正确 {} / 错误 {} / 失败 {}，正确率 {:.1}%",
        report.correct,
        report.wrong,
        report.failed,
        report.accuracy() * 100.0
    );
    report
}
