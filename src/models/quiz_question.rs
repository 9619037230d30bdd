//! 选择题数据模型

use serde::Deserialize;
use thiserror::Error;

/// 题目不满足约束
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyQuestion,
    #[error("question has no answer choices")]
    NoChoices,
    #[error("answer choice {position} is empty")]
    EmptyChoice { position: usize },
    #[error("correct answer index {index} out of range for {choice_count} choices")]
    AnswerOutOfRange { index: usize, choice_count: usize },
}

/// 一道选择题
///
/// 创建后不可修改。`answer_choices` 的顺序就是答案索引的顺序，必须和页面一致
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuizQuestion")]
pub struct QuizQuestion {
    question: String,
    answer_choices: Vec<String>,
    correct_answer_index: Option<usize>,
}

/// 未校验的题目，只用于反序列化
#[derive(Deserialize)]
struct RawQuizQuestion {
    question: String,
    answer_choices: Vec<String>,
    #[serde(default)]
    correct_answer_index: Option<usize>,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = QuestionError;

    fn try_from(raw: RawQuizQuestion) -> Result<Self, Self::Error> {
        match raw.correct_answer_index {
            Some(index) => Self::with_answer(raw.question, raw.answer_choices, index),
            None => Self::new(raw.question, raw.answer_choices),
        }
    }
}

impl QuizQuestion {
    /// 页面上读到的题目，正确答案未知
    pub fn new(question: impl Into<String>, answer_choices: Vec<String>) -> Result<Self, QuestionError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuestionError::EmptyQuestion);
        }
        if answer_choices.is_empty() {
            return Err(QuestionError::NoChoices);
        }
        if let Some(position) = answer_choices.iter().position(|c| c.trim().is_empty()) {
            return Err(QuestionError::EmptyChoice { position });
        }

        Ok(Self {
            question,
            answer_choices,
            correct_answer_index: None,
        })
    }

    /// 已知正确答案的题目（评测数据）
    pub fn with_answer(
        question: impl Into<String>,
        answer_choices: Vec<String>,
        correct_answer_index: usize,
    ) -> Result<Self, QuestionError> {
        let mut q = Self::new(question, answer_choices)?;
        if correct_answer_index >= q.answer_choices.len() {
            return Err(QuestionError::AnswerOutOfRange {
                index: correct_answer_index,
                choice_count: q.answer_choices.len(),
            });
        }
        q.correct_answer_index = Some(correct_answer_index);
        Ok(q)
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer_choices(&self) -> &[String] {
        &self.answer_choices
    }

    pub fn choice_count(&self) -> usize {
        self.answer_choices.len()
    }

    pub fn choice(&self, index: usize) -> Option<&str> {
        self.answer_choices.get(index).map(String::as_str)
    }

    pub fn correct_answer_index(&self) -> Option<usize> {
        self.correct_answer_index
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.correct_answer_index.and_then(|i| self.choice(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_keeps_choice_order() {
        let q = QuizQuestion::new(
            "What is the capital of France?",
            choices(&["Berlin", "Madrid", "Paris", "Rome"]),
        )
        .unwrap();
        assert_eq!(q.choice(2), Some("Paris"));
        assert_eq!(q.choice(4), None);
        assert_eq!(q.correct_answer_index(), None);
        assert_eq!(q.choice_count(), 4);
    }

    #[test]
    fn test_rejects_empty_question_and_choices() {
        assert_eq!(QuizQuestion::new("  ", choices(&["A"])), Err(QuestionError::EmptyQuestion));
        assert_eq!(QuizQuestion::new("Q?", Vec::new()), Err(QuestionError::NoChoices));
        assert_eq!(
            QuizQuestion::new("Q?", choices(&["A", ""])),
            Err(QuestionError::EmptyChoice { position: 1 })
        );
    }

    #[test]
    fn test_keeps_padded_choice_text() {
        let q = QuizQuestion::new("Capital?", choices(&["Berlin", " Paris "])).unwrap();
        assert_eq!(q.choice(1), Some(" Paris "));
        assert_eq!(
            QuizQuestion::new("Capital?", choices(&["Berlin", " \n "])),
            Err(QuestionError::EmptyChoice { position: 1 })
        );
    }

    #[test]
    fn test_with_answer_checks_bounds() {
        let q = QuizQuestion::with_answer("Which is a fruit?", choices(&["Avocado", "Lemon"]), 0).unwrap();
        assert_eq!(q.correct_answer(), Some("Avocado"));

        assert_eq!(
            QuizQuestion::with_answer("Which is a fruit?", choices(&["Avocado", "Lemon"]), 2),
            Err(QuestionError::AnswerOutOfRange { index: 2, choice_count: 2 })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: QuizQuestion = serde_json::from_str(
            r#"{"question": "2 + 2?", "answer_choices": ["3", "4"], "correct_answer_index": 1}"#,
        )
        .unwrap();
        assert_eq!(ok.correct_answer(), Some("4"));

        let bad = serde_json::from_str::<QuizQuestion>(
            r#"{"question": "2 + 2?", "answer_choices": ["3", "4"], "correct_answer_index": 5}"#,
        );
        assert!(bad.is_err());
    }
}
