//! Slido 页面选择器
//!
//! 平台改版时只需要改这里

use super::page_driver::Selector;

pub const NAME_INPUT: &str = r#"input[name="participantName"]"#;
pub const JOIN_BUTTON: &str = ".btn-primary";
pub const SEND_BUTTON: &str = "button";
pub const SEND_BUTTON_TEXT: &str = "Send";
pub const SUBMIT_BUTTON: &str = r#"button.poll__btn-submit[type="button"]"#;
pub const QUESTION_TITLE: &str = r#"[data-testid="poll-title"]"#;
pub const ANSWER_LABELS: &str = ".poll-question-options .MuiFormControlLabel-label";
pub const ANSWER_RADIO: &str = "input[type='radio']";
pub const QUESTION_COUNTER: &str = "[data-testid='question-counter']";
pub const LEADERBOARD: &str = r#"[data-testid="quiz-leaderboard"], .quiz-leaderboard"#;

/// 一次会话用到的全部选择器
#[derive(Debug, Clone)]
pub struct Selectors {
    /// 名字输入框
    pub name_input: Selector,
    /// 加入按钮
    pub join_button: Selector,
    /// 可答题信号
    pub send_button: Selector,
    /// 提交按钮
    pub submit_button: Selector,
    pub question_title: Selector,
    pub answer_labels: Selector,
    /// `answered/total` 计数器
    pub question_counter: Selector,
    /// 结束信号
    pub leaderboard: Selector,
}

impl Selectors {
    /// 标签与选项文本完全一致的单选框
    pub fn answer_radio(&self, label: &str) -> Selector {
        Selector::with_label(ANSWER_RADIO, label)
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            name_input: Selector::css(NAME_INPUT),
            join_button: Selector::css(JOIN_BUTTON),
            send_button: Selector::with_text(SEND_BUTTON, SEND_BUTTON_TEXT),
            submit_button: Selector::css(SUBMIT_BUTTON),
            question_title: Selector::css(QUESTION_TITLE),
            answer_labels: Selector::css(ANSWER_LABELS),
            question_counter: Selector::css(QUESTION_COUNTER),
            leaderboard: Selector::css(LEADERBOARD),
        }
    }
}
