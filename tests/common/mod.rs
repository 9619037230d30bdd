//! 集成测试共用的假页面、假模型和事件记录器

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use slido_quiz_bot::clients::{AnswerModel, GenerationConfig};
use slido_quiz_bot::infrastructure::{ElementState, PageDriver, Selector, Selectors};
use slido_quiz_bot::workflow::{LoopSettings, QuizEvent, QuizObserver};
use slido_quiz_bot::{AnswerOracle, DriverError, ModelError};

/// 假页面上的一道题
#[derive(Debug, Clone)]
pub struct FakeQuestion {
    pub prompt: String,
    pub choices: Vec<String>,
    /// 这道题显示时计数器的文本
    pub counter: Option<String>,
    /// 题干元素不可见
    pub title_hidden: bool,
    /// 选项文本在，但找不到对应的单选框
    pub radios_missing: bool,
}

impl FakeQuestion {
    pub fn new(prompt: &str, choices: &[&str]) -> Self {
        Self {
            prompt: prompt.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
            counter: None,
            title_hidden: false,
            radios_missing: false,
        }
    }

    pub fn with_hidden_title(mut self) -> Self {
        self.title_hidden = true;
        self
    }

    pub fn with_missing_radios(mut self) -> Self {
        self.radios_missing = true;
        self
    }

    pub fn with_counter(mut self, counter: &str) -> Self {
        self.counter = Some(counter.to_string());
        self
    }
}

/// 页面上发生过的动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(String),
    Fill(String, String),
    Click(String),
    Close,
}

#[derive(Debug, Default)]
struct FakeState {
    name_form_visible: bool,
    joined: bool,
    pending: VecDeque<FakeQuestion>,
    current: Option<FakeQuestion>,
    counter: Option<String>,
    leaderboard_visible: bool,
    leaderboard_when_done: bool,
    reject_submissions: bool,
    advance_due: bool,
    hang_on_close: bool,
    selected: Option<String>,
    submitted: Vec<String>,
    actions: Vec<Action>,
    closed: bool,
}

/// 内存里的 Slido 页面
///
/// 点击加入后出现第一题；提交后下一次查询页面时换下一题，题目用完后显示排行榜。
/// 计数器显示当前题目的 `counter`
pub struct FakeQuiz {
    selectors: Selectors,
    state: Mutex<FakeState>,
}

impl FakeQuiz {
    pub fn new(questions: Vec<FakeQuestion>) -> Self {
        Self {
            selectors: Selectors::default(),
            state: Mutex::new(FakeState {
                name_form_visible: true,
                pending: questions.into(),
                leaderboard_when_done: true,
                ..Default::default()
            }),
        }
    }

    /// 题目用完后不出现排行榜
    pub fn without_leaderboard(self) -> Self {
        self.state.lock().unwrap().leaderboard_when_done = false;
        self
    }

    /// 提交不起作用，题目一直留在页面上
    pub fn rejecting_submissions(self) -> Self {
        self.state.lock().unwrap().reject_submissions = true;
        self
    }

    /// 排行榜从一开始就可见
    pub fn with_leaderboard_visible(self) -> Self {
        self.state.lock().unwrap().leaderboard_visible = true;
        self
    }

    /// 关闭页面时永远不返回
    pub fn hanging_on_close(self) -> Self {
        self.state.lock().unwrap().hang_on_close = true;
        self
    }

    /// 名字输入框永远不出现
    pub fn without_name_form(self) -> Self {
        self.state.lock().unwrap().name_form_visible = false;
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.state.lock().unwrap().actions.clone()
    }

    /// 提交时选中的选项
    pub fn submitted(&self) -> Vec<String> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// 除加入表单以外的点击
    pub fn answer_clicks(&self) -> Vec<String> {
        let name_input = self.selectors.name_input.to_string();
        let join_button = self.selectors.join_button.to_string();
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Click(s) if s != name_input && s != join_button => Some(s),
                _ => None,
            })
            .collect()
    }

    fn advance(state: &mut FakeState) {
        state.current = state.pending.pop_front();
        state.selected = None;
        if let Some(counter) = state.current.as_ref().and_then(|q| q.counter.clone()) {
            state.counter = Some(counter);
        }
        if state.current.is_none() && state.leaderboard_when_done {
            state.leaderboard_visible = true;
        }
    }
}

fn visible(yes: bool) -> ElementState {
    if yes {
        ElementState::Visible { enabled: true }
    } else {
        ElementState::Absent
    }
}

#[async_trait]
impl PageDriver for FakeQuiz {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.state.lock().unwrap().actions.push(Action::Navigate(url.to_string()));
        Ok(())
    }

    async fn probe(&self, selector: &Selector) -> Result<ElementState, DriverError> {
        let s = &self.selectors;
        let mut state = self.state.lock().unwrap();
        if state.advance_due {
            state.advance_due = false;
            Self::advance(&mut state);
        }
        let active = state.current.is_some();

        let result = if selector == &s.name_input {
            visible(state.name_form_visible && !state.joined)
        } else if selector == &s.join_button {
            visible(state.name_form_visible && !state.joined)
        } else if selector == &s.leaderboard {
            visible(state.leaderboard_visible)
        } else if selector == &s.question_title {
            visible(state.current.as_ref().map_or(false, |q| !q.title_hidden))
        } else if selector == &s.send_button || selector == &s.submit_button || selector == &s.answer_labels {
            visible(active)
        } else if let Selector::CssWithLabel { label, .. } = selector {
            visible(
                state
                    .current
                    .as_ref()
                    .map_or(false, |q| !q.radios_missing && q.choices.contains(label)),
            )
        } else {
            ElementState::Absent
        };
        Ok(result)
    }

    async fn text(&self, selector: &Selector) -> Result<Option<String>, DriverError> {
        let state = self.state.lock().unwrap();
        if selector == &self.selectors.question_title {
            // 页面上的文本带空白
            return Ok(state.current.as_ref().map(|q| format!("  {}\n", q.prompt)));
        }
        if selector == &self.selectors.question_counter {
            return Ok(state.counter.clone());
        }
        Ok(None)
    }

    async fn all_texts(&self, selector: &Selector) -> Result<Vec<String>, DriverError> {
        let state = self.state.lock().unwrap();
        if selector == &self.selectors.answer_labels {
            return Ok(state.current.as_ref().map(|q| q.choices.clone()).unwrap_or_default());
        }
        Ok(Vec::new())
    }

    async fn click(&self, selector: &Selector) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.actions.push(Action::Click(selector.to_string()));

        if selector == &self.selectors.join_button {
            state.joined = true;
            Self::advance(&mut state);
        } else if selector == &self.selectors.submit_button {
            let Some(choice) = state.selected.clone() else {
                return Err(DriverError::ElementMissing {
                    selector: "checked radio".to_string(),
                });
            };
            state.submitted.push(choice);
            if !state.reject_submissions {
                state.current = None;
                state.advance_due = true;
            }
        } else if let Selector::CssWithLabel { label, .. } = selector {
            state.selected = Some(label.clone());
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<(), DriverError> {
        self.state
            .lock()
            .unwrap()
            .actions
            .push(Action::Fill(selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            state.actions.push(Action::Close);
            state.closed = true;
            state.hang_on_close
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}

/// 按顺序返回预设回复的模型，`None` 表示调用失败
pub struct ScriptedModel {
    name: String,
    replies: Mutex<VecDeque<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedModel {
    pub fn new(name: &str, replies: &[Option<&str>]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = Self {
            name: name.to_string(),
            replies: Mutex::new(replies.iter().map(|r| r.map(str::to_string)).collect()),
            calls: calls.clone(),
        };
        (model, calls)
    }

    /// 每次都失败的模型
    pub fn failing(name: &str) -> (Self, Arc<AtomicUsize>) {
        Self::new(name, &[])
    }
}

#[async_trait]
impl AnswerModel for ScriptedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .ok_or_else(|| ModelError::EmptyContent {
                model: self.name.clone(),
            })
    }
}

/// 只有一个模型的答案服务
pub fn oracle_answering(replies: &[Option<&str>]) -> (AnswerOracle, Arc<AtomicUsize>) {
    let (model, calls) = ScriptedModel::new("primary", replies);
    let oracle = AnswerOracle::new(vec![Box::new(model)], 2, 0.0).unwrap();
    (oracle, calls)
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// 记录所有事件
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<QuizEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<QuizEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl QuizObserver for RecordingObserver {
    fn on_event(&self, event: &QuizEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// 测试用轮询参数（配合暂停的时钟使用）
pub fn test_settings() -> LoopSettings {
    LoopSettings {
        poll_interval: Duration::from_secs(1),
        question_wait: Duration::from_secs(120),
        element_wait: Duration::from_secs(5),
        max_ticks: 1_000,
        max_stuck_ticks: 3,
        trust_question_counter: true,
    }
}

pub fn france() -> FakeQuestion {
    FakeQuestion::new("What is the capital of France?", &["Berlin", "Madrid", "Paris", "Rome"])
}

pub fn fruit() -> FakeQuestion {
    FakeQuestion::new("Which of these is a fruit?", &["Avocado", "Lemon"])
}
