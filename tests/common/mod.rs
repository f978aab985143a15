//! 测试用的内存会话
//!
//! 模拟课程主页、课程 IDE 和完成对话框之间的跳转

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use lesson_clicker::{Config, Script, Selector, Session, SessionError, SessionResult};
use serde_json::{json, Value as JsonValue};

pub const HUB_URL: &str = "https://replit.test/learn/100-days-of-python/hub";

/// 测试配置：超时都很短
pub fn test_config() -> Config {
    Config {
        hub_url: HUB_URL.to_string(),
        patient_timeout: Duration::from_millis(100),
        short_timeout: Duration::from_millis(20),
        poll_interval: Duration::from_millis(1),
        ..Config::default()
    }
}

/// 按钮文本序列: "Day 1" ... "Day n"，最后是 "Completed Day 100"
pub fn course_texts(lessons: usize) -> Vec<String> {
    let mut texts: Vec<String> = (1..=lessons).map(|n| format!("Day {}", n)).collect();
    texts.push("Completed Day 100".to_string());
    texts
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockElement {
    /// 开始按钮，带主页加载代数
    StartButton(u64),
    Sidebar,
    CloseSidebar,
    TutorialPanel,
    /// 0 = "Show tutorial", 1 = "Mark lesson as completed"
    HeaderButton(u8),
    Dialog,
    BackLink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Blank,
    Hub,
    Loading,
    Lesson,
    Dialog,
}

pub struct MockSession {
    texts: Vec<String>,
    position: usize,
    page: Page,
    generation: u64,

    /// 导航后实际落在的地址（模拟未登录跳转）
    pub redirect_to: Option<String>,
    /// 站点忽略开始按钮点击的次数
    pub already_started: usize,
    pub sidebar_open: bool,
    /// 关闭按钮无效
    pub sidebar_stuck: bool,
    /// 标题栏先显示 "Show tutorial"
    pub show_tutorial_first: bool,
    /// 第 n 次点击标记完成时弹出"未保存的更改"
    pub alert_on_completion: Option<usize>,
    /// 点击开始后教程面板永远不出现
    pub lesson_never_loads: bool,
    /// 接下来若干次查找因页面跳转而失败
    pub context_lost_lookups: usize,

    header_swapped: bool,
    show_tutorial_polls: usize,

    pub navigations: usize,
    pub start_clicks: usize,
    pub lessons_loaded: usize,
    pub completions: usize,
    pub sidebar_removals: usize,
    pub handle_releases: usize,
}

impl MockSession {
    pub fn new(texts: Vec<String>) -> Self {
        Self {
            texts,
            position: 0,
            page: Page::Blank,
            generation: 0,
            redirect_to: None,
            already_started: 0,
            sidebar_open: false,
            sidebar_stuck: false,
            show_tutorial_first: false,
            alert_on_completion: None,
            lesson_never_loads: false,
            context_lost_lookups: 0,
            header_swapped: false,
            show_tutorial_polls: 0,
            navigations: 0,
            start_clicks: 0,
            lessons_loaded: 0,
            completions: 0,
            sidebar_removals: 0,
            handle_releases: 0,
        }
    }

    fn current_text(&self) -> String {
        let index = self.position.min(self.texts.len().saturating_sub(1));
        self.texts.get(index).cloned().unwrap_or_default()
    }

    fn open_hub(&mut self) {
        self.page = Page::Hub;
        self.generation += 1;
    }

    fn check_start_button(&self, generation: u64) -> SessionResult<()> {
        if generation != self.generation {
            return Err(SessionError::StaleElement);
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MockSession {
    type Element = MockElement;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.navigations += 1;
        assert_eq!(url, HUB_URL);
        if self.redirect_to.is_none() {
            self.open_hub();
        }
        Ok(())
    }

    async fn current_url(&mut self) -> SessionResult<String> {
        Ok(match (&self.redirect_to, self.page) {
            (Some(url), _) => url.clone(),
            (None, Page::Blank) => "about:blank".to_string(),
            (None, _) => HUB_URL.to_string(),
        })
    }

    async fn find_element(&mut self, selector: &str) -> SessionResult<Option<MockElement>> {
        if self.context_lost_lookups > 0 {
            self.context_lost_lookups -= 1;
            return Err(SessionError::ContextDestroyed("Execution context was destroyed.".to_string()));
        }
        let page = self.page;
        let found = if selector == Selector::StartButton.css() {
            (page == Page::Hub).then_some(MockElement::StartButton(self.generation))
        } else if selector == Selector::Sidebar.css() {
            (page == Page::Hub && self.sidebar_open).then_some(MockElement::Sidebar)
        } else if selector == Selector::CloseSidebar.css() {
            (page == Page::Hub && self.sidebar_open).then_some(MockElement::CloseSidebar)
        } else if selector == Selector::TutorialPanel.css() {
            (page == Page::Lesson).then_some(MockElement::TutorialPanel)
        } else if selector == Selector::Dialog.css() {
            (page == Page::Dialog).then_some(MockElement::Dialog)
        } else {
            None
        };
        Ok(found)
    }

    async fn find_within(&mut self, parent: &MockElement, selector: &str) -> SessionResult<Option<MockElement>> {
        let found = *parent == MockElement::Dialog
            && self.page == Page::Dialog
            && selector == Selector::BackToHubLink.css();
        Ok(found.then_some(MockElement::BackLink))
    }

    async fn click(&mut self, element: &MockElement) -> SessionResult<()> {
        match element {
            MockElement::StartButton(generation) => {
                self.check_start_button(*generation)?;
                self.start_clicks += 1;
                if self.already_started > 0 {
                    self.already_started -= 1;
                } else if self.lesson_never_loads {
                    self.page = Page::Loading;
                } else {
                    self.page = Page::Lesson;
                    self.lessons_loaded += 1;
                    self.header_swapped = !self.show_tutorial_first;
                    self.show_tutorial_polls = 0;
                }
            }
            MockElement::CloseSidebar => {
                if !self.sidebar_stuck {
                    self.sidebar_open = false;
                }
            }
            MockElement::HeaderButton(0) => {
                return Err(SessionError::Protocol("点到了 Show tutorial".to_string()));
            }
            MockElement::HeaderButton(_) => {
                assert_eq!(self.page, Page::Lesson);
                if self.alert_on_completion == Some(self.completions + 1) {
                    self.alert_on_completion = None;
                    return Err(SessionError::UnexpectedAlert {
                        message: "You have unsaved changes".to_string(),
                    });
                }
                self.completions += 1;
                self.page = Page::Dialog;
            }
            MockElement::BackLink => {
                assert_eq!(self.page, Page::Dialog);
                self.position += 1;
                self.open_hub();
            }
            other => {
                return Err(SessionError::Protocol(format!("不可点击: {:?}", other)));
            }
        }
        Ok(())
    }

    async fn text(&mut self, element: &MockElement) -> SessionResult<String> {
        match element {
            MockElement::StartButton(generation) => {
                self.check_start_button(*generation)?;
                Ok(self.current_text())
            }
            MockElement::HeaderButton(0) => Ok("Show tutorial".to_string()),
            MockElement::HeaderButton(_) => Ok("Mark lesson as completed".to_string()),
            _ => Ok(String::new()),
        }
    }

    async fn is_displayed(&mut self, element: &MockElement) -> SessionResult<bool> {
        match element {
            MockElement::StartButton(generation) => {
                self.check_start_button(*generation)?;
                Ok(self.page == Page::Hub)
            }
            MockElement::Sidebar | MockElement::CloseSidebar => Ok(self.page == Page::Hub && self.sidebar_open),
            MockElement::TutorialPanel => Ok(self.page == Page::Lesson),
            MockElement::HeaderButton(0) => {
                // 第一次轮询时仍可见，之后切换为标记完成按钮
                self.show_tutorial_polls += 1;
                if self.show_tutorial_polls > 1 {
                    self.header_swapped = true;
                }
                Ok(!self.header_swapped)
            }
            MockElement::HeaderButton(_) => Ok(self.page == Page::Lesson),
            MockElement::Dialog | MockElement::BackLink => Ok(self.page == Page::Dialog),
        }
    }

    async fn is_enabled(&mut self, _element: &MockElement) -> SessionResult<bool> {
        Ok(true)
    }

    async fn evaluate(&mut self, expression: &str) -> SessionResult<JsonValue> {
        if expression == Script::RemoveSidebar.source() {
            self.sidebar_open = false;
            self.sidebar_removals += 1;
            return Ok(json!(2));
        }
        Ok(JsonValue::Null)
    }

    async fn evaluate_for_element(&mut self, expression: &str) -> SessionResult<Option<MockElement>> {
        if expression != Script::FirstHeaderButton.source() || self.page != Page::Lesson {
            return Ok(None);
        }
        Ok(Some(MockElement::HeaderButton(if self.header_swapped { 1 } else { 0 })))
    }

    async fn call_on(&mut self, element: &MockElement, function: &str) -> SessionResult<JsonValue> {
        assert_eq!(function, Script::IsShowTutorialButton.source());
        Ok(json!(*element == MockElement::HeaderButton(0)))
    }

    async fn release_all(&mut self) -> SessionResult<()> {
        self.handle_releases += 1;
        Ok(())
    }
}
