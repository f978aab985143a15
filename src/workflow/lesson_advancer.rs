//! 课程推进流程 - 流程层
//!
//! 核心职责：从主页开始，一课一课地"开始 → 标记完成 → 返回主页"
//!
//! 流程顺序（每一轮）：
//! 1. 读取开始按钮，判断是否应停止
//! 2. 关闭挡住按钮的侧边栏
//! 3. 点击开始按钮进入课程（按钮不消失时视为"课程已开始"，重来一轮）
//! 4. 点击标记完成
//! 5. 在完成对话框中返回主页

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ClickerError, ClickerResult, SessionError};
use crate::infrastructure::{Session, Waiter};
use crate::models::{Script, Selector, StopCondition};
use crate::utils::logging::truncate_text;
use crate::utils::text::{lesson_number, normalize};

/// 单次推进的统计
#[derive(Debug, Default, Clone)]
pub struct AdvanceReport {
    /// 标记完成的课程数
    pub lessons_completed: usize,
    /// "课程已开始"重试次数
    pub already_started_retries: usize,
    /// 停止时开始按钮的文本
    pub last_button_text: Option<String>,
}

/// 课程推进器
///
/// - 借用唯一的浏览器会话，按顺序操作
/// - 停止条件在构造时确定
/// - 每轮重新获取开始按钮（跳转后旧句柄失效）
pub struct LessonAdvancer<'s, S: Session> {
    session: &'s mut S,
    stop: StopCondition,
    hub_url: String,
    patient: Waiter,
    short: Waiter,
    report: AdvanceReport,
}

impl<'s, S: Session> LessonAdvancer<'s, S> {
    /// 创建新的推进器
    pub fn new(session: &'s mut S, stop: StopCondition, config: &Config) -> Self {
        Self {
            session,
            stop,
            hub_url: config.hub_url.clone(),
            patient: Waiter::new(config.patient_timeout, config.poll_interval),
            short: Waiter::new(config.short_timeout, config.poll_interval),
            report: AdvanceReport::default(),
        }
    }

    /// 到目前为止的统计（出错中断时也可读取）
    pub fn report(&self) -> &AdvanceReport {
        &self.report
    }

    /// 从主页开始推进，直到满足停止条件
    pub async fn start(&mut self) -> ClickerResult<AdvanceReport> {
        self.enter_hub().await?;

        loop {
            // 上一轮的句柄在主页重新渲染后都已失效
            self.session.release_all().await?;

            let start_button = self.session.require_element(Selector::StartButton.css()).await?;
            let button_text = self.session.text(&start_button).await?;
            debug!("开始按钮文本: {:?}", button_text);

            if self.stop.reached(&button_text)? {
                info!("🏁 满足停止条件 ({}): {}", self.stop, normalize(&button_text));
                self.report.last_button_text = Some(button_text);
                return Ok(self.report.clone());
            }

            let label = lesson_label(&button_text);
            info!("[{}] ▶️ 开始处理", label);

            self.dismiss_sidebar().await?;

            match self.load_lesson(&start_button).await {
                Err(ClickerError::LessonAlreadyStarted) => {
                    self.report.already_started_retries += 1;
                    warn!("[{}] ⚠️ 课程已开始，重新读取开始按钮", label);
                    continue;
                }
                other => other?,
            }

            self.mark_lesson_as_completed().await?;
            self.return_to_hub().await?;

            self.report.lessons_completed += 1;
            info!("[{}] ✓ 已标记完成 (本次共 {} 课)", label, self.report.lessons_completed);

            // 主页会重新加载
            self.patient.visible(self.session, Selector::StartButton).await?;
        }
    }

    /// 打开主页并确认确实停留在主页
    async fn enter_hub(&mut self) -> ClickerResult<()> {
        info!("🌐 正在打开课程主页: {}", self.hub_url);
        self.session.navigate(&self.hub_url).await?;

        let current_url = self.session.current_url().await?;
        if !is_under(&current_url, &self.hub_url) {
            return Err(ClickerError::CannotReachHub {
                hub_url: self.hub_url.clone(),
                current_url,
            });
        }

        self.patient.visible(self.session, Selector::StartButton).await?;
        debug!("已到达课程主页");
        Ok(())
    }

    /// 侧边栏打开时会挡住开始按钮，先关闭
    async fn dismiss_sidebar(&mut self) -> ClickerResult<()> {
        let Some(sidebar) = self.session.find_element(Selector::Sidebar.css()).await? else {
            return Ok(());
        };
        if !self.session.is_displayed(&sidebar).await? {
            return Ok(());
        }

        info!("📑 侧边栏已打开，正在关闭...");
        if let Some(close) = self.session.find_element(Selector::CloseSidebar.css()).await? {
            self.session.click(&close).await?;
            match self.patient.invisible(self.session, &sidebar).await {
                Ok(()) => {}
                Err(ClickerError::TimeoutExceeded { .. }) => {
                    debug!("侧边栏 {:?} 内未关闭", self.patient.timeout());
                }
                Err(e) => return Err(e),
            }
        }

        let still_visible = match self.session.is_displayed(&sidebar).await {
            Ok(visible) => visible,
            Err(e) if e.is_transient() => false,
            Err(e) => return Err(e.into()),
        };
        if still_visible {
            warn!("⚠️ 侧边栏关闭失败，直接移除侧边栏和遮罩层");
            let removed = self.session.evaluate(&Script::RemoveSidebar.source()).await?;
            debug!("移除节点数: {}", removed);
        }

        Ok(())
    }

    /// 点击开始按钮进入课程
    async fn load_lesson(&mut self, start_button: &S::Element) -> ClickerResult<()> {
        self.patient.clickable(self.session, start_button).await?;
        self.session.click(start_button).await?;

        match self.short.invisible(self.session, start_button).await {
            Ok(()) => {}
            Err(ClickerError::TimeoutExceeded { .. }) => return Err(ClickerError::LessonAlreadyStarted),
            Err(e) => return Err(e),
        }

        self.patient.visible(self.session, Selector::TutorialPanel).await?;
        debug!("已进入课程");
        Ok(())
    }

    /// 等待 "Show tutorial" 变成 "Mark lesson as completed" 后点击
    async fn mark_lesson_as_completed(&mut self) -> ClickerResult<()> {
        let header_button = self.first_header_button().await?;
        let is_show_tutorial = self
            .session
            .call_on(&header_button, &Script::IsShowTutorialButton.source())
            .await?
            .as_bool()
            .unwrap_or(false);

        let target = if is_show_tutorial {
            debug!("等待 Show tutorial 按钮切换为标记完成按钮");
            self.patient.invisible(self.session, &header_button).await?;
            self.first_header_button().await?
        } else {
            header_button
        };

        self.session.click(&target).await?;
        debug!("已点击标记完成");
        Ok(())
    }

    async fn first_header_button(&mut self) -> ClickerResult<S::Element> {
        let script = Script::FirstHeaderButton.source();
        let button = self.session.evaluate_for_element(&script).await?;
        button.ok_or_else(|| {
            SessionError::NoSuchElement {
                selector: format!("{} 右侧的第一个按钮", Selector::RunButton.css()),
            }
            .into()
        })
    }

    /// 等待完成对话框并点击返回主页
    async fn return_to_hub(&mut self) -> ClickerResult<()> {
        let dialog = self.patient.visible(self.session, Selector::Dialog).await?;
        let link = self
            .session
            .find_within(&dialog, Selector::BackToHubLink.css())
            .await?
            .ok_or_else(|| SessionError::NoSuchElement {
                selector: Selector::BackToHubLink.css().to_string(),
            })?;

        self.session.click(&link).await?;
        debug!("已返回主页");
        Ok(())
    }
}

/// 日志前缀：能解析出课程编号时为 "第 N 课"，否则为按钮文本
fn lesson_label(button_text: &str) -> String {
    match lesson_number(button_text) {
        Ok(number) => format!("第 {} 课", number),
        Err(_) => truncate_text(&normalize(button_text), 40),
    }
}

/// `url` 是否位于 `base` 之下（忽略末尾斜杠、查询串和锚点）
fn is_under(url: &str, base: &str) -> bool {
    let strip = |s: &str| -> String {
        let end = s.find(['?', '#']).unwrap_or(s.len());
        s[..end].trim_end_matches('/').to_string()
    };
    let url = strip(url);
    let base = strip(base);

    url == base || url.starts_with(&format!("{}/", base))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUB: &str = "https://replit.com/learn/100-days-of-python/hub";

    #[test]
    fn test_is_under_hub() {
        assert!(is_under(HUB, HUB));
        assert!(is_under(&format!("{}/", HUB), HUB));
        assert!(is_under(&format!("{}?tab=lessons#top", HUB), HUB));
        assert!(is_under(&format!("{}/day/3", HUB), HUB));
    }

    #[test]
    fn test_lesson_label() {
        assert_eq!(lesson_label("Start Day 7"), "第 7 课");
        assert_eq!(lesson_label("  Continue   Day 42 "), "第 42 课");
        assert_eq!(lesson_label("Hello world"), "hello world");
    }

    #[test]
    fn test_redirects_are_not_hub() {
        assert!(!is_under("https://replit.com/login?goto=%2Flearn", HUB));
        assert!(!is_under("https://replit.com/learn/100-days-of-python/hubba", HUB));
        assert!(!is_under("about:blank", HUB));
    }
}
