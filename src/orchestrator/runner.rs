//! 推进器外层
//!
//! 浏览器弹出"未保存的更改"之类的对话框时，从主页重新开始整个流程

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{ClickerError, ClickerResult};
use crate::infrastructure::Session;
use crate::models::StopCondition;
use crate::workflow::{AdvanceReport, LessonAdvancer};

/// 全部运行的汇总
#[derive(Debug, Default, Clone)]
pub struct RunSummary {
    pub lessons_completed: usize,
    pub already_started_retries: usize,
    /// 因意外弹窗重启的次数
    pub restarts: usize,
    pub last_button_text: Option<String>,
}

impl RunSummary {
    fn absorb(&mut self, report: &AdvanceReport) {
        self.lessons_completed += report.lessons_completed;
        self.already_started_retries += report.already_started_retries;
    }
}

/// 运行推进器，遇到意外弹窗时以相同的停止条件重新开始
pub async fn run_clicker<S: Session>(
    session: &mut S,
    stop: StopCondition,
    config: &Config,
) -> ClickerResult<RunSummary> {
    let mut summary = RunSummary::default();

    loop {
        let mut advancer = LessonAdvancer::new(&mut *session, stop, config);
        match advancer.start().await {
            Ok(report) => {
                summary.absorb(&report);
                summary.last_button_text = report.last_button_text;
                info!("✓ 推进结束，共完成 {} 课", summary.lessons_completed);
                return Ok(summary);
            }
            Err(ClickerError::UnexpectedInterstitial { message }) => {
                summary.absorb(advancer.report());
                summary.restarts += 1;
                warn!(
                    "⚠️ 忽略意外弹窗 ({})，第 {} 次从主页重新开始",
                    message, summary.restarts
                );
            }
            Err(e) => return Err(e),
        }
    }
}
