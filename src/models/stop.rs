use crate::error::ClickerResult;
use crate::utils::text::{lesson_number, normalize};

/// 全部完成时开始按钮的文本（规范化后）
pub const COMPLETION_SENTINEL: &str = "completed day 100";

/// 停止条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// 一直运行到第 100 课标记完成
    UntilCourseCompleted,
    /// 课程编号达到阈值时停止
    AtLesson(i64),
}

impl StopCondition {
    /// 根据命令行的 `--stop-at` 构造
    pub fn from_stop_at(stop_at: Option<i32>) -> Self {
        match stop_at {
            Some(n) => StopCondition::AtLesson(i64::from(n)),
            None => StopCondition::UntilCourseCompleted,
        }
    }

    /// 根据开始按钮文本判断是否应停止
    pub fn reached(self, button_text: &str) -> ClickerResult<bool> {
        match self {
            StopCondition::UntilCourseCompleted => Ok(normalize(button_text) == COMPLETION_SENTINEL),
            StopCondition::AtLesson(threshold) => {
                Ok(i64::from(lesson_number(button_text)?) >= threshold)
            }
        }
    }
}

impl std::fmt::Display for StopCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopCondition::UntilCourseCompleted => write!(f, "全部 100 课完成"),
            StopCondition::AtLesson(n) => write!(f, "到达第 {} 课", n),
        }
    }
}
