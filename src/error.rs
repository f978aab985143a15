use std::time::Duration;

use thiserror::Error;

/// 问题反馈地址（页面文本格式变化时提示用户上报）
pub const ISSUE_TRACKER_URL: &str = "https://github.com/InSyncWithFoo/100doc-clicker/issues";

/// 浏览器会话层错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 按选择器找不到元素
    #[error("未找到元素: {selector}")]
    NoSuchElement { selector: String },

    /// 元素已脱离文档（页面跳转后旧句柄失效）
    #[error("元素已失效")]
    StaleElement,

    /// 页面正在跳转，执行上下文已销毁（轮询时应重试）
    #[error("页面正在跳转: {0}")]
    ContextDestroyed(String),

    /// 浏览器弹出了意外的对话框（如"未保存的更改"）
    #[error("浏览器弹出意外对话框: {message}")]
    UnexpectedAlert { message: String },

    /// 页面脚本抛出异常
    #[error("执行脚本失败: {0}")]
    Script(String),

    /// 驱动/协议层错误
    #[error("浏览器协议错误: {0}")]
    Protocol(String),
}

/// 点击流程错误
#[derive(Debug, Error)]
pub enum ClickerError {
    /// 导航后没有落在课程主页，需要先登录并报名课程
    #[error("无法进入课程主页 {hub_url} (当前地址: {current_url})，请先登录并开始该课程")]
    CannotReachHub { hub_url: String, current_url: String },

    /// 点击开始按钮后按钮迟迟不消失，站点认为课程已开始
    #[error("课程已开始，重新读取开始按钮")]
    LessonAlreadyStarted,

    /// 按钮文本中找不到课程编号
    #[error("意外的按钮文本: {text:?}。请在 {} 反馈此问题", ISSUE_TRACKER_URL)]
    UnexpectedTextFormat { text: String },

    /// 等待条件超时
    #[error("等待超时 ({timeout:?}): {condition}")]
    TimeoutExceeded { condition: String, timeout: Duration },

    /// "未保存的更改"之类的浏览器级弹窗，由最外层重启整个流程
    #[error("遇到意外弹窗: {message}")]
    UnexpectedInterstitial { message: String },

    #[error(transparent)]
    Session(SessionError),
}

impl SessionError {
    /// 轮询中可以忽略、下次再试的错误
    pub fn is_transient(&self) -> bool {
        matches!(self, SessionError::StaleElement | SessionError::ContextDestroyed(_))
    }
}

impl From<SessionError> for ClickerError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UnexpectedAlert { message } => {
                ClickerError::UnexpectedInterstitial { message }
            }
            other => ClickerError::Session(other),
        }
    }
}

/// 会话层结果类型
pub type SessionResult<T> = Result<T, SessionError>;

/// 点击流程结果类型
pub type ClickerResult<T> = Result<T, ClickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_becomes_interstitial() {
        let err: ClickerError = SessionError::UnexpectedAlert {
            message: "You have unsaved changes".to_string(),
        }
        .into();
        assert!(matches!(err, ClickerError::UnexpectedInterstitial { .. }));
    }

    #[test]
    fn test_other_session_errors_are_wrapped() {
        let err: ClickerError = SessionError::StaleElement.into();
        assert!(matches!(err, ClickerError::Session(SessionError::StaleElement)));
    }

    #[test]
    fn test_transient_errors() {
        assert!(SessionError::StaleElement.is_transient());
        assert!(SessionError::ContextDestroyed("Execution context was destroyed.".to_string()).is_transient());
        assert!(!SessionError::Protocol("Request timed out.".to_string()).is_transient());
        assert!(!SessionError::UnexpectedAlert {
            message: String::new()
        }
        .is_transient());
    }

    #[test]
    fn test_text_format_error_mentions_tracker() {
        let err = ClickerError::UnexpectedTextFormat {
            text: "Hello world".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Hello world"));
        assert!(msg.contains(ISSUE_TRACKER_URL));
    }
}
