//! Chrome 会话（chromiumoxide / CDP）
//!
//! 元素以 CDP 远程对象句柄表示，所有元素操作都通过 `Runtime.callFunctionOn` 完成

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    EventJavascriptDialogOpening, HandleJavaScriptDialogParams,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    CallFunctionOnParams, CallFunctionOnReturns, EvaluateParams, EvaluateReturns,
    ReleaseObjectGroupParams, ReleaseObjectParams, RemoteObjectId,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value as JsonValue;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{SessionError, SessionResult};
use crate::infrastructure::Session;
use crate::models::ui::js_string;

/// 所有元素句柄都建在这个对象组里，每轮统一释放
const OBJECT_GROUP: &str = "lesson-clicker";

/// 页面跳转时 CDP 报告的错误
const CONTEXT_DESTROYED: [&str; 3] = [
    "Execution context was destroyed",
    "Cannot find default execution context",
    "Inspected target navigated or closed",
];

/// 远程对象已不存在时 CDP 报告的错误
const OBJECT_GONE: [&str; 2] = [
    "Could not find object with given id",
    "Cannot find context with specified id",
];

const IS_DISPLAYED: &str = r#"function () {
    if (!this.isConnected) {
        return false;
    }
    const style = window.getComputedStyle(this);
    if (style.display === 'none' || style.visibility === 'hidden' || style.opacity === '0') {
        return false;
    }
    const rect = this.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
}"#;

const IS_ENABLED: &str = "function () { return !this.disabled; }";

const INNER_TEXT: &str = "function () { return this.innerText; }";

const CLICK: &str = r#"function () {
    this.scrollIntoView({ block: 'center' });
    this.click();
}"#;

/// Chrome 启动参数
#[derive(Debug, Clone, Default)]
pub struct ChromeOptions {
    /// 用户数据目录
    pub user_data_directory: Option<PathBuf>,
    /// 用户数据目录下的配置目录
    pub profile_directory: Option<PathBuf>,
}

/// CDP 远程对象句柄
#[derive(Debug, Clone)]
pub struct ChromiumElement {
    object_id: RemoteObjectId,
}

/// Chrome 会话
///
/// 唯一持有 Browser 和 Page
pub struct ChromiumSession {
    _browser: Browser,
    page: Page,
    dialogs: watch::Receiver<Option<String>>,
}

impl ChromiumSession {
    /// 启动 Chrome 并打开空白页
    pub async fn launch(options: &ChromeOptions, config: &Config) -> Result<Self> {
        info!("🚀 启动 Chrome...");
        debug!("Chrome 参数: {:?}", options);

        let mut builder = BrowserConfig::builder()
            .with_head()
            .no_sandbox()
            .request_timeout(Duration::from_secs(120));

        if let Some(dir) = &options.user_data_directory {
            builder = builder.user_data_dir(dir);
        }
        if let Some(profile) = &options.profile_directory {
            builder = builder.arg(format!("--profile-directory={}", profile.display()));
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(|e| {
            error!("配置 Chrome 失败: {}", e);
            anyhow::anyhow!("配置 Chrome 失败: {}", e)
        })?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("启动 Chrome 失败")?;
        debug!("Chrome 启动成功");

        // 在后台处理浏览器事件
        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = browser
            .new_page("about:blank")
            .await
            .context("创建页面失败")?;

        let dialogs = watch_dialogs(&page).await?;

        Ok(Self {
            _browser: browser,
            page,
            dialogs,
        })
    }

    async fn evaluate_raw(&mut self, expression: &str, by_value: bool) -> SessionResult<EvaluateReturns> {
        let params = EvaluateParams::builder()
            .expression(expression)
            .return_by_value(by_value)
            .await_promise(true)
            .object_group(OBJECT_GROUP)
            .build()
            .map_err(SessionError::Protocol)?;

        let returns = guarded(&mut self.dialogs, self.page.execute(params))
            .await?
            .map_err(protocol_error)?
            .result;

        if let Some(details) = &returns.exception_details {
            let message = details
                .exception
                .as_ref()
                .and_then(|e| e.description.clone())
                .unwrap_or_else(|| details.text.clone());
            return Err(SessionError::Script(message));
        }
        Ok(returns)
    }

    /// 以元素为 `this` 调用函数，远程对象失效时返回 [`SessionError::StaleElement`]
    async fn call_function(
        &mut self,
        element: &ChromiumElement,
        function: &str,
        by_value: bool,
    ) -> SessionResult<CallFunctionOnReturns> {
        let params = CallFunctionOnParams::builder()
            .function_declaration(function)
            .object_id(element.object_id.clone())
            .return_by_value(by_value)
            .await_promise(true)
            .object_group(OBJECT_GROUP)
            .build()
            .map_err(SessionError::Protocol)?;

        let returns = guarded(&mut self.dialogs, self.page.execute(params))
            .await?
            .map_err(protocol_error)?
            .result;

        if let Some(details) = &returns.exception_details {
            return Err(SessionError::Script(details.text.clone()));
        }
        Ok(returns)
    }
}

#[async_trait]
impl Session for ChromiumSession {
    type Element = ChromiumElement;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        guarded(&mut self.dialogs, self.page.goto(url))
            .await?
            .map_err(protocol_error)?;
        Ok(())
    }

    async fn current_url(&mut self) -> SessionResult<String> {
        let url = guarded(&mut self.dialogs, self.page.url())
            .await?
            .map_err(protocol_error)?;
        Ok(url.unwrap_or_default())
    }

    async fn find_element(&mut self, selector: &str) -> SessionResult<Option<ChromiumElement>> {
        let expression = format!("document.querySelector({})", js_string(selector));
        self.evaluate_for_element(&expression).await
    }

    async fn find_within(
        &mut self,
        parent: &ChromiumElement,
        selector: &str,
    ) -> SessionResult<Option<ChromiumElement>> {
        let function = format!(
            "function () {{ return this.querySelector({}); }}",
            js_string(selector)
        );
        let returns = self.call_function(parent, &function, false).await?;
        Ok(returns
            .result
            .object_id
            .map(|object_id| ChromiumElement { object_id }))
    }

    async fn click(&mut self, element: &ChromiumElement) -> SessionResult<()> {
        self.call_function(element, CLICK, true).await?;
        Ok(())
    }

    async fn text(&mut self, element: &ChromiumElement) -> SessionResult<String> {
        let returns = self.call_function(element, INNER_TEXT, true).await?;
        Ok(returns
            .result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn is_displayed(&mut self, element: &ChromiumElement) -> SessionResult<bool> {
        let returns = self.call_function(element, IS_DISPLAYED, true).await?;
        Ok(returns.result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn is_enabled(&mut self, element: &ChromiumElement) -> SessionResult<bool> {
        let returns = self.call_function(element, IS_ENABLED, true).await?;
        Ok(returns.result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn evaluate(&mut self, expression: &str) -> SessionResult<JsonValue> {
        let returns = self.evaluate_raw(expression, true).await?;
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }

    async fn evaluate_for_element(&mut self, expression: &str) -> SessionResult<Option<ChromiumElement>> {
        // null / undefined 不会带 object_id
        let returns = self.evaluate_raw(expression, false).await?;
        Ok(returns
            .result
            .object_id
            .map(|object_id| ChromiumElement { object_id }))
    }

    async fn call_on(&mut self, element: &ChromiumElement, function: &str) -> SessionResult<JsonValue> {
        let returns = self.call_function(element, function, true).await?;
        Ok(returns.result.value.unwrap_or(JsonValue::Null))
    }

    async fn release(&mut self, element: &ChromiumElement) -> SessionResult<()> {
        let params = ReleaseObjectParams::new(element.object_id.clone());
        guarded(&mut self.dialogs, self.page.execute(params))
            .await?
            .map_err(protocol_error)?;
        Ok(())
    }

    async fn release_all(&mut self) -> SessionResult<()> {
        let params = ReleaseObjectGroupParams::new(OBJECT_GROUP);
        guarded(&mut self.dialogs, self.page.execute(params))
            .await?
            .map_err(protocol_error)?;
        debug!("已释放对象组 {}", OBJECT_GROUP);
        Ok(())
    }
}

/// 监听页面对话框：自动接受，并通知正在执行的命令
async fn watch_dialogs(page: &Page) -> Result<watch::Receiver<Option<String>>> {
    let mut events = page
        .event_listener::<EventJavascriptDialogOpening>()
        .await
        .context("监听对话框事件失败")?;
    let (tx, rx) = watch::channel(None);
    let page = page.clone();

    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            warn!("⚠️ 页面弹出对话框 ({:?}): {}", event.r#type, event.message);
            if let Err(e) = page.execute(HandleJavaScriptDialogParams::new(true)).await {
                error!("关闭对话框失败: {}", e);
            }
            if tx.send(Some(event.message.clone())).is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// 执行 CDP 命令；期间弹出对话框时优先报告对话框
async fn guarded<T>(
    dialogs: &mut watch::Receiver<Option<String>>,
    command: impl Future<Output = Result<T, CdpError>>,
) -> SessionResult<Result<T, CdpError>> {
    if dialogs.has_changed().unwrap_or(false) {
        return Err(take_dialog(dialogs));
    }

    let outcome = tokio::select! {
        res = command => Some(res),
        Ok(()) = dialogs.changed() => None,
    };

    match outcome {
        Some(res) => Ok(res),
        None => Err(take_dialog(dialogs)),
    }
}

fn take_dialog(dialogs: &mut watch::Receiver<Option<String>>) -> SessionError {
    let message = dialogs.borrow_and_update().clone().unwrap_or_default();
    SessionError::UnexpectedAlert { message }
}

fn protocol_error(err: CdpError) -> SessionError {
    classify(err.to_string())
}

/// 按 CDP 错误信息归类：页面跳转、句柄失效，其余都是协议错误
fn classify(message: String) -> SessionError {
    if CONTEXT_DESTROYED.iter().any(|m| message.contains(m)) {
        SessionError::ContextDestroyed(message)
    } else if OBJECT_GONE.iter().any(|m| message.contains(m)) {
        SessionError::StaleElement
    } else {
        SessionError::Protocol(message)
    }
}
