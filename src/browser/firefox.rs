//! Firefox 会话（fantoccini / WebDriver）
//!
//! 需要先启动 geckodriver，地址由 `WEBDRIVER_URL` 指定

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{SessionError, SessionResult};
use crate::infrastructure::Session;

/// 脚本返回的节点会被打上这个属性，再按属性查找
const HANDLE_ATTRIBUTE: &str = "data-lesson-clicker-handle";

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Firefox 启动参数
#[derive(Debug, Clone, Default)]
pub struct FirefoxOptions {
    /// 配置目录
    pub profile_directory: Option<PathBuf>,
}

/// Firefox 会话
pub struct FirefoxSession {
    client: Client,
}

impl FirefoxSession {
    /// 通过 geckodriver 启动 Firefox
    pub async fn launch(options: &FirefoxOptions, config: &Config) -> Result<Self> {
        info!("🚀 通过 {} 启动 Firefox...", config.webdriver_url);

        let client = ClientBuilder::native()
            .capabilities(capabilities(options))
            .connect(&config.webdriver_url)
            .await
            .with_context(|| format!("无法连接 WebDriver: {}", config.webdriver_url))?;
        debug!("Firefox 会话已建立");

        Ok(Self { client })
    }
}

/// WebDriver 能力声明
///
/// 弹窗按 "accept and notify" 处理：接受后在下一条命令上报 unexpected alert open
fn capabilities(options: &FirefoxOptions) -> serde_json::Map<String, JsonValue> {
    let mut firefox_options = serde_json::Map::new();
    if let Some(profile) = &options.profile_directory {
        firefox_options.insert(
            "args".to_string(),
            json!(["-profile", profile.to_string_lossy()]),
        );
    }

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".to_string(), json!("firefox"));
    caps.insert("unhandledPromptBehavior".to_string(), json!("accept and notify"));
    caps.insert("moz:firefoxOptions".to_string(), JsonValue::Object(firefox_options));
    caps
}

#[async_trait]
impl Session for FirefoxSession {
    type Element = Element;

    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.client.goto(url).await.map_err(map_cmd_error)
    }

    async fn current_url(&mut self) -> SessionResult<String> {
        let url = self.client.current_url().await.map_err(map_cmd_error)?;
        Ok(url.to_string())
    }

    async fn find_element(&mut self, selector: &str) -> SessionResult<Option<Element>> {
        match self.client.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if is_no_such_element(&e) => Ok(None),
            Err(e) => Err(map_cmd_error(e)),
        }
    }

    async fn find_within(&mut self, parent: &Element, selector: &str) -> SessionResult<Option<Element>> {
        match parent.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(element)),
            Err(e) if is_no_such_element(&e) => Ok(None),
            Err(e) => Err(map_cmd_error(e)),
        }
    }

    async fn click(&mut self, element: &Element) -> SessionResult<()> {
        element.click().await.map_err(map_cmd_error)
    }

    async fn text(&mut self, element: &Element) -> SessionResult<String> {
        element.text().await.map_err(map_cmd_error)
    }

    async fn is_displayed(&mut self, element: &Element) -> SessionResult<bool> {
        element.is_displayed().await.map_err(map_cmd_error)
    }

    async fn is_enabled(&mut self, element: &Element) -> SessionResult<bool> {
        element.is_enabled().await.map_err(map_cmd_error)
    }

    async fn evaluate(&mut self, expression: &str) -> SessionResult<JsonValue> {
        self.client
            .execute(&format!("return {};", expression), Vec::new())
            .await
            .map_err(map_cmd_error)
    }

    async fn evaluate_for_element(&mut self, expression: &str) -> SessionResult<Option<Element>> {
        let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed).to_string();
        let script = format!(
            r#"const node = {expression};
            if (!node) {{
                return false;
            }}
            node.setAttribute({attribute}, {handle});
            return true;"#,
            expression = expression,
            attribute = json!(HANDLE_ATTRIBUTE),
            handle = json!(handle),
        );

        let tagged = self.evaluate_statements(&script).await?;
        if !tagged.as_bool().unwrap_or(false) {
            return Ok(None);
        }

        let selector = format!(r#"[{}="{}"]"#, HANDLE_ATTRIBUTE, handle);
        self.find_element(&selector).await
    }

    async fn call_on(&mut self, element: &Element, function: &str) -> SessionResult<JsonValue> {
        let argument =
            serde_json::to_value(element).map_err(|e| SessionError::Protocol(e.to_string()))?;
        self.client
            .execute(
                &format!("return ({}).call(arguments[0]);", function),
                vec![argument],
            )
            .await
            .map_err(map_cmd_error)
    }
}

impl FirefoxSession {
    async fn evaluate_statements(&mut self, script: &str) -> SessionResult<JsonValue> {
        self.client
            .execute(script, Vec::new())
            .await
            .map_err(map_cmd_error)
    }
}

fn is_no_such_element(err: &CmdError) -> bool {
    matches!(err, CmdError::Standard(e) if matches!(e.error, ErrorStatus::NoSuchElement))
}

fn map_cmd_error(err: CmdError) -> SessionError {
    match err {
        CmdError::Standard(e) if matches!(e.error, ErrorStatus::NoSuchElement) => {
            SessionError::NoSuchElement {
                selector: e.to_string(),
            }
        }
        CmdError::Standard(e) if matches!(e.error, ErrorStatus::StaleElementReference) => {
            SessionError::StaleElement
        }
        CmdError::Standard(e) if matches!(e.error, ErrorStatus::UnexpectedAlertOpen) => {
            SessionError::UnexpectedAlert {
                message: e.to_string(),
            }
        }
        CmdError::Standard(e) if matches!(e.error, ErrorStatus::JavascriptError) => {
            SessionError::Script(e.to_string())
        }
        other => SessionError::Protocol(other.to_string()),
    }
}
