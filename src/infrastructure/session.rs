//! 浏览器会话 - 基础设施层
//!
//! 流程层只依赖这里暴露的能力，不关心背后是 CDP 还是 WebDriver

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{SessionError, SessionResult};

/// 浏览器会话能力
///
/// 职责：
/// - 导航、查找元素、点击、读取文本与可见性
/// - 执行页面脚本（脚本内容由调用方提供）
/// - 浏览器级弹窗统一报告为 [`SessionError::UnexpectedAlert`]
#[async_trait]
pub trait Session: Send {
    /// 元素句柄，页面跳转后可能失效
    type Element: Clone + Send + Sync;

    async fn navigate(&mut self, url: &str) -> SessionResult<()>;

    async fn current_url(&mut self) -> SessionResult<String>;

    /// 查找元素，找不到时返回 `None`
    async fn find_element(&mut self, selector: &str) -> SessionResult<Option<Self::Element>>;

    /// 在父元素内查找
    async fn find_within(
        &mut self,
        parent: &Self::Element,
        selector: &str,
    ) -> SessionResult<Option<Self::Element>>;

    async fn click(&mut self, element: &Self::Element) -> SessionResult<()>;

    /// 元素的可见文本
    async fn text(&mut self, element: &Self::Element) -> SessionResult<String>;

    async fn is_displayed(&mut self, element: &Self::Element) -> SessionResult<bool>;

    async fn is_enabled(&mut self, element: &Self::Element) -> SessionResult<bool>;

    /// 执行表达式并返回 JSON 结果
    async fn evaluate(&mut self, expression: &str) -> SessionResult<JsonValue>;

    /// 执行返回 DOM 节点的表达式
    async fn evaluate_for_element(&mut self, expression: &str) -> SessionResult<Option<Self::Element>>;

    /// 以元素为 `this` 调用函数声明
    async fn call_on(&mut self, element: &Self::Element, function: &str) -> SessionResult<JsonValue>;

    /// 释放单个元素句柄
    async fn release(&mut self, _element: &Self::Element) -> SessionResult<()> {
        Ok(())
    }

    /// 释放此前取得的全部元素句柄
    async fn release_all(&mut self) -> SessionResult<()> {
        Ok(())
    }

    /// 查找元素，找不到时报错
    async fn require_element(&mut self, selector: &str) -> SessionResult<Self::Element> {
        self.find_element(selector)
            .await?
            .ok_or_else(|| SessionError::NoSuchElement {
                selector: selector.to_string(),
            })
    }
}
