//! 条件等待
//!
//! 以固定间隔轮询会话，直到条件满足或超时

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{ClickerError, ClickerResult, SessionError};
use crate::infrastructure::session::Session;
use crate::models::Selector;

/// 等待的条件
enum Expect<'a, E> {
    /// 区域对应的元素出现且可见
    Visible(Selector),
    /// 元素可见且可用
    Clickable(&'a E),
    /// 元素不可见或已脱离文档
    Invisible(&'a E),
}

impl<E> Expect<'_, E> {
    fn describe(&self) -> String {
        match self {
            Expect::Visible(region) => format!("等待 {} 可见", region),
            Expect::Clickable(_) => "等待元素可点击".to_string(),
            Expect::Invisible(_) => "等待元素消失".to_string(),
        }
    }
}

/// 轮询等待器
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 等待区域对应的元素可见，返回该元素
    pub async fn visible<S: Session>(&self, session: &mut S, region: Selector) -> ClickerResult<S::Element> {
        self.until(session, Expect::Visible(region)).await
    }

    /// 等待元素可点击
    pub async fn clickable<S: Session>(&self, session: &mut S, element: &S::Element) -> ClickerResult<()> {
        self.until(session, Expect::Clickable(element)).await.map(|_| ())
    }

    /// 等待元素消失
    pub async fn invisible<S: Session>(&self, session: &mut S, element: &S::Element) -> ClickerResult<()> {
        self.until(session, Expect::Invisible(element)).await.map(|_| ())
    }

    async fn until<S: Session>(
        &self,
        session: &mut S,
        expect: Expect<'_, S::Element>,
    ) -> ClickerResult<S::Element> {
        let deadline = Instant::now() + self.timeout;

        loop {
            if let Some(element) = check(session, &expect).await? {
                return Ok(element);
            }

            if Instant::now() >= deadline {
                debug!("{} 超时 ({:?})", expect.describe(), self.timeout);
                return Err(ClickerError::TimeoutExceeded {
                    condition: expect.describe(),
                    timeout: self.timeout,
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}

/// 检查一次条件，满足时返回相关元素
///
/// 页面跳转期间的瞬时错误（句柄失效、执行上下文销毁）视为"尚未满足"
async fn check<S: Session>(
    session: &mut S,
    expect: &Expect<'_, S::Element>,
) -> ClickerResult<Option<S::Element>> {
    match expect {
        Expect::Visible(region) => {
            let element = match session.find_element(region.css()).await {
                Ok(Some(element)) => element,
                Ok(None) => return Ok(None),
                Err(e) if e.is_transient() => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            match session.is_displayed(&element).await {
                Ok(true) => Ok(Some(element)),
                Ok(false) => {
                    release(session, &element).await?;
                    Ok(None)
                }
                Err(e) if e.is_transient() => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
        Expect::Clickable(element) => {
            let ready = session.is_displayed(element).await? && session.is_enabled(element).await?;
            Ok(ready.then(|| (*element).clone()))
        }
        Expect::Invisible(element) => match session.is_displayed(element).await {
            Ok(false) | Err(SessionError::StaleElement) => Ok(Some((*element).clone())),
            Ok(true) | Err(SessionError::ContextDestroyed(_)) => Ok(None),
            Err(e) => Err(e.into()),
        },
    }
}

/// 释放没用上的句柄，句柄本身已失效时忽略
async fn release<S: Session>(session: &mut S, element: &S::Element) -> ClickerResult<()> {
    match session.release(element).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_transient() => Ok(()),
        Err(e) => Err(e.into()),
    }
}
