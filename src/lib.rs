//! # Lesson Clicker
//!
//! 自动点完 replit "100 Days of Python" 全部课程的小工具
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - `Session` 能力接口与轮询等待 `Waiter`
//! - `browser/` - Chrome（chromiumoxide）与 Firefox（fantoccini）两种实现
//!
//! ### ② 数据层（Models）
//! - `models/` - 页面区域选择器、页面脚本、停止条件
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - `LessonAdvancer`：开始 → 标记完成 → 返回主页
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/` - 选择浏览器、弹窗后重启、输出统计
//!
//! ## 模块结构

pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::{Cli, Driver};
pub use config::Config;
pub use error::{ClickerError, ClickerResult, SessionError, SessionResult};
pub use infrastructure::{Session, Waiter};
pub use models::{Script, Selector, StopCondition};
pub use orchestrator::{run_clicker, App, RunSummary};
pub use workflow::{AdvanceReport, LessonAdvancer};
