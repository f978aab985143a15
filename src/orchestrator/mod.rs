//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 选择浏览器并启动会话（唯一持有 Browser / Client 的地方）
//! - 打印启动信息和最终统计
//!
//! ### `runner` - 推进器外层
//! - 运行 `LessonAdvancer`
//! - 遇到"未保存的更改"弹窗时从主页重新开始
//!
//! ## 层次关系
//!
//! ```text
//! app (选择浏览器)
//!     ↓
//! runner (弹窗重启)
//!     ↓
//! workflow::LessonAdvancer (逐课推进)
//!     ↓
//! infrastructure (Session / Waiter)
//! ```

pub mod app;
pub mod runner;

pub use app::App;
pub use runner::{run_clicker, RunSummary};
