//! 命令行参数（clap derive）

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

/// 自动点完 replit "100 Days of Python" 的全部课程
#[derive(Parser, Debug, Serialize)]
#[command(name = "lesson_clicker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 仅打印解析后的参数（调试用）
    #[arg(short = 'r', long, overrides_with = "no_dry_run")]
    pub dry_run: bool,

    /// 关闭 --dry-run
    #[arg(long, overrides_with = "dry_run", hide = true)]
    #[serde(skip)]
    pub no_dry_run: bool,

    /// 停在第几课，默认一直运行到第 100 课完成
    #[arg(short, long, allow_negative_numbers = true)]
    pub stop_at: Option<i32>,

    /// 使用的浏览器
    #[command(subcommand)]
    pub driver: Option<Driver>,
}

/// 浏览器类型
#[derive(Subcommand, Debug, Clone, Serialize)]
#[serde(tag = "driver", rename_all = "lowercase")]
pub enum Driver {
    /// 使用 Chrome
    #[command(visible_alias = "c")]
    Chrome {
        /// 用户数据目录
        #[arg(short = 'd', long)]
        user_data_directory: Option<PathBuf>,

        /// 配置目录（USER_DATA_DIRECTORY 的子目录）
        #[arg(short = 'p', long)]
        profile_directory: Option<PathBuf>,
    },

    /// 使用 Firefox
    #[command(visible_alias = "f")]
    Firefox {
        /// 配置目录
        #[arg(short = 'p', long)]
        profile_directory: Option<PathBuf>,
    },
}

impl Driver {
    /// 浏览器名称（别名统一为全名）
    pub fn name(&self) -> &'static str {
        match self {
            Driver::Chrome { .. } => "chrome",
            Driver::Firefox { .. } => "firefox",
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::Chrome {
            user_data_directory: None,
            profile_directory: None,
        }
    }
}

impl Cli {
    /// 未指定子命令时使用 Chrome
    pub fn driver(&self) -> Driver {
        self.driver.clone().unwrap_or_default()
    }

    /// 是否为试运行
    pub fn is_dry_run(&self) -> bool {
        self.dry_run && !self.no_dry_run
    }
}
