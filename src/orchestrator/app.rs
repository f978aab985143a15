//! 应用入口 - 编排层
//!
//! 根据命令行选择浏览器，启动会话后交给推进器

use anyhow::{Context, Result};
use tracing::info;

use crate::browser::{ChromeOptions, ChromiumSession, FirefoxOptions, FirefoxSession};
use crate::cli::{Cli, Driver};
use crate::config::Config;
use crate::infrastructure::Session;
use crate::models::StopCondition;
use crate::orchestrator::runner::{run_clicker, RunSummary};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    driver: Driver,
    stop: StopCondition,
}

impl App {
    /// 初始化应用
    pub fn initialize(cli: &Cli, config: Config) -> Self {
        let driver = cli.driver();
        let stop = StopCondition::from_stop_at(cli.stop_at);
        logging::log_startup(driver.name(), stop);

        Self {
            config,
            driver,
            stop,
        }
    }

    /// 启动浏览器并运行
    pub async fn run(&self) -> Result<RunSummary> {
        let summary = match &self.driver {
            Driver::Chrome {
                user_data_directory,
                profile_directory,
            } => {
                let options = ChromeOptions {
                    user_data_directory: user_data_directory.clone(),
                    profile_directory: profile_directory.clone(),
                };
                let mut session = ChromiumSession::launch(&options, &self.config).await?;
                self.drive(&mut session).await?
            }
            Driver::Firefox { profile_directory } => {
                let options = FirefoxOptions {
                    profile_directory: profile_directory.clone(),
                };
                let mut session = FirefoxSession::launch(&options, &self.config).await?;
                self.drive(&mut session).await?
            }
        };

        logging::print_final_stats(&summary);
        Ok(summary)
    }

    async fn drive<S: Session>(&self, session: &mut S) -> Result<RunSummary> {
        info!("▶️ 开始推进课程");
        run_clicker(session, self.stop, &self.config)
            .await
            .context("课程推进失败")
    }
}
