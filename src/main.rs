use anyhow::Result;
use clap::Parser;
use lesson_clicker::utils::logging;
use lesson_clicker::{App, Cli, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 参数错误时 clap 会打印用法并以非零状态退出
    let cli = Cli::parse();

    if cli.is_dry_run() {
        println!("{}", serde_json::to_string_pretty(&cli)?);
        return Ok(());
    }

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    if let Err(e) = App::initialize(&cli, config).run().await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
