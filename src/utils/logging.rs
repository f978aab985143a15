/// 日志工具模块
///
/// 初始化 tracing 输出，以及启动/结束时的统计打印
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::StopCondition;
use crate::orchestrator::RunSummary;

/// 初始化日志输出
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info 级别。
/// 重复调用不会报错（测试里会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `driver`: 浏览器类型
/// - `stop`: 停止条件
pub fn log_startup(driver: &str, stop: StopCondition) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🌐 浏览器: {}", driver);
    info!("🛑 停止条件: {}", stop);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 完成课程: {}", summary.lessons_completed);
    info!("🔁 课程已开始重试: {}", summary.already_started_retries);
    info!("⚠️ 弹窗重启次数: {}", summary.restarts);
    if let Some(text) = &summary.last_button_text {
        info!("🏁 最后按钮文本: {}", truncate_text(text, 60));
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
