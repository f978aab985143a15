use lesson_clicker::browser::{ChromeOptions, ChromiumSession};
use lesson_clicker::utils::logging;
use lesson_clicker::{Config, LessonAdvancer, Session, StopCondition};

#[tokio::test]
#[ignore] // 默认忽略，需要本机 Chrome 且已登录：cargo test -- --ignored
async fn test_chrome_reaches_hub() {
    // 初始化日志
    logging::init(true);

    // 加载配置
    let config = Config::from_env();

    let mut session = ChromiumSession::launch(&ChromeOptions::default(), &config)
        .await
        .expect("启动 Chrome 失败");

    session.navigate(&config.hub_url).await.expect("导航失败");
    let url = session.current_url().await.expect("读取地址失败");
    println!("当前地址: {}", url);
}

#[tokio::test]
#[ignore]
async fn test_chrome_completes_first_lesson() {
    logging::init(true);

    let config = Config::from_env();

    let mut session = ChromiumSession::launch(&ChromeOptions::default(), &config)
        .await
        .expect("启动 Chrome 失败");

    let mut advancer = LessonAdvancer::new(&mut session, StopCondition::AtLesson(2), &config);
    let report = advancer.start().await.expect("推进失败");

    println!("完成 {} 课", report.lessons_completed);
}
