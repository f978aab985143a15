use std::path::PathBuf;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 课程主页地址
    pub hub_url: String,
    /// 耐心等待的超时（页面加载慢时也要等得住）
    pub patient_timeout: Duration,
    /// 短超时，仅用于快速判断"课程已开始"
    pub short_timeout: Duration,
    /// 轮询间隔
    pub poll_interval: Duration,
    /// Chrome 可执行文件路径，为空时由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    /// geckodriver 地址
    pub webdriver_url: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hub_url: "https://replit.com/learn/100-days-of-python/hub".to_string(),
            patient_timeout: Duration::from_secs(1000),
            short_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(500),
            chrome_executable: None,
            webdriver_url: "http://localhost:4444".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            hub_url: std::env::var("HUB_URL").unwrap_or(default.hub_url),
            patient_timeout: env_parse("PATIENT_TIMEOUT_SECS").map(Duration::from_secs).unwrap_or(default.patient_timeout),
            short_timeout: env_parse("SHORT_TIMEOUT_SECS").map(Duration::from_secs).unwrap_or(default.short_timeout),
            poll_interval: env_parse("POLL_INTERVAL_MS").map(Duration::from_millis).unwrap_or(default.poll_interval),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from).or(default.chrome_executable),
            webdriver_url: std::env::var("WEBDRIVER_URL").unwrap_or(default.webdriver_url),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }
}

fn env_parse(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
