//! 页面区域选择器与页面脚本
//!
//! 选择器和脚本都是固定常量，流程层只引用枚举值

/// 页面区域（每个区域对应唯一的 CSS 选择器）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    /// 主页上的"开始/继续课程"按钮
    StartButton,
    /// 主页侧边栏
    Sidebar,
    /// 侧边栏关闭按钮
    CloseSidebar,
    /// 侧边栏打开时的遮罩层
    Overlay,
    /// 课程内的教程面板
    TutorialPanel,
    /// 课程 IDE 的运行按钮
    RunButton,
    /// 完成课程后弹出的对话框
    Dialog,
    /// 对话框中返回主页的链接
    BackToHubLink,
}

impl Selector {
    /// 获取 CSS 选择器
    pub fn css(self) -> &'static str {
        match self {
            Selector::StartButton => r#"button[data-cy="lesson-cta"]"#,
            Selector::Sidebar => r#"div[data-cy="hub-sidebar"]"#,
            Selector::CloseSidebar => r#"button[data-cy="hub-sidebar-close"]"#,
            Selector::Overlay => r#"div[data-cy="hub-sidebar-overlay"]"#,
            Selector::TutorialPanel => r#"div[data-cy="tutorial-viewer-content"]"#,
            Selector::RunButton => r#"div[data-cy="ws-run-btn"]"#,
            Selector::Dialog => r#"div[role="dialog"]"#,
            Selector::BackToHubLink => r#"a[href*="100-days-of-python/hub"]"#,
        }
    }

    /// 区域名称（用于日志）
    pub fn name(self) -> &'static str {
        match self {
            Selector::StartButton => "开始按钮",
            Selector::Sidebar => "侧边栏",
            Selector::CloseSidebar => "侧边栏关闭按钮",
            Selector::Overlay => "遮罩层",
            Selector::TutorialPanel => "教程面板",
            Selector::RunButton => "运行按钮",
            Selector::Dialog => "完成对话框",
            Selector::BackToHubLink => "返回主页链接",
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.css())
    }
}

/// 页面脚本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// 表达式：运行按钮右侧标题栏里的第一个按钮
    /// （"Show tutorial" 或 "Mark lesson as completed"）
    FirstHeaderButton,
    /// 函数声明，`this` 为按钮：文本是否为 "show tutorial"
    IsShowTutorialButton,
    /// 表达式：强制移除侧边栏和遮罩层
    RemoveSidebar,
}

impl Script {
    /// 脚本源码
    pub fn source(self) -> String {
        match self {
            Script::FirstHeaderButton => format!(
                r#"(() => {{
                    const runButton = document.querySelector({run});
                    if (!runButton || !runButton.nextElementSibling) {{
                        return null;
                    }}
                    return runButton.nextElementSibling.children[0] || null;
                }})()"#,
                run = js_string(Selector::RunButton.css()),
            ),
            Script::IsShowTutorialButton => r#"function () {
                    const normalized = this.innerText
                        .trim().replace(/\s+/g, ' ')
                        .toLowerCase();
                    return normalized === 'show tutorial';
                }"#
            .to_string(),
            Script::RemoveSidebar => format!(
                r#"(() => {{
                    let removed = 0;
                    for (const selector of [{sidebar}, {overlay}]) {{
                        document.querySelectorAll(selector).forEach((node) => {{
                            node.remove();
                            removed += 1;
                        }});
                    }}
                    return removed;
                }})()"#,
                sidebar = js_string(Selector::Sidebar.css()),
                overlay = js_string(Selector::Overlay.css()),
            ),
        }
    }
}

/// 转成 JS 字符串字面量
pub fn js_string(text: &str) -> String {
    serde_json::Value::from(text).to_string()
}
