//! 按钮文本处理
//!
//! 页面文本的规范化，以及从开始按钮文本中解析课程编号

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ClickerError, ClickerResult};

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+$").expect("constant pattern"));

/// 去掉首尾空白，连续空白合并为一个空格，并转为小写
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 从开始按钮文本中解析课程编号
///
/// 文本必须以数字结尾（如 "Start Day 7"），否则说明站点改了界面文案，
/// 返回 [`ClickerError::UnexpectedTextFormat`]。
pub fn lesson_number(text: &str) -> ClickerResult<u32> {
    let normalized = normalize(text);
    let unexpected = || ClickerError::UnexpectedTextFormat {
        text: text.to_string(),
    };

    TRAILING_DIGITS
        .find(&normalized)
        .ok_or_else(unexpected)?
        .as_str()
        .parse()
        .map_err(|_| unexpected())
}
