//! 日志脱敏
//!
//! 任何可能包含用户数据的文本在写入日志前都要经过这里。

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

pub const MASK: &str = "****";

/// `KEY=VALUE` 中 KEY 看起来敏感的赋值
static SENSITIVE_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([A-Z0-9_]*(?:PASSWORD|PASSWD|SECRET|TOKEN|KEY|CREDENTIAL)[A-Z0-9_]*)\s*=\s*\S+")
        .expect("valid regex")
});

/// envelope 的三个字段
static ENVELOPE_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""(salt|iv|cipherText)"\s*:\s*"[^"]*""#).expect("valid regex")
});

static BEARER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._~+/=-]+").expect("valid regex"));

/// 屏蔽文本中的敏感内容
pub fn sanitize_string(input: &str) -> String {
    let out = ENVELOPE_FIELD.replace_all(input, format!("\"$1\":\"{MASK}\""));
    let out = replace(out, &SENSITIVE_ASSIGNMENT, &format!("$1={MASK}"));
    let out = replace(out, &BEARER_TOKEN, &format!("Bearer {MASK}"));
    out.into_owned()
}

/// 日志中展示一个值时使用，不泄露内容
pub fn mask_value(value: &str) -> &'static str {
    if value.is_empty() { "<empty>" } else { MASK }
}

fn replace<'a>(text: Cow<'a, str>, re: &Regex, rep: &str) -> Cow<'a, str> {
    let replaced = match re.replace_all(&text, rep) {
        Cow::Owned(s) => Some(s),
        Cow::Borrowed(_) => None,
    };

    match replaced {
        Some(s) => Cow::Owned(s),
        None => text,
    }
}
