//! `.env` 文件的行级模型
//!
//! 文件按行保存，行顺序有意义，重写时必须保持不变：
//! - 空行、注释、非赋值行原样保留
//! - 赋值行 `KEY=VALUE`：KEY 为第一个 `=` 之前的部分，
//!   VALUE 为其后的全部内容（保留内部的 `=`），两者均去除首尾空白
//! - 只有被替换的 KEY 对应行会改写，新 KEY 追加在末尾

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvLine {
    Blank,
    Comment(String),
    Assignment { key: String, value: String },
    /// 非空且不含 `=` 的行
    Other(String),
}

impl EnvLine {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            return Self::Blank;
        }
        if trimmed.starts_with('#') {
            return Self::Comment(line.to_string());
        }

        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Self::Assignment {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            _ => Self::Other(line.to_string()),
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Assignment { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// 一个已解析的 `.env` 文件
///
/// 保留每一行的原始文本，未修改的行写回时逐字节不变。
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    lines: Vec<RawLine>,
    trailing_newline: bool,
}

#[derive(Debug, Clone)]
struct RawLine {
    text: String,
    parsed: EnvLine,
}

impl EnvFile {
    /// 空文件，写出时以换行结尾
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            trailing_newline: true,
        }
    }

    pub fn parse(content: &str) -> Self {
        let trailing_newline = content.ends_with('\n');
        let body = content.strip_suffix('\n').unwrap_or(content);

        let lines = if content.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|line| {
                    // CRLF 文件：去掉行尾 \r 再解析，原文保留
                    let parsed = EnvLine::parse(line.strip_suffix('\r').unwrap_or(line));
                    RawLine {
                        text: line.to_string(),
                        parsed,
                    }
                })
                .collect()
        };

        Self {
            lines,
            trailing_newline,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &EnvLine> {
        self.lines.iter().map(|l| &l.parsed)
    }

    /// 按文件顺序返回所有 `(key, value)`
    pub fn variables(&self) -> Vec<(String, String)> {
        self.lines()
            .filter_map(|line| match line {
                EnvLine::Assignment { key, value } => Some((key.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines().find_map(|line| match line {
            EnvLine::Assignment { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// 第一个值等于 `value` 的 key
    pub fn find_key_by_value(&self, value: &str) -> Option<&str> {
        self.lines().find_map(|line| match line {
            EnvLine::Assignment { key, value: v } if v == value => Some(key.as_str()),
            _ => None,
        })
    }

    /// 原位替换 `key` 第一次出现的行；不存在时追加到末尾
    ///
    /// 同名的后续行保持不变，原行的 `\r` 行尾保留。
    pub fn set(&mut self, key: &str, value: &str) {
        let text = format!("{key}={value}");
        let parsed = EnvLine::Assignment {
            key: key.to_string(),
            value: value.to_string(),
        };

        match self.lines.iter_mut().find(|l| l.parsed.key() == Some(key)) {
            Some(line) => {
                let crlf = line.text.ends_with('\r');
                line.text = if crlf { format!("{text}\r") } else { text };
                line.parsed = parsed;
            }
            None => self.lines.push(RawLine { text, parsed }),
        }
    }

    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if self.trailing_newline {
            out.push('\n');
        }
        out
    }
}
