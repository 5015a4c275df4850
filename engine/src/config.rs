//! secret key 的来源
//!
//! 加密管理器本身不决定 secret key 从哪里来，只通过
//! [`SecretSource`] 按变量名查询。

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::format::env_file::EnvFile;

/// 默认环境文件目录
pub const DEFAULT_ENV_DIR: &str = "envs";

/// 默认基础 secrets 文件
pub const DEFAULT_BASE_FILE: &str = ".env";

/// 默认 secret key 变量名
pub const DEFAULT_KEY_NAME: &str = "SECRET_KEY";

/// 按变量名解析 secret 值
pub trait SecretSource: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// 进程环境变量
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl SecretSource for ProcessEnv {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// 从 `.env` 文件加载的变量表
#[derive(Debug, Clone, Default)]
pub struct EnvFileSecrets {
    values: HashMap<String, String>,
}

impl EnvFileSecrets {
    /// 同名 key 以第一次出现为准
    pub fn from_content(content: &str) -> Self {
        let mut values = HashMap::new();
        for (key, value) in EnvFile::parse(content).variables() {
            values.entry(key).or_insert(value);
        }
        Self { values }
    }

    /// 读取文件；文件不存在时返回空表
    pub async fn load(path: &Path) -> Result<Self> {
        if !crate::fs::file_exists(path).await {
            return Ok(Self::default());
        }
        let content = crate::fs::read_text(path).await?;
        Ok(Self::from_content(&content))
    }
}

impl SecretSource for EnvFileSecrets {
    fn resolve(&self, name: &str) -> Option<String> {
        self.values.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

impl SecretSource for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty()).cloned()
    }
}

/// 按顺序依次查询，返回第一个命中的值
#[derive(Default)]
pub struct Layered {
    sources: Vec<Box<dyn SecretSource>>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl SecretSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl SecretSource for Layered {
    fn resolve(&self, name: &str) -> Option<String> {
        self.sources.iter().find_map(|s| s.resolve(name))
    }
}
