//! 文件读写能力
//!
//! 只处理整文件 UTF-8 文本；写入一律走原子替换。

pub mod atomic;
pub mod secret_file;

use std::path::{Path, PathBuf};

use crate::error::{EnvVaultError, Result};

pub use secret_file::{EnvironmentSecretFileManager, KeyStorage};

/// 在 `directory` 下定位 `file_name`
pub fn resolve_file_path(directory: impl AsRef<Path>, file_name: &str) -> PathBuf {
    directory.as_ref().join(file_name)
}

pub async fn file_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EnvVaultError::file_access(path, e))
}

pub async fn write_text(path: &Path, text: &str) -> Result<()> {
    atomic::write_atomic(path, text.as_bytes())
        .await
        .map_err(|e| EnvVaultError::file_access(path, e))
}
