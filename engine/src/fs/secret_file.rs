//! 基础 secrets 文件管理
//!
//! secret key 保存在基础 `.env` 文件中。同名 key 已存在时
//! 不覆盖，只记录日志并返回 `KeyStorage::AlreadyExists`。

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Result;
use crate::format::env_file::EnvFile;

/// 存储 secret key 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStorage {
    Stored,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentSecretFileManager;

impl EnvironmentSecretFileManager {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve_file_path(&self, directory: impl AsRef<Path>, file_name: &str) -> PathBuf {
        super::resolve_file_path(directory, file_name)
    }

    pub async fn file_exists(&self, path: &Path) -> bool {
        super::file_exists(path).await
    }

    /// 将 `key_name=key_value` 写入基础文件
    ///
    /// 文件不存在时创建；已有同名 key 时不做任何修改。
    pub async fn store_secret_key(
        &self,
        path: &Path,
        key_name: &str,
        key_value: &str,
    ) -> Result<KeyStorage> {
        let mut file = if self.file_exists(path).await {
            EnvFile::parse(&super::read_text(path).await?)
        } else {
            warn!(path = %path.display(), "base environment file not found, creating it");
            EnvFile::new()
        };

        if file.contains_key(key_name) {
            info!(
                key = key_name,
                path = %path.display(),
                "secret key already exists, leaving it untouched"
            );
            return Ok(KeyStorage::AlreadyExists);
        }

        file.set(key_name, key_value);
        super::write_text(path, &file.render()).await?;

        info!(key = key_name, path = %path.display(), "secret key stored");
        Ok(KeyStorage::Stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_base_file() {
        let dir = tempdir().expect("create temp dir");
        let manager = EnvironmentSecretFileManager::new();
        let path = manager.resolve_file_path(dir.path(), ".env");

        let outcome = manager
            .store_secret_key(&path, "SECRET_KEY", "abc")
            .await
            .unwrap();

        assert_eq!(outcome, KeyStorage::Stored);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "SECRET_KEY=abc\n");
    }

    #[tokio::test]
    async fn never_overwrites_existing_key() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "ENV=dev\nSECRET_KEY=original\n").unwrap();

        let manager = EnvironmentSecretFileManager::new();
        let outcome = manager
            .store_secret_key(&path, "SECRET_KEY", "replacement")
            .await
            .unwrap();

        assert_eq!(outcome, KeyStorage::AlreadyExists);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "ENV=dev\nSECRET_KEY=original\n"
        );
    }

    #[tokio::test]
    async fn appends_to_existing_file() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "ENV=dev").unwrap();

        let manager = EnvironmentSecretFileManager::new();
        manager
            .store_secret_key(&path, "SECRET_KEY", "abc")
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "ENV=dev\nSECRET_KEY=abc"
        );
    }
}
