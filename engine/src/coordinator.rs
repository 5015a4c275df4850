//! 加密工作流编排
//!
//! 两个粗粒度入口，本身不包含分支逻辑：
//! - 生成 secret key 并写入基础文件
//! - 对目标环境文件执行加密

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::SecretSource;
use crate::crypto::random::{self, SECRET_KEY_LEN};
use crate::error::Result;
use crate::fs::secret_file::{EnvironmentSecretFileManager, KeyStorage};
use crate::manager::{EncryptionSummary, EnvironmentEncryptionManager};
use crate::service::EncryptionService;

#[derive(Clone)]
pub struct EnvironmentEncryptionCoordinator {
    manager: EnvironmentEncryptionManager,
    secret_files: EnvironmentSecretFileManager,
}

impl EnvironmentEncryptionCoordinator {
    pub fn new(manager: EnvironmentEncryptionManager) -> Self {
        Self {
            manager,
            secret_files: EnvironmentSecretFileManager::new(),
        }
    }

    /// 使用默认 KDF 参数与给定 secret 来源
    pub fn with_secrets(secrets: Arc<dyn SecretSource>) -> Self {
        Self::new(EnvironmentEncryptionManager::new(
            EncryptionService::new(),
            secrets,
        ))
    }

    pub fn manager(&self) -> &EnvironmentEncryptionManager {
        &self.manager
    }

    /// 生成新的 secret key 并写入 `directory/base_file_name`
    ///
    /// 同名 key 已存在时不覆盖，返回 `KeyStorage::AlreadyExists`。
    pub async fn generate_and_store_secret_key(
        &self,
        directory: impl AsRef<Path>,
        base_file_name: &str,
        key_variable_name: &str,
    ) -> Result<KeyStorage> {
        let secret_key = zeroize::Zeroizing::new(random::generate_secret_key(SECRET_KEY_LEN)?);
        let path = self
            .secret_files
            .resolve_file_path(directory, base_file_name);

        let outcome = self
            .secret_files
            .store_secret_key(&path, key_variable_name, &secret_key)
            .await?;

        info!(key = key_variable_name, outcome = ?outcome, "secret key generation finished");
        Ok(outcome)
    }

    /// 加密 `directory/file_name` 中的目标变量
    pub async fn orchestrate_environment_encryption(
        &self,
        directory: impl AsRef<Path>,
        file_name: &str,
        secret_key_variable_name: &str,
        variables: &[String],
    ) -> Result<EncryptionSummary> {
        self.manager
            .encrypt_and_update_environment_variables(
                directory,
                file_name,
                secret_key_variable_name,
                variables,
            )
            .await
    }
}
