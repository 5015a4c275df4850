//! env-vault：`.env` 文件中测试凭据的加密工具
//!
//! - 使用 Argon2id 从 secret key 派生密钥
//! - 使用 AES-256-GCM 加密每个变量值
//! - 原位改写 `.env` 文件，保留已加密值与无关内容

pub mod config;
pub mod coordinator;
pub mod crypto;
pub mod error;
pub mod format;
pub mod fs;
pub mod logging;
pub mod manager;
pub mod sanitize;
pub mod service;

pub use config::{EnvFileSecrets, Layered, ProcessEnv, SecretSource};
pub use coordinator::EnvironmentEncryptionCoordinator;
pub use error::{EnvVaultError, Result};
pub use format::envelope::{EncryptionEnvelope, EnvValue};
pub use fs::secret_file::{EnvironmentSecretFileManager, KeyStorage};
pub use manager::{EncryptionSummary, EnvironmentEncryptionManager};
pub use sanitize::sanitize_string;
pub use service::EncryptionService;

/// 使用默认参数加密一个值，返回 envelope JSON
pub async fn encrypt(plaintext: &str, secret_key: &str) -> Result<String> {
    EncryptionService::new()
        .encrypt(plaintext, secret_key)
        .await?
        .to_json()
}

/// 使用默认参数解密一个 envelope JSON
pub async fn decrypt(envelope_json: &str, secret_key: &str) -> Result<String> {
    EncryptionService::new()
        .decrypt(envelope_json, secret_key)
        .await
}
