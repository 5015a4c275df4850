use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvVaultError {
    #[error("invalid length: {0} (must be greater than 0)")]
    InvalidLength(usize),

    #[error("secure random source unavailable")]
    EntropyUnavailable,

    #[error("malformed encryption envelope: {0}")]
    MalformedEnvelope(String),

    /// 认证失败：不区分“密钥错误”与“数据损坏”
    #[error("decryption failed: wrong secret key or corrupted data")]
    DecryptionFailed,

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("key derivation failed")]
    KeyDerivation,

    #[error("cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret key variable `{0}` is not set")]
    SecretKeyMissing(String),

    #[error("internal error")]
    Internal,
}

impl EnvVaultError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, EnvVaultError>;
