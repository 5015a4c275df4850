//! 落盘格式：`.env` 行模型与加密 envelope

pub mod env_file;
pub mod envelope;

pub use env_file::{EnvFile, EnvLine};
pub use envelope::{EncryptionEnvelope, EnvValue};
