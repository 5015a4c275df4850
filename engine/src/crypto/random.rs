//! 安全随机数生成模块
//!
//! 系统中所有随机性（salt、IV、secret key）都从这里取得，
//! 底层统一使用操作系统 CSPRNG（`OsRng`）。
//!
//! 约束：
//! - 长度为 0 的请求一律返回 `InvalidLength`
//! - 熵源不可用视为不可恢复错误，直接向上返回
//! - AES-GCM 加密只能使用 `GCM_IV_LEN` 长度的 IV

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};

use crate::error::{EnvVaultError, Result};

/// KDF salt 默认长度
pub const SALT_LEN: usize = 32;

/// 通用 IV 长度
pub const IV_LEN: usize = 16;

/// AES-GCM nonce 长度（96 bit）
pub const GCM_IV_LEN: usize = 12;

/// 可分发 secret key 的默认长度
pub const SECRET_KEY_LEN: usize = 32;

/// 生成 `len` 字节的安全随机数
pub fn random_bytes(len: usize) -> Result<Vec<u8>> {
    if len == 0 {
        return Err(EnvVaultError::InvalidLength(len));
    }

    let mut buf = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|_| EnvVaultError::EntropyUnavailable)?;

    Ok(buf)
}

pub fn generate_salt(len: usize) -> Result<Vec<u8>> {
    random_bytes(len)
}

pub fn generate_salt_b64(len: usize) -> Result<String> {
    generate_salt(len).map(|salt| STANDARD.encode(salt))
}

/// 生成 IV
///
/// 用于 AES-GCM 时必须传入 `GCM_IV_LEN`，
/// `IV_LEN` 只适用于通用场景。
pub fn generate_iv(len: usize) -> Result<Vec<u8>> {
    random_bytes(len)
}

pub fn generate_iv_b64(len: usize) -> Result<String> {
    generate_iv(len).map(|iv| STANDARD.encode(iv))
}

/// 生成 AES-GCM 专用的定长 nonce
pub fn generate_gcm_iv() -> Result<[u8; GCM_IV_LEN]> {
    let mut iv = [0u8; GCM_IV_LEN];
    iv.copy_from_slice(&generate_iv(GCM_IV_LEN)?);
    Ok(iv)
}

/// 生成 secret key（base64 文本，便于写入 .env 分发）
pub fn generate_secret_key(len: usize) -> Result<String> {
    random_bytes(len).map(|key| STANDARD.encode(key))
}
