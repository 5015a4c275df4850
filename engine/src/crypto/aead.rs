//! AEAD 加解密模块
//!
//! 基于 AES-256-GCM，不使用附加认证数据（AAD）。
//!
//! - 认证 tag 附在密文末尾，与密文一起保存
//! - 解密失败即表示：密钥错误 或 数据被篡改，两者不做区分
//! - nonce 由调用方提供，同一密钥下严禁复用

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};

use crate::crypto::kdf::KEY_LEN;
use crate::crypto::random::GCM_IV_LEN;
use crate::error::{EnvVaultError, Result};

/// 使用 AES-256-GCM 加密数据
///
/// 返回 `ciphertext || tag`
pub fn encrypt(
    key_bytes: &[u8; KEY_LEN],
    nonce: &[u8; GCM_IV_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key_bytes));

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| EnvVaultError::EncryptionFailed)
}

/// 使用 AES-256-GCM 解密数据
///
/// 认证未通过前不会返回任何明文
pub fn decrypt(
    key_bytes: &[u8; KEY_LEN],
    nonce: &[u8; GCM_IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key_bytes));

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| EnvVaultError::DecryptionFailed)
}
