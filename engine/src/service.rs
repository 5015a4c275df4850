//! 加解密服务
//!
//! 系统中唯一执行密码学变换的组件。
//!
//! 加密流程（严格顺序）：
//! 1. 生成 32 字节 salt 与 12 字节 IV
//! 2. Argon2id(secret key, salt) 派生 32 字节密钥
//! 3. AES-256-GCM 加密明文（无 AAD）
//! 4. 三个字段 base64 编码后组成 envelope
//!
//! 每次加密都使用全新的 salt 与 IV，同一明文两次加密结果不同。
//!
//! KDF 开销很大，同步部分一律放到 blocking 线程池执行，
//! 异步调用方不会被阻塞。

use futures::future::try_join_all;
use tracing::{debug, error};
use zeroize::Zeroizing;

use crate::crypto::aead;
use crate::crypto::kdf::{self, KdfParams};
use crate::crypto::random::{self, SALT_LEN};
use crate::error::{EnvVaultError, Result};
use crate::format::envelope::EncryptionEnvelope;

#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptionService {
    params: KdfParams,
}

impl EncryptionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义 KDF 参数
    ///
    /// envelope 不记录参数，解密时必须使用同一组参数。
    pub fn with_params(params: KdfParams) -> Self {
        Self { params }
    }

    /// 加密一个明文值
    pub async fn encrypt(&self, plaintext: &str, passphrase: &str) -> Result<EncryptionEnvelope> {
        let params = self.params;
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let passphrase = Zeroizing::new(passphrase.to_owned());

        run_blocking(move || encrypt_blocking(&plaintext, &passphrase, params))
            .await
            .inspect_err(|e| error!(operation = "encrypt", error = %e, "encryption failed"))
    }

    /// 解密一个 envelope JSON
    ///
    /// - JSON 非法或字段缺失：`MalformedEnvelope`
    /// - 认证失败（密钥错误 / 数据被篡改 / 参数不一致）：`DecryptionFailed`
    pub async fn decrypt(&self, envelope_json: &str, passphrase: &str) -> Result<String> {
        let envelope = EncryptionEnvelope::parse(envelope_json)
            .inspect_err(|e| error!(operation = "decrypt", error = %e, "rejecting envelope"))?;

        let params = self.params;
        let passphrase = Zeroizing::new(passphrase.to_owned());

        run_blocking(move || decrypt_blocking(&envelope, &passphrase, params))
            .await
            .inspect_err(|e| error!(operation = "decrypt", error = %e, "decryption failed"))
    }

    /// 并发解密多个 envelope
    ///
    /// 结果顺序与输入一致；任意一个失败则整体失败。
    pub async fn decrypt_multiple<S>(
        &self,
        envelopes: &[S],
        passphrase: &str,
    ) -> Result<Vec<String>>
    where
        S: AsRef<str>,
    {
        debug!(count = envelopes.len(), "decrypting envelopes");

        try_join_all(
            envelopes
                .iter()
                .map(|envelope| self.decrypt(envelope.as_ref(), passphrase)),
        )
        .await
    }
}

fn encrypt_blocking(
    plaintext: &str,
    passphrase: &str,
    params: KdfParams,
) -> Result<EncryptionEnvelope> {
    let salt = random::generate_salt(SALT_LEN)?;
    let iv = random::generate_gcm_iv()?;

    let key = kdf::derive_key(passphrase, &salt, params)?;
    let cipher_text = aead::encrypt(&key, &iv, plaintext.as_bytes())?;

    Ok(EncryptionEnvelope::from_parts(&salt, &iv, &cipher_text))
}

fn decrypt_blocking(
    envelope: &EncryptionEnvelope,
    passphrase: &str,
    params: KdfParams,
) -> Result<String> {
    let decoded = envelope.decode()?;

    let key = kdf::derive_key(passphrase, &decoded.salt, params)?;
    let plaintext = Zeroizing::new(aead::decrypt(&key, &decoded.iv, &decoded.cipher_text)?);

    String::from_utf8(plaintext.to_vec()).map_err(|_| EnvVaultError::DecryptionFailed)
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| EnvVaultError::Internal)?
}
