//! 加密 envelope 格式
//!
//! 一个明文值加密后对应一个 envelope，以单行 JSON 形式
//! 作为 `.env` 中 `KEY=VALUE` 的 VALUE 保存：
//!
//! ```text
//! TOKEN_PASSWORD={"salt":"<base64>","iv":"<base64>","cipherText":"<base64>"}
//! ```
//!
//! - salt：32 字节，base64
//! - iv：12 字节（AES-GCM nonce），base64
//! - cipherText：密文 + 认证 tag，base64
//!
//! 三个字段缺一不可，envelope 生成后不可修改。

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::crypto::random::{GCM_IV_LEN, SALT_LEN};
use crate::error::{EnvVaultError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncryptionEnvelope {
    pub salt: String,
    pub iv: String,
    #[serde(rename = "cipherText")]
    pub cipher_text: String,
}

/// 反序列化用的宽松结构，字段缺失时给出明确错误
#[derive(Deserialize)]
struct RawEnvelope {
    salt: Option<String>,
    iv: Option<String>,
    #[serde(rename = "cipherText")]
    cipher_text: Option<String>,
}

/// 解码后的二进制字段
pub struct DecodedEnvelope {
    pub salt: Vec<u8>,
    pub iv: [u8; GCM_IV_LEN],
    pub cipher_text: Vec<u8>,
}

impl EncryptionEnvelope {
    pub fn from_parts(salt: &[u8], iv: &[u8], cipher_text: &[u8]) -> Self {
        Self {
            salt: STANDARD.encode(salt),
            iv: STANDARD.encode(iv),
            cipher_text: STANDARD.encode(cipher_text),
        }
    }

    /// 解析并校验 envelope JSON
    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawEnvelope = serde_json::from_str(json.trim())
            .map_err(|e| EnvVaultError::MalformedEnvelope(format!("invalid JSON: {e}")))?;

        let mut missing = Vec::new();
        let salt = take_field(raw.salt, "salt", &mut missing);
        let iv = take_field(raw.iv, "iv", &mut missing);
        let cipher_text = take_field(raw.cipher_text, "cipherText", &mut missing);

        if !missing.is_empty() {
            return Err(EnvVaultError::MalformedEnvelope(format!(
                "missing or empty field(s): {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            salt,
            iv,
            cipher_text,
        })
    }

    /// 单行 JSON，直接写入 `.env`
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|_| EnvVaultError::Internal)
    }

    /// 解码 base64 字段
    ///
    /// 字段内容被改动（含 salt / IV 长度不符）与密钥错误一样，
    /// 统一报告为解密失败。
    pub fn decode(&self) -> Result<DecodedEnvelope> {
        let salt = STANDARD
            .decode(&self.salt)
            .ok()
            .filter(|salt| salt.len() == SALT_LEN)
            .ok_or(EnvVaultError::DecryptionFailed)?;
        let iv: [u8; GCM_IV_LEN] = STANDARD
            .decode(&self.iv)
            .map_err(|_| EnvVaultError::DecryptionFailed)?
            .try_into()
            .map_err(|_| EnvVaultError::DecryptionFailed)?;
        let cipher_text = STANDARD
            .decode(&self.cipher_text)
            .map_err(|_| EnvVaultError::DecryptionFailed)?;

        Ok(DecodedEnvelope {
            salt,
            iv,
            cipher_text,
        })
    }
}

fn take_field(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(name);
            String::new()
        }
    }
}

/// `.env` 中某个值的加密状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Encrypted(EncryptionEnvelope),
    Plain,
}

impl EnvValue {
    /// 判断一个值是否已经是 envelope
    ///
    /// 任何解析失败都视为 `Plain`，不会返回错误。
    pub fn classify(value: &str) -> Self {
        let trimmed = value.trim();
        if !(trimmed.starts_with('{') && trimmed.ends_with('}')) {
            return Self::Plain;
        }

        match EncryptionEnvelope::parse(trimmed) {
            Ok(envelope) => Self::Encrypted(envelope),
            Err(_) => Self::Plain,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_camel_case_cipher_text() {
        let envelope = EncryptionEnvelope::from_parts(&[1; 32], &[2; 12], b"ct");
        let json = envelope.to_json().unwrap();

        assert!(json.starts_with("{\"salt\":\""));
        assert!(json.contains("\"iv\":\""));
        assert!(json.contains("\"cipherText\":\""));
        assert!(!json.contains('\n'));
        assert_eq!(EncryptionEnvelope::parse(&json).unwrap(), envelope);
    }

    #[test]
    fn missing_fields_are_reported() {
        let err = EncryptionEnvelope::parse(r#"{"salt":"x"}"#).unwrap_err();
        match err {
            EnvVaultError::MalformedEnvelope(msg) => {
                assert!(msg.contains("iv"));
                assert!(msg.contains("cipherText"));
                assert!(!msg.contains("salt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_fields_are_rejected() {
        let result = EncryptionEnvelope::parse(r#"{"salt":"","iv":"a","cipherText":"b"}"#);
        assert!(matches!(result, Err(EnvVaultError::MalformedEnvelope(_))));
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(
            EncryptionEnvelope::parse("not json"),
            Err(EnvVaultError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            EncryptionEnvelope::parse(r#"{"salt":1,"iv":"a","cipherText":"b"}"#),
            Err(EnvVaultError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn classify_plain_values() {
        assert_eq!(EnvValue::classify("hunter2"), EnvValue::Plain);
        assert_eq!(EnvValue::classify(""), EnvValue::Plain);
        assert_eq!(EnvValue::classify("{not json}"), EnvValue::Plain);
        // 合法 JSON 但不是 envelope，仍视为明文
        assert_eq!(EnvValue::classify(r#"{"user":"bob"}"#), EnvValue::Plain);
        assert_eq!(EnvValue::classify(r#"["salt","iv"]"#), EnvValue::Plain);
    }

    #[test]
    fn classify_envelope() {
        let value = r#"  {"salt":"a","iv":"b","cipherText":"c"}  "#;
        assert!(EnvValue::classify(value).is_encrypted());
    }

    #[test]
    fn decode_rejects_wrong_salt_length() {
        let envelope = EncryptionEnvelope::from_parts(&[1; 3], &[2; 12], b"ct");
        assert!(matches!(
            envelope.decode(),
            Err(EnvVaultError::DecryptionFailed)
        ));
    }

    #[test]
    fn decode_rejects_wrong_iv_length() {
        let envelope = EncryptionEnvelope::from_parts(&[1; 32], &[2; 16], b"ct");
        assert!(matches!(
            envelope.decode(),
            Err(EnvVaultError::DecryptionFailed)
        ));
    }
}
