//! envelope 加解密端到端测试

use env_vault::crypto::KdfParams;
use env_vault::{EncryptionEnvelope, EncryptionService, EnvVaultError};

fn fast_service() -> EncryptionService {
    EncryptionService::with_params(KdfParams {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    })
}

/// 替换第 `index` 个字符为另一个合法 base64 字符
fn flip_char(value: &str, index: usize) -> String {
    value
        .char_indices()
        .map(|(i, c)| {
            if i != index {
                c
            } else if c == 'A' {
                'B'
            } else {
                'A'
            }
        })
        .collect()
}

#[tokio::test]
async fn encrypt_decrypt_roundtrip_with_production_params() {
    // 默认参数（256 MB / 4 次迭代 / 3 lanes）能够完成 round-trip。
    let json = env_vault::encrypt("TOKEN_PASSWORD value", "test-secret")
        .await
        .expect("encrypt value");

    let decrypted = env_vault::decrypt(&json, "test-secret")
        .await
        .expect("decrypt value");
    assert_eq!(decrypted, "TOKEN_PASSWORD value");
}

#[tokio::test]
async fn encrypt_decrypt_roundtrip() {
    let service = fast_service();
    let samples = [
        "simple",
        "with spaces and = signs",
        "{\"salt\":\"not really\"}",
        "ünïcödé ✓",
        "",
    ];

    for plaintext in samples {
        let json = service
            .encrypt(plaintext, "passphrase")
            .await
            .expect("encrypt")
            .to_json()
            .expect("serialize");
        let decrypted = service.decrypt(&json, "passphrase").await.expect("decrypt");
        assert_eq!(decrypted, plaintext);
    }
}

#[tokio::test]
async fn encryption_is_not_deterministic() {
    // 每次加密都使用新的 salt 与 IV。
    let service = fast_service();

    let a = service.encrypt("same", "k").await.expect("encrypt");
    let b = service.encrypt("same", "k").await.expect("encrypt");

    assert_ne!(a.salt, b.salt);
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.cipher_text, b.cipher_text);

    for envelope in [a, b] {
        let json = envelope.to_json().expect("serialize");
        assert_eq!(service.decrypt(&json, "k").await.expect("decrypt"), "same");
    }
}

#[tokio::test]
async fn decrypt_with_wrong_passphrase_fails() {
    let service = fast_service();
    let json = service
        .encrypt("secret", "correct")
        .await
        .expect("encrypt")
        .to_json()
        .expect("serialize");

    let result = service.decrypt(&json, "wrong").await;
    assert!(matches!(result, Err(EnvVaultError::DecryptionFailed)));
}

#[tokio::test]
async fn tampered_fields_fail_authentication() {
    let service = fast_service();
    let envelope = service.encrypt("secret", "k").await.expect("encrypt");

    let mut bad_cipher = envelope.clone();
    bad_cipher.cipher_text = flip_char(&envelope.cipher_text, 0);

    let mut bad_iv = envelope.clone();
    bad_iv.iv = flip_char(&envelope.iv, 0);

    let mut bad_salt = envelope.clone();
    bad_salt.salt = flip_char(&envelope.salt, 0);

    let mut short_salt = envelope.clone();
    short_salt.salt = "AAAA".to_string();

    for tampered in [bad_cipher, bad_iv, bad_salt, short_salt] {
        let json = tampered.to_json().expect("serialize");
        let result = service.decrypt(&json, "k").await;
        assert!(
            matches!(result, Err(EnvVaultError::DecryptionFailed)),
            "expected authentication failure, got {result:?}"
        );
    }
}

#[tokio::test]
async fn decrypt_rejects_malformed_envelope() {
    let service = fast_service();

    for input in [r#"{"salt":"x"}"#, "not json", "{}", r#"{"salt":"a","iv":"","cipherText":"c"}"#] {
        let result = service.decrypt(input, "k").await;
        assert!(
            matches!(result, Err(EnvVaultError::MalformedEnvelope(_))),
            "expected malformed envelope for {input}"
        );
    }
}

#[test]
fn error_messages_do_not_leak_details() {
    let message = EnvVaultError::DecryptionFailed.to_string();
    assert_eq!(message, "decryption failed: wrong secret key or corrupted data");

    let parsed = EncryptionEnvelope::parse(r#"{"salt":"a","iv":"b","cipherText":"c"}"#)
        .expect("parse envelope");
    assert_eq!(parsed.cipher_text, "c");
}
