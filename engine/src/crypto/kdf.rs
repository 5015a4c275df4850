//! 密钥派生函数（KDF）模块
//!
//! 使用 Argon2id 将 secret key（口令）与随机 salt
//! 派生为 AES-256-GCM 所需的 32 字节对称密钥。
//!
//! 说明：
//! - 派生密钥不落盘，每次 encrypt / decrypt 都重新计算
//! - 敏感密钥材料离开作用域后自动清零
//! - 参数未写入 envelope，加解密双方必须使用同一组参数

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::error::{EnvVaultError, Result};

/// 派生密钥长度（256-bit）
pub const KEY_LEN: usize = 32;

/// 派生出的对称密钥，drop 时清零
pub type DerivedKey = Zeroizing<[u8; KEY_LEN]>;

/// Argon2id 成本参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// 内存成本（KiB）
    pub memory_kib: u32,
    /// 时间成本（迭代次数）
    pub iterations: u32,
    /// 并行度（lanes）
    pub parallelism: u32,
}

impl KdfParams {
    pub const MEMORY_KIB: u32 = 262_144; // 256 MB
    pub const ITERATIONS: u32 = 4;
    pub const PARALLELISM: u32 = 3;

    fn to_argon2(self) -> Result<Params> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|_| EnvVaultError::KeyDerivation)
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: Self::MEMORY_KIB,
            iterations: Self::ITERATIONS,
            parallelism: Self::PARALLELISM,
        }
    }
}

/// 根据口令和 salt 派生对称密钥
///
/// 该函数是 CPU / 内存密集型操作，异步调用方应放到
/// blocking 线程池中执行。
pub fn derive_key(passphrase: &str, salt: &[u8], params: KdfParams) -> Result<DerivedKey> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);

    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|_| EnvVaultError::KeyDerivation)?;

    Ok(key)
}
