//! 环境文件加密管理
//!
//! 对 `.env` 文件中需要加密的变量调用 [`EncryptionService`]，
//! 其余内容保持不变。
//!
//! 处理流程（严格顺序）：
//! 1. 解析 secret key（缺失直接报错，不读文件）
//! 2. 读取整个文件并逐行解析
//! 3. 确定目标变量：未指定 selector 时为全部变量；
//!    否则先按 key 匹配，失败再按当前值匹配，仍失败则记录并跳过
//! 4. 逐个加密：空值跳过，已是 envelope 的跳过
//! 5. 全部处理完后一次性原子写回整个文件
//!
//! 注意：
//! - 中途失败时原文件不受影响
//! - 同一文件的并发调用不安全（后写者覆盖）

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::config::SecretSource;
use crate::error::{EnvVaultError, Result};
use crate::format::env_file::EnvFile;
use crate::format::envelope::EnvValue;
use crate::fs;
use crate::sanitize::sanitize_string;
use crate::service::EncryptionService;

/// 一次加密运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionSummary {
    /// 目标变量数
    pub considered: usize,
    /// 本次新加密的 key
    pub encrypted: Vec<String>,
    /// 已是 envelope 而跳过的 key
    pub already_encrypted: Vec<String>,
    /// 值为空而跳过的 key
    pub empty: Vec<String>,
    /// 未匹配到任何变量的 selector 数
    pub unresolved_selectors: usize,
}

impl EncryptionSummary {
    pub fn is_noop(&self) -> bool {
        self.encrypted.is_empty()
    }
}

#[derive(Clone)]
pub struct EnvironmentEncryptionManager {
    service: EncryptionService,
    secrets: Arc<dyn SecretSource>,
}

impl EnvironmentEncryptionManager {
    pub fn new(service: EncryptionService, secrets: Arc<dyn SecretSource>) -> Self {
        Self { service, secrets }
    }

    /// 加密 `directory/file_name` 中的目标变量并原位改写文件
    ///
    /// `selectors` 为空时加密全部变量。
    pub async fn encrypt_and_update_environment_variables(
        &self,
        directory: impl AsRef<Path>,
        file_name: &str,
        secret_key_variable_name: &str,
        selectors: &[String],
    ) -> Result<EncryptionSummary> {
        let secret_key = self.secret_key(secret_key_variable_name)?;

        let path = fs::resolve_file_path(directory, file_name);
        let content = fs::read_text(&path).await.inspect_err(|e| {
            error!(
                operation = "encrypt_and_update_environment_variables",
                error = %sanitize_string(&e.to_string()),
                "failed to read environment file"
            )
        })?;

        let mut file = EnvFile::parse(&content);
        let mut summary = EncryptionSummary::default();
        let targets = resolve_targets(&file, selectors, &mut summary);
        summary.considered = targets.len();

        for (key, value) in targets {
            if value.is_empty() {
                info!(key = %key, "skipping variable with empty value");
                summary.empty.push(key);
                continue;
            }

            if EnvValue::classify(&value).is_encrypted() {
                info!(key = %key, "variable is already encrypted, skipping");
                summary.already_encrypted.push(key);
                continue;
            }

            let envelope = self.service.encrypt(&value, &secret_key).await?;
            file.set(&key, &envelope.to_json()?);
            debug!(key = %key, "variable encrypted");
            summary.encrypted.push(key);
        }

        if !summary.encrypted.is_empty() {
            fs::write_text(&path, &file.render()).await.inspect_err(|e| {
                error!(
                    operation = "encrypt_and_update_environment_variables",
                    error = %sanitize_string(&e.to_string()),
                    "failed to write environment file"
                )
            })?;
        }

        info!(
            path = %path.display(),
            considered = summary.considered,
            encrypted = summary.encrypted.len(),
            "environment encryption finished"
        );

        Ok(summary)
    }

    /// 读取 `directory/file_name` 中的全部变量，envelope 值解密后返回
    ///
    /// 明文值原样返回；没有加密值时不需要 secret key。
    pub async fn decrypt_environment_variables(
        &self,
        directory: impl AsRef<Path>,
        file_name: &str,
        secret_key_variable_name: &str,
    ) -> Result<BTreeMap<String, String>> {
        let path = fs::resolve_file_path(directory, file_name);
        let file = EnvFile::parse(&fs::read_text(&path).await?);

        let mut values = BTreeMap::new();
        let mut encrypted_keys = Vec::new();
        let mut envelopes = Vec::new();

        for (key, value) in unique_variables(&file) {
            if EnvValue::classify(&value).is_encrypted() {
                encrypted_keys.push(key);
                envelopes.push(value);
            } else {
                values.insert(key, value);
            }
        }

        if !envelopes.is_empty() {
            let secret_key = self.secret_key(secret_key_variable_name)?;
            let decrypted = self
                .service
                .decrypt_multiple(&envelopes, &secret_key)
                .await?;
            values.extend(encrypted_keys.into_iter().zip(decrypted));
        }

        Ok(values)
    }

    fn secret_key(&self, name: &str) -> Result<Zeroizing<String>> {
        self.secrets
            .resolve(name)
            .map(Zeroizing::new)
            .ok_or_else(|| {
                error!(variable = name, "secret key variable is not set");
                EnvVaultError::SecretKeyMissing(name.to_string())
            })
    }
}

/// 文件中的变量，同名 key 只保留第一次出现
fn unique_variables(file: &EnvFile) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    file.variables()
        .into_iter()
        .filter(|(key, _)| seen.insert(key.clone()))
        .collect()
}

/// 将 selector 解析为 `(key, value)` 目标列表
///
/// selector 先按 key 匹配，再按值匹配（取文件中第一个值相等的 key）。
/// 结果按 selector 顺序排列并去重。
fn resolve_targets(
    file: &EnvFile,
    selectors: &[String],
    summary: &mut EncryptionSummary,
) -> Vec<(String, String)> {
    if selectors.is_empty() {
        return unique_variables(file);
    }

    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    for (index, selector) in selectors.iter().enumerate() {
        let key = if file.contains_key(selector) {
            selector.as_str()
        } else if let Some(key) = file.find_key_by_value(selector) {
            info!(key = %key, selector_index = index, "selector matched a variable by value");
            key
        } else {
            warn!(
                selector_index = index,
                "selector matched no variable key or value, skipping"
            );
            summary.unresolved_selectors += 1;
            continue;
        };

        if seen.insert(key.to_string()) {
            let value = file.get(key).unwrap_or_default().to_string();
            targets.push((key.to_string(), value));
        }
    }

    targets
}
