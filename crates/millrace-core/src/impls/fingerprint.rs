//! FingerprintValidator - 出力ファイルの SHA-256 と更新時刻で検証する
//!
//! - `off`: null チェックのみ
//! - `before`: manifest に記録済みの hash / mtime と一致するか確認
//! - `after`: 現在の hash / mtime を manifest に書き込む
//!
//! manifest は作業ディレクトリ直下の JSON ファイル（既定は `millrace.json`）。

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Resolved, ValidationError, ValidationMode, ValidationReport};
use crate::ports::Validator;

pub const DEFAULT_MANIFEST: &str = "millrace.json";

/// 1 つの出力ファイルについて記録した内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub sha256: String,
    pub modified: DateTime<Utc>,
}

type Manifest = BTreeMap<String, Fingerprint>;

pub struct FingerprintValidator {
    manifest: String,
    // 並行タスク間で manifest の read-modify-write を直列化する
    write_lock: Mutex<()>,
}

impl FingerprintValidator {
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn manifest_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.manifest)
    }

    async fn check(&self, dir: &Path, output: &Resolved) -> Result<ValidationReport, ValidationError> {
        let manifest = read_manifest(&self.manifest_path(dir)).await?;

        for path in output.paths() {
            let recorded = manifest
                .get(&manifest_key(dir, path))
                .ok_or_else(|| ValidationError::Unrecorded { path: path.clone() })?;
            let current = fingerprint(path).await?;

            if recorded.sha256 != current.sha256 {
                return Err(ValidationError::Fingerprint {
                    path: path.clone(),
                    detail: "content hash differs".to_string(),
                });
            }
            if recorded.modified != current.modified {
                return Err(ValidationError::Fingerprint {
                    path: path.clone(),
                    detail: format!(
                        "modified at {} but recorded {}",
                        current.modified, recorded.modified
                    ),
                });
            }
        }

        Ok(ValidationReport::accepted()
            .with_check("non_null", json!(true))
            .with_check("hash", json!(true))
            .with_check("time", json!(true)))
    }

    async fn record(&self, dir: &Path, output: &Resolved) -> Result<ValidationReport, ValidationError> {
        let _guard = self.write_lock.lock().await;
        let path = self.manifest_path(dir);
        let mut manifest = read_manifest(&path).await?;

        for file in output.paths() {
            manifest.insert(manifest_key(dir, file), fingerprint(file).await?);
        }

        let body = serde_json::to_string_pretty(&manifest).map_err(|e| ValidationError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| ValidationError::Io {
                path: path.display().to_string(),
                source,
            })?;

        debug!(manifest = %path.display(), files = output.len(), "recorded output fingerprints");
        Ok(ValidationReport::accepted()
            .with_check("non_null", json!(true))
            .with_check("recorded", json!(output.len())))
    }
}

impl Default for FingerprintValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST)
    }
}

#[async_trait]
impl Validator for FingerprintValidator {
    async fn validate(
        &self,
        dir: &Path,
        output: Option<&Resolved>,
        mode: ValidationMode,
    ) -> Result<ValidationReport, ValidationError> {
        let output = output
            .filter(|o| !o.is_empty())
            .ok_or(ValidationError::NullOutput)?;

        match mode {
            ValidationMode::Off => {
                Ok(ValidationReport::accepted().with_check("non_null", json!(true)))
            }
            ValidationMode::Before => self.check(dir, output).await,
            ValidationMode::After => self.record(dir, output).await,
        }
    }
}

async fn fingerprint(path: &Path) -> Result<Fingerprint, ValidationError> {
    let io_err = |source| ValidationError::Io {
        path: path.display().to_string(),
        source,
    };
    let bytes = tokio::fs::read(path).await.map_err(io_err)?;
    let modified = tokio::fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .map_err(io_err)?;

    Ok(Fingerprint {
        sha256: format!("{:x}", Sha256::digest(&bytes)),
        modified: DateTime::<Utc>::from(modified),
    })
}

async fn read_manifest(path: &Path) -> Result<Manifest, ValidationError> {
    match tokio::fs::read_to_string(path).await {
        Ok(body) => serde_json::from_str(&body).map_err(|e| ValidationError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Manifest::new()),
        Err(source) => Err(ValidationError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn manifest_key(dir: &Path, file: &Path) -> String {
    file.strip_prefix(dir)
        .unwrap_or(file)
        .to_string_lossy()
        .into_owned()
}
