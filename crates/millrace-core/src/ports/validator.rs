//! Validator port - 出力の検証
//!
//! 検証はソフト。engine はエラーも `validated: false` も警告として吸収し、
//! タスクを失敗させない。
//!
//! 実装: `impls::FingerprintValidator`

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{Resolved, ValidationError, ValidationMode, ValidationReport};

/// Validator は解決済み output を `mode` に従って検査する
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        dir: &Path,
        output: Option<&Resolved>,
        mode: ValidationMode,
    ) -> Result<ValidationReport, ValidationError>;
}
