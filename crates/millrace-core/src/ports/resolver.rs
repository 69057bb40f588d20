//! Resolver port - パターンを具体的なパスに解決する
//!
//! 実装: `impls::GlobResolver`（ファイルシステム上の glob）

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{ResolutionError, Resolved};

/// Resolver は `pattern` を `dir` 基準で解決する
///
/// 一致なしは `ResolutionError::NoMatch`。空の `Resolved` を返してはいけない。
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, dir: &Path, pattern: &str) -> Result<Resolved, ResolutionError>;
}
