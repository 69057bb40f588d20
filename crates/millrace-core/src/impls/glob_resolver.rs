//! GlobResolver - ファイルシステム上の glob でパターンを解決する

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{ResolutionError, Resolved};
use crate::ports::Resolver;

/// `*.pids` のようなパターンをタスクのディレクトリ基準で解決する
///
/// 結果はソート済み。`single()` では 2 件以上のマッチはエラー。
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobResolver {
    require_single: bool,
}

impl GlobResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// ちょうど 1 件のマッチを要求する resolver
    pub fn single() -> Self {
        Self {
            require_single: true,
        }
    }
}

#[async_trait]
impl Resolver for GlobResolver {
    async fn resolve(&self, dir: &Path, pattern: &str) -> Result<Resolved, ResolutionError> {
        let dir = dir.to_path_buf();
        let paths = {
            let dir = dir.clone();
            let pattern = pattern.to_string();
            tokio::task::spawn_blocking(move || expand(&dir, &pattern))
        }
        .await
        .map_err(|e| ResolutionError::Io {
            pattern: pattern.to_string(),
            source: std::io::Error::other(e),
        })??;

        debug!(pattern, dir = %dir.display(), matches = paths.len(), "resolved pattern");

        match paths.len() {
            0 => Err(ResolutionError::NoMatch {
                pattern: pattern.to_string(),
                dir,
            }),
            n if n > 1 && self.require_single => Err(ResolutionError::Ambiguous {
                pattern: pattern.to_string(),
                count: n,
            }),
            _ => Ok(Resolved::new(paths)),
        }
    }
}

fn expand(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ResolutionError> {
    // ディレクトリ部分はリテラル。ワイルドカードはパターン側だけ。
    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        format!("{base}/{pattern}")
    };

    let entries = glob::glob(&full).map_err(|e| ResolutionError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.msg.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ResolutionError::Io {
            pattern: pattern.to_string(),
            source: e.into(),
        })?;
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}
