//! Resolved - resolver がパターンから得た具体的なパス

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// タスクの input / output の具体的な場所
///
/// ストアにとっては不透明。作るのは resolver だけで、中を見るのは
/// operation と validator だけ。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resolved {
    paths: Vec<PathBuf>,
}

impl Resolved {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}
