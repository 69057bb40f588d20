//! Errors - エラー型と分類
//!
//! - `StoreError`: 不正なイベント（reducer が拒否したもの）
//! - `ResolutionError` / `OperationError` / `ValidationError`: 各ステージの協調者のエラー
//! - `TaskFailure` / `PipelineFailure`: pipeline の呼び出し元に返る失敗

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::events::EventKind;
use super::ids::TaskId;
use super::outcome::TaskResult;
use super::state::Lifecycle;

/// ストアがイベントを拒否する理由。ストアは変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{event} event carries no task identifier")]
    MissingIdentifier { event: EventKind },

    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("task {0} already exists")]
    DuplicateTask(TaskId),

    #[error("{event} is not allowed for task {id} in {from}")]
    InvalidTransition {
        id: TaskId,
        from: Lifecycle,
        event: EventKind,
    },
}

/// パターンを具体的なパスに解決できなかった
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no match for `{pattern}` in {}", dir.display())]
    NoMatch { pattern: String, dir: PathBuf },

    #[error("`{pattern}` matched {count} paths, expected exactly one")]
    Ambiguous { pattern: String, count: usize },

    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("I/O error while resolving `{pattern}`: {source}")]
    Io {
        pattern: String,
        #[source]
        source: std::io::Error,
    },
}

/// operation 本体が報告した失敗
#[derive(Debug, Error)]
pub enum OperationError {
    /// 自由形式の失敗。メッセージそのものを表示する
    #[error("{0}")]
    Failed(String),

    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OperationError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// 出力の検査で見つかった問題。エンジンは警告として吸収し、
/// タスクを失敗させない。
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("resolved output is missing")]
    NullOutput,

    #[error("no recorded fingerprint for {}", path.display())]
    Unrecorded { path: PathBuf },

    #[error("fingerprint mismatch for {}: {detail}", path.display())]
    Fingerprint { path: PathBuf, detail: String },

    #[error("manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// タスクを終わらせた協調者（または原因）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Resolution,
    Operation,
    Cancelled,
    Store,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Resolution => "resolution",
            Self::Operation => "operation",
            Self::Cancelled => "cancelled",
            Self::Store => "store",
        };
        f.write_str(s)
    }
}

/// 失敗した 1 つのタスクインスタンス
///
/// `reason` は元のエラーのメッセージそのまま。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("task {name} ({task_id}) failed during {stage}: {reason}")]
pub struct TaskFailure {
    pub task_id: TaskId,
    pub name: String,
    /// 失敗したときのステージ
    pub stage: Lifecycle,
    pub kind: FailureKind,
    pub reason: String,
}

/// pipeline の invoke の失敗
///
/// `completed` には完了したタスクの結果が宣言順に残る。
/// 呼び出し側はどこまで進んだかを確認できる。
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", describe(.failures))]
pub struct PipelineFailure {
    pub completed: Vec<TaskResult>,
    pub failures: Vec<TaskFailure>,
}

impl PipelineFailure {
    pub fn single(completed: Vec<TaskResult>, failure: TaskFailure) -> Self {
        Self {
            completed,
            failures: vec![failure],
        }
    }

    /// 宣言順で最初の失敗
    pub fn first(&self) -> Option<&TaskFailure> {
        self.failures.first()
    }
}

fn describe(failures: &[TaskFailure]) -> String {
    match failures {
        [] => "pipeline failed".to_string(),
        [one] => one.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
