//! Events - タスクインスタンスへの型付き遷移リクエスト
//!
//! `TaskState` の変更はすべてこの enum のどれかを通り、`domain::state` /
//! `store` の reducer で適用される。文字列でのディスパッチはしない。

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::descriptor::TaskDescriptor;
use super::ids::TaskId;
use super::resolved::Resolved;

/// TaskEvent はタスクを 1 歩進める（または FAILED にする）リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// 新しいインスタンスを登録する。`dir` と `created_at` は呼び出し側で
    /// 決めておくので、適用は決定的なまま。
    Create {
        id: TaskId,
        name: String,
        input: Option<String>,
        output: Option<String>,
        dir: PathBuf,
        created_at: DateTime<Utc>,
    },
    StartResolveInput {
        id: TaskId,
    },
    SuccessResolveInput {
        id: TaskId,
        resolved: Resolved,
    },
    StartCheckResumable {
        id: TaskId,
    },
    /// `resumable`: 前回の出力が記録済みの fingerprint と一致した
    SuccessCheckResumable {
        id: TaskId,
        resumable: bool,
        warning: Option<String>,
    },
    StartOperation {
        id: TaskId,
    },
    SuccessOperation {
        id: TaskId,
    },
    StartResolveOutput {
        id: TaskId,
    },
    SuccessResolveOutput {
        id: TaskId,
        resolved: Option<Resolved>,
    },
    StartValidatingOutput {
        id: TaskId,
    },
    /// `warning` は吸収した検証の問題（あれば）
    SuccessValidatingOutput {
        id: TaskId,
        warning: Option<String>,
    },
    Fail {
        id: TaskId,
        reason: String,
    },
}

impl TaskEvent {
    pub fn create(
        id: TaskId,
        descriptor: &TaskDescriptor,
        dir: PathBuf,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::Create {
            id,
            name: descriptor.name.clone(),
            input: descriptor.input.clone(),
            output: descriptor.output.clone(),
            dir,
            created_at,
        }
    }

    pub fn fail(id: TaskId, reason: impl Into<String>) -> Self {
        Self::Fail {
            id,
            reason: reason.into(),
        }
    }

    /// このイベントの対象タスク
    pub fn id(&self) -> TaskId {
        match self {
            Self::Create { id, .. }
            | Self::StartResolveInput { id }
            | Self::SuccessResolveInput { id, .. }
            | Self::StartCheckResumable { id }
            | Self::SuccessCheckResumable { id, .. }
            | Self::StartOperation { id }
            | Self::SuccessOperation { id }
            | Self::StartResolveOutput { id }
            | Self::SuccessResolveOutput { id, .. }
            | Self::StartValidatingOutput { id }
            | Self::SuccessValidatingOutput { id, .. }
            | Self::Fail { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Create { .. } => EventKind::Create,
            Self::StartResolveInput { .. } => EventKind::StartResolveInput,
            Self::SuccessResolveInput { .. } => EventKind::SuccessResolveInput,
            Self::StartCheckResumable { .. } => EventKind::StartCheckResumable,
            Self::SuccessCheckResumable { .. } => EventKind::SuccessCheckResumable,
            Self::StartOperation { .. } => EventKind::StartOperation,
            Self::SuccessOperation { .. } => EventKind::SuccessOperation,
            Self::StartResolveOutput { .. } => EventKind::StartResolveOutput,
            Self::SuccessResolveOutput { .. } => EventKind::SuccessResolveOutput,
            Self::StartValidatingOutput { .. } => EventKind::StartValidatingOutput,
            Self::SuccessValidatingOutput { .. } => EventKind::SuccessValidatingOutput,
            Self::Fail { .. } => EventKind::Fail,
        }
    }
}

/// EventKind は `TaskEvent` のペイロードなし判別子（エラーや通知で使う）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Create,
    StartResolveInput,
    SuccessResolveInput,
    StartCheckResumable,
    SuccessCheckResumable,
    StartOperation,
    SuccessOperation,
    StartResolveOutput,
    SuccessResolveOutput,
    StartValidatingOutput,
    SuccessValidatingOutput,
    Fail,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::StartResolveInput => "start_resolve_input",
            Self::SuccessResolveInput => "success_resolve_input",
            Self::StartCheckResumable => "start_check_resumable",
            Self::SuccessCheckResumable => "success_check_resumable",
            Self::StartOperation => "start_operation",
            Self::SuccessOperation => "success_operation",
            Self::StartResolveOutput => "start_resolve_output",
            Self::SuccessResolveOutput => "success_resolve_output",
            Self::StartValidatingOutput => "start_validating_output",
            Self::SuccessValidatingOutput => "success_validating_output",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
