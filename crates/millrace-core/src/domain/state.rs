//! State - タスクインスタンスのライフサイクル状態と遷移関数
//!
//! # 状態遷移（前進のみ）
//! - Created -> ResolvingInput -> RunningOperation -> ResolvingOutput
//!   -> ValidatingOutput -> Validated
//! - Created -> RunningOperation（input を宣言しないタスク）
//! - (Created | ResolvingInput) -> CheckingResumable -> RunningOperation
//!   （`before` モードで前回の出力を確認する場合）
//! - 終端以外 -> Failed
//!
//! 各ステージは `start_*` イベントで入り、対応する `success_*` で閉じる。
//! `settled` はその success が適用済みかどうか。次のステージは適用済みに
//! なってからしか始められない。

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::StoreError;
use super::events::TaskEvent;
use super::ids::TaskId;
use super::resolved::Resolved;

/// Lifecycle はタスクインスタンスのステージ（宣言順 = 前進順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    Created,
    ResolvingInput,
    CheckingResumable,
    RunningOperation,
    ResolvingOutput,
    ValidatingOutput,
    /// 終端（成功）
    Validated,
    /// 終端（失敗）
    Failed,
}

impl Lifecycle {
    /// 終端状態か（これ以上遷移しない）
    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::Validated | Lifecycle::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::ResolvingInput => "RESOLVING_INPUT",
            Self::CheckingResumable => "CHECKING_RESUMABLE",
            Self::RunningOperation => "RUNNING_OPERATION",
            Self::ResolvingOutput => "RESOLVING_OUTPUT",
            Self::ValidatingOutput => "VALIDATING_OUTPUT",
            Self::Validated => "VALIDATED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TaskState は 1 インスタンスの現在の状態
///
/// その場で書き換えない。`apply` が次の状態を返し、ストアが差し替える。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub id: TaskId,
    pub name: String,
    pub input: Option<String>,
    pub output: Option<String>,
    pub status: Lifecycle,

    /// input 解決の成功時にセット
    pub resolved_input: Option<Resolved>,

    /// output 解決の成功時にセット
    pub resolved_output: Option<Resolved>,

    /// 実行前の時点で出力が記録済みの fingerprint と一致していたか
    pub resumable: bool,

    /// 実行前チェックで吸収した問題
    pub resume_warning: Option<String>,

    /// 検証が問題なく通ったら true。問題を `validation_warning` に吸収した
    /// 場合は false のまま。
    pub validated: bool,

    /// 失敗にせず吸収した検証の問題
    pub validation_warning: Option<String>,

    /// Failed になった理由
    pub failure: Option<String>,

    pub created_at: DateTime<Utc>,

    /// 作成時に設定からスナップショットした作業ディレクトリ
    pub dir: PathBuf,

    /// 現在のステージの success イベントが適用済みか
    pub settled: bool,
}

impl TaskState {
    pub(crate) fn new(
        id: TaskId,
        name: String,
        input: Option<String>,
        output: Option<String>,
        dir: PathBuf,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            input,
            output,
            status: Lifecycle::Created,
            resolved_input: None,
            resolved_output: None,
            resumable: false,
            resume_warning: None,
            validated: false,
            validation_warning: None,
            failure: None,
            created_at,
            dir,
            settled: true,
        }
    }

    /// 純粋な遷移: `event` 適用後の状態、または許されない理由
    ///
    /// `Create` はストアが扱う。ここに来るのは id が既に存在するとき。
    pub fn apply(&self, event: &TaskEvent) -> Result<Self, StoreError> {
        use Lifecycle as L;

        if let TaskEvent::Create { .. } = event {
            return Err(StoreError::DuplicateTask(self.id));
        }
        if self.status.is_terminal() {
            return Err(self.rejected(event));
        }

        let mut next = self.clone();
        match event {
            TaskEvent::StartResolveInput { .. }
                if self.status == L::Created && self.input.is_some() =>
            {
                next.begin(L::ResolvingInput);
            }
            TaskEvent::SuccessResolveInput { resolved, .. }
                if self.in_flight(L::ResolvingInput) =>
            {
                next.resolved_input = Some(resolved.clone());
                next.settled = true;
            }
            TaskEvent::StartCheckResumable { .. }
                if self.status != L::CheckingResumable
                    && self.may_start_operation()
                    && self.output.is_some() =>
            {
                next.begin(L::CheckingResumable);
            }
            TaskEvent::SuccessCheckResumable {
                resumable, warning, ..
            } if self.in_flight(L::CheckingResumable) => {
                next.resumable = *resumable;
                next.resume_warning = warning.clone();
                next.settled = true;
            }
            TaskEvent::StartOperation { .. } if self.may_start_operation() => {
                next.begin(L::RunningOperation);
            }
            TaskEvent::SuccessOperation { .. } if self.in_flight(L::RunningOperation) => {
                next.settled = true;
            }
            TaskEvent::StartResolveOutput { .. } if self.closed(L::RunningOperation) => {
                next.begin(L::ResolvingOutput);
            }
            TaskEvent::SuccessResolveOutput { resolved, .. }
                if self.in_flight(L::ResolvingOutput) =>
            {
                next.resolved_output = resolved.clone();
                next.settled = true;
            }
            TaskEvent::StartValidatingOutput { .. } if self.closed(L::ResolvingOutput) => {
                next.begin(L::ValidatingOutput);
            }
            TaskEvent::SuccessValidatingOutput { warning, .. }
                if self.in_flight(L::ValidatingOutput) =>
            {
                next.status = L::Validated;
                next.validated = warning.is_none();
                next.validation_warning = warning.clone();
                next.settled = true;
            }
            TaskEvent::Fail { reason, .. } => {
                next.status = L::Failed;
                next.failure = Some(reason.clone());
                next.settled = true;
            }
            _ => return Err(self.rejected(event)),
        }
        Ok(next)
    }

    fn begin(&mut self, stage: Lifecycle) {
        self.status = stage;
        self.settled = false;
    }

    fn in_flight(&self, stage: Lifecycle) -> bool {
        self.status == stage && !self.settled
    }

    fn closed(&self, stage: Lifecycle) -> bool {
        self.status == stage && self.settled
    }

    fn may_start_operation(&self) -> bool {
        match self.status {
            Lifecycle::Created => self.input.is_none(),
            Lifecycle::ResolvingInput | Lifecycle::CheckingResumable => self.settled,
            _ => false,
        }
    }

    fn rejected(&self, event: &TaskEvent) -> StoreError {
        StoreError::InvalidTransition {
            id: self.id,
            from: self.status,
            event: event.kind(),
        }
    }
}
