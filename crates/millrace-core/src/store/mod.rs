//! Store - 純粋な reducer としてのタスクレジストリ
//!
//! `TaskStore::apply` は書き換えない。次のストアを返し、触らなかった
//! エントリは前のストアと共有する。`SharedStore` は「現在のストア」を持つ
//! 唯一の場所で、書き込みを直列化する。
//!
//! ストアは 1 回の pipeline 実行の間だけ生きる。実行が終われば丸ごと捨てる。

mod shared;

pub use self::shared::SharedStore;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{Lifecycle, StoreError, TaskEvent, TaskId, TaskState};

/// TaskStore はこれまでに登録された全タスクインスタンスの不変スナップショット
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskStore {
    tasks: HashMap<TaskId, Arc<TaskState>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// イベントを 1 つ適用して次のストアを返す
    ///
    /// エラー時は `self` がそのまま有効。部分的な適用はない。
    pub fn apply(&self, event: &TaskEvent) -> Result<Self, StoreError> {
        let id = event.id();
        if id.is_nil() {
            return Err(StoreError::MissingIdentifier {
                event: event.kind(),
            });
        }

        let next = match (event, self.tasks.get(&id)) {
            (TaskEvent::Create { .. }, Some(_)) => return Err(StoreError::DuplicateTask(id)),
            (
                TaskEvent::Create {
                    name,
                    input,
                    output,
                    dir,
                    created_at,
                    ..
                },
                None,
            ) => TaskState::new(
                id,
                name.clone(),
                input.clone(),
                output.clone(),
                dir.clone(),
                *created_at,
            ),
            (_, Some(current)) => current.apply(event)?,
            (_, None) => return Err(StoreError::UnknownTask(id)),
        };

        let mut tasks = self.tasks.clone();
        tasks.insert(id, Arc::new(next));
        Ok(Self { tasks })
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskState> {
        self.tasks.get(&id).map(Arc::as_ref)
    }

    /// エントリへの共有ハンドル（後続イベントの後も有効）
    pub fn entry(&self, id: TaskId) -> Option<Arc<TaskState>> {
        self.tasks.get(&id).cloned()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskState> {
        self.tasks.values().map(Arc::as_ref)
    }

    /// ライフサイクルのステージ別件数
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in self.iter() {
            match task.status {
                Lifecycle::Created => counts.created += 1,
                Lifecycle::ResolvingInput
                | Lifecycle::CheckingResumable
                | Lifecycle::RunningOperation
                | Lifecycle::ResolvingOutput
                | Lifecycle::ValidatingOutput => counts.running += 1,
                Lifecycle::Validated => counts.validated += 1,
                Lifecycle::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub created: usize,
    /// input 解決から検証までのどこか
    pub running: usize,
    pub validated: usize,
    pub failed: usize,
}
