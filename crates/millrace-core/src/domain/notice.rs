//! Notice - 人間向けの進捗・警告メッセージ

use serde::{Deserialize, Serialize};

use super::ids::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Progress,
    Warning,
    Failure,
}

/// `EventSink` に渡す 1 件のメッセージ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNotice {
    pub kind: NoticeKind,
    pub task_id: TaskId,
    pub task_name: String,
    pub message: String,
}

impl TaskNotice {
    pub fn progress(task_id: TaskId, task_name: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Progress, task_id, task_name, message)
    }

    pub fn warning(task_id: TaskId, task_name: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Warning, task_id, task_name, message)
    }

    pub fn failure(task_id: TaskId, task_name: &str, message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Failure, task_id, task_name, message)
    }

    fn new(kind: NoticeKind, task_id: TaskId, task_name: &str, message: impl Into<String>) -> Self {
        Self {
            kind,
            task_id,
            task_name: task_name.to_string(),
            message: message.into(),
        }
    }
}
