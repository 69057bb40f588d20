//! Sinks - EventSink の実装
//!
//! - TracingEventSink: notice を tracing のイベントとして出す（既定）
//! - NoopEventSink: 何もしない
//! - RecordingEventSink: メモリに溜める（テスト・埋め込み用）

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use crate::domain::{NoticeKind, TaskNotice};
use crate::ports::EventSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, notice: &TaskNotice) {
        match notice.kind {
            NoticeKind::Progress => {
                info!(task_id = %notice.task_id, task = %notice.task_name, "{}", notice.message)
            }
            NoticeKind::Warning => {
                warn!(task_id = %notice.task_id, task = %notice.task_name, "{}", notice.message)
            }
            NoticeKind::Failure => {
                error!(task_id = %notice.task_id, task = %notice.task_name, "{}", notice.message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _notice: &TaskNotice) {}
}

/// 受け取った notice を発行順にメモリに保持する
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    notices: Arc<Mutex<Vec<TaskNotice>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<TaskNotice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn of_kind(&self, kind: NoticeKind) -> Vec<TaskNotice> {
        self.notices()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, notice: &TaskNotice) {
        let mut guard = match self.notices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(notice.clone());
    }
}
