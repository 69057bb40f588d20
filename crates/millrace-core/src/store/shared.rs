//! SharedStore - 並行するタスク間で共有する現在の `TaskStore`
//!
//! `tokio::sync::watch` チャネルで持つ。書き込みはチャネルのロック下で
//! スナップショットを差し替え、読み取りは `Arc` を clone するだけ。

use std::sync::Arc;

use tokio::sync::watch;

use super::TaskStore;
use crate::domain::{StoreError, TaskEvent, TaskId, TaskState};

/// SharedStore はタスク状態への唯一の書き込み口
///
/// clone は安価で、どの clone も同じストアを指す。
#[derive(Debug, Clone)]
pub struct SharedStore {
    tx: Arc<watch::Sender<Arc<TaskStore>>>,
}

impl SharedStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(TaskStore::new()));
        Self { tx: Arc::new(tx) }
    }

    /// `event` をアトミックに適用し、更新後のエントリを返す
    ///
    /// 並行する dispatch は直列化され、それぞれが直前の結果を見る。
    /// 拒否されたイベントはストアを変えず、購読者も起こさない。
    pub fn dispatch(&self, event: &TaskEvent) -> Result<Arc<TaskState>, StoreError> {
        let id = event.id();
        let mut outcome = None;
        self.tx.send_if_modified(|current| match current.apply(event) {
            Ok(next) => {
                outcome = next.entry(id).map(Ok);
                *current = Arc::new(next);
                true
            }
            Err(err) => {
                outcome = Some(Err(err));
                false
            }
        });
        outcome.unwrap_or(Err(StoreError::UnknownTask(id)))
    }

    /// 現在のスナップショット
    pub fn snapshot(&self) -> Arc<TaskStore> {
        self.tx.borrow().clone()
    }

    pub fn get(&self, id: TaskId) -> Option<Arc<TaskState>> {
        self.tx.borrow().entry(id)
    }

    /// イベントが適用されるたびに通知される Receiver
    pub fn subscribe(&self) -> watch::Receiver<Arc<TaskStore>> {
        self.tx.subscribe()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}
