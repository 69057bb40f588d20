//! Ids - タスクインスタンスの識別子
//!
//! ULID をラップした newtype。ULID は生成時刻順に並ぶので、ストアのダンプや
//! ログが読みやすい。
//!
//! nil ULID（全ビット 0）は「識別子なし」として予約されている。ストアはこれを
//! 持つイベントを拒否する。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// TaskId はタスクインスタンス（タスク定義の 1 回の実行）の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Ulid);

impl TaskId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    /// nil id（識別子なし）
    pub fn nil() -> Self {
        Self(Ulid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}
