//! Domain - ドメインモデル
//!
//! ids, descriptor, lifecycle state, events, outcome, errors。
//! I/O は持たない。純粋なデータと `state` の遷移関数だけ。

pub mod descriptor;
pub mod errors;
pub mod events;
pub mod ids;
pub mod notice;
pub mod outcome;
pub mod resolved;
pub mod state;

pub use self::descriptor::TaskDescriptor;
pub use self::errors::{
    FailureKind, OperationError, PipelineFailure, ResolutionError, StoreError, TaskFailure,
    ValidationError,
};
pub use self::events::{EventKind, TaskEvent};
pub use self::ids::TaskId;
pub use self::notice::{NoticeKind, TaskNotice};
pub use self::outcome::{TaskResult, ValidationMode, ValidationReport};
pub use self::resolved::Resolved;
pub use self::state::{Lifecycle, TaskState};
