//! Ports - 抽象化レイヤー
//!
//! Engine が外の世界（ファイルシステム、プロセス、時刻、ログ）に触る境界。
//! 各 trait は `Send + Sync` で、`Arc<dyn ...>` として engine に渡される。

pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod operation;
pub mod resolver;
pub mod validator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::operation::{FnOperation, Operation, OperationContext, operation_fn};
pub use self::resolver::Resolver;
pub use self::validator::Validator;
