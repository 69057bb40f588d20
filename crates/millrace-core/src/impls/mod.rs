//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **GlobResolver**: glob によるパス解決
//! - **ShellOperation**: `sh -c` によるコマンド実行
//! - **FingerprintValidator**: SHA-256 + mtime による出力検証
//! - **TracingEventSink / NoopEventSink / RecordingEventSink**: 通知先

pub mod fingerprint;
pub mod glob_resolver;
pub mod shell;
pub mod sinks;

pub use self::fingerprint::{DEFAULT_MANIFEST, Fingerprint, FingerprintValidator};
pub use self::glob_resolver::GlobResolver;
pub use self::shell::ShellOperation;
pub use self::sinks::{NoopEventSink, RecordingEventSink, TracingEventSink};
