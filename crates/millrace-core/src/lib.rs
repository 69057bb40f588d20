//! millrace-core
//!
//! millrace のファイルパイプラインを組み立てる中核部品。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, descriptor, state, events, outcome, errors）
//! - **store**: 純粋な reducer (`TaskStore`) と共有ストア (`SharedStore`)
//! - **ports**: 抽象化レイヤー（Resolver, Operation, Validator, EventSink, Clock, IdGenerator）
//! - **impls**: ports の実装（glob, shell, fingerprint, sinks）
//! - **app**: エンジン、pipeline 合成、設定、builder

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod store;

#[cfg(test)]
mod testing;

pub use app::{EngineBuilder, EngineConfig, LifecycleEngine, Pipeline, join, parallel};
pub use domain::{
    Lifecycle, PipelineFailure, Resolved, TaskDescriptor, TaskFailure, TaskId, TaskResult,
    ValidationMode,
};
pub use ports::{Operation, OperationContext, operation_fn};
pub use store::SharedStore;
