//! App - アプリケーション層
//!
//! ports を組み合わせてタスクを駆動する。
//!
//! # 主要コンポーネント
//! - **EngineBuilder**: エンジンの構築とワイヤリング
//! - **LifecycleEngine**: 1 インスタンスをライフサイクルに沿って実行
//! - **Pipeline**: task / join / parallel の合成
//! - **EngineConfig**: プロセス全体の設定（TOML）

pub mod builder;
pub mod config;
pub mod engine;
pub mod pipeline;

pub use self::builder::{BuildError, EngineBuilder};
pub use self::config::{ConfigError, EngineConfig};
pub use self::engine::LifecycleEngine;
pub use self::pipeline::{Pipeline, TaskLeaf, join, parallel};
