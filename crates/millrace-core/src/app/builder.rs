//! EngineBuilder - LifecycleEngine の構築とワイヤリング
//!
//! 協調者（resolver, validator, sink, clock, id generator）を差し込み、
//! 指定がなければ既定の実装を使う。
//!
//! # Fail-fast
//! build() で設定を検査する:
//! - work_dir が存在するディレクトリであること
//! - manifest がファイル名（ディレクトリ区切りなし）であること

use std::path::PathBuf;
use std::sync::Arc;

use crate::app::config::EngineConfig;
use crate::app::engine::LifecycleEngine;
use crate::impls::{FingerprintValidator, GlobResolver, TracingEventSink};
use crate::ports::{Clock, EventSink, IdGenerator, Resolver, SystemClock, UlidGenerator, Validator};

/// # 使用例
/// ```ignore
/// let engine = EngineBuilder::new()
///     .config(EngineConfig::load("millrace.toml")?)
///     .sink(RecordingEventSink::new())
///     .build()?;
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    resolver: Option<Arc<dyn Resolver>>,
    validator: Option<Arc<dyn Validator>>,
    sink: Option<Arc<dyn EventSink>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

/// BuildError はエンジン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("work_dir {} is not an existing directory", .0.display())]
    WorkDir(PathBuf),

    #[error("manifest `{0}` must be a plain file name")]
    Manifest(String),
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// 検証してから LifecycleEngine を生成
    pub fn build(self) -> Result<Arc<LifecycleEngine>, BuildError> {
        if !self.config.work_dir.is_dir() {
            return Err(BuildError::WorkDir(self.config.work_dir));
        }
        let manifest = &self.config.manifest;
        if manifest.is_empty() || manifest.contains(['/', '\\']) {
            return Err(BuildError::Manifest(manifest.clone()));
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));
        let validator = self
            .validator
            .unwrap_or_else(|| Arc::new(FingerprintValidator::new(manifest.clone())));

        Ok(Arc::new(LifecycleEngine {
            config: self.config,
            resolver: self.resolver.unwrap_or_else(|| Arc::new(GlobResolver::new())),
            validator,
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingEventSink)),
            clock,
            ids,
        }))
    }
}
