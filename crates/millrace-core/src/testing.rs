//! Testing - engine / pipeline テスト用のテストダブル

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ulid::Ulid;

use crate::app::{EngineBuilder, LifecycleEngine};
use crate::domain::{
    OperationError, ResolutionError, Resolved, TaskId, ValidationError, ValidationMode,
    ValidationReport,
};
use crate::impls::RecordingEventSink;
use crate::ports::{IdGenerator, Operation, OperationContext, Resolver, Validator};

/// 渡されたダブルと記録用 sink でワイヤリングしたエンジン
pub(crate) fn test_engine(
    resolver: impl Resolver + 'static,
    validator: impl Validator + 'static,
) -> (Arc<LifecycleEngine>, RecordingEventSink) {
    let sink = RecordingEventSink::new();
    let engine = EngineBuilder::new()
        .resolver(resolver)
        .validator(validator)
        .sink(sink.clone())
        .build()
        .expect("test engine");
    (engine, sink)
}

/// 登録されたパターンだけを解決する。それ以外は `NoMatch`
#[derive(Clone, Default)]
pub(crate) struct StaticResolver {
    table: HashMap<String, Resolved>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, pattern: &str, resolved: Resolved) -> Self {
        self.table.insert(pattern.to_string(), resolved);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, dir: &Path, pattern: &str) -> Result<Resolved, ResolutionError> {
        self.calls.lock().unwrap().push(pattern.to_string());
        self.table
            .get(pattern)
            .cloned()
            .ok_or_else(|| ResolutionError::NoMatch {
                pattern: pattern.to_string(),
                dir: dir.to_path_buf(),
            })
    }
}

/// operation の開始と終了を順に記録する共有ログ
#[derive(Clone, Default)]
pub(crate) struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }
}

/// 開始回数と完了回数を数える Operation
#[derive(Clone)]
pub(crate) struct CountingOperation {
    result: Result<serde_json::Value, String>,
    delay: Duration,
    runs: Arc<AtomicUsize>,
    finished: Arc<AtomicUsize>,
    journal: Option<Journal>,
}

impl CountingOperation {
    pub(crate) fn ok(value: serde_json::Value) -> Self {
        Self::with_result(Ok(value))
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self::with_result(Err(message.to_string()))
    }

    fn with_result(result: Result<serde_json::Value, String>) -> Self {
        Self {
            result,
            delay: Duration::ZERO,
            runs: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicUsize::new(0)),
            journal: None,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// 開始された回数
    pub(crate) fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// 最後まで走った回数（drop されたものは含まない）
    pub(crate) fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Operation for CountingOperation {
    async fn run(&self, ctx: OperationContext) -> Result<serde_json::Value, OperationError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.push(format!("start {}", ctx.name));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal.push(format!("end {}", ctx.name));
        }
        self.result.clone().map_err(OperationError::Failed)
    }
}

/// 決まった答えを返す Validator
pub(crate) struct FixedValidator {
    answer: Answer,
}

enum Answer {
    Accept,
    Reject,
    Error,
}

impl FixedValidator {
    pub(crate) fn accepting() -> Self {
        Self {
            answer: Answer::Accept,
        }
    }

    pub(crate) fn rejecting() -> Self {
        Self {
            answer: Answer::Reject,
        }
    }

    pub(crate) fn erroring() -> Self {
        Self {
            answer: Answer::Error,
        }
    }
}

#[async_trait]
impl Validator for FixedValidator {
    async fn validate(
        &self,
        dir: &Path,
        _output: Option<&Resolved>,
        _mode: ValidationMode,
    ) -> Result<ValidationReport, ValidationError> {
        match self.answer {
            Answer::Accept => Ok(ValidationReport::accepted()),
            Answer::Reject => Ok(ValidationReport::rejected()),
            Answer::Error => Err(ValidationError::Manifest {
                path: dir.join("millrace.json"),
                message: "corrupt".to_string(),
            }),
        }
    }
}

/// 毎回同じ id を返す
pub(crate) struct FixedIdGenerator {
    id: TaskId,
}

impl FixedIdGenerator {
    pub(crate) fn new() -> Self {
        Self {
            id: TaskId::from_ulid(Ulid::new()),
        }
    }
}

impl IdGenerator for FixedIdGenerator {
    fn generate_task_id(&self) -> TaskId {
        self.id
    }
}
