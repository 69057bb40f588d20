//! LifecycleEngine - 1 つのタスクインスタンスをライフサイクルに沿って駆動する
//!
//! 流れ（各ステージ: start イベント → 協調者を await → success か fail）:
//! 1. id 採番 → `Create`
//! 2. input があれば resolve（なければスキップ）
//! 3. `before` モードなら、実行前に前回の出力を fingerprint と照合
//! 4. operation 実行
//! 5. output resolve（pattern がなければ resolver は呼ばない）
//! 6. output validation（ソフト。問題は警告として吸収）
//!
//! 自動リトライはしない。再実行は pipeline を再度 invoke すること。
//!
//! 状態はエンジンではなく呼び出し側が渡す `SharedStore` に書く。
//! 1 回の pipeline 実行につき 1 つのストア。

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::app::config::EngineConfig;
use crate::app::pipeline::{Pipeline, TaskLeaf};
use crate::domain::{
    FailureKind, Lifecycle, StoreError, TaskDescriptor, TaskEvent, TaskFailure, TaskId,
    TaskNotice, TaskResult, TaskState, ValidationMode, ValidationReport,
};
use crate::ports::{Clock, EventSink, IdGenerator, Operation, OperationContext, Resolver, Validator};
use crate::store::SharedStore;

pub struct LifecycleEngine {
    pub(crate) config: EngineConfig,
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) validator: Arc<dyn Validator>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

/// 駆動中のインスタンス
struct Instance<'a> {
    id: TaskId,
    name: &'a str,
    store: &'a SharedStore,
}

impl LifecycleEngine {
    /// `descriptor` のもとで `operation` を実行する葉 pipeline
    ///
    /// 葉を invoke するたびに新しいタスクインスタンスが作られる。
    pub fn task(
        self: &Arc<Self>,
        descriptor: TaskDescriptor,
        operation: impl Operation + 'static,
    ) -> Pipeline {
        self.task_shared(descriptor, Arc::new(operation))
    }

    pub fn task_shared(
        self: &Arc<Self>,
        descriptor: TaskDescriptor,
        operation: Arc<dyn Operation>,
    ) -> Pipeline {
        Pipeline::Task(TaskLeaf::new(descriptor, operation, Arc::clone(self)))
    }

    /// `descriptor` の新しいインスタンスを VALIDATED か FAILED まで進める
    pub async fn run(
        &self,
        store: &SharedStore,
        descriptor: &TaskDescriptor,
        operation: &dyn Operation,
    ) -> Result<TaskResult, TaskFailure> {
        self.run_with_cancel(store, descriptor, operation, &CancellationToken::new())
            .await
    }

    /// `run` と同じだが、`cancel` が発火したら次の await で諦める
    ///
    /// 実行中の協調者呼び出しは drop され、タスクは
    /// `FailureKind::Cancelled` で失敗する。
    pub async fn run_with_cancel(
        &self,
        store: &SharedStore,
        descriptor: &TaskDescriptor,
        operation: &dyn Operation,
        cancel: &CancellationToken,
    ) -> Result<TaskResult, TaskFailure> {
        let task = Instance {
            id: self.ids.generate_task_id(),
            name: &descriptor.name,
            store,
        };

        let created = self.apply(
            &task,
            TaskEvent::create(
                task.id,
                descriptor,
                self.config.work_dir.clone(),
                self.clock.now(),
            ),
        )?;
        let dir = created.dir.clone();
        self.progress(&task, "created");

        // input
        let resolved_input = match descriptor.input.as_deref() {
            Some(pattern) => {
                self.apply(&task, TaskEvent::StartResolveInput { id: task.id })?;
                self.progress(&task, format!("resolving input `{pattern}`"));
                let resolved = self
                    .stage(
                        &task,
                        Lifecycle::ResolvingInput,
                        FailureKind::Resolution,
                        cancel,
                        self.resolver.resolve(&dir, pattern),
                    )
                    .await?;
                self.apply(
                    &task,
                    TaskEvent::SuccessResolveInput {
                        id: task.id,
                        resolved: resolved.clone(),
                    },
                )?;
                self.progress(&task, format!("input resolved ({} path(s))", resolved.len()));
                Some(resolved)
            }
            None => None,
        };

        // previous output
        let mode = self.config.validation_mode;
        if let (ValidationMode::Before, Some(pattern)) = (mode, descriptor.output.as_deref()) {
            self.check_resumable(&task, &dir, pattern, cancel).await?;
        }

        // operation
        self.apply(&task, TaskEvent::StartOperation { id: task.id })?;
        self.progress(&task, "running operation");
        let ctx = OperationContext {
            task_id: task.id,
            name: task.name.to_string(),
            dir: dir.clone(),
            input: resolved_input.clone(),
        };
        let output = self
            .stage(
                &task,
                Lifecycle::RunningOperation,
                FailureKind::Operation,
                cancel,
                operation.run(ctx),
            )
            .await?;
        self.apply(&task, TaskEvent::SuccessOperation { id: task.id })?;
        self.progress(&task, "operation finished");

        // output
        self.apply(&task, TaskEvent::StartResolveOutput { id: task.id })?;
        let resolved_output = match descriptor.output.as_deref() {
            Some(pattern) => {
                self.progress(&task, format!("resolving output `{pattern}`"));
                let resolved = self
                    .stage(
                        &task,
                        Lifecycle::ResolvingOutput,
                        FailureKind::Resolution,
                        cancel,
                        self.resolver.resolve(&dir, pattern),
                    )
                    .await?;
                Some(resolved)
            }
            None => None,
        };
        self.apply(
            &task,
            TaskEvent::SuccessResolveOutput {
                id: task.id,
                resolved: resolved_output.clone(),
            },
        )?;

        // validation
        self.apply(&task, TaskEvent::StartValidatingOutput { id: task.id })?;
        self.progress(&task, format!("validating output (mode {mode})"));
        // before モードの照合は実行前に済んでいる。実行後は存在だけ確認する。
        let after_run = match mode {
            ValidationMode::Before => ValidationMode::Off,
            other => other,
        };
        let checked = guarded(
            cancel,
            self.validator.validate(&dir, resolved_output.as_ref(), after_run),
        )
        .await;
        let warning = match checked {
            None => return Err(self.cancelled(&task, Lifecycle::ValidatingOutput)),
            Some(Ok(report)) if report.validated => None,
            Some(Ok(_)) => Some("output was not validated".to_string()),
            Some(Err(err)) => Some(err.to_string()),
        };
        if let Some(warning) = &warning {
            self.warn(&task, format!("validation: {warning}"));
        }
        self.apply(
            &task,
            TaskEvent::SuccessValidatingOutput {
                id: task.id,
                warning,
            },
        )?;
        self.progress(&task, "validated");

        Ok(TaskResult {
            task_id: task.id,
            name: task.name.to_string(),
            output,
            resolved_input,
            resolved_output,
            validation: ValidationReport::accepted(),
        })
    }

    /// 前回の実行が残した出力を、記録済みの fingerprint と照合する
    ///
    /// 検証と同じくソフト。照合できなくてもタスクは失敗せず、結果は
    /// `resumable` / `resume_warning` に残る。キャンセルだけは失敗になる。
    async fn check_resumable(
        &self,
        task: &Instance<'_>,
        dir: &Path,
        pattern: &str,
        cancel: &CancellationToken,
    ) -> Result<(), TaskFailure> {
        self.apply(task, TaskEvent::StartCheckResumable { id: task.id })?;
        self.progress(task, format!("checking previous output `{pattern}`"));

        let resolved = match guarded(cancel, self.resolver.resolve(dir, pattern)).await {
            None => return Err(self.cancelled(task, Lifecycle::CheckingResumable)),
            Some(resolved) => resolved,
        };
        let warning = match resolved {
            Err(err) => Some(format!("could not resolve output before running: {err}")),
            Ok(previous) => {
                let checked = guarded(
                    cancel,
                    self.validator
                        .validate(dir, Some(&previous), ValidationMode::Before),
                )
                .await;
                match checked {
                    None => return Err(self.cancelled(task, Lifecycle::CheckingResumable)),
                    Some(Ok(report)) if report.validated => None,
                    Some(Ok(_)) => Some("previous output was not validated".to_string()),
                    Some(Err(err)) => Some(err.to_string()),
                }
            }
        };

        match &warning {
            Some(warning) => self.warn(task, format!("before running: {warning}")),
            None => self.progress(task, "previous output matches recorded fingerprints"),
        }
        self.apply(
            task,
            TaskEvent::SuccessCheckResumable {
                id: task.id,
                resumable: warning.is_none(),
                warning,
            },
        )?;
        Ok(())
    }

    /// 協調者を 1 つ await する。失敗かキャンセルならタスクを失敗させる。
    async fn stage<T, E, F>(
        &self,
        task: &Instance<'_>,
        stage: Lifecycle,
        kind: FailureKind,
        cancel: &CancellationToken,
        fut: F,
    ) -> Result<T, TaskFailure>
    where
        E: std::fmt::Display,
        F: Future<Output = Result<T, E>>,
    {
        match guarded(cancel, fut).await {
            Some(Ok(value)) => Ok(value),
            Some(Err(err)) => Err(self.fail(task, stage, kind, err.to_string())),
            None => Err(self.cancelled(task, stage)),
        }
    }

    fn apply(&self, task: &Instance<'_>, event: TaskEvent) -> Result<Arc<TaskState>, TaskFailure> {
        task.store
            .dispatch(&event)
            .map_err(|err| self.store_failure(task, err))
    }

    fn fail(
        &self,
        task: &Instance<'_>,
        stage: Lifecycle,
        kind: FailureKind,
        reason: String,
    ) -> TaskFailure {
        if let Err(err) = task.store.dispatch(&TaskEvent::fail(task.id, reason.clone())) {
            return self.store_failure(task, err);
        }
        self.sink.emit(&TaskNotice::failure(
            task.id,
            task.name,
            format!("{stage} failed: {reason}"),
        ));
        TaskFailure {
            task_id: task.id,
            name: task.name.to_string(),
            stage,
            kind,
            reason,
        }
    }

    fn cancelled(&self, task: &Instance<'_>, stage: Lifecycle) -> TaskFailure {
        self.fail(task, stage, FailureKind::Cancelled, "cancelled".to_string())
    }

    fn store_failure(&self, task: &Instance<'_>, err: StoreError) -> TaskFailure {
        let stage = task
            .store
            .get(task.id)
            .map(|state| state.status)
            .unwrap_or(Lifecycle::Created);
        let reason = err.to_string();
        self.sink.emit(&TaskNotice::failure(task.id, task.name, reason.clone()));
        TaskFailure {
            task_id: task.id,
            name: task.name.to_string(),
            stage,
            kind: FailureKind::Store,
            reason,
        }
    }

    fn progress(&self, task: &Instance<'_>, message: impl Into<String>) {
        self.sink
            .emit(&TaskNotice::progress(task.id, task.name, message));
    }

    fn warn(&self, task: &Instance<'_>, message: impl Into<String>) {
        self.sink
            .emit(&TaskNotice::warning(task.id, task.name, message));
    }
}

/// `cancel` が先に発火したら `None`
async fn guarded<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::builder::EngineBuilder;
    use crate::domain::{NoticeKind, OperationError, Resolved, ValidationMode};
    use crate::impls::{FingerprintValidator, GlobResolver, RecordingEventSink};
    use crate::ports::operation_fn;
    use crate::testing::{
        CountingOperation, FixedValidator, FixedIdGenerator, StaticResolver, test_engine,
    };
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn task_without_input_skips_input_resolution() {
        let resolver = StaticResolver::new().with("*.out", Resolved::single("/work/a.out"));
        let (engine, _sink) = test_engine(resolver.clone(), FixedValidator::accepting());
        let store = SharedStore::new();
        let observer = store.clone();

        let op = operation_fn(move |ctx: OperationContext| {
            let store = observer.clone();
            async move {
                let state = store.get(ctx.task_id).expect("task registered");
                assert_eq!(state.status, Lifecycle::RunningOperation);
                assert_eq!(state.resolved_input, None);
                assert_eq!(ctx.input, None);
                Ok(json!("ran"))
            }
        });

        let result = engine
            .run(&store, &TaskDescriptor::new("t").with_output("*.out"), &op)
            .await
            .unwrap();

        assert_eq!(result.resolved_input, None);
        assert_eq!(resolver.calls(), vec!["*.out".to_string()]);
    }

    #[tokio::test]
    async fn resolved_input_reaches_operation_and_state() {
        let resolver = StaticResolver::new()
            .with("*.pids", Resolved::single("/work/1.pids"))
            .with("*.txt", Resolved::single("/work/1.txt"));
        let (engine, _sink) = test_engine(resolver, FixedValidator::accepting());
        let store = SharedStore::new();

        let op = operation_fn(|ctx: OperationContext| async move {
            Ok(json!(ctx.input.map(|i| i.len()).unwrap_or(0)))
        });
        let descriptor = TaskDescriptor::new("convert")
            .with_input("*.pids")
            .with_output("*.txt");

        let result = engine.run(&store, &descriptor, &op).await.unwrap();

        assert_eq!(result.output, json!(1));
        assert_eq!(result.resolved_input, Some(Resolved::single("/work/1.pids")));
        let state = store.get(result.task_id).unwrap();
        assert_eq!(state.status, Lifecycle::Validated);
        assert_eq!(state.resolved_output, Some(Resolved::single("/work/1.txt")));
    }

    #[tokio::test]
    async fn input_resolution_failure_fails_task_before_operation() {
        let (engine, sink) = test_engine(StaticResolver::new(), FixedValidator::accepting());
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!(null));
        let descriptor = TaskDescriptor::new("convert").with_input("*.pids");

        let failure = engine.run(&store, &descriptor, &op).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Resolution);
        assert_eq!(failure.stage, Lifecycle::ResolvingInput);
        assert!(failure.reason.contains("*.pids"));
        assert_eq!(op.runs(), 0);
        let state = store.get(failure.task_id).unwrap();
        assert_eq!(state.status, Lifecycle::Failed);
        assert_eq!(sink.of_kind(NoticeKind::Failure).len(), 1);
    }

    #[tokio::test]
    async fn operation_failure_keeps_original_message() {
        let (engine, _sink) = test_engine(StaticResolver::new(), FixedValidator::accepting());
        let store = SharedStore::new();
        let op = CountingOperation::failing("disk full");

        let failure = engine.run(&store, &TaskDescriptor::new("t1"), &op).await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::Operation);
        assert_eq!(failure.stage, Lifecycle::RunningOperation);
        assert_eq!(failure.reason, "disk full");
        assert_eq!(failure.name, "t1");
        let state = store.get(failure.task_id).unwrap();
        assert_eq!(state.failure.as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn output_resolution_failure_fails_task() {
        let (engine, _sink) = test_engine(StaticResolver::new(), FixedValidator::accepting());
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!(null));

        let failure = engine
            .run(&store, &TaskDescriptor::new("t").with_output("*.out"), &op)
            .await
            .unwrap_err();

        assert_eq!(failure.stage, Lifecycle::ResolvingOutput);
        assert_eq!(op.runs(), 1);
    }

    #[tokio::test]
    async fn validator_error_is_absorbed_as_warning() {
        let resolver = StaticResolver::new().with("*.out", Resolved::single("/work/a.out"));
        let (engine, sink) = test_engine(resolver, FixedValidator::erroring());
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!("done"));

        let result = engine
            .run(&store, &TaskDescriptor::new("t").with_output("*.out"), &op)
            .await
            .unwrap();

        assert_eq!(result.validation, ValidationReport::accepted());
        let state = store.get(result.task_id).unwrap();
        assert_eq!(state.status, Lifecycle::Validated);
        assert!(!state.validated);
        assert!(state.validation_warning.is_some());
        assert_eq!(sink.of_kind(NoticeKind::Warning).len(), 1);
    }

    #[tokio::test]
    async fn rejected_report_is_absorbed_as_warning() {
        let resolver = StaticResolver::new().with("*.out", Resolved::single("/work/a.out"));
        let (engine, sink) = test_engine(resolver, FixedValidator::rejecting());
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!("done"));

        let result = engine
            .run(&store, &TaskDescriptor::new("t").with_output("*.out"), &op)
            .await
            .unwrap();

        assert!(result.validation.validated);
        assert!(result.validation.validations.is_empty());
        let state = store.get(result.task_id).unwrap();
        assert_eq!(
            state.validation_warning.as_deref(),
            Some("output was not validated")
        );
        assert_eq!(sink.of_kind(NoticeKind::Warning).len(), 1);
    }

    #[tokio::test]
    async fn missing_output_pattern_still_validates() {
        let resolver = StaticResolver::new();
        let (engine, _sink) = test_engine(resolver.clone(), FixedValidator::accepting());
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!(null));

        let result = engine.run(&store, &TaskDescriptor::new("t"), &op).await.unwrap();

        assert_eq!(result.resolved_output, None);
        assert!(resolver.calls().is_empty());
        assert_eq!(
            store.get(result.task_id).unwrap().status,
            Lifecycle::Validated
        );
    }

    #[tokio::test]
    async fn cancellation_fails_task_and_drops_operation() {
        let (engine, _sink) = test_engine(StaticResolver::new(), FixedValidator::accepting());
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!(null)).with_delay(Duration::from_secs(30));
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let failure = engine
            .run_with_cancel(&store, &TaskDescriptor::new("slow"), &op, &cancel)
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::Cancelled);
        assert_eq!(failure.stage, Lifecycle::RunningOperation);
        assert_eq!(op.finished(), 0);
        assert_eq!(
            store.get(failure.task_id).unwrap().status,
            Lifecycle::Failed
        );
    }

    #[tokio::test]
    async fn store_rejection_surfaces_as_store_failure() {
        let engine = EngineBuilder::new()
            .resolver(StaticResolver::new())
            .validator(FixedValidator::accepting())
            .sink(RecordingEventSink::new())
            .id_generator(FixedIdGenerator::new())
            .build()
            .unwrap();
        let store = SharedStore::new();
        let op = CountingOperation::ok(json!(null));

        engine.run(&store, &TaskDescriptor::new("first"), &op).await.unwrap();
        let failure = engine
            .run(&store, &TaskDescriptor::new("second"), &op)
            .await
            .unwrap_err();

        assert_eq!(failure.kind, FailureKind::Store);
        assert!(failure.reason.contains("already exists"));
        assert_eq!(op.runs(), 1);
    }

    #[tokio::test]
    async fn end_to_end_with_glob_resolver_and_fingerprints() {
        let dir = tempdir().unwrap();
        let sink = RecordingEventSink::new();
        let engine = EngineBuilder::new()
            .config(
                EngineConfig::default()
                    .with_work_dir(dir.path())
                    .with_validation_mode(ValidationMode::After),
            )
            .resolver(GlobResolver::new())
            .validator(FingerprintValidator::default())
            .sink(sink.clone())
            .build()
            .unwrap();
        let store = SharedStore::new();

        let op = operation_fn(|ctx: OperationContext| async move {
            tokio::fs::write(ctx.dir.join("result.out"), "42").await?;
            Ok::<_, OperationError>(json!("wrote"))
        });

        let result = engine
            .run(&store, &TaskDescriptor::new("t1").with_output("*.out"), &op)
            .await
            .unwrap();

        assert_eq!(result.output_paths(), &[dir.path().join("result.out")]);
        let state = store.get(result.task_id).unwrap();
        assert_eq!(state.status, Lifecycle::Validated);
        assert_eq!(state.validation_warning, None);
        assert!(dir.path().join("millrace.json").exists());
        assert!(sink.of_kind(NoticeKind::Warning).is_empty());
    }

    fn fingerprint_engine(
        dir: &Path,
        mode: ValidationMode,
        sink: &RecordingEventSink,
    ) -> Arc<LifecycleEngine> {
        EngineBuilder::new()
            .config(
                EngineConfig::default()
                    .with_work_dir(dir)
                    .with_validation_mode(mode),
            )
            .resolver(GlobResolver::new())
            .validator(FingerprintValidator::default())
            .sink(sink.clone())
            .build()
            .unwrap()
    }

    fn writing(body: &'static str) -> impl Operation {
        operation_fn(move |ctx: OperationContext| async move {
            tokio::fs::write(ctx.dir.join("result.out"), body).await?;
            Ok::<_, OperationError>(json!(body))
        })
    }

    #[tokio::test]
    async fn before_mode_checks_previous_output_ahead_of_the_operation() {
        let dir = tempdir().unwrap();
        let descriptor = TaskDescriptor::new("t1").with_output("*.out");

        let recording = RecordingEventSink::new();
        fingerprint_engine(dir.path(), ValidationMode::After, &recording)
            .run(&SharedStore::new(), &descriptor, &writing("42"))
            .await
            .unwrap();

        let sink = RecordingEventSink::new();
        let engine = fingerprint_engine(dir.path(), ValidationMode::Before, &sink);
        let store = SharedStore::new();
        let result = engine
            .run(&store, &descriptor, &writing("43"))
            .await
            .unwrap();

        let state = store.get(result.task_id).unwrap();
        assert_eq!(state.status, Lifecycle::Validated);
        assert!(state.resumable);
        assert_eq!(state.resume_warning, None);
        assert!(state.validated);
        assert_eq!(state.validation_warning, None);
        assert!(sink.of_kind(NoticeKind::Warning).is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("result.out")).unwrap(),
            "43"
        );

        let messages: Vec<String> = sink.notices().into_iter().map(|n| n.message).collect();
        let checked = messages
            .iter()
            .position(|m| m == "previous output matches recorded fingerprints")
            .unwrap();
        let ran = messages.iter().position(|m| m == "running operation").unwrap();
        assert!(checked < ran, "{messages:?}");
    }

    #[tokio::test]
    async fn before_mode_without_previous_output_still_runs() {
        let dir = tempdir().unwrap();
        let sink = RecordingEventSink::new();
        let engine = fingerprint_engine(dir.path(), ValidationMode::Before, &sink);
        let store = SharedStore::new();

        let result = engine
            .run(
                &store,
                &TaskDescriptor::new("t1").with_output("*.out"),
                &writing("42"),
            )
            .await
            .unwrap();

        let state = store.get(result.task_id).unwrap();
        assert_eq!(state.status, Lifecycle::Validated);
        assert!(!state.resumable);
        assert!(
            state
                .resume_warning
                .as_deref()
                .is_some_and(|w| w.starts_with("could not resolve output before running"))
        );
        assert!(state.validated);
        assert_eq!(result.output_paths(), &[dir.path().join("result.out")]);
        assert_eq!(sink.of_kind(NoticeKind::Warning).len(), 1);
        assert!(!dir.path().join("millrace.json").exists());
    }

    #[tokio::test]
    async fn before_mode_reports_changed_previous_output() {
        let dir = tempdir().unwrap();
        let descriptor = TaskDescriptor::new("t1").with_output("*.out");
        let recording = RecordingEventSink::new();
        fingerprint_engine(dir.path(), ValidationMode::After, &recording)
            .run(&SharedStore::new(), &descriptor, &writing("42"))
            .await
            .unwrap();
        std::fs::write(dir.path().join("result.out"), "edited by hand").unwrap();

        let sink = RecordingEventSink::new();
        let store = SharedStore::new();
        let result = fingerprint_engine(dir.path(), ValidationMode::Before, &sink)
            .run(&store, &descriptor, &writing("43"))
            .await
            .unwrap();

        let state = store.get(result.task_id).unwrap();
        assert!(!state.resumable);
        assert!(
            state
                .resume_warning
                .as_deref()
                .is_some_and(|w| w.contains("content hash differs"))
        );
        assert_eq!(state.status, Lifecycle::Validated);
    }

    #[tokio::test]
    async fn before_mode_skips_check_without_output_pattern() {
        let resolver = StaticResolver::new();
        let sink = RecordingEventSink::new();
        let engine = EngineBuilder::new()
            .config(EngineConfig::default().with_validation_mode(ValidationMode::Before))
            .resolver(resolver.clone())
            .validator(FixedValidator::accepting())
            .sink(sink.clone())
            .build()
            .unwrap();
        let store = SharedStore::new();

        let result = engine
            .run(&store, &TaskDescriptor::new("t"), &CountingOperation::ok(json!(null)))
            .await
            .unwrap();

        assert!(resolver.calls().is_empty());
        assert!(!store.get(result.task_id).unwrap().resumable);
    }
}
