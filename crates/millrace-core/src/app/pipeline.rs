//! Pipeline - task / join / parallel の合成
//!
//! ```ignore
//! let pipeline = join([
//!     engine.task(dump_pids, dump_op),
//!     parallel([
//!         engine.task(to_letters, letters_op),
//!         engine.task(to_hex, hex_op),
//!     ]),
//! ]);
//! let results = pipeline.invoke().await?;
//! ```
//!
//! - `join`: 順番に実行。失敗したらそこで止まる
//! - `parallel`: 全部を同じタスク上で並行に実行し、全部終わるまで待つ（fail-fast しない）
//!
//! 結果はどちらも宣言順（深さ優先）に平坦化される。
//!
//! # ストアの寿命
//! `invoke` / `invoke_with_cancel` は呼び出しごとに新しい `SharedStore` を作り、
//! 終わったら捨てる。実行中や実行後の状態を見たいときは `invoke_in` に
//! 自分のストアを渡す。

use std::fmt;
use std::sync::Arc;

use futures::future::{BoxFuture, join_all};
use tokio_util::sync::CancellationToken;

use crate::app::engine::LifecycleEngine;
use crate::domain::{PipelineFailure, TaskDescriptor, TaskResult};
use crate::ports::Operation;
use crate::store::SharedStore;

/// Pipeline は合成でき、何度でも invoke できる仕事の単位
#[derive(Clone)]
pub enum Pipeline {
    Task(TaskLeaf),
    Join(Vec<Pipeline>),
    Parallel(Vec<Pipeline>),
}

/// TaskLeaf は 1 タスクの定義（descriptor, 本体, 駆動するエンジン）
#[derive(Clone)]
pub struct TaskLeaf {
    descriptor: TaskDescriptor,
    operation: Arc<dyn Operation>,
    engine: Arc<LifecycleEngine>,
}

impl TaskLeaf {
    pub(crate) fn new(
        descriptor: TaskDescriptor,
        operation: Arc<dyn Operation>,
        engine: Arc<LifecycleEngine>,
    ) -> Self {
        Self {
            descriptor,
            operation,
            engine,
        }
    }
}

/// `children` を順番に実行する
pub fn join(children: impl IntoIterator<Item = Pipeline>) -> Pipeline {
    Pipeline::Join(children.into_iter().collect())
}

/// `children` を並行に実行し、全部を待つ
pub fn parallel(children: impl IntoIterator<Item = Pipeline>) -> Pipeline {
    Pipeline::Parallel(children.into_iter().collect())
}

impl Pipeline {
    pub async fn invoke(&self) -> Result<Vec<TaskResult>, PipelineFailure> {
        let cancel = CancellationToken::new();
        self.invoke_with_cancel(&cancel).await
    }

    /// 木のすべてのタスクに `cancel` をつないで invoke する
    pub async fn invoke_with_cancel(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<TaskResult>, PipelineFailure> {
        let store = SharedStore::new();
        self.invoke_in(&store, cancel).await
    }

    /// 呼び出し側のストアで invoke する（1 回の実行につき 1 つのストア）
    pub fn invoke_in<'a>(
        &'a self,
        store: &'a SharedStore,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Result<Vec<TaskResult>, PipelineFailure>> {
        match self {
            Pipeline::Task(leaf) => Box::pin(async move {
                leaf.engine
                    .run_with_cancel(store, &leaf.descriptor, leaf.operation.as_ref(), cancel)
                    .await
                    .map(|result| vec![result])
                    .map_err(|failure| PipelineFailure::single(Vec::new(), failure))
            }),
            Pipeline::Join(children) => Box::pin(async move {
                let mut completed = Vec::new();
                for child in children {
                    match child.invoke_in(store, cancel).await {
                        Ok(results) => completed.extend(results),
                        Err(failure) => {
                            completed.extend(failure.completed);
                            return Err(PipelineFailure {
                                completed,
                                failures: failure.failures,
                            });
                        }
                    }
                }
                Ok(completed)
            }),
            Pipeline::Parallel(children) => Box::pin(async move {
                let outcomes =
                    join_all(children.iter().map(|c| c.invoke_in(store, cancel))).await;

                let mut completed = Vec::new();
                let mut failures = Vec::new();
                for outcome in outcomes {
                    match outcome {
                        Ok(results) => completed.extend(results),
                        Err(failure) => {
                            completed.extend(failure.completed);
                            failures.extend(failure.failures);
                        }
                    }
                }

                if failures.is_empty() {
                    Ok(completed)
                } else {
                    Err(PipelineFailure {
                        completed,
                        failures,
                    })
                }
            }),
        }
    }

    /// 木に含まれる葉の数
    pub fn task_count(&self) -> usize {
        match self {
            Pipeline::Task(_) => 1,
            Pipeline::Join(children) | Pipeline::Parallel(children) => {
                children.iter().map(Pipeline::task_count).sum()
            }
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipeline::Task(leaf) => write!(f, "task({})", leaf.descriptor.name),
            Pipeline::Join(children) => f.debug_tuple("join").field(children).finish(),
            Pipeline::Parallel(children) => f.debug_tuple("parallel").field(children).finish(),
        }
    }
}
