//! Operation port - タスク本体
//!
//! Operation は解決済み input を受け取り、任意の JSON 値を返す。
//! 出力ファイルの書き出しは副作用として行い、engine は後で output pattern で探す。

use std::future::Future;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{OperationError, Resolved, TaskId};

/// operation から見えるタスクの情報
#[derive(Debug, Clone, PartialEq)]
pub struct OperationContext {
    pub task_id: TaskId,
    pub name: String,
    /// タスクインスタンスの作業ディレクトリ
    pub dir: PathBuf,
    /// input を宣言していないタスクでは `None`
    pub input: Option<Resolved>,
}

/// Operation はタスクの本体
///
/// # 使用例
/// ```ignore
/// let op = operation_fn(|ctx: OperationContext| async move {
///     let input = ctx.input.ok_or_else(|| OperationError::failed("no input"))?;
///     Ok(serde_json::json!({ "files": input.len() }))
/// });
/// ```
#[async_trait]
pub trait Operation: Send + Sync {
    async fn run(&self, ctx: OperationContext) -> Result<serde_json::Value, OperationError>;
}

/// async クロージャによる Operation。[`operation_fn`] で作る。
#[derive(Clone)]
pub struct FnOperation<F> {
    f: F,
}

/// async クロージャを `Operation` として包む
pub fn operation_fn<F, Fut>(f: F) -> FnOperation<F>
where
    F: Fn(OperationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, OperationError>> + Send + 'static,
{
    FnOperation { f }
}

#[async_trait]
impl<F, Fut> Operation for FnOperation<F>
where
    F: Fn(OperationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<serde_json::Value, OperationError>> + Send + 'static,
{
    async fn run(&self, ctx: OperationContext) -> Result<serde_json::Value, OperationError> {
        (self.f)(ctx).await
    }
}
