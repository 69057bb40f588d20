//! ShellOperation - `sh -c` でコマンドを実行する Operation

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;
use tracing::debug;

use crate::domain::OperationError;
use crate::ports::{Operation, OperationContext};

/// タスクのディレクトリでシェルコマンドを実行する
///
/// コマンドラインは呼び出しごとに context から組み立てるので、解決済み input を
/// 埋め込める。終了コードが 0 以外なら stderr を理由に失敗する。
/// キャンセルされたら子プロセスは kill される。
pub struct ShellOperation<F> {
    command: F,
}

impl<F> ShellOperation<F>
where
    F: Fn(&OperationContext) -> String + Send + Sync,
{
    pub fn new(command: F) -> Self {
        Self { command }
    }
}

#[async_trait]
impl<F> Operation for ShellOperation<F>
where
    F: Fn(&OperationContext) -> String + Send + Sync,
{
    async fn run(&self, ctx: OperationContext) -> Result<serde_json::Value, OperationError> {
        let command = (self.command)(&ctx);
        debug!(task_id = %ctx.task_id, task = %ctx.name, %command, "running shell command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&ctx.dir)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "signal".to_string(),
            };
            return Err(OperationError::Command {
                command,
                status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(json!({
            "command": command,
            "stdout": String::from_utf8_lossy(&output.stdout),
        }))
    }
}
