//! Tasks - デモ用タスク。プロセス ID をファイルに書き出し、文字に変換する

use std::path::{Path, PathBuf};

use millrace_core::domain::OperationError;
use millrace_core::impls::ShellOperation;
use millrace_core::{Operation, OperationContext, TaskDescriptor, operation_fn};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

pub fn dump_pids() -> (TaskDescriptor, impl Operation + 'static) {
    let descriptor = TaskDescriptor::new("Dump all PIDs to *.pids").with_output("*.pids");
    let op = ShellOperation::new(|ctx: &OperationContext| {
        format!(
            "ps aux | awk '{{print $2}}' | tail -n +2 > {}.pids",
            ctx.task_id.as_ulid()
        )
    });
    (descriptor, op)
}

pub fn numbers_to_letters() -> (TaskDescriptor, impl Operation + 'static) {
    let descriptor = TaskDescriptor::new("Convert lines of numbers to letters")
        .with_input("*.pids")
        .with_output("*.txt");
    let op = operation_fn(|ctx: OperationContext| async move {
        let input = ctx
            .input
            .ok_or_else(|| OperationError::failed("no input resolved"))?;

        let mut written = Vec::new();
        for path in input.paths() {
            written.push(convert(path).await?);
        }
        Ok::<_, OperationError>(json!({ "written": written }))
    });
    (descriptor, op)
}

/// `<name>.pids` の隣に `<name>.txt` を書く。数値の行 1 つにつき 1 文字
async fn convert(path: &Path) -> Result<PathBuf, OperationError> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut letters = String::new();
    while let Some(line) = lines.next_line().await? {
        if let Ok(n) = line.trim().parse::<u32>() {
            letters.extend(char::from_u32(n % 65));
        }
    }

    let target = path.with_extension("txt");
    tokio::fs::write(&target, letters).await?;
    Ok(target)
}
