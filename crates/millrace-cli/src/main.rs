//! millrace - デモ pipeline を実行する。PID を書き出し、文字に変換する

mod tasks;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use millrace_core::{EngineBuilder, EngineConfig, SharedStore, ValidationMode, join};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "millrace", version, about = "Run a file pipeline of tasks")]
struct Cli {
    /// TOML 設定ファイル
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,

    /// 設定の `work_dir` を上書きする
    #[arg(long = "work-dir", value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// 設定の `validation_mode` を上書きする（off, before, after）
    #[arg(long = "validation-mode", value_name = "MODE")]
    validation_mode: Option<ValidationMode>,

    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    let config = load_config(&args)?;
    info!(
        work_dir = %config.work_dir.display(),
        validation_mode = %config.validation_mode,
        "starting millrace"
    );

    let engine = EngineBuilder::new()
        .config(config)
        .build()
        .context("build engine")?;

    let (dump, dump_op) = tasks::dump_pids();
    let (convert, convert_op) = tasks::numbers_to_letters();
    let pipeline = join([
        engine.task(dump, dump_op),
        engine.task(convert, convert_op),
    ]);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let store = SharedStore::new();
    let outcome = pipeline.invoke_in(&store, &cancel).await;
    let counts = store.snapshot().counts();
    info!(
        validated = counts.validated,
        failed = counts.failed,
        "pipeline finished"
    );

    match outcome {
        Ok(results) => {
            let rendered =
                serde_json::to_string_pretty(&results).context("render pipeline results")?;
            println!("{rendered}");
            Ok(())
        }
        Err(failure) => {
            for task in &failure.failures {
                error!(task_id = %task.task_id, task = %task.name, stage = %task.stage, "{}", task.reason);
            }
            Err(anyhow!(failure).context("pipeline failed"))
        }
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Cli) -> Result<EngineConfig> {
    let mut config = match &args.config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.work_dir {
        config.work_dir = dir.clone();
    }
    if let Some(mode) = args.validation_mode {
        config.validation_mode = mode;
    }
    Ok(config)
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT, cancelling pipeline");
        cancel.cancel();
    });
}
