//! Outcome - 完了したタスクが pipeline に返すもの

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::resolved::Resolved;

/// 出力の検証結果
///
/// 検証はソフト。呼び出し側は常に `accepted()` を受け取り、
/// 問題はタスク状態の警告として現れる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub validated: bool,
    #[serde(default)]
    pub validations: BTreeMap<String, serde_json::Value>,
}

impl ValidationReport {
    pub fn accepted() -> Self {
        Self {
            validated: true,
            validations: BTreeMap::new(),
        }
    }

    pub fn rejected() -> Self {
        Self {
            validated: false,
            validations: BTreeMap::new(),
        }
    }

    /// 名前付きのチェックを 1 つ記録する
    pub fn with_check(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.validations.insert(name.into(), value);
        self
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::accepted()
    }
}

/// 出力の検査方法
///
/// - `Off`: 空でないかだけ確認する
/// - `Before`: 実行前に、以前の実行が記録した fingerprint と照合する
/// - `After`: 次回以降のために fingerprint を記録する
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Off,
    Before,
    After,
}

impl ValidationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(Self::Off),
            "before" => Ok(Self::Before),
            "after" => Ok(Self::After),
            other => Err(format!(
                "unknown validation mode `{other}` (expected off, before or after)"
            )),
        }
    }
}

/// 1 つのタスクインスタンスの正常完了
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: TaskId,
    pub name: String,
    /// operation が返した値
    pub output: serde_json::Value,
    pub resolved_input: Option<Resolved>,
    pub resolved_output: Option<Resolved>,
    pub validation: ValidationReport,
}

impl TaskResult {
    /// 解決済みの出力パス。output を宣言していなければ空
    pub fn output_paths(&self) -> &[std::path::PathBuf] {
        self.resolved_output
            .as_ref()
            .map(Resolved::paths)
            .unwrap_or(&[])
    }
}
