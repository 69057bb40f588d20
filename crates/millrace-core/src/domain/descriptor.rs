//! Descriptor - 1 単位の仕事の不変な定義

use serde::{Deserialize, Serialize};

/// TaskDescriptor はタスクの入力・出力・名前
///
/// pipeline 構築時にタスク定義ごとに 1 つ作る。operation 本体は descriptor の
/// 中ではなく隣に置く（`app::pipeline` 参照）。descriptor は純粋なデータのまま。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// glob 風の input パターン。`None` なら input 依存がなく、
    /// input 解決は飛ばす。
    #[serde(default)]
    pub input: Option<String>,

    /// 出力の置き場所を表す glob 風パターン。
    /// `None` でも output 解決と検証は走る（どちらも空になる）。
    #[serde(default)]
    pub output: Option<String>,

    /// 表示用の名前
    pub name: String,
}

impl TaskDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            input: None,
            output: None,
            name: name.into(),
        }
    }

    pub fn with_input(mut self, pattern: impl Into<String>) -> Self {
        self.input = Some(pattern.into());
        self
    }

    pub fn with_output(mut self, pattern: impl Into<String>) -> Self {
        self.output = Some(pattern.into());
        self
    }
}
