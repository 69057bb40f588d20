//! EventSink port - 進捗・警告の通知先
//!
//! Engine は各ステージの開始/完了、吸収した validation の警告、失敗をここに流す。
//! 実装は `impls::sinks`（tracing / noop / recording）。

use crate::domain::TaskNotice;

/// EventSink は TaskNotice を受け取る
///
/// 通知は best-effort。sink 側の失敗で task を止めてはいけないので戻り値はない。
pub trait EventSink: Send + Sync {
    fn emit(&self, notice: &TaskNotice);
}
