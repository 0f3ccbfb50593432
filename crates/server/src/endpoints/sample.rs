//! # GET /sample
//!
//! 固定プロンプトで画像を生成し、ローカルに保存する動作確認用エンドポイント。

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;

use super::{reply, StatusReply};
use crate::config::AppState;
use crate::error::ErrorKind;

/// GET /sample — 固定プロンプトでのローカル生成。
///
/// 生成・書き込み失敗は200、デコード失敗（内部エラー）は500で返す。
pub async fn handle_sample(State(state): State<Arc<AppState>>) -> StatusReply {
    let result = state.service.sample().await;
    reply(result, |kind| match kind {
        ErrorKind::Decode => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    })
}
