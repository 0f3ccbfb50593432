//! # POST /createImageLocal
//!
//! プロンプトから画像を生成し、指定パスのローカルファイルに保存する。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use imagegen_types::{LocalImageRequest, PROCESS_IMAGE_ERROR};

use super::{parse_body, reject, reply, StatusReply};
use crate::config::AppState;
use crate::error::ErrorKind;
use crate::service::GenerationRequest;

/// POST /createImageLocal — ローカル保存。
///
/// `prompt` と `filePath` は必須。欠落時は画像生成を呼ばずに400を返す。
pub async fn handle_create_local(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LocalImageRequest>, JsonRejection>,
) -> StatusReply {
    let request = match parse_body(payload)
        .and_then(|body| GenerationRequest::local(&body.prompt, &body.file_path))
    {
        Ok(request) => request,
        Err(e) => return reject(e, PROCESS_IMAGE_ERROR),
    };

    let result = state.service.create(request).await;
    reply(result, |kind| match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Decode => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    })
}
