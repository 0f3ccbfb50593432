//! # POST /createImageS3
//!
//! プロンプトから画像を生成し、S3バケットに保存する。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use imagegen_types::{S3ImageRequest, S3_SAVE_FAILURE};

use super::{parse_body, reject, reply, StatusReply};
use crate::config::AppState;
use crate::error::ErrorKind;
use crate::service::GenerationRequest;

/// POST /createImageS3 — S3保存。
///
/// `prompt`, `fileName`, `bucketName` は必須。失敗は全て500。
pub async fn handle_create_s3(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<S3ImageRequest>, JsonRejection>,
) -> StatusReply {
    let request = match parse_body(payload).and_then(|body| {
        GenerationRequest::object_store(&body.prompt, &body.bucket_name, &body.file_name)
    }) {
        Ok(request) => request,
        Err(e) => return reject(e, S3_SAVE_FAILURE),
    };

    let result = state.service.create(request).await;
    reply(result, |kind| match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    })
}
