//! # POST /downloadImageS3
//!
//! S3バケットのオブジェクトをローカルファイルに取得する。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use imagegen_types::{S3DownloadRequest, S3_DOWNLOAD_FAILURE};

use super::{parse_body, reject, reply, StatusReply};
use crate::config::AppState;
use crate::error::ErrorKind;
use crate::service::RetrievalRequest;

/// POST /downloadImageS3 — S3からの取得。
///
/// `item`, `bucket`, `filePath` は必須。失敗は全て500。
pub async fn handle_download_s3(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<S3DownloadRequest>, JsonRejection>,
) -> StatusReply {
    let request = match parse_body(payload)
        .and_then(|body| RetrievalRequest::new(&body.bucket, &body.item, &body.file_path))
    {
        Ok(request) => request,
        Err(e) => return reject(e, S3_DOWNLOAD_FAILURE),
    };

    let result = state.service.retrieve(request).await;
    reply(result, |kind| match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    })
}
