//! # HTTPエンドポイント
//!
//! リクエストボディを検証して `ImageService` に渡し、`ServiceResult` を
//! `{"status": ...}` 形式のレスポンスに変換する薄いディスパッチャ。

pub mod sample;
pub mod create_local;
pub mod create_s3;
pub mod download_s3;

pub use sample::handle_sample;
pub use create_local::handle_create_local;
pub use create_s3::handle_create_s3;
pub use download_s3::handle_download_s3;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use imagegen_types::StatusResponse;

use crate::config::AppState;
use crate::error::{ErrorKind, ServiceError};
use crate::service::{Outcome, ServiceResult};

/// 全エンドポイントを登録したルーターを構築する。
pub fn router(state: Arc<AppState>) -> axum::Router {
    axum::Router::new()
        .route("/sample", axum::routing::get(handle_sample))
        .route("/createImageLocal", axum::routing::post(handle_create_local))
        .route("/createImageS3", axum::routing::post(handle_create_s3))
        .route("/downloadImageS3", axum::routing::post(handle_download_s3))
        .with_state(state)
}

/// エンドポイントの応答型
pub type StatusReply = (StatusCode, Json<StatusResponse>);

/// `ServiceResult` をレスポンスに変換する。
/// 失敗時のステータスコードはエンドポイントごとに `failure_status` で決める。
pub(crate) fn reply(result: ServiceResult, failure_status: fn(ErrorKind) -> StatusCode) -> StatusReply {
    let status = match result.outcome {
        Outcome::Success => StatusCode::OK,
        Outcome::Failure(kind) => failure_status(kind),
    };
    (status, Json(StatusResponse::new(result.message)))
}

/// 境界での検証失敗をレスポンスに変換する。ゲートウェイは一切呼ばない。
pub(crate) fn reject(error: ServiceError, message: &'static str) -> StatusReply {
    tracing::error!(error = %error, "リクエスト形式が不正です");
    (StatusCode::BAD_REQUEST, Json(StatusResponse::new(message)))
}

/// JSONボディの抽出結果を取り出す。JSONとして読めない場合は検証エラー扱い。
pub(crate) fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServiceError::Validation(rejection.body_text()))
}
