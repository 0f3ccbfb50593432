//! # Base64コーデック
//!
//! 画像生成APIが返すBase64ペイロードを成果物のバイト列に変換する。

use base64::Engine;

use crate::error::ServiceError;

/// Base64エンジン（Standard）
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// Base64ペイロードをデコードする。
///
/// 標準アルファベット・標準パディングのみ受け付ける。
/// 不正な入力は `ServiceError::Decode` になる（プロセスは停止しない）。
pub fn decode_image(payload: &str) -> Result<Vec<u8>, ServiceError> {
    b64()
        .decode(payload)
        .map_err(|e| ServiceError::Decode(e.to_string()))
}

/// 成果物のMIMEタイプをマジックバイトから検出する。
/// アップロード時のContent-Typeに使用する。
pub fn detect_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.len() >= 12 && data[8..12] == *b"WEBP" {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}
