//! # Imagegen 共有型定義
//!
//! HTTPエンドポイントが受け付けるリクエストボディと、返却するステータス応答を
//! Rust構造体として提供する。
//!
//! ## エンコーディング規則
//! - JSONフィールド名はcamelCase（`filePath`, `bucketName` 等）
//! - 必須フィールドの欠落は空文字列としてデシリアライズし、境界の検証で拒否する

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ステータスメッセージ
// ---------------------------------------------------------------------------

/// ローカル保存成功時のステータス。
pub const LOCAL_DOWNLOAD_SUCCESS: &str = "successfully downloaded file to path";
/// 画像生成・ローカル保存失敗時のステータス。
pub const PROCESS_IMAGE_ERROR: &str = "failed to process image response";
/// S3保存成功時のステータス。
pub const S3_SAVE_SUCCESS: &str = "successfully saved to S3 bucket";
/// S3保存失敗時のステータス。
pub const S3_SAVE_FAILURE: &str = "failed to save image to S3 bucket";
/// S3からのダウンロード成功時のステータス。
pub const S3_DOWNLOAD_SUCCESS: &str = "successfully downloaded file from S3 bucket";
/// S3からのダウンロード失敗時のステータス。
pub const S3_DOWNLOAD_FAILURE: &str = "failed to download file from S3 bucket";

// ---------------------------------------------------------------------------
// リクエスト
// ---------------------------------------------------------------------------

/// POST /createImageLocal のリクエストボディ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalImageRequest {
    /// 画像生成プロンプト
    pub prompt: String,
    /// 保存先のローカルファイルパス
    pub file_path: String,
}

/// POST /createImageS3 のリクエストボディ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct S3ImageRequest {
    /// 画像生成プロンプト
    pub prompt: String,
    /// バケット内のオブジェクトキー
    pub file_name: String,
    /// 保存先バケット名
    pub bucket_name: String,
}

/// POST /downloadImageS3 のリクエストボディ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct S3DownloadRequest {
    /// 取得するオブジェクトキー
    pub item: String,
    /// 取得元バケット名
    pub bucket: String,
    /// 書き出し先のローカルファイルパス
    pub file_path: String,
}

// ---------------------------------------------------------------------------
// レスポンス
// ---------------------------------------------------------------------------

/// 全エンドポイント共通のレスポンスボディ。
/// 成果物のデータは含まず、人間向けのステータスのみを返す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}
