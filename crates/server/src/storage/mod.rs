//! # オブジェクトストレージゲートウェイ
//!
//! 成果物の保存先となるオブジェクトストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

pub mod s3;

pub use self::s3::S3ObjectStore;

use std::path::Path;

use crate::error::ServiceError;

/// オブジェクトストレージの抽象インターフェース。
///
/// 呼び出し元は `upload` / `download` の2操作のみに依存する。
/// 接続・認証情報のセットアップは構築時に一度だけ行い、全リクエストで再利用する。
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// `data` を `bucket` の `key` に単発PUTで保存する。
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), ServiceError>;

    /// `bucket` の `key` を取得し、`dest` にストリーミングで書き出す。
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), ServiceError>;
}
