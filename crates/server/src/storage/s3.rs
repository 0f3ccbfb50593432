//! # S3互換 オブジェクトストレージ実装
//!
//! AWS S3, MinIO 等のS3互換APIを使用するObjectStore実装。

use std::path::Path;

use tokio::io::AsyncWriteExt;

use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::ServiceError;
use crate::writer::{open_for_write, remove_partial_file};

/// S3互換ストレージによるObjectStore実装。
///
/// リージョンと認証情報は構築時に一度だけ用意する。
/// バケットはリクエストごとに指定されるため、呼び出し時にハンドルを組み立てる
/// （ネットワーク通信は発生しない）。
pub struct S3ObjectStore {
    region: s3::Region,
    /// Noneの場合は全操作がStorageエラーになる
    credentials: Option<s3::creds::Credentials>,
    /// カスタムエンドポイント使用時はパススタイルでアクセスする
    path_style: bool,
}

impl S3ObjectStore {
    /// 設定から構築する。
    ///
    /// 認証情報が無い・不正な場合も起動は継続し、初回のストレージ操作で失敗させる。
    pub fn new(config: &StorageConfig) -> Self {
        let region = match &config.endpoint {
            Some(endpoint) => s3::Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => s3::Region::Custom {
                region: config.region.clone(),
                endpoint: format!("https://s3.{}.amazonaws.com", config.region),
            },
        };

        let credentials = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                match s3::creds::Credentials::new(
                    Some(access_key.as_str()),
                    Some(secret_key.as_str()),
                    None,
                    None,
                    None,
                ) {
                    Ok(credentials) => Some(credentials),
                    Err(e) => {
                        tracing::warn!(error = %e, "ストレージ認証情報が不正です");
                        None
                    }
                }
            }
            _ => {
                tracing::warn!(
                    "AWS_ACCESS_KEY / AWS_SECRET_KEYが未設定です。ストレージ操作は失敗します"
                );
                None
            }
        };

        tracing::info!(
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "S3クライアントを初期化しました"
        );

        Self {
            region,
            credentials,
            path_style: config.endpoint.is_some(),
        }
    }

    /// バケット名からハンドルを組み立てる。
    fn bucket(&self, bucket_name: &str) -> Result<Box<s3::Bucket>, ServiceError> {
        let credentials = self
            .credentials
            .clone()
            .ok_or_else(|| ServiceError::Storage("ストレージ認証情報が設定されていません".to_string()))?;

        let bucket = s3::Bucket::new(bucket_name, self.region.clone(), credentials)
            .map_err(|e| ServiceError::Storage(format!("バケットの初期化に失敗 ({bucket_name}): {e}")))?;

        if self.path_style {
            Ok(bucket.with_path_style())
        } else {
            Ok(bucket)
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), ServiceError> {
        let handle = self.bucket(bucket)?;

        let response = handle
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| ServiceError::Storage(format!("PUT失敗 ({bucket}/{key}): {e}")))?;

        let status = response.status_code();
        if !is_success(status) {
            return Err(ServiceError::Storage(format!(
                "PUTがエラーを返しました ({bucket}/{key}): HTTP {} - {}",
                status,
                String::from_utf8_lossy(response.as_slice())
            )));
        }

        tracing::debug!(bucket, key, bytes = data.len(), "オブジェクトをアップロードしました");
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), ServiceError> {
        // 認証情報の確認はファイル作成より前に行う
        let handle = self.bucket(bucket)?;

        let (mut file, created) = open_for_write(dest).await.map_err(|e| {
            ServiceError::Storage(format!("ファイル作成失敗 ({}): {e}", dest.display()))
        })?;

        let streamed = async {
            let status = handle
                .get_object_to_writer(key, &mut file)
                .await
                .map_err(|e| format!("GET失敗 ({bucket}/{key}): {e}"))?;
            if !is_success(status) {
                return Err(format!("GETがエラーを返しました ({bucket}/{key}): HTTP {status}"));
            }
            file.flush()
                .await
                .map_err(|e| format!("ファイル書き込み失敗 ({}): {e}", dest.display()))?;
            file.sync_all()
                .await
                .map_err(|e| format!("ファイル同期失敗 ({}): {e}", dest.display()))?;
            Ok::<u64, String>(file.metadata().await.map(|m| m.len()).unwrap_or(0))
        }
        .await;

        match streamed {
            Ok(bytes) => {
                tracing::debug!(bucket, key, path = %dest.display(), bytes, "オブジェクトをダウンロードしました");
                Ok(())
            }
            Err(msg) => {
                drop(file);
                if created {
                    remove_partial_file(dest).await;
                }
                Err(ServiceError::Storage(msg))
            }
        }
    }
}
