//! # ローカルライター
//!
//! デコード済みの成果物をローカルファイルシステムに書き込む。
//! 成功を返した時点でデータは永続ストレージに同期済みである。

use std::path::Path;

use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::ServiceError;

/// 成果物をローカルパスに書き込む抽象インターフェース。
#[async_trait::async_trait]
pub trait LocalWriter: Send + Sync {
    /// `data` を `path` に書き込む。
    ///
    /// ファイルが無ければ作成し、あれば切り詰める（追記はしない）。
    /// 既存ファイルの上書きに警告は出さない。
    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ServiceError>;
}

/// tokio::fs によるLocalWriter実装。
pub struct FsWriter;

#[async_trait::async_trait]
impl LocalWriter for FsWriter {
    async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ServiceError> {
        let (file, created) = open_for_write(path)
            .await
            .map_err(|e| ServiceError::Io(format!("ファイル作成失敗 ({}): {e}", path.display())))?;

        fill(path, created, file, data).await
    }
}

/// 書き込み後に永続化できる出力先。
#[async_trait::async_trait]
pub(crate) trait Persist: AsyncWrite + Unpin + Send {
    async fn persist(&mut self) -> std::io::Result<()>;
}

#[async_trait::async_trait]
impl Persist for tokio::fs::File {
    async fn persist(&mut self) -> std::io::Result<()> {
        self.sync_all().await
    }
}

/// 書き込み用にファイルを開く。戻り値の `bool` はこの呼び出しで新規作成したかどうか。
///
/// 既存ファイルは切り詰めて開く。
pub(crate) async fn open_for_write(path: &Path) -> std::io::Result<(tokio::fs::File, bool)> {
    match OpenOptions::new().write(true).create_new(true).open(path).await {
        Ok(file) => Ok((file, true)),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .await
            .map(|file| (file, false)),
        Err(e) => Err(e),
    }
}

/// `data` を書き込み、flushと永続化まで行う。
///
/// 失敗時、`created` ならこの呼び出しで作ったファイルを削除する。
/// 既存のパス（デバイスファイル等）は削除しない。
async fn fill<W: Persist>(path: &Path, created: bool, mut sink: W, data: &[u8]) -> Result<(), ServiceError> {
    let written = async {
        sink.write_all(data).await?;
        // tokio::fs::File は遅延書き込みのエラーを flush で返す
        sink.flush().await?;
        sink.persist().await
    }
    .await;

    if let Err(e) = written {
        drop(sink);
        if created {
            remove_partial_file(path).await;
        }
        return Err(ServiceError::Io(format!(
            "ファイル書き込み失敗 ({}): {e}",
            path.display()
        )));
    }

    Ok(())
}

/// 失敗時に作成途中のファイルを削除する。削除の失敗はwarnログのみ。
pub(crate) async fn remove_partial_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "作成途中のファイルを削除できませんでした");
    }
}
