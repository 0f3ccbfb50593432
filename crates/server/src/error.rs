//! # サービス エラー型
//!
//! パイプライン各段（検証・生成・デコード・書き込み・ストレージ）で共通のエラー型。
//! 詳細はログにのみ出力し、呼び出し元には `ServiceResult` の固定メッセージを返す。

/// サービスエラー型。
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// 必須フィールドの欠落（境界で検出、副作用なし）
    #[error("不正なリクエスト: {0}")]
    Validation(String),
    /// 画像生成APIの呼び出しに失敗
    #[error("画像生成に失敗: {0}")]
    Generation(String),
    /// 生成結果のBase64デコードに失敗
    #[error("Base64デコードに失敗: {0}")]
    Decode(String),
    /// ローカルファイルへの書き込みに失敗
    #[error("ファイル書き込みに失敗: {0}")]
    Io(String),
    /// オブジェクトストレージ操作に失敗
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
}

impl ServiceError {
    /// エラーの種別を返す。
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Generation(_) => ErrorKind::Generation,
            ServiceError::Decode(_) => ErrorKind::Decode,
            ServiceError::Io(_) => ErrorKind::Io,
            ServiceError::Storage(_) => ErrorKind::Storage,
        }
    }
}

/// 詳細を持たないエラー種別。`ServiceResult` に載せてHTTP層へ渡す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Generation,
    Decode,
    Io,
    Storage,
}
