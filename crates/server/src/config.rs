//! # サービス設定・共有状態
//!
//! 環境変数からの設定読み込みとサービスの共有状態の定義。
//! 設定は起動時に一度だけ構築し、各ゲートウェイのコンストラクタへ参照で渡す。

use std::time::Duration;

use anyhow::Context;

use crate::service::ImageService;

/// デフォルトの待受アドレス
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
/// デフォルトの画像生成APIベースURL
const DEFAULT_API_BASE: &str = "https://api.openai.com";
/// デフォルトの画像生成タイムアウト（秒）
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
/// デフォルトのストレージリージョン
const DEFAULT_REGION: &str = "us-east-2";

/// サービスの共有状態。
/// 起動時に一度だけ構築し、以降は読み取り専用で全リクエストが共有する。
pub struct AppState {
    /// 画像生成・保存パイプライン
    pub service: ImageService,
}

/// サービス全体の設定。
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTPサーバーの待受アドレス
    pub listen_addr: String,
    pub log: LogConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
}

/// ログ出力設定。
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル（trace/debug/info/warn/error/off）
    pub level: String,
    pub format: LogFormat,
}

/// ログ出力形式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON Lines（本番用）
    Json,
    /// 人間向けテキスト
    Text,
}

/// 画像生成ゲートウェイの設定。
#[derive(Clone)]
pub struct GenerationConfig {
    /// APIキー（必須）
    pub api_key: String,
    /// APIのベースURL
    pub api_base: String,
    /// 使用モデル。Noneの場合はプロバイダのデフォルト
    pub model: Option<String>,
    /// 1リクエストあたりのタイムアウト
    pub timeout: Duration,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// オブジェクトストレージゲートウェイの設定。
#[derive(Clone)]
pub struct StorageConfig {
    /// リージョン（固定）
    pub region: String,
    /// S3互換エンドポイント（MinIO等）。Noneの場合はAWS S3
    pub endpoint: Option<String>,
    /// アクセスキー。未設定でも起動は継続し、初回のストレージ操作で失敗する
    pub access_key: Option<String>,
    /// シークレットキー
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ServiceConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から構築する。空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENAI_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEYが設定されていません"))?;

        let timeout_secs = match var("GENERATION_TIMEOUT_SECS") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("GENERATION_TIMEOUT_SECSが不正です: {v}"))?,
            None => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        let format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("json") => LogFormat::Json,
            Some("text") => LogFormat::Text,
            Some(other) => anyhow::bail!("LOG_FORMATが不正です: {other}（json または text）"),
        };

        Ok(Self {
            listen_addr: var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string()),
            log: LogConfig {
                level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format,
            },
            generation: GenerationConfig {
                api_key,
                api_base: var("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                model: var("OPENAI_IMAGE_MODEL"),
                timeout: Duration::from_secs(timeout_secs),
            },
            storage: StorageConfig {
                region: var("S3_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
                endpoint: var("S3_ENDPOINT"),
                access_key: var("AWS_ACCESS_KEY"),
                secret_key: var("AWS_SECRET_KEY"),
            },
        })
    }
}
