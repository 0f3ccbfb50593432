//! # Imagegen サーバー
//!
//! 画像生成APIに画像を要求し、生成結果をローカルディスクまたは
//! S3バケットに保存するHTTPサービス。S3からローカルへの取得も提供する。
//!
//! ## 役割
//! - 画像生成リクエストの受付と検証
//! - 生成結果（Base64）のデコード
//! - 保存先（ローカル / S3）への振り分け
//! - S3オブジェクトのローカルへの取得
//!
//! ## API エンドポイント
//! - `GET /sample` — 固定プロンプトでの動作確認
//! - `POST /createImageLocal` — 生成してローカルに保存
//! - `POST /createImageS3` — 生成してS3に保存
//! - `POST /downloadImageS3` — S3からローカルに取得

mod codec;
mod config;
mod endpoints;
mod error;
mod generation;
mod service;
mod storage;
mod writer;

use std::sync::Arc;

use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::{AppState, LogConfig, LogFormat, ServiceConfig};
use crate::generation::OpenAiImageGenerator;
use crate::service::ImageService;
use crate::storage::S3ObjectStore;
use crate::writer::FsWriter;

fn parse_log_level(value: &str) -> LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// ログ出力を初期化する。HTTPクライアント系のターゲットはwarn以上に絞る。
fn init_tracing(config: &LogConfig) {
    let filter = Targets::new()
        .with_default(parse_log_level(&config.level))
        .with_target("hyper", LevelFilter::WARN)
        .with_target("hyper_util", LevelFilter::WARN)
        .with_target("reqwest", LevelFilter::WARN);

    let layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // APIキー欠落はここで起動失敗とする
    let config = ServiceConfig::from_env()?;
    init_tracing(&config.log);

    // 各ゲートウェイは起動時に一度だけ構築し、全リクエストで共有する
    let generator = OpenAiImageGenerator::new(&config.generation)?;
    let store = S3ObjectStore::new(&config.storage);

    let state = Arc::new(AppState {
        service: ImageService::new(Box::new(generator), Box::new(store), Box::new(FsWriter)),
    });

    let app = endpoints::router(state);

    tracing::info!("サーバーを {} で起動します", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
