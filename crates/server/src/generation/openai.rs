//! # OpenAI 画像生成実装
//!
//! OpenAI Images API (`POST /v1/images/generations`) を使用する
//! ImageGenerator実装。

use serde::{Deserialize, Serialize};

use super::{ImageGenerator, IMAGE_COUNT, IMAGE_SIZE, RESPONSE_FORMAT};
use crate::config::GenerationConfig;
use crate::error::ServiceError;

/// 画像生成APIのパス
const GENERATIONS_PATH: &str = "/v1/images/generations";

/// OpenAI Images APIへのリクエストボディ。
#[derive(Debug, Serialize)]
struct CreateImageRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct CreateImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

/// OpenAI Images APIによる画像生成ゲートウェイ。
/// HTTPクライアントは起動時に一度だけ構築し、全リクエストで共有する。
pub struct OpenAiImageGenerator {
    http_client: reqwest::Client,
    api_key: String,
    /// APIのベースURL（末尾スラッシュなし）
    api_base: String,
    model: Option<String>,
}

impl OpenAiImageGenerator {
    /// 設定から構築する。
    pub fn new(config: &GenerationConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let body = CreateImageRequest {
            prompt,
            n: IMAGE_COUNT,
            size: IMAGE_SIZE,
            response_format: RESPONSE_FORMAT,
            model: self.model.as_deref(),
        };

        let url = format!("{}{GENERATIONS_PATH}", self.api_base);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Generation(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| ServiceError::Generation(format!("レスポンス読み取り失敗: {e}")))?;

        if !status.is_success() {
            return Err(ServiceError::Generation(format!(
                "画像生成APIがエラーを返しました: HTTP {} - {}",
                status, response_body
            )));
        }

        let parsed: CreateImageResponse = serde_json::from_str(&response_body)
            .map_err(|e| ServiceError::Generation(format!("レスポンスのパースに失敗: {e}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|image| image.b64_json)
            .ok_or_else(|| {
                ServiceError::Generation("レスポンスに画像データがありません".to_string())
            })
    }
}
