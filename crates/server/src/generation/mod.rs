//! # 画像生成ゲートウェイ
//!
//! 外部の画像生成サービスの抽象インターフェース。
//! OpenAI Images API実装は `openai` サブモジュールを参照。

pub mod openai;

pub use openai::OpenAiImageGenerator;

use crate::error::ServiceError;

/// 1リクエストあたりの生成枚数（固定）
pub const IMAGE_COUNT: u32 = 1;
/// 生成画像の解像度（固定、正方形）
pub const IMAGE_SIZE: &str = "512x512";
/// レスポンス形式（固定、Base64）
pub const RESPONSE_FORMAT: &str = "b64_json";

/// 画像生成サービスの抽象インターフェース。
///
/// 呼び出し元はこのシグネチャのみに依存する。
/// プロバイダ・認証・通信方式は実装側の責務。
#[async_trait::async_trait]
pub trait ImageGenerator: Send + Sync {
    /// プロンプトから画像を1枚生成し、Base64ペイロードを返す。
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}
