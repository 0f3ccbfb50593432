//! # 画像生成・保存パイプライン
//!
//! プロンプトを受け取り、画像生成 → Base64デコード → 保存先への書き込み を
//! 1本の直線的なパイプラインとして実行する。逆方向の取得（ストレージ → ローカル）も扱う。
//!
//! ## 方針
//! - リトライしない。最初に失敗した段でパイプラインを打ち切る
//! - 下位層のエラーはここで全て捕捉し、固定メッセージの `ServiceResult` に変換する
//! - エラー詳細はログにのみ出力し、呼び出し元には返さない

use std::path::PathBuf;

use imagegen_types::{
    LOCAL_DOWNLOAD_SUCCESS, PROCESS_IMAGE_ERROR, S3_DOWNLOAD_FAILURE, S3_DOWNLOAD_SUCCESS,
    S3_SAVE_FAILURE, S3_SAVE_SUCCESS,
};

use crate::codec::{decode_image, detect_mime_type};
use crate::error::{ErrorKind, ServiceError};
use crate::generation::ImageGenerator;
use crate::storage::ObjectStore;
use crate::writer::LocalWriter;

/// 動作確認用の固定プロンプト
pub const SAMPLE_PROMPT: &str =
    "Man serves you a hot dog in New York, cartoon style, natural light, high detail";
/// 動作確認用の固定出力パス
pub const SAMPLE_FILE_PATH: &str = "test.png";

// ---------------------------------------------------------------------------
// リクエスト
// ---------------------------------------------------------------------------

/// 成果物の保存先。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// ローカルファイルシステム
    Local { file_path: PathBuf },
    /// オブジェクトストレージのバケット
    ObjectStore { bucket_name: String, object_key: String },
}

/// 画像生成リクエスト。構築時に全フィールドの非空を検証済み。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub destination: Destination,
}

impl GenerationRequest {
    /// ローカル保存のリクエストを構築する。
    pub fn local(prompt: &str, file_path: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            prompt: required("prompt", prompt)?,
            destination: Destination::Local {
                file_path: PathBuf::from(required("filePath", file_path)?),
            },
        })
    }

    /// オブジェクトストレージ保存のリクエストを構築する。
    pub fn object_store(
        prompt: &str,
        bucket_name: &str,
        object_key: &str,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            prompt: required("prompt", prompt)?,
            destination: Destination::ObjectStore {
                bucket_name: required("bucketName", bucket_name)?,
                object_key: required("fileName", object_key)?,
            },
        })
    }
}

/// ストレージからローカルへの取得リクエスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub bucket: String,
    pub object_key: String,
    pub file_path: PathBuf,
}

impl RetrievalRequest {
    pub fn new(bucket: &str, object_key: &str, file_path: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            bucket: required("bucket", bucket)?,
            object_key: required("item", object_key)?,
            file_path: PathBuf::from(required("filePath", file_path)?),
        })
    }
}

/// 必須フィールドの検証。
///
/// 存在だけを見る一般的な required 検証より厳しく、`" "` のような空白のみの値も
/// 欠落とみなす。空白のみのパスやバケット名で外部呼び出しは行わない。
fn required(field: &str, value: &str) -> Result<String, ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field}は必須です")));
    }
    Ok(value.to_string())
}

// ---------------------------------------------------------------------------
// 結果
// ---------------------------------------------------------------------------

/// 処理結果の種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// どの段で失敗したか
    Failure(ErrorKind),
}

/// 呼び出し元に返す処理結果。成果物もエラー詳細も含まない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResult {
    pub outcome: Outcome,
    pub message: &'static str,
}

impl ServiceResult {
    pub fn success(message: &'static str) -> Self {
        Self {
            outcome: Outcome::Success,
            message,
        }
    }

    pub fn failure(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            outcome: Outcome::Failure(kind),
            message,
        }
    }
}

// ---------------------------------------------------------------------------
// オーケストレーター
// ---------------------------------------------------------------------------

/// 画像生成・保存パイプライン。
///
/// 各ゲートウェイは起動時に一度だけ構築され、コンストラクタで注入される。
/// リクエスト間で共有する可変状態は持たない。
pub struct ImageService {
    generator: Box<dyn ImageGenerator>,
    store: Box<dyn ObjectStore>,
    writer: Box<dyn LocalWriter>,
}

impl ImageService {
    pub fn new(
        generator: Box<dyn ImageGenerator>,
        store: Box<dyn ObjectStore>,
        writer: Box<dyn LocalWriter>,
    ) -> Self {
        Self {
            generator,
            store,
            writer,
        }
    }

    /// 保存先に応じて生成パイプラインを実行する。
    pub async fn create(&self, request: GenerationRequest) -> ServiceResult {
        match request.destination {
            Destination::Local { file_path } => {
                self.create_local(&request.prompt, &file_path).await
            }
            Destination::ObjectStore {
                bucket_name,
                object_key,
            } => {
                self.create_in_store(&request.prompt, &bucket_name, &object_key)
                    .await
            }
        }
    }

    /// 生成した画像をローカルファイルに保存する。
    pub async fn create_local(&self, prompt: &str, file_path: &std::path::Path) -> ServiceResult {
        let result = async {
            let image = self.generate_image(prompt).await?;
            self.writer.write(file_path, &image).await?;
            Ok::<usize, ServiceError>(image.len())
        }
        .await;

        match result {
            Ok(bytes) => {
                tracing::info!(path = %file_path.display(), bytes, "ローカル画像を作成しました");
                ServiceResult::success(LOCAL_DOWNLOAD_SUCCESS)
            }
            Err(e) => {
                tracing::error!(path = %file_path.display(), error = %e, "ローカル画像の作成に失敗しました");
                ServiceResult::failure(e.kind(), PROCESS_IMAGE_ERROR)
            }
        }
    }

    /// 生成した画像をオブジェクトストレージに保存する。ローカルディスクには触れない。
    pub async fn create_in_store(&self, prompt: &str, bucket: &str, key: &str) -> ServiceResult {
        let result = async {
            let image = self.generate_image(prompt).await?;
            self.store
                .upload(bucket, key, &image, detect_mime_type(&image))
                .await?;
            Ok::<usize, ServiceError>(image.len())
        }
        .await;

        match result {
            Ok(bytes) => {
                tracing::info!(bucket, key, bytes, "S3バケットに画像を保存しました");
                ServiceResult::success(S3_SAVE_SUCCESS)
            }
            Err(e) => {
                tracing::error!(bucket, key, error = %e, "S3バケットへの画像保存に失敗しました");
                ServiceResult::failure(e.kind(), S3_SAVE_FAILURE)
            }
        }
    }

    /// ストレージのオブジェクトをローカルファイルに取得する。
    pub async fn retrieve(&self, request: RetrievalRequest) -> ServiceResult {
        let RetrievalRequest {
            bucket,
            object_key,
            file_path,
        } = request;

        match self.store.download(&bucket, &object_key, &file_path).await {
            Ok(()) => {
                tracing::info!(
                    bucket = %bucket,
                    key = %object_key,
                    path = %file_path.display(),
                    "S3バケットからファイルを取得しました"
                );
                ServiceResult::success(S3_DOWNLOAD_SUCCESS)
            }
            Err(e) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %object_key,
                    error = %e,
                    "S3バケットからの取得に失敗しました"
                );
                ServiceResult::failure(e.kind(), S3_DOWNLOAD_FAILURE)
            }
        }
    }

    /// 固定プロンプト・固定パスでローカル生成を行う（動作確認用）。
    pub async fn sample(&self) -> ServiceResult {
        self.create_local(SAMPLE_PROMPT, std::path::Path::new(SAMPLE_FILE_PATH))
            .await
    }

    /// 画像を生成し、デコード済みのバイト列を返す。
    /// Base64ペイロードはこの関数内で破棄される。
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>, ServiceError> {
        let payload = self.generator.generate(prompt).await?;
        decode_image(&payload)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::codec::b64;
    use base64::Engine;

    /// 呼び出し記録を共有するテスト用ハンドル。
    #[derive(Default)]
    pub(crate) struct Calls {
        pub generate: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
        pub writes: Mutex<Vec<(PathBuf, Vec<u8>)>>,
        pub uploads: Mutex<Vec<(String, String, Vec<u8>, String)>>,
        pub downloads: Mutex<Vec<(String, String, PathBuf)>>,
    }

    /// 固定の応答を返すモック画像生成ゲートウェイ。
    pub(crate) struct MockGenerator {
        pub calls: Arc<Calls>,
        pub response: Result<String, String>,
    }

    #[async_trait::async_trait]
    impl ImageGenerator for MockGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
            self.calls.generate.fetch_add(1, Ordering::SeqCst);
            self.calls.prompts.lock().unwrap().push(prompt.to_string());
            self.response.clone().map_err(ServiceError::Generation)
        }
    }

    /// 呼び出しを記録するモックストレージ。
    pub(crate) struct MockStore {
        pub calls: Arc<Calls>,
        pub fail: bool,
    }

    #[async_trait::async_trait]
    impl ObjectStore for MockStore {
        async fn upload(
            &self,
            bucket: &str,
            key: &str,
            data: &[u8],
            content_type: &str,
        ) -> Result<(), ServiceError> {
            self.calls.uploads.lock().unwrap().push((
                bucket.to_string(),
                key.to_string(),
                data.to_vec(),
                content_type.to_string(),
            ));
            if self.fail {
                return Err(ServiceError::Storage("AccessDenied".to_string()));
            }
            Ok(())
        }

        async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), ServiceError> {
            self.calls.downloads.lock().unwrap().push((
                bucket.to_string(),
                key.to_string(),
                dest.to_path_buf(),
            ));
            if self.fail {
                return Err(ServiceError::Storage("NoSuchKey".to_string()));
            }
            Ok(())
        }
    }

    /// 書き込み内容を記録するモックライター。
    pub(crate) struct MockWriter {
        pub calls: Arc<Calls>,
        pub fail: bool,
    }

    #[async_trait::async_trait]
    impl LocalWriter for MockWriter {
        async fn write(&self, path: &Path, data: &[u8]) -> Result<(), ServiceError> {
            self.calls
                .writes
                .lock()
                .unwrap()
                .push((path.to_path_buf(), data.to_vec()));
            if self.fail {
                return Err(ServiceError::Io("disk full".to_string()));
            }
            Ok(())
        }
    }

    /// PNGシグネチャ4バイト
    pub(crate) const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];

    /// モック一式でImageServiceを構築するヘルパー
    pub(crate) fn test_service(
        response: Result<String, String>,
        store_fails: bool,
        writer_fails: bool,
    ) -> (ImageService, Arc<Calls>) {
        let calls = Arc::new(Calls::default());
        let service = ImageService::new(
            Box::new(MockGenerator {
                calls: calls.clone(),
                response,
            }),
            Box::new(MockStore {
                calls: calls.clone(),
                fail: store_fails,
            }),
            Box::new(MockWriter {
                calls: calls.clone(),
                fail: writer_fails,
            }),
        );
        (service, calls)
    }

    pub(crate) fn png_payload() -> Result<String, String> {
        Ok(b64().encode(PNG_MAGIC))
    }

    #[tokio::test]
    async fn test_create_local_writes_decoded_bytes() {
        let (service, calls) = test_service(png_payload(), false, false);

        let request = GenerationRequest::local("a red balloon", "out.png").unwrap();
        let result = service.create(request).await;

        assert_eq!(result, ServiceResult::success(LOCAL_DOWNLOAD_SUCCESS));
        assert_eq!(*calls.prompts.lock().unwrap(), vec!["a red balloon".to_string()]);
        let writes = calls.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, PathBuf::from("out.png"));
        assert_eq!(writes[0].1, PNG_MAGIC.to_vec());
        assert!(calls.uploads.lock().unwrap().is_empty());
    }

    /// 生成失敗時は汎用メッセージを返し、以降の段を呼ばないこと
    #[tokio::test]
    async fn test_generation_failure_short_circuits() {
        let (service, calls) = test_service(Err("quota exceeded".to_string()), false, false);

        let result = service
            .create(GenerationRequest::local("a red balloon", "out.png").unwrap())
            .await;
        assert_eq!(
            result,
            ServiceResult::failure(ErrorKind::Generation, PROCESS_IMAGE_ERROR)
        );
        assert!(!result.message.contains("quota"));

        let result = service
            .create(GenerationRequest::object_store("a red balloon", "b", "k").unwrap())
            .await;
        assert_eq!(result, ServiceResult::failure(ErrorKind::Generation, S3_SAVE_FAILURE));

        assert_eq!(calls.generate.load(Ordering::SeqCst), 2);
        assert!(calls.writes.lock().unwrap().is_empty());
        assert!(calls.uploads.lock().unwrap().is_empty());
    }

    /// 不正なBase64はプロセスを停止させず、Decode失敗として返ること
    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let (service, calls) = test_service(Ok("%%% not base64 %%%".to_string()), false, false);

        let result = service
            .create(GenerationRequest::local("cat", "out.png").unwrap())
            .await;
        assert_eq!(result, ServiceResult::failure(ErrorKind::Decode, PROCESS_IMAGE_ERROR));

        let result = service
            .create(GenerationRequest::object_store("cat", "b", "k").unwrap())
            .await;
        assert_eq!(result, ServiceResult::failure(ErrorKind::Decode, S3_SAVE_FAILURE));

        assert!(calls.writes.lock().unwrap().is_empty());
        assert!(calls.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure() {
        let (service, _calls) = test_service(png_payload(), false, true);

        let result = service
            .create(GenerationRequest::local("cat", "out.png").unwrap())
            .await;
        assert_eq!(result, ServiceResult::failure(ErrorKind::Io, PROCESS_IMAGE_ERROR));
    }

    #[tokio::test]
    async fn test_create_in_store_uploads_with_content_type() {
        let (service, calls) = test_service(png_payload(), false, false);

        let result = service
            .create(GenerationRequest::object_store("a red balloon", "images", "balloon.png").unwrap())
            .await;

        assert_eq!(result, ServiceResult::success(S3_SAVE_SUCCESS));
        let uploads = calls.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "images");
        assert_eq!(uploads[0].1, "balloon.png");
        assert_eq!(uploads[0].2, PNG_MAGIC.to_vec());
        assert_eq!(uploads[0].3, "image/png");
    }

    /// アップロード失敗時はストレージ固有のメッセージを返し、ローカルには書き込まないこと
    #[tokio::test]
    async fn test_upload_failure_leaves_local_disk_untouched() {
        let (service, calls) = test_service(png_payload(), true, false);

        let result = service
            .create(GenerationRequest::object_store("a red balloon", "b", "k").unwrap())
            .await;

        assert_eq!(result, ServiceResult::failure(ErrorKind::Storage, S3_SAVE_FAILURE));
        assert_eq!(calls.uploads.lock().unwrap().len(), 1);
        assert!(calls.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retrieve() {
        let (service, calls) = test_service(png_payload(), false, false);

        let result = service
            .retrieve(RetrievalRequest::new("b", "k", "d.png").unwrap())
            .await;

        assert_eq!(result, ServiceResult::success(S3_DOWNLOAD_SUCCESS));
        assert_eq!(
            *calls.downloads.lock().unwrap(),
            vec![("b".to_string(), "k".to_string(), PathBuf::from("d.png"))]
        );
        // 取得では画像生成を呼ばない
        assert_eq!(calls.generate.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retrieve_failure() {
        let (service, _calls) = test_service(png_payload(), true, false);

        let result = service
            .retrieve(RetrievalRequest::new("b", "k", "d.png").unwrap())
            .await;
        assert_eq!(result, ServiceResult::failure(ErrorKind::Storage, S3_DOWNLOAD_FAILURE));
        assert_ne!(result.outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_sample_uses_fixed_prompt_and_path() {
        let (service, calls) = test_service(png_payload(), false, false);

        let result = service.sample().await;

        assert_eq!(result.outcome, Outcome::Success);
        assert_eq!(*calls.prompts.lock().unwrap(), vec![SAMPLE_PROMPT.to_string()]);
        assert_eq!(calls.writes.lock().unwrap()[0].0, PathBuf::from(SAMPLE_FILE_PATH));
    }

    #[test]
    fn test_request_validation() {
        assert!(matches!(
            GenerationRequest::local("", "out.png"),
            Err(ServiceError::Validation(_))
        ));
        assert!(GenerationRequest::local("cat", "   ").is_err());
        assert!(GenerationRequest::local(" ", "out.png").is_err());
        assert!(RetrievalRequest::new("b", "\t", "d.png").is_err());
        assert!(GenerationRequest::object_store("cat", "", "k").is_err());
        assert!(GenerationRequest::object_store("cat", "b", "").is_err());
        assert!(RetrievalRequest::new("", "k", "d.png").is_err());
        assert!(RetrievalRequest::new("b", "", "d.png").is_err());
        assert!(RetrievalRequest::new("b", "k", "").is_err());

        let request = GenerationRequest::object_store("cat", "b", "k").unwrap();
        assert_eq!(
            request.destination,
            Destination::ObjectStore {
                bucket_name: "b".to_string(),
                object_key: "k".to_string(),
            }
        );
    }
}
