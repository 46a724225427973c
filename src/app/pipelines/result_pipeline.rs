use crate::adapters::http::HttpResultClient;
use crate::core::csv_output::to_csv;
use crate::core::scheduler::Extractor;
use crate::core::{ConfigProvider, OutputRow, Pipeline, ResultSource, Storage, TransformResult};
use crate::domain::request::ExtractionRequest;
use crate::utils::error::Result;
use chrono::Local;
use std::path::Path;

/// Extract / transform / load over the result service: fan out the request,
/// render the rows as CSV, and write a timestamped file through `Storage`.
pub struct ResultPipeline<S: Storage, C: ConfigProvider, R: ResultSource> {
    storage: S,
    config: C,
    request: ExtractionRequest,
    extractor: Extractor<R>,
}

impl<S: Storage, C: ConfigProvider> ResultPipeline<S, C, HttpResultClient> {
    pub fn with_http_client(storage: S, config: C, request: ExtractionRequest) -> Result<Self> {
        let client = HttpResultClient::from_config(&config)?;
        Ok(Self::new(storage, config, request, client))
    }
}

impl<S: Storage, C: ConfigProvider, R: ResultSource + 'static> ResultPipeline<S, C, R> {
    pub fn new(storage: S, config: C, request: ExtractionRequest, source: R) -> Self {
        let extractor = Extractor::new(source, config.retry_policy(), config.concurrent_requests());
        Self {
            storage,
            config,
            request,
            extractor,
        }
    }

    pub fn extractor(&self) -> &Extractor<R> {
        &self.extractor
    }

    pub fn output_filename(&self) -> String {
        format!(
            "{}_{}.csv",
            self.config.filename_prefix(),
            Local::now().format("%Y%m%d_%H%M%S")
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, R: ResultSource + 'static> Pipeline for ResultPipeline<S, C, R> {
    async fn extract(&self) -> Result<Vec<OutputRow>> {
        tracing::info!(
            "Received extraction request from regNo {} to {}",
            self.request.start_reg_no,
            self.request.end_reg_no
        );

        let batch = self.request.clone().into_batch()?;
        let report = self
            .extractor
            .run(
                &batch.identifiers,
                &batch.dob,
                &batch.start_session,
                &batch.end_session,
            )
            .await?;

        if report.tasks_failed > 0 {
            tracing::warn!(
                "{} of {} work units did not complete; their rows are missing from the output",
                report.tasks_failed,
                report.tasks_dispatched
            );
        }

        Ok(report.rows)
    }

    async fn transform(&self, rows: Vec<OutputRow>) -> Result<TransformResult> {
        let csv_output = to_csv(&rows)?;
        tracing::debug!("Rendered {} rows ({} bytes of CSV)", rows.len(), csv_output.len());
        Ok(TransformResult { rows, csv_output })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let filename = self.output_filename();
        self.storage
            .write_file(&filename, result.csv_output.as_bytes())
            .await?;

        let output_path = Path::new(self.config.output_path()).join(&filename);
        Ok(output_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::RetryPolicy;
    use crate::domain::model::{SemesterDescriptor, SubjectRecord};
    use crate::utils::error::ExtractError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn only_file(&self) -> (String, Vec<u8>) {
            let files = self.files.lock().await;
            assert_eq!(files.len(), 1);
            let (name, data) = files.iter().next().unwrap();
            (name.clone(), data.clone())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ExtractError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig;

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            "http://localhost:9"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn concurrent_requests(&self) -> usize {
            2
        }

        fn retry_policy(&self) -> RetryPolicy {
            RetryPolicy {
                max_retries: 1,
                base_delay: Duration::from_millis(1),
                call_timeout: Duration::from_secs(5),
            }
        }

        fn filename_prefix(&self) -> &str {
            "results"
        }
    }

    /// Every identifier has one semester with one subject in every session.
    struct StaticSource;

    #[async_trait::async_trait]
    impl ResultSource for StaticSource {
        async fn fetch_result_list(
            &self,
            _regd_no: &str,
            _dob: &str,
            session: &str,
        ) -> Result<Vec<SemesterDescriptor>> {
            Ok(vec![SemesterDescriptor {
                sem_id: Some("3".to_string()),
                exam_session: Some(session.to_string()),
            }])
        }

        async fn fetch_subject_results(
            &self,
            sem_id: &str,
            _regd_no: &str,
            _exam_session: &str,
        ) -> Result<Vec<SubjectRecord>> {
            Ok(vec![SubjectRecord {
                sem_id: Some(sem_id.to_string()),
                subject_code: Some("RCS3C001".to_string()),
                subject_credits: Some(3),
                grade: Some("A".to_string()),
                ..Default::default()
            }])
        }
    }

    fn request() -> ExtractionRequest {
        ExtractionRequest {
            start_reg_no: "2101289370".to_string(),
            end_reg_no: "2101289371".to_string(),
            dob: "2001-03-13".to_string(),
            start_session: "Odd-(2022-23)".to_string(),
            end_session: Some("Even-(2022-23)".to_string()),
        }
    }

    #[tokio::test]
    async fn test_extract_fans_out_over_request() {
        let pipeline = ResultPipeline::new(MockStorage::new(), MockConfig, request(), StaticSource);

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(pipeline.extractor().gate().max_concurrent(), 2);
    }

    #[tokio::test]
    async fn test_extract_rejects_invalid_request_before_dispatch() {
        let mut req = request();
        req.end_session = Some("Even(2022-23)".to_string());
        let pipeline = ResultPipeline::new(MockStorage::new(), MockConfig, req, StaticSource);

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, ExtractError::SessionFormatError { .. }));
        assert_eq!(pipeline.extractor().gate().admitted(), 0);
    }

    #[tokio::test]
    async fn test_transform_renders_csv() {
        let pipeline = ResultPipeline::new(MockStorage::new(), MockConfig, request(), StaticSource);

        let result = pipeline.transform(Vec::new()).await.unwrap();

        assert!(result.rows.is_empty());
        assert_eq!(
            result.csv_output,
            "regdNo,semId,subjectCode,credits,grade,examSession\n"
        );
    }

    #[tokio::test]
    async fn test_load_writes_timestamped_csv() {
        let storage = MockStorage::new();
        let pipeline = ResultPipeline::new(storage.clone(), MockConfig, request(), StaticSource);

        let result = TransformResult {
            rows: Vec::new(),
            csv_output: "regdNo,semId,subjectCode,credits,grade,examSession\n".to_string(),
        };
        let output_path = pipeline.load(result).await.unwrap();

        let (name, data) = storage.only_file().await;
        assert!(name.starts_with("results_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "results_YYYYMMDD_HHMMSS.csv".len());
        assert!(output_path.starts_with("test_output"));
        assert!(output_path.ends_with(&name));
        assert_eq!(
            String::from_utf8(data).unwrap(),
            "regdNo,semId,subjectCode,credits,grade,examSession\n"
        );
        assert!(storage.read_file(&name).await.is_ok());
    }
}
