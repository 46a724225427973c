use crate::core::retry::RetryPolicy;
use crate::domain::model::{OutputRow, SemesterDescriptor, SubjectRecord, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn concurrent_requests(&self) -> usize;
    fn retry_policy(&self) -> RetryPolicy;
    fn filename_prefix(&self) -> &str;
    fn request_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// The upstream result-publishing service. Each method is a single attempt;
/// retries, backoff and timeouts are layered on by `ResilientSource`.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn fetch_result_list(
        &self,
        regd_no: &str,
        dob: &str,
        session: &str,
    ) -> Result<Vec<SemesterDescriptor>>;

    async fn fetch_subject_results(
        &self,
        sem_id: &str,
        regd_no: &str,
        exam_session: &str,
    ) -> Result<Vec<SubjectRecord>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<OutputRow>>;
    async fn transform(&self, rows: Vec<OutputRow>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
