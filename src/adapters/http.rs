use crate::domain::model::{SemesterDescriptor, SubjectRecord};
use crate::domain::ports::{ConfigProvider, ResultSource};
use crate::utils::error::{ExtractError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

const RESULT_LIST_PATH: &str = "student-results-list";
const SUBJECT_LIST_PATH: &str = "student-results-subjects-list";

/// reqwest-backed client for the result-publishing service.
///
/// Each call is a single POST; see `ResilientSource` for retries.
#[derive(Debug, Clone)]
pub struct HttpResultClient {
    client: Client,
    base_url: Url,
    headers: Vec<(String, String)>,
}

impl HttpResultClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Without a trailing slash `Url::join` would replace the last segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| ExtractError::InvalidConfigValueError {
            field: "upstream.endpoint".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            headers: Vec::new(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Self::new(config.api_endpoint(), config.retry_policy().call_timeout)?;
        Ok(client.with_headers(config.request_headers()))
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ExtractError::ConfigError {
                message: format!("Cannot build endpoint {}: {}", path, e),
            })
    }

    /// POSTs with query parameters and decodes a JSON array body. A `null`
    /// body decodes as an empty list.
    async fn post_for_list<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = self.endpoint(path)?;

        let mut request = self.client.post(url).query(query);
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("{} response status: {}", operation, status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Non-2xx response for {}: {}, body: {}", operation, status, body);
            return Err(ExtractError::HttpStatusError {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }

        let items: Option<Vec<T>> = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Error parsing response body for {}: {}", operation, e);
            e
        })?;
        Ok(items.unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl ResultSource for HttpResultClient {
    async fn fetch_result_list(
        &self,
        regd_no: &str,
        dob: &str,
        session: &str,
    ) -> Result<Vec<SemesterDescriptor>> {
        tracing::debug!(
            "Fetching result list for rollNo: {}, session: {}",
            regd_no,
            session
        );
        self.post_for_list(
            "fetch_result_list",
            RESULT_LIST_PATH,
            &[("rollNo", regd_no), ("dob", dob), ("session", session)],
        )
        .await
    }

    async fn fetch_subject_results(
        &self,
        sem_id: &str,
        regd_no: &str,
        exam_session: &str,
    ) -> Result<Vec<SubjectRecord>> {
        tracing::debug!(
            "Fetching subject results for rollNo: {}, semId: {}, session: {}",
            regd_no,
            sem_id,
            exam_session
        );
        self.post_for_list(
            "fetch_subject_results",
            SUBJECT_LIST_PATH,
            &[("semid", sem_id), ("rollNo", regd_no), ("session", exam_session)],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> HttpResultClient {
        HttpResultClient::new(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_result_list_posts_query_parameters() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/student-results-list")
                .query_param("rollNo", "2101289370")
                .query_param("dob", "2001-03-13")
                .query_param("session", "Odd-(2022-23)");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"semId": "3", "examSession": "Odd-(2022-23)"},
                    {"semId": 4, "examSession": "Even-(2022-23)"}
                ]));
        });

        let semesters = client(&server)
            .fetch_result_list("2101289370", "2001-03-13", "Odd-(2022-23)")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(semesters.len(), 2);
        assert_eq!(semesters[1].sem_id.as_deref(), Some("4"));
    }

    #[tokio::test]
    async fn test_fetch_subject_results_decodes_records() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/student-results-subjects-list")
                .query_param("semid", "3")
                .query_param("rollNo", "2101289370")
                .query_param("session", "Odd-(2022-23)");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"semId": "3", "subjectCODE": "RCS3C001", "subjectCredits": 3, "grade": "A"}
                ]));
        });

        let subjects = client(&server)
            .fetch_subject_results("3", "2101289370", "Odd-(2022-23)")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].subject_code.as_deref(), Some("RCS3C001"));
    }

    #[tokio::test]
    async fn test_null_and_empty_bodies_are_empty_lists() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/student-results-list");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("null");
        });
        server.mock(|when, then| {
            when.method(POST).path("/student-results-subjects-list");
            then.status(200).body("");
        });

        let client = client(&server);
        let semesters = client
            .fetch_result_list("1", "2001-03-13", "Odd-(2022-23)")
            .await
            .unwrap();
        let subjects = client
            .fetch_subject_results("3", "1", "Odd-(2022-23)")
            .await
            .unwrap();

        assert!(semesters.is_empty());
        assert!(subjects.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_retryable_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/student-results-list");
            then.status(503).body("maintenance");
        });

        let err = client(&server)
            .fetch_result_list("1", "2001-03-13", "Odd-(2022-23)")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExtractError::HttpStatusError { status: 503, .. }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_retryable_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/student-results-list");
            then.status(200).body("{\"not\": \"a list\"}");
        });

        let err = client(&server)
            .fetch_result_list("1", "2001-03-13", "Odd-(2022-23)")
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::SerializationError(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let client = HttpResultClient::new("https://results.example.edu/api", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(RESULT_LIST_PATH).unwrap();
        assert_eq!(
            url.as_str(),
            "https://results.example.edu/api/student-results-list"
        );
    }
}
