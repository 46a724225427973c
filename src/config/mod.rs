pub mod cli;
pub mod toml_config;

use crate::core::retry::{RetryPolicy, DEFAULT_MAX_RETRIES};
use crate::core::gate::DEFAULT_CONCURRENT_REQUESTS;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://results.bput.ac.in";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_FILENAME_PREFIX: &str = "bput_results";
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const MAX_CONCURRENT_REQUESTS: usize = 100;
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Checks shared by every configuration source.
pub(crate) fn validate_settings(
    prefix: &str,
    api_endpoint: &str,
    output_path: &str,
    concurrent_requests: usize,
    policy: &RetryPolicy,
) -> Result<()> {
    validate_url(&format!("{}endpoint", prefix), api_endpoint)?;
    validate_path(&format!("{}output_path", prefix), output_path)?;
    validate_range(
        &format!("{}concurrent_requests", prefix),
        concurrent_requests,
        1,
        MAX_CONCURRENT_REQUESTS,
    )?;
    validate_range(
        &format!("{}max_retries", prefix),
        policy.max_retries,
        0,
        MAX_RETRIES_LIMIT,
    )?;
    validate_range(
        &format!("{}timeout_seconds", prefix),
        policy.call_timeout.as_secs(),
        1,
        600,
    )?;
    Ok(())
}

#[cfg(feature = "cli")]
pub use self::cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::*;
    use crate::core::ConfigProvider;
    use crate::domain::request::ExtractionRequest;
    use clap::Parser;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "result-etl")]
    #[command(about = "Extract student results for a registration range into CSV")]
    pub struct CliConfig {
        #[arg(long, help = "First registration number (inclusive)")]
        pub start_reg_no: String,

        #[arg(long, help = "Last registration number (inclusive)")]
        pub end_reg_no: String,

        #[arg(long, help = "Date of birth, YYYY-MM-DD")]
        pub dob: String,

        #[arg(long, help = "First session, e.g. Odd-(2022-23)")]
        pub start_session: String,

        #[arg(long, help = "Last session; defaults to the start session")]
        pub end_session: Option<String>,

        #[arg(short, long, help = "Path to a TOML configuration file")]
        pub config: Option<String>,

        #[arg(long)]
        pub api_endpoint: Option<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        #[arg(long)]
        pub concurrent_requests: Option<usize>,

        #[arg(long)]
        pub max_retries: Option<u32>,

        #[arg(long)]
        pub retry_delay_ms: Option<u64>,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long)]
        pub filename_prefix: Option<String>,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[arg(long, help = "Show the work plan without calling the upstream")]
        pub dry_run: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        pub fn request(&self) -> ExtractionRequest {
            ExtractionRequest {
                start_reg_no: self.start_reg_no.clone(),
                end_reg_no: self.end_reg_no.clone(),
                dob: self.dob.clone(),
                start_session: self.start_session.clone(),
                end_session: self.end_session.clone(),
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn api_endpoint(&self) -> &str {
            self.api_endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
        }

        fn output_path(&self) -> &str {
            self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
        }

        fn concurrent_requests(&self) -> usize {
            self.concurrent_requests
                .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
        }

        fn retry_policy(&self) -> RetryPolicy {
            RetryPolicy {
                max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                base_delay: Duration::from_millis(
                    self.retry_delay_ms.unwrap_or(DEFAULT_RETRY_DELAY_MS),
                ),
                call_timeout: Duration::from_secs(
                    self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
                ),
            }
        }

        fn filename_prefix(&self) -> &str {
            self.filename_prefix
                .as_deref()
                .unwrap_or(DEFAULT_FILENAME_PREFIX)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_settings(
                "",
                self.api_endpoint(),
                self.output_path(),
                self.concurrent_requests(),
                &self.retry_policy(),
            )
        }
    }

}
