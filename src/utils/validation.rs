use crate::utils::error::{ExtractError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ExtractError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Request fields are user input, so failures surface as validation errors
/// rather than configuration errors.
pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ExtractError::ValidationError {
            message: format!("{} is required", field_name),
        });
    }
    Ok(())
}

pub fn validate_iso_date(field_name: &str, value: &str) -> Result<()> {
    if !ISO_DATE.is_match(value) {
        return Err(ExtractError::ValidationError {
            message: format!("{} must be in YYYY-MM-DD format, got {}", field_name, value),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ExtractError::ValidationError {
        message: format!("{} is not a valid date ({}): {}", field_name, value, e),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("upstream.endpoint", "https://example.com").is_ok());
        assert!(validate_url("upstream.endpoint", "http://example.com").is_ok());
        assert!(validate_url("upstream.endpoint", "").is_err());
        assert!(validate_url("upstream.endpoint", "invalid-url").is_err());
        assert!(validate_url("upstream.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("concurrent_requests", 5, 1).is_ok());
        assert!(validate_positive_number("concurrent_requests", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("dob", "2001-03-13").is_ok());
        assert!(matches!(
            validate_required("dob", "   "),
            Err(ExtractError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_iso_date() {
        assert!(validate_iso_date("dob", "2001-03-13").is_ok());
        assert!(validate_iso_date("dob", "2001-3-13").is_err());
        assert!(validate_iso_date("dob", "13-03-2001").is_err());
        assert!(validate_iso_date("dob", "2001-02-30").is_err());
    }
}
