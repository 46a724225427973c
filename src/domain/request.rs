use crate::domain::identifiers::expand_identifiers;
use crate::utils::error::Result;
use crate::utils::validation::{validate_iso_date, validate_required, Validate};
use serde::{Deserialize, Serialize};

/// What a caller asks for: a registration-number range, the shared date of
/// birth, and a session range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub start_reg_no: String,
    pub end_reg_no: String,
    pub dob: String,
    pub start_session: String,
    #[serde(default)]
    pub end_session: Option<String>,
}

/// A validated request with the identifier range already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub identifiers: Vec<String>,
    pub dob: String,
    pub start_session: String,
    pub end_session: String,
}

impl ExtractionRequest {
    /// `end_session` falls back to `start_session` when omitted.
    pub fn end_session(&self) -> &str {
        self.end_session
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(self.start_session.as_str())
    }

    pub fn into_batch(self) -> Result<BatchRequest> {
        self.validate()?;

        let identifiers = expand_identifiers(&self.start_reg_no, &self.end_reg_no)?;
        let end_session = self.end_session().to_string();

        Ok(BatchRequest {
            identifiers,
            dob: self.dob,
            start_session: self.start_session,
            end_session,
        })
    }
}

impl Validate for ExtractionRequest {
    fn validate(&self) -> Result<()> {
        validate_required("startRegNo", &self.start_reg_no)?;
        validate_required("endRegNo", &self.end_reg_no)?;
        validate_required("dob", &self.dob)?;
        validate_required("startSession", &self.start_session)?;
        validate_iso_date("dob", &self.dob)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ExtractError;

    fn request() -> ExtractionRequest {
        ExtractionRequest {
            start_reg_no: "2101289370".to_string(),
            end_reg_no: "2101289372".to_string(),
            dob: "2001-03-13".to_string(),
            start_session: "Odd-(2022-23)".to_string(),
            end_session: Some("Even-(2024-25)".to_string()),
        }
    }

    #[test]
    fn test_into_batch_expands_identifiers() {
        let batch = request().into_batch().unwrap();
        assert_eq!(batch.identifiers.len(), 3);
        assert_eq!(batch.identifiers[0], "2101289370");
        assert_eq!(batch.end_session, "Even-(2024-25)");
    }

    #[test]
    fn test_missing_end_session_defaults_to_start() {
        let mut req = request();
        req.end_session = None;
        assert_eq!(req.into_batch().unwrap().end_session, "Odd-(2022-23)");

        let mut req = request();
        req.end_session = Some("  ".to_string());
        assert_eq!(req.end_session(), "Odd-(2022-23)");
    }

    #[test]
    fn test_required_fields() {
        let mut req = request();
        req.dob = String::new();
        let err = req.into_batch().unwrap_err();
        assert!(err.to_string().contains("dob is required"));

        let mut req = request();
        req.start_session = " ".to_string();
        assert!(matches!(
            req.validate(),
            Err(ExtractError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_deserializes_camel_case_request() {
        let json = r#"{
            "startRegNo": "2101289370",
            "endRegNo": "2101289380",
            "startSession": "Odd-(2022-23)",
            "endSession": "Even-(2024-25)",
            "dob": "2001-03-13"
        }"#;

        let req: ExtractionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.end_reg_no, "2101289380");
        assert_eq!(req.end_session(), "Even-(2024-25)");
    }
}
