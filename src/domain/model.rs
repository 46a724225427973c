use crate::domain::session::SessionLabel;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One published semester result, as returned by `student-results-list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterDescriptor {
    #[serde(default, deserialize_with = "lenient_string")]
    pub sem_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub exam_session: Option<String>,
}

/// One subject within a semester, as returned by `student-results-subjects-list`.
///
/// Only `sem_id`, `subject_code`, `subject_credits` and `grade` reach the output;
/// the rest are kept so the record round-trips for debugging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub course: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sem_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub branch_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub roll_no: Option<String>,
    #[serde(rename = "subjectCODE", default, deserialize_with = "lenient_string")]
    pub subject_code: Option<String>,
    #[serde(rename = "subjectTP", default, deserialize_with = "lenient_string")]
    pub subject_tp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub subject_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub subject_credits: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub points: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub credit_points: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub recheck: Option<i64>,
}

/// A row of the final table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    pub regd_no: String,
    pub sem_id: Option<String>,
    pub subject_code: Option<String>,
    pub credits: Option<i64>,
    pub grade: Option<String>,
    pub exam_session: String,
}

impl OutputRow {
    pub fn from_subject(regd_no: &str, exam_session: &str, subject: SubjectRecord) -> Self {
        Self {
            regd_no: regd_no.to_string(),
            sem_id: subject.sem_id,
            subject_code: subject.subject_code,
            credits: subject.subject_credits,
            grade: subject.grade,
            exam_session: exam_session.to_string(),
        }
    }
}

/// One (identifier, session) pair scheduled for concurrent processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub regd_no: String,
    pub session: SessionLabel,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub rows: Vec<OutputRow>,
    pub csv_output: String,
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_integer<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
