use crate::domain::model::OutputRow;
use crate::utils::error::{ExtractError, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const CSV_HEADER: [&str; 6] = [
    "regdNo",
    "semId",
    "subjectCode",
    "credits",
    "grade",
    "examSession",
];

/// Renders rows in the order given, one `\n`-terminated line each.
///
/// Fields containing a delimiter, quote or line break are quoted with inner
/// quotes doubled. Missing credits are written as `0`, other missing values
/// as empty fields.
pub fn to_csv(rows: &[OutputRow]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for row in rows {
        let credits = row.credits.unwrap_or(0).to_string();
        writer.write_record([
            row.regd_no.as_str(),
            row.sem_id.as_deref().unwrap_or(""),
            row.subject_code.as_deref().unwrap_or(""),
            credits.as_str(),
            row.grade.as_deref().unwrap_or(""),
            row.exam_session.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExtractError::ProcessingError {
            message: format!("Failed to flush CSV output: {}", e.error()),
        })?;

    String::from_utf8(bytes).map_err(|e| ExtractError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(grade: &str, credits: Option<i64>) -> OutputRow {
        OutputRow {
            regd_no: "2101289370".to_string(),
            sem_id: Some("3".to_string()),
            subject_code: Some("RCS3C001".to_string()),
            credits,
            grade: Some(grade.to_string()),
            exam_session: "Odd-(2022-23)".to_string(),
        }
    }

    #[test]
    fn test_empty_rows_is_header_only() {
        assert_eq!(
            to_csv(&[]).unwrap(),
            "regdNo,semId,subjectCode,credits,grade,examSession\n"
        );
    }

    #[test]
    fn test_plain_rows() {
        let csv = to_csv(&[row("A", Some(3)), row("O", Some(4))]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2101289370,3,RCS3C001,3,A,Odd-(2022-23)");
        assert_eq!(lines[2], "2101289370,3,RCS3C001,4,O,Odd-(2022-23)");
        assert!(csv.ends_with("Odd-(2022-23)\n"));
        assert!(!csv.ends_with("\n\n"));
    }

    #[test]
    fn test_comma_is_quoted() {
        let csv = to_csv(&[row("A,B", Some(3))]).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "2101289370,3,RCS3C001,3,\"A,B\",Odd-(2022-23)"
        );
    }

    #[test]
    fn test_quote_is_doubled() {
        let mut r = row("A", Some(3));
        r.subject_code = Some("3\"5".to_string());
        let csv = to_csv(&[r]).unwrap();
        assert!(csv.contains(",\"3\"\"5\","));
    }

    #[test]
    fn test_newline_is_quoted() {
        let csv = to_csv(&[row("A\nB", Some(3))]).unwrap();
        assert!(csv.contains("\"A\nB\""));
    }

    #[test]
    fn test_missing_values() {
        let mut r = row("A", None);
        r.grade = None;
        r.sem_id = None;
        let csv = to_csv(&[r]).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "2101289370,,RCS3C001,0,,Odd-(2022-23)"
        );
    }
}
