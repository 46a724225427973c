use crate::utils::error::{ExtractError, Result};

/// Largest number of registration numbers a single request may expand to.
pub const MAX_IDENTIFIERS: u64 = 10_000;

/// Expands an inclusive numeric range such as `2101289370..=2101289380` into
/// decimal-string identifiers, ascending.
pub fn expand_identifiers(start: &str, end: &str) -> Result<Vec<String>> {
    let parse = |value: &str| -> Result<u64> {
        value.trim().parse().map_err(|_| ExtractError::ValidationError {
            message: format!(
                "Registration numbers must be numeric. Invalid format: startRegNo={}, endRegNo={}",
                start, end
            ),
        })
    };

    let first = parse(start)?;
    let last = parse(end)?;

    if first > last {
        return Err(ExtractError::ValidationError {
            message: "startRegNo must be less than or equal to endRegNo".to_string(),
        });
    }

    let count = last - first + 1;
    if count > MAX_IDENTIFIERS {
        return Err(ExtractError::RangeTooLargeError {
            subject: format!("Registration range {}..={} ({} numbers)", first, last, count),
            limit: MAX_IDENTIFIERS,
        });
    }

    let identifiers: Vec<String> = (first..=last).map(|n| n.to_string()).collect();
    tracing::info!(
        "Generated {} registration numbers from {} to {}",
        identifiers.len(),
        start,
        end
    );
    Ok(identifiers)
}
