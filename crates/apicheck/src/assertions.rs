//! Response expectations.

use apicheck_harness::{ApiResponse, AssertionError};

/// Compares a response with the expected HTTP status, business
/// `responseCode` and, when given, business `message`.
///
/// All mismatches are collected into one error, joined with `" | "`.
pub fn assert_response(
    response: &ApiResponse,
    status: u16,
    response_code: i64,
    message: Option<&str>,
) -> Result<(), AssertionError> {
    let mut mismatches = Vec::new();

    if response.status != status {
        mismatches.push(format!(
            "Status: expected {}, got {}",
            status, response.status
        ));
    }

    let actual_code = response.response_code();
    if actual_code != Some(response_code) {
        mismatches.push(format!(
            "responseCode: expected {}, got {}",
            response_code,
            display_or_missing(actual_code)
        ));
    }

    if let Some(expected) = message {
        let actual = response.message();
        if actual != Some(expected) {
            mismatches.push(format!(
                "Message: expected \"{}\", got \"{}\"",
                expected,
                display_or_missing(actual)
            ));
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(AssertionError { mismatches })
    }
}

fn display_or_missing<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "undefined".to_string())
}
