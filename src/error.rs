use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of one analysis exchange.
///
/// The variants only determine which user-facing message is produced; the
/// session collapses all of them into the same failed state and the user
/// may always re-submit.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// No response was obtained from the service (connection failure,
    /// timeout, interrupted transfer).
    #[error("Failed to analyze the image")]
    Transport(#[source] reqwest::Error),

    /// The service answered with a non-success status. `message` carries
    /// the body-level error when one was present, otherwise the status
    /// fallback.
    #[error("{message}")]
    Server { status: StatusCode, message: String },

    /// The service answered with a success status but the body signals an
    /// application-level error.
    #[error("{0}")]
    Api(String),

    /// The service answered with a success status but the body was not
    /// decodable JSON.
    #[error("Failed to analyze the image")]
    Decode(#[source] reqwest::Error),
}

/// Extracts the error message a response body carries, if any.
///
/// Checks the `error` field first, then `msg` of the first `detail` entry,
/// independent of the HTTP status the body arrived with. Returns `None`
/// when neither field holds a usable message, leaving the fallback to the
/// caller.
pub fn extract_api_error(body: &Value) -> Option<String> {
    if let Some(message) = coerce_message(body.get("error")) {
        return Some(message);
    }
    let detail = body.get("detail")?.as_array()?;
    coerce_message(detail.first()?.get("msg"))
}

// Absent, null, and empty-string values carry no message; anything else
// non-string is rendered as its JSON text.
fn coerce_message(field: Option<&Value>) -> Option<String> {
    match field? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
