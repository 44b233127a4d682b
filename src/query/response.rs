//! Classification of transport outcomes into success or a typed error.

use crate::error::{DruidLinkError, Result};
use crate::transport::ResponseOutcome;
use serde_json::Value;

/// The only status the SQL endpoint returns for a well-formed result.
/// Anything else is unexpected and gets its body parsed as an error.
const SUCCESS_STATUS: u16 = 200;

/// Inspect the outcome of one submission and either hand back the body for
/// row parsing or classify the failure.
///
/// A timeout wins over everything else, including any partial body; a
/// transport-level failure comes next; then the body of any non-200
/// response is interpreted as a server-reported query error.
pub fn classify_response(outcome: ResponseOutcome) -> Result<String> {
    match outcome {
        ResponseOutcome::TimedOut => Err(DruidLinkError::Timeout),
        ResponseOutcome::TransportFailure { code, message } => {
            Err(DruidLinkError::Transport { code, message })
        }
        ResponseOutcome::Response { status, body } if status == SUCCESS_STATUS => Ok(body),
        ResponseOutcome::Response { body, .. } => {
            Err(DruidLinkError::Query(parse_query_error(&body)))
        }
    }
}

/// Extract an error message from a non-200 response body.
///
/// The server normally sends a JSON object with `error` and/or
/// `errorMessage` fields; whichever are present are joined with `": "`. A
/// body that is not such an object still produces a message — it is quoted
/// verbatim so the caller has something to diagnose with.
fn parse_query_error(body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let components: Vec<&str> = ["error", "errorMessage"]
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .collect();
        if !components.is_empty() {
            return components.join(": ");
        }
    }

    format!(
        "An error occurred, but the server's response was unparseable: {}",
        body
    )
}
