//! The submittable query payload.

use crate::error::Result;
use crate::query::context::QueryContext;
use crate::query::params::{encode_parameters, SqlParameter, WireParameter};
use serde::Serialize;

/// The JSON object posted to the SQL endpoint.
///
/// `header` is always true so the first response line is the column header,
/// and `resultFormat` is always `arrayLines` so column names are not
/// repeated on every row; the response parser depends on both.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPayload {
    /// The SQL statement, with `?` placeholders for parameters.
    pub query: String,

    /// Forces the header row; always true.
    pub header: bool,

    /// Encoded positional parameters.
    pub parameters: Vec<WireParameter>,

    /// Response wire format selector; always `arrayLines`.
    #[serde(rename = "resultFormat")]
    pub result_format: &'static str,

    /// Sparse execution options, query id included.
    pub context: QueryContext,
}

impl QueryPayload {
    /// Build the payload for a statement, its parameters, and its context.
    ///
    /// Fails fast if any parameter cannot be encoded (a non-finite DOUBLE),
    /// rather than emitting invalid wire data.
    pub fn build(sql: &str, params: &[SqlParameter], context: &QueryContext) -> Result<Self> {
        Ok(Self {
            query: sql.to_string(),
            header: true,
            parameters: encode_parameters(params)?,
            result_format: "arrayLines",
            context: context.clone(),
        })
    }

    /// Serialize to the JSON body submitted to the transport.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            crate::error::DruidLinkError::Configuration(format!(
                "failed to serialize query payload: {}",
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let context = QueryContext::new("qid".to_string());
        let payload =
            QueryPayload::build("SELECT 1312", &[SqlParameter::from("y")], &context).unwrap();
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "SELECT 1312",
                "header": true,
                "parameters": [{ "type": "VARCHAR", "value": "y" }],
                "resultFormat": "arrayLines",
                "context": { "sqlQueryId": "qid" },
            })
        );
    }

    #[test]
    fn test_build_rejects_non_finite_double() {
        let context = QueryContext::new("qid".to_string());
        let err = QueryPayload::build("SELECT ?", &[SqlParameter::Double(f64::NAN)], &context)
            .unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let mut context = QueryContext::new("qid".to_string());
        context.sql_time_zone = Some("Etc/UTC".to_string());
        let payload = QueryPayload::build(
            "SELECT ? + ?",
            &[1i64.into(), 2i64.into()],
            &context,
        )
        .unwrap();
        assert_eq!(payload.to_json().unwrap(), payload.to_json().unwrap());
    }
}
