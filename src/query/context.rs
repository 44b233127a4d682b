//! Query context options sent alongside a SQL statement.

use serde::Serialize;

/// Named execution hints for one query.
///
/// The query id is always present; every other field is tri-state — an
/// option that was never set does not appear in the serialized context at
/// all, while an explicit `false` does. Options are set through the
/// mutators on [`crate::Query`], which reject changes once the query has
/// executed.
#[derive(Debug, Clone, Serialize)]
pub struct QueryContext {
    /// Unique id for this query, generated at construction.
    #[serde(rename = "sqlQueryId")]
    pub sql_query_id: String,

    /// Time zone name (`America/Los_Angeles`) or offset (`-08:00`) used for
    /// time functions and timestamp literals.
    #[serde(rename = "sqlTimeZone", skip_serializing_if = "Option::is_none")]
    pub sql_time_zone: Option<String>,

    /// Whether `COUNT(DISTINCT ...)` may use an approximate cardinality
    /// algorithm.
    #[serde(
        rename = "useApproximateCountDistinct",
        skip_serializing_if = "Option::is_none"
    )]
    pub use_approximate_count_distinct: Option<bool>,

    /// Whether queries expressible as TopN may use the approximate TopN
    /// engine instead of exact GroupBy.
    #[serde(rename = "useApproximateTopN", skip_serializing_if = "Option::is_none")]
    pub use_approximate_top_n: Option<bool>,

    /// Whether the server may answer from its segment-level cache.
    #[serde(rename = "useCache", skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,

    /// Whether window functions are enabled for this query.
    #[serde(rename = "enableWindowing", skip_serializing_if = "Option::is_none")]
    pub enable_windowing: Option<bool>,

    /// Scheduling priority; higher values run first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
}

impl QueryContext {
    /// Create a context with the given query id and no options set.
    pub fn new(sql_query_id: String) -> Self {
        Self {
            sql_query_id,
            sql_time_zone: None,
            use_approximate_count_distinct: None,
            use_approximate_top_n: None,
            use_cache: None,
            enable_windowing: None,
            priority: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unset_options_are_absent() {
        let context = QueryContext::new("qid-1".to_string());
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value, json!({ "sqlQueryId": "qid-1" }));
    }

    #[test]
    fn test_explicit_false_is_serialized() {
        let mut context = QueryContext::new("qid-2".to_string());
        context.use_approximate_top_n = Some(false);
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(
            value,
            json!({ "sqlQueryId": "qid-2", "useApproximateTopN": false })
        );
    }

    #[test]
    fn test_all_options_use_wire_names() {
        let mut context = QueryContext::new("qid-3".to_string());
        context.sql_time_zone = Some("Foo/Bar".to_string());
        context.use_approximate_count_distinct = Some(true);
        context.use_approximate_top_n = Some(true);
        context.use_cache = Some(false);
        context.enable_windowing = Some(true);
        context.priority = Some(75);

        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(
            value,
            json!({
                "sqlQueryId": "qid-3",
                "sqlTimeZone": "Foo/Bar",
                "useApproximateCountDistinct": true,
                "useApproximateTopN": true,
                "useCache": false,
                "enableWindowing": true,
                "priority": 75,
            })
        );
    }
}
