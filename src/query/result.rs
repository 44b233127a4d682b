//! Assembly of parsed rows into a queryable result set.

use crate::error::{DruidLinkError, Result};
use crate::query::row_parser::RowParser;
use serde_json::Value;
use std::collections::HashMap;

/// The result of one successfully executed query.
///
/// The first response line is the header (ordered column names); every
/// other line is a data row zipped positionally against it. The set is
/// immutable once assembled. Data rows are expected to match the header's
/// arity but this is not re-validated — the parser already rejects every
/// structural violation the server could plausibly produce, and the rows
/// are forwarded as received.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl QueryResultSet {
    /// Parse a complete response body into a result set.
    ///
    /// The body must end with a terminating blank line; without it the
    /// stream was cut short and the rows cannot be trusted, even if every
    /// line parsed cleanly, so this fails with
    /// [`DruidLinkError::ResultTruncated`] before any rows are surfaced.
    pub fn parse(body: &str) -> Result<Self> {
        if body != "\n" && !body.ends_with("\n\n") {
            return Err(DruidLinkError::ResultTruncated);
        }

        let mut parsed: Vec<Vec<Value>> = Vec::new();
        for line in body.lines().filter(|line| !line.is_empty()) {
            parsed.push(RowParser::parse(line)?);
        }

        let mut rows = parsed.into_iter();
        let header = rows.next().ok_or_else(|| {
            DruidLinkError::ResultUnparseable("response contained no header row".to_string())
        })?;
        let columns = header
            .into_iter()
            .map(|value| match value {
                Value::String(name) => Ok(name),
                other => Err(DruidLinkError::ResultUnparseable(format!(
                    "header row contained a non-string column name: {}",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            columns,
            rows: rows.collect(),
        })
    }

    /// Ordered column names from the header row.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All data rows, in response order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A data row by index.
    pub fn get(&self, row_idx: usize) -> Option<&[Value]> {
        self.rows.get(row_idx).map(Vec::as_slice)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// A single cell, addressed by row index and column name.
    pub fn value(&self, row_idx: usize, column: &str) -> Option<&Value> {
        let col_idx = self.column_index(column)?;
        self.rows.get(row_idx)?.get(col_idx)
    }

    /// Iterate over data rows.
    pub fn iter(&self) -> std::slice::Iter<'_, Vec<Value>> {
        self.rows.iter()
    }

    /// A data row as a name-to-value map, for convenience.
    pub fn row_as_map(&self, row_idx: usize) -> Option<HashMap<String, Value>> {
        let row = self.rows.get(row_idx)?;
        let mut map = HashMap::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            if let Some(value) = row.get(i) {
                map.insert(column.clone(), value.clone());
            }
        }
        Some(map)
    }
}

impl<'a> IntoIterator for &'a QueryResultSet {
    type Item = &'a Vec<Value>;
    type IntoIter = std::slice::Iter<'a, Vec<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_header_and_rows() {
        let result = QueryResultSet::parse("[\"a\",\"b\"]\n[\"1\",\"2\"]\n\n").unwrap();
        assert_eq!(result.columns(), &["a", "b"]);
        assert_eq!(result.len(), 1);
        assert_eq!(result.get(0).unwrap(), &[json!("1"), json!("2")]);
    }

    #[test]
    fn test_header_only_result_is_empty() {
        let result = QueryResultSet::parse("[\"col\"]\n\n").unwrap();
        assert_eq!(result.columns(), &["col"]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_missing_terminator_is_truncated() {
        let err = QueryResultSet::parse("[\"a\",\"b\"]\n[\"1\",\"2\"]\n").unwrap_err();
        assert!(matches!(err, DruidLinkError::ResultTruncated));
    }

    #[test]
    fn test_empty_body_is_truncated() {
        assert!(matches!(
            QueryResultSet::parse("").unwrap_err(),
            DruidLinkError::ResultTruncated
        ));
    }

    #[test]
    fn test_unterminated_single_row_is_truncated_even_if_parseable() {
        let err = QueryResultSet::parse("[\"a\"]").unwrap_err();
        assert!(matches!(err, DruidLinkError::ResultTruncated));
    }

    #[test]
    fn test_terminator_without_header_is_unparseable() {
        let err = QueryResultSet::parse("\n").unwrap_err();
        assert!(matches!(err, DruidLinkError::ResultUnparseable(_)));
    }

    #[test]
    fn test_non_string_header_cell_is_unparseable() {
        let err = QueryResultSet::parse("[\"a\",1]\n[\"x\",\"y\"]\n\n").unwrap_err();
        match err {
            DruidLinkError::ResultUnparseable(msg) => {
                assert_eq!(msg, "header row contained a non-string column name: 1");
            }
            other => panic!("expected ResultUnparseable, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_row_grammar_propagates() {
        let err = QueryResultSet::parse("[\"a\"]\n[[\"oops\"], \"x\"]\n\n").unwrap_err();
        match err {
            DruidLinkError::ResultUnparseable(msg) => {
                assert_eq!(msg, "Row was already initialized");
            }
            other => panic!("expected ResultUnparseable, got {:?}", other),
        }
    }

    #[test]
    fn test_named_and_positional_access() {
        let body = "[\"id\",\"name\",\"score\"]\n[1,\"alice\",2.5]\n[2,\"bob\",null]\n\n";
        let result = QueryResultSet::parse(body).unwrap();

        assert_eq!(result.column_index("name"), Some(1));
        assert_eq!(result.column_index("missing"), None);
        assert_eq!(result.value(0, "name"), Some(&json!("alice")));
        assert_eq!(result.value(1, "score"), Some(&json!(null)));
        assert_eq!(result.value(2, "id"), None);

        let map = result.row_as_map(1).unwrap();
        assert_eq!(map.get("id"), Some(&json!(2)));
        assert_eq!(map.get("name"), Some(&json!("bob")));
    }

    #[test]
    fn test_iteration_preserves_order() {
        let body = "[\"n\"]\n[1]\n[2]\n[3]\n\n";
        let result = QueryResultSet::parse(body).unwrap();
        let values: Vec<i64> = result
            .iter()
            .map(|row| row[0].as_i64().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_mixed_scalar_types_survive() {
        let body = "[\"s\",\"i\",\"f\",\"b\"]\n[\"x\",7,1.5,true]\n\n";
        let result = QueryResultSet::parse(body).unwrap();
        assert_eq!(
            result.get(0).unwrap(),
            &[json!("x"), json!(7), json!(1.5), json!(true)]
        );
    }
}
