//! A Druid SQL query: configuration, one-shot execution, cached results.
//!
//! A [`Query`] is created unexecuted, configured through chainable
//! mutators, and executed at most once. The first successful call to
//! [`Query::result`] performs the network round trip and caches the parsed
//! result set; later calls return the cached value. Configuration is
//! rejected once the query has executed. Any failure leaves the query
//! unexecuted so it can be reconfigured and retried.

pub mod context;
pub mod params;
pub mod payload;
pub mod response;
pub mod result;
pub mod row_parser;

pub use context::QueryContext;
pub use params::{encode_parameters, SqlParameter, WireParameter};
pub use payload::QueryPayload;
pub use result::QueryResultSet;
pub use row_parser::RowParser;

use crate::error::{DruidLinkError, Result};
use crate::instrument::{LogObserver, QueryEvent, QueryObserver};
use crate::query::response::classify_response;
use crate::transport::SqlTransport;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use uuid::Uuid;

/// One parameterized SQL statement and its execution state.
///
/// Created by [`crate::DruidLinkClient::query`]. Not intended for
/// concurrent mutation, but concurrent [`Query::result`] calls are safe:
/// the first execution is gated internally so at most one request goes out
/// and every caller sees the same cached result.
///
/// # Examples
///
/// ```rust,no_run
/// use druid_link::DruidLinkClient;
///
/// # async fn example() -> druid_link::Result<()> {
/// let client = DruidLinkClient::builder()
///     .uri("http://localhost:8888/druid/v2/sql/")
///     .build()?;
///
/// let mut query = client.query("SELECT channel, COUNT(*) FROM wikipedia WHERE page = ? GROUP BY channel");
/// query
///     .bind("Rust (programming language)")?
///     .in_time_zone("America/Chicago")?
///     .with_approximate_count_distinct()?;
///
/// let result = query.result().await?;
/// for row in result.rows() {
///     println!("{:?}", row);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Query {
    sql: String,
    params: Vec<SqlParameter>,
    context: QueryContext,
    transport: Arc<dyn SqlTransport>,
    observer: Arc<dyn QueryObserver>,
    result: OnceCell<QueryResultSet>,
}

impl Query {
    /// Create an unexecuted query against the given transport.
    ///
    /// A fresh query id is generated here and stays fixed for the query's
    /// lifetime.
    pub fn new(sql: impl Into<String>, transport: Arc<dyn SqlTransport>) -> Self {
        Self::with_observer(sql, transport, Arc::new(LogObserver))
    }

    /// As [`Query::new`], with a caller-supplied execution observer.
    pub fn with_observer(
        sql: impl Into<String>,
        transport: Arc<dyn SqlTransport>,
        observer: Arc<dyn QueryObserver>,
    ) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            context: QueryContext::new(Uuid::new_v4().to_string()),
            transport,
            observer,
            result: OnceCell::new(),
        }
    }

    /// The unique id sent as `sqlQueryId`.
    pub fn id(&self) -> &str {
        &self.context.sql_query_id
    }

    /// The SQL statement.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Whether the query has executed. Once true, configuration mutators
    /// fail with [`DruidLinkError::AlreadyExecuted`].
    pub fn executed(&self) -> bool {
        self.result.initialized()
    }

    /// Append a positional parameter for the next `?` placeholder.
    ///
    /// The parameter count is not validated against the number of
    /// placeholders in the statement; the server reports that mismatch.
    pub fn bind(&mut self, param: impl Into<SqlParameter>) -> Result<&mut Self> {
        self.check_not_executed("bind")?;
        self.params.push(param.into());
        Ok(self)
    }

    /// Set the time zone for this query, affecting time functions and
    /// timestamp literals. A name like `America/Los_Angeles` or an offset
    /// like `-08:00`.
    pub fn in_time_zone(&mut self, zone: impl Into<String>) -> Result<&mut Self> {
        self.check_not_executed("in_time_zone")?;
        self.context.sql_time_zone = Some(zone.into());
        Ok(self)
    }

    /// Allow an approximate cardinality algorithm for `COUNT(DISTINCT ...)`.
    pub fn with_approximate_count_distinct(&mut self) -> Result<&mut Self> {
        self.check_not_executed("with_approximate_count_distinct")?;
        self.context.use_approximate_count_distinct = Some(true);
        Ok(self)
    }

    /// Require exact `COUNT(DISTINCT ...)`.
    pub fn without_approximate_count_distinct(&mut self) -> Result<&mut Self> {
        self.check_not_executed("without_approximate_count_distinct")?;
        self.context.use_approximate_count_distinct = Some(false);
        Ok(self)
    }

    /// Allow approximate TopN execution where the query can be expressed
    /// as one.
    pub fn with_approximate_top_n(&mut self) -> Result<&mut Self> {
        self.check_not_executed("with_approximate_top_n")?;
        self.context.use_approximate_top_n = Some(true);
        Ok(self)
    }

    /// Force exact GroupBy instead of approximate TopN.
    pub fn without_approximate_top_n(&mut self) -> Result<&mut Self> {
        self.check_not_executed("without_approximate_top_n")?;
        self.context.use_approximate_top_n = Some(false);
        Ok(self)
    }

    /// Let the server answer from its segment cache.
    pub fn with_cache(&mut self) -> Result<&mut Self> {
        self.check_not_executed("with_cache")?;
        self.context.use_cache = Some(true);
        Ok(self)
    }

    /// Bypass the server's segment cache.
    pub fn without_cache(&mut self) -> Result<&mut Self> {
        self.check_not_executed("without_cache")?;
        self.context.use_cache = Some(false);
        Ok(self)
    }

    /// Enable window functions for this query.
    pub fn with_windowing(&mut self) -> Result<&mut Self> {
        self.check_not_executed("with_windowing")?;
        self.context.enable_windowing = Some(true);
        Ok(self)
    }

    /// Disable window functions for this query.
    pub fn without_windowing(&mut self) -> Result<&mut Self> {
        self.check_not_executed("without_windowing")?;
        self.context.enable_windowing = Some(false);
        Ok(self)
    }

    /// Set the scheduling priority; higher runs first.
    pub fn with_priority(&mut self, priority: i64) -> Result<&mut Self> {
        self.check_not_executed("with_priority")?;
        self.context.priority = Some(priority);
        Ok(self)
    }

    /// Execute the query, or return the already-cached result.
    ///
    /// The round trip happens at most once: concurrent callers are
    /// serialized on an internal gate and all observe the same cached
    /// result set. On any failure — timeout, transport error, server
    /// error, truncated or unparseable result — the query stays
    /// unexecuted, so the caller may reconfigure and retry.
    pub async fn result(&self) -> Result<&QueryResultSet> {
        self.result.get_or_try_init(|| self.execute_once()).await
    }

    async fn execute_once(&self) -> Result<QueryResultSet> {
        let payload = QueryPayload::build(&self.sql, &self.params, &self.context)?;
        let body = payload.to_json()?;

        // Truncate on a char boundary; a byte slice could split a
        // multi-byte character and panic.
        let sql_preview = match self.sql.char_indices().nth(80) {
            Some((cut, _)) => format!("{}...", &self.sql[..cut]),
            None => self.sql.clone(),
        };
        debug!(
            "[DRUID_QUERY] Starting query id={} sql=\"{}\"",
            self.id(),
            sql_preview.replace('\n', " ")
        );

        let start = Instant::now();
        let outcome = self.transport.submit(body).await;
        let parsed =
            classify_response(outcome).and_then(|body| QueryResultSet::parse(&body));
        let duration = start.elapsed();

        self.observer.query_executed(&QueryEvent {
            name: "Druid SQL",
            sql: &self.sql,
            binds: &self.params,
            context: &self.context,
            duration,
        });

        match &parsed {
            Ok(result) => debug!(
                "[DRUID_QUERY] Success: id={} rows={} duration_ms={}",
                self.id(),
                result.len(),
                duration.as_millis()
            ),
            Err(e) => warn!(
                "[DRUID_QUERY] Failed: id={} error=\"{}\" duration_ms={}",
                self.id(),
                e,
                duration.as_millis()
            ),
        }

        parsed
    }

    fn check_not_executed(&self, operation: &str) -> Result<()> {
        if self.executed() {
            return Err(DruidLinkError::AlreadyExecuted {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("id", &self.id())
            .field("sql", &self.sql)
            .field("params", &self.params)
            .field("executed", &self.executed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::NoopObserver;
    use crate::transport::ResponseOutcome;
    use async_trait::async_trait;

    struct FixedTransport {
        outcome: ResponseOutcome,
    }

    #[async_trait]
    impl SqlTransport for FixedTransport {
        async fn submit(&self, _payload: String) -> ResponseOutcome {
            self.outcome.clone()
        }
    }

    fn query_with_body(body: &str) -> Query {
        Query::with_observer(
            "SELECT 1",
            Arc::new(FixedTransport {
                outcome: ResponseOutcome::Response {
                    status: 200,
                    body: body.to_string(),
                },
            }),
            Arc::new(NoopObserver),
        )
    }

    #[test]
    fn test_each_query_gets_a_fresh_id() {
        let a = query_with_body("\n");
        let b = query_with_body("\n");
        assert_ne!(a.id(), b.id());
        assert!(!a.id().is_empty());
    }

    #[test]
    fn test_mutators_chain_before_execution() {
        let mut query = query_with_body("\n");
        query
            .bind(7i64)
            .unwrap()
            .in_time_zone("Etc/UTC")
            .unwrap()
            .with_approximate_top_n()
            .unwrap()
            .without_cache()
            .unwrap()
            .with_priority(50)
            .unwrap();

        assert!(!query.executed());
        assert_eq!(query.context.sql_time_zone.as_deref(), Some("Etc/UTC"));
        assert_eq!(query.context.use_approximate_top_n, Some(true));
        assert_eq!(query.context.use_cache, Some(false));
        assert_eq!(query.context.priority, Some(50));
    }

    #[tokio::test]
    async fn test_mutators_fail_after_execution() {
        let mut query = query_with_body("[\"a\"]\n[\"1\"]\n\n");
        query.result().await.unwrap();
        assert!(query.executed());

        let err = query.in_time_zone("Etc/UTC").unwrap_err();
        assert_eq!(
            err.to_string(),
            "in_time_zone cannot be set because the query has already been executed"
        );

        let err = query.bind(1i64).unwrap_err();
        assert!(matches!(
            err,
            DruidLinkError::AlreadyExecuted { ref operation } if operation == "bind"
        ));

        // The cached result is untouched by the failed mutation.
        assert_eq!(query.result().await.unwrap().columns(), &["a"]);
    }

    #[tokio::test]
    async fn test_failure_leaves_query_unexecuted() {
        let query = Query::with_observer(
            "SELECT 1",
            Arc::new(FixedTransport {
                outcome: ResponseOutcome::TimedOut,
            }),
            Arc::new(NoopObserver),
        );

        assert!(matches!(
            query.result().await.unwrap_err(),
            DruidLinkError::Timeout
        ));
        assert!(!query.executed());
    }

    #[tokio::test]
    async fn test_long_multibyte_sql_executes_without_panic() {
        // A multi-byte character straddling the preview cut must not abort
        // execution.
        // 71 ASCII chars of padding place the é across bytes 79..81.
        let sql = format!("SELECT '{}é' AS s", "x".repeat(71));
        let query = Query::with_observer(
            sql,
            Arc::new(FixedTransport {
                outcome: ResponseOutcome::Response {
                    status: 200,
                    body: "[\"s\"]\n[\"v\"]\n\n".to_string(),
                },
            }),
            Arc::new(NoopObserver),
        );

        let result = query.result().await.unwrap();
        assert_eq!(result.columns(), &["s"]);
    }

    #[test]
    fn test_debug_reports_state_without_transport() {
        let mut query = query_with_body("\n");
        query.bind(1i64).unwrap();

        let rendered = format!("{:?}", query);
        assert!(rendered.contains("executed: false"));
        assert!(rendered.contains("SELECT 1"));
    }

    #[tokio::test]
    async fn test_non_finite_parameter_fails_before_submission() {
        let mut query = query_with_body("\n");
        query.bind(f64::NAN).unwrap();
        assert!(matches!(
            query.result().await.unwrap_err(),
            DruidLinkError::Configuration(_)
        ));
        assert!(!query.executed());
    }
}
