//! Observer hooks around query execution.
//!
//! Each execution attempt notifies a caller-supplied [`QueryObserver`]
//! with what ran and for how long. There is no further contract: observers
//! may log, time, or count as they see fit. The default [`LogObserver`]
//! renders a debug line in the style of SQL query logs.

use crate::query::context::QueryContext;
use crate::query::params::SqlParameter;
use log::debug;
use std::time::Duration;

/// A snapshot of one query execution attempt.
#[derive(Debug)]
pub struct QueryEvent<'a> {
    /// Operation name, e.g. `Druid SQL`.
    pub name: &'a str,

    /// The SQL statement that was submitted.
    pub sql: &'a str,

    /// The bind values, in placeholder order.
    pub binds: &'a [SqlParameter],

    /// The execution context the query carried.
    pub context: &'a QueryContext,

    /// Wall-clock time of the round trip, including parsing.
    pub duration: Duration,
}

/// Callback interface invoked after every execution attempt, successful or
/// not.
pub trait QueryObserver: Send + Sync {
    /// Called once per attempt with the execution snapshot.
    fn query_executed(&self, event: &QueryEvent<'_>);
}

/// Observer that does nothing.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl QueryObserver for NoopObserver {
    fn query_executed(&self, _event: &QueryEvent<'_>) {}
}

/// Observer that renders each execution at debug level via the `log`
/// facade: name and duration, the SQL, any context flags, and the binds.
#[derive(Debug, Default)]
pub struct LogObserver;

impl QueryObserver for LogObserver {
    fn query_executed(&self, event: &QueryEvent<'_>) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }

        let flags = context_flags(event.context);
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!("  ({})", flags.join(", "))
        };
        let binds = if event.binds.is_empty() {
            String::new()
        } else {
            format!("  {:?}", event.binds)
        };

        debug!(
            "  {} ({:.1}ms)  {}{}{}",
            event.name,
            event.duration.as_secs_f64() * 1000.0,
            event.sql,
            flags,
            binds
        );
    }
}

/// Render the set context options as human-readable flags.
fn context_flags(context: &QueryContext) -> Vec<String> {
    let mut flags = Vec::new();

    if let Some(zone) = &context.sql_time_zone {
        flags.push(format!("in time zone {}", zone));
    }
    push_flag(
        &mut flags,
        "approximate count distinct",
        context.use_approximate_count_distinct,
    );
    push_flag(&mut flags, "approximate top N", context.use_approximate_top_n);
    push_flag(&mut flags, "cache", context.use_cache);
    push_flag(&mut flags, "windowing", context.enable_windowing);
    if let Some(priority) = context.priority {
        flags.push(format!("priority = {}", priority));
    }

    flags
}

fn push_flag(flags: &mut Vec<String>, human: &str, value: Option<bool>) {
    match value {
        Some(true) => flags.push(format!("with {}", human)),
        Some(false) => flags.push(format!("without {}", human)),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_flags_empty_when_nothing_set() {
        let context = QueryContext::new("qid".to_string());
        assert!(context_flags(&context).is_empty());
    }

    #[test]
    fn test_context_flags_render_with_and_without() {
        let mut context = QueryContext::new("qid".to_string());
        context.sql_time_zone = Some("America/Los_Angeles".to_string());
        context.use_approximate_count_distinct = Some(true);
        context.use_approximate_top_n = Some(false);
        context.priority = Some(-1);

        assert_eq!(
            context_flags(&context),
            vec![
                "in time zone America/Los_Angeles",
                "with approximate count distinct",
                "without approximate top N",
                "priority = -1",
            ]
        );
    }
}
