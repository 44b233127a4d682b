//! # druid-link
//!
//! Client library for Apache Druid's SQL-over-HTTP endpoint.
//!
//! A [`DruidLinkClient`] validates the service URI once and hands out
//! [`Query`] objects. Each query carries typed positional parameters and a
//! sparse set of execution options, executes its network round trip at most
//! once, and caches the parsed [`QueryResultSet`]. The response — Druid's
//! `arrayLines` format, one JSON array per line with the header first and a
//! trailing blank line as terminator — is decoded by a streaming parser
//! that rejects anything outside the flat scalar-array grammar, so a
//! truncated or non-tabular response can never be mistaken for data.
//!
//! ## Example
//!
//! ```rust,no_run
//! use druid_link::DruidLinkClient;
//!
//! # async fn example() -> druid_link::Result<()> {
//! let client = DruidLinkClient::builder()
//!     .uri("https://druid.example.com/druid/v2/sql/")
//!     .build()?;
//!
//! let mut query = client.query("SELECT page, COUNT(*) AS edits FROM wikipedia WHERE channel = ? GROUP BY page");
//! query.bind("#en.wikipedia")?.in_time_zone("Etc/UTC")?;
//!
//! let result = query.result().await?;
//! println!("{} rows, columns {:?}", result.len(), result.columns());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error taxonomy
//!
//! Every failure is a distinguishable [`DruidLinkError`] kind: caller
//! misuse ([`DruidLinkError::AlreadyExecuted`]), network-layer failures
//! ([`DruidLinkError::Transport`], [`DruidLinkError::Timeout`]),
//! server-reported failures ([`DruidLinkError::Query`]), and malformed
//! output ([`DruidLinkError::ResultTruncated`],
//! [`DruidLinkError::ResultUnparseable`]). A failed query stays
//! unexecuted and may be retried.

pub mod auth;
pub mod client;
pub mod error;
pub mod instrument;
pub mod query;
pub mod timeouts;
pub mod transport;

pub use auth::AuthProvider;
pub use client::{DruidLinkClient, DruidLinkClientBuilder};
pub use error::{DruidLinkError, Result};
pub use instrument::{LogObserver, NoopObserver, QueryEvent, QueryObserver};
pub use query::{
    encode_parameters, Query, QueryContext, QueryPayload, QueryResultSet, RowParser, SqlParameter,
    WireParameter,
};
pub use timeouts::{DruidLinkTimeouts, DruidLinkTimeoutsBuilder};
pub use transport::{HttpTransport, ResponseOutcome, SqlTransport};
