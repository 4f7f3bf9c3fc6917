use thiserror::Error;

use super::ArticleId;

/// Errors raised by the article store.
///
/// These propagate to callers unmodified; nothing in the core retries them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Article not found: {article_id}")]
    NotFound { article_id: ArticleId },

    #[error("Article {article_id} has no summary to review")]
    NoSummary { article_id: ArticleId },

    /// The store could not be reached (I/O, TLS, pool exhausted or closed)
    #[error("Article store unavailable: {0}")]
    Connection(sqlx::Error),

    /// The store answered but the query failed (constraint, decode, schema)
    #[error("Article store query failed: {0}")]
    Query(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Connection(error),
            _ => StoreError::Query(error),
        }
    }
}

impl StoreError {
    /// Connection failures can be retried by the reviewer; the rest need a refresh.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }

    pub fn article_id(&self) -> Option<ArticleId> {
        match self {
            StoreError::NotFound { article_id } | StoreError::NoSummary { article_id } => {
                Some(*article_id)
            }
            StoreError::Connection(_) | StoreError::Query(_) => None,
        }
    }
}

/// Startup configuration errors. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// A raw filter value that couldn't be mapped onto its field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field} filter value {value:?}")]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
}
