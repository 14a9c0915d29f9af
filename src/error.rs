use crate::value::{Params, Row};

/// Error types for sqlx-pdo-driver
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error during SQL template parsing
    #[error("Failed to parse SQL template: {0}")]
    Parse(#[from] regex::Error),

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Placeholder was referenced by the statement but no value was bound to it
    #[error("Placeholder ':{0}' was not bound")]
    UnboundPlaceholder(String),

    /// A value was bound under a name the statement never references
    #[error("Bind parameter ':{0}' is not referenced by the statement")]
    UnusedBind(String),

    /// List expansion produced a name that is already bound as a scalar
    #[error("Bind parameter ':{0}' is bound twice after list expansion")]
    DuplicateBind(String),

    /// A list-valued bind parameter had no elements
    #[error("Bind parameter ':{name}' is an empty list")]
    EmptyListBind {
        name: String,
        sql: String,
        bind: Params,
    },

    /// No prepared statement lives under the identifier
    #[error("No prepared statement under identifier '{0}'")]
    StatementNotFound(String),

    /// Any failure while preparing, binding or running a statement
    #[error("Query failed: {source} (sql: {sql})")]
    Query {
        sql: String,
        bind: Params,
        source: Box<Error>,
    },

    /// A single-row lookup matched more than one row
    #[error("Expected at most one row, the query returned {}", rows.len())]
    UnexpectedResult {
        sql: String,
        bind: Params,
        rows: Vec<Row>,
    },

    /// Failure while reading a configuration source
    #[error("Failed to import configuration: {0}")]
    Import(#[from] dotenvy::Error),

    #[error("Invalid environment key '{0}'")]
    InvalidEnvironmentKey(String),

    #[error("Environment key '{0}' is important and cannot be overwritten")]
    ImportantEnvironmentKey(String),

    #[error("Environment key '{0}' not found")]
    EnvironmentKeyNotFound(String),
}

impl Error {
    pub(crate) fn query(sql: impl Into<String>, bind: &Params, source: Error) -> Self {
        Error::Query {
            sql: sql.into(),
            bind: bind.clone(),
            source: Box::new(source),
        }
    }

    /// Strips every `Query` wrapper, keeping only the innermost error.
    pub(crate) fn into_cause(self) -> Error {
        match self {
            Error::Query { source, .. } => source.into_cause(),
            other => other,
        }
    }

    /// Returns the innermost error, looking through any `Query` wrappers.
    ///
    /// ```
    /// use sqlx_pdo_driver::{Error, Params};
    ///
    /// let err = Error::Query {
    ///     sql: "SELECT 1".into(),
    ///     bind: Params::new(),
    ///     source: Box::new(Error::StatementNotFound("reader".into())),
    /// };
    /// assert!(matches!(err.cause(), Error::StatementNotFound(id) if id == "reader"));
    /// ```
    pub fn cause(&self) -> &Error {
        let mut current = self;
        while let Error::Query { source, .. } = current {
            current = source;
        }
        current
    }

    /// `true` when the error reports an ambiguous single-row lookup rather than a broken query.
    pub fn is_unexpected_result(&self) -> bool {
        matches!(self, Error::UnexpectedResult { .. })
    }
}

/// Result type alias for sqlx-pdo-driver operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_unwraps_nested_queries() {
        let inner = Error::query("SELECT 1", &Params::new(), Error::UnusedBind("id".into()));
        let outer = Error::query("SELECT 1", &Params::new(), inner);

        assert!(matches!(outer.cause(), Error::UnusedBind(name) if name == "id"));
    }

    #[test]
    fn test_into_cause_drops_wrappers() {
        let inner = Error::query("SELECT ?", &Params::new(), Error::UnboundPlaceholder("id".into()));
        let rewrapped = Error::query("SELECT :id", &Params::new(), inner.into_cause());

        assert_eq!(
            rewrapped.to_string(),
            "Query failed: Placeholder ':id' was not bound (sql: SELECT :id)"
        );
    }

    #[test]
    fn test_cause_of_plain_error_is_itself() {
        let err = Error::StatementNotFound("single".into());
        assert!(matches!(err.cause(), Error::StatementNotFound(_)));
    }

    #[test]
    fn test_query_display_includes_sql_and_cause() {
        let err = Error::query(
            "SELECT * FROM users WHERE id = :id",
            &Params::new(),
            Error::UnboundPlaceholder("id".into()),
        );
        let message = err.to_string();
        assert!(message.contains("Placeholder ':id' was not bound"));
        assert!(message.contains("SELECT * FROM users WHERE id = :id"));
    }

    #[test]
    fn test_unexpected_result_is_distinguishable() {
        let err = Error::UnexpectedResult {
            sql: "SELECT * FROM users".into(),
            bind: Params::new(),
            rows: vec![Row::new(), Row::new()],
        };
        assert!(err.is_unexpected_result());
        assert_eq!(err.to_string(), "Expected at most one row, the query returned 2");
        assert!(!Error::StatementNotFound("x".into()).is_unexpected_result());
    }
}
