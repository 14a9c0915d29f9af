use tracing::{debug, warn};

use crate::builder::prepare_bind;
use crate::connection::{Connection, BEGIN, COMMIT, ROLLBACK};
use crate::error::Error;
use crate::registry::StatementRegistry;
use crate::statement::{compile, PreparedStatement};
use crate::value::{Bindings, ExecutionResult, Params, Row};

/// Identifier the `simple_*` methods prepare their statement under.
pub const DEFAULT_IDENTIFIER: &str = "single";

/// Runs named-parameter SQL against one connection.
///
/// `Driver` owns a [`StatementRegistry`]: statements are prepared once under an identifier
/// and then executed or fetched with any number of bind sets. The `simple_*` methods do
/// the whole expand, prepare, run cycle in one call under [`DEFAULT_IDENTIFIER`].
///
/// Every failure coming out of the connection, the bind expansion or the registry is
/// reported as [`Error::Query`], with the SQL and binds attached and the original failure as
/// its source. The one exception is [`Error::UnexpectedResult`] from
/// [`simple_fetch_one`](Self::simple_fetch_one).
///
/// # Type Parameters
///
/// * `C` - The connection, owned (`MySqlConnection`) or borrowed (`&mut MySqlConnection`)
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::{Connection as _, MySqlConnection};
/// use sqlx_pdo_driver::{Driver, Params};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut conn = MySqlConnection::connect("mysql://localhost/test").await?;
/// let mut driver = Driver::new(&mut conn);
///
/// let users = driver
///     .simple_fetch(
///         "SELECT id, name FROM users WHERE id IN (:ids)",
///         &Params::new().bind_list("ids", [1, 2, 3]),
///     )
///     .await?;
/// println!("Found {} users", users.len());
/// # Ok(())
/// # }
/// ```
pub struct Driver<C: Connection> {
    connection: C,
    statements: StatementRegistry<C::Statement>,
}

impl<C: Connection> Driver<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            statements: StatementRegistry::new(),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// Direct access to the connection, for anything this driver does not wrap.
    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Releases every prepared statement and returns the connection.
    pub fn into_inner(self) -> C {
        self.connection
    }

    pub fn statements(&self) -> &StatementRegistry<C::Statement> {
        &self.statements
    }

    pub fn is_prepared(&self, identifier: &str) -> bool {
        self.statements.contains(identifier)
    }

    /// Fetches every row the query returns. Zero rows yield an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the binds cannot be expanded or the query fails.
    pub async fn simple_fetch(&mut self, sql: &str, bind: &Params) -> crate::Result<Vec<Row>> {
        let result = async {
            let query = prepare_bind(sql, bind)?;
            self.prepare(&query.sql, DEFAULT_IDENTIFIER).await?;
            self.fetch(&query.bind, DEFAULT_IDENTIFIER).await
        }
        .await;
        result.map_err(|e| Error::query(sql, bind, e.into_cause()))
    }

    /// Fetches at most one row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedResult`] when more than one row matches, and
    /// [`Error::Query`] when the query itself fails.
    pub async fn simple_fetch_one(&mut self, sql: &str, bind: &Params) -> crate::Result<Option<Row>> {
        let mut rows = self.simple_fetch(sql, bind).await?;
        if rows.len() > 1 {
            return Err(Error::UnexpectedResult {
                sql: sql.to_owned(),
                bind: bind.clone(),
                rows,
            });
        }
        Ok(rows.pop())
    }

    /// Runs a write statement in one call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the binds cannot be expanded or the statement fails.
    pub async fn simple_execute(&mut self, sql: &str, bind: &Params) -> crate::Result<ExecutionResult> {
        let result = async {
            let query = prepare_bind(sql, bind)?;
            self.prepare(&query.sql, DEFAULT_IDENTIFIER).await?;
            self.execute(&query.bind, DEFAULT_IDENTIFIER).await
        }
        .await;
        result.map_err(|e| Error::query(sql, bind, e.into_cause()))
    }

    /// Compiles `sql` and stores it under `identifier`, replacing whatever was there.
    ///
    /// `sql` uses named placeholders and must already be expanded; see
    /// [`prepare_bind`](crate::prepare_bind) for list parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the connection rejects the statement.
    pub async fn prepare(&mut self, sql: &str, identifier: &str) -> crate::Result<()> {
        let result = async {
            let (positional, order) = compile(sql)?;
            let handle = self.connection.prepare_statement(&positional).await?;
            Ok::<_, Error>(PreparedStatement::new(sql.to_owned(), positional, order, handle))
        }
        .await;

        let statement = result.map_err(|e| Error::query(sql, &Params::new(), e))?;
        debug!(identifier, sql, "prepared statement");
        if self.statements.insert(identifier, statement).is_some() {
            warn!(identifier, "replaced a live prepared statement");
        }
        Ok(())
    }

    /// Runs the statement prepared under `identifier` as a write.
    ///
    /// The statement stays prepared and can be executed again straight away.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] wrapping [`Error::StatementNotFound`] when nothing is
    /// prepared under `identifier`, or the connection's failure.
    pub async fn execute(&mut self, bind: &Bindings, identifier: &str) -> crate::Result<ExecutionResult> {
        let Self {
            connection,
            statements,
        } = self;

        let statement = statements
            .get(identifier)
            .map_err(|e| Error::query(String::new(), &Params::from(bind.clone()), e))?;
        let result = async {
            let args = statement.arguments(bind)?;
            Ok::<_, Error>(connection.execute_statement(statement.handle(), &args).await?)
        }
        .await
        .map_err(|e| Error::query(statement.template(), &Params::from(bind.clone()), e))?;

        debug!(
            identifier,
            row_count = result.row_count,
            last_insert_id = result.last_insert_id,
            "executed statement"
        );
        Ok(result)
    }

    /// Runs the statement prepared under `identifier` and collects all of its rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] wrapping [`Error::StatementNotFound`] when nothing is
    /// prepared under `identifier`, or the connection's failure.
    pub async fn fetch(&mut self, bind: &Bindings, identifier: &str) -> crate::Result<Vec<Row>> {
        let Self {
            connection,
            statements,
        } = self;

        let statement = statements
            .get(identifier)
            .map_err(|e| Error::query(String::new(), &Params::from(bind.clone()), e))?;
        let rows = async {
            let args = statement.arguments(bind)?;
            Ok::<_, Error>(connection.fetch_statement(statement.handle(), &args).await?)
        }
        .await
        .map_err(|e| Error::query(statement.template(), &Params::from(bind.clone()), e))?;

        debug!(identifier, rows = rows.len(), "fetched rows");
        Ok(rows)
    }

    /// Drops the statement under `identifier`. Later `execute`/`fetch` calls against it fail
    /// until it is prepared again.
    pub fn clear(&mut self, identifier: &str) -> &mut Self {
        if self.statements.clear(identifier) {
            debug!(identifier, "cleared prepared statement");
        }
        self
    }

    /// Starts a transaction. There is no nesting: a second `begin_transaction` behaves
    /// however the database treats a nested `BEGIN`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`] if the connection refuses.
    pub async fn begin_transaction(&mut self) -> crate::Result<()> {
        debug!("beginning transaction");
        self.connection
            .begin_transaction()
            .await
            .map_err(|e| Error::query(BEGIN, &Params::new(), e.into()))
    }

    /// # Errors
    ///
    /// Returns [`Error::Query`] if the connection refuses, e.g. with no open transaction.
    pub async fn commit(&mut self) -> crate::Result<()> {
        debug!("committing transaction");
        self.connection
            .commit_transaction()
            .await
            .map_err(|e| Error::query(COMMIT, &Params::new(), e.into()))
    }

    /// # Errors
    ///
    /// Returns [`Error::Query`] if the connection refuses, e.g. with no open transaction.
    pub async fn rollback(&mut self) -> crate::Result<()> {
        debug!("rolling back transaction");
        self.connection
            .rollback_transaction()
            .await
            .map_err(|e| Error::query(ROLLBACK, &Params::new(), e.into()))
    }
}

impl<C: Connection> std::fmt::Debug for Driver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("statements", &self.statements.identifiers().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
