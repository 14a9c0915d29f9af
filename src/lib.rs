//! # sqlx-pdo-driver
//!
//! A statement-registry driver for SQLx with named placeholders, list parameter expansion
//! and pagination helpers.
//!
//! ## Features
//!
//! - **Named Placeholders**: Write `:param_name` instead of `?`; compiled to positional SQL before preparing
//! - **List Parameters**: Bind a list to `IN (:ids)` and it expands to `:ids_0, :ids_1, ...`
//! - **Statement Registry**: Keep several prepared statements alive on one connection under separate identifiers
//! - **One-Shot Helpers**: `simple_fetch`, `simple_fetch_one` and `simple_execute` for the common case
//! - **Structured Errors**: Every failure carries the SQL and binds it happened with
//! - **MySQL and SQLite**: Works with `MySqlConnection` and `SqliteConnection`, owned or borrowed
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio"] }
//! sqlx-pdo-driver = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### One-Shot Queries
//!
//! ```rust,no_run
//! use sqlx::{Connection as _, MySqlConnection};
//! use sqlx_pdo_driver::{Driver, Params};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = MySqlConnection::connect("mysql://localhost/test").await?;
//! let mut driver = Driver::new(conn);
//!
//! let result = driver
//!     .simple_execute(
//!         "INSERT INTO users (name, email) VALUES (:name, :email)",
//!         &Params::new().bind("name", "John Doe").bind("email", "john@example.com"),
//!     )
//!     .await?;
//! println!("Inserted user {}", result.last_insert_id);
//!
//! let user = driver
//!     .simple_fetch_one(
//!         "SELECT id, name FROM users WHERE email = :email",
//!         &Params::new().bind("email", "john@example.com"),
//!     )
//!     .await?;
//! if let Some(user) = user {
//!     println!("Found {:?}", user.get("name"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Reusing a Prepared Statement
//!
//! ```rust,no_run
//! use sqlx::{Connection as _, MySqlConnection};
//! use sqlx_pdo_driver::{Bindings, Driver, Value};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let conn = MySqlConnection::connect("mysql://localhost/test").await?;
//! let mut driver = Driver::new(conn);
//!
//! driver.prepare("INSERT INTO tags (name) VALUES (:name)", "insert_tag").await?;
//! for name in ["rust", "sql", "async"] {
//!     let bind = Bindings::from([("name".to_owned(), Value::from(name))]);
//!     driver.execute(&bind, "insert_tag").await?;
//! }
//! driver.clear("insert_tag");
//! # Ok(())
//! # }
//! ```
//!
//! ### Transactions
//!
//! ```rust,no_run
//! use sqlx::{Connection as _, MySqlConnection};
//! use sqlx_pdo_driver::{Driver, Params};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let conn = MySqlConnection::connect("mysql://localhost/test").await?;
//! let mut driver = Driver::new(conn);
//!
//! driver.begin_transaction().await?;
//! let moved = driver
//!     .simple_execute(
//!         "UPDATE accounts SET balance = balance - :amount WHERE id = :id",
//!         &Params::new().bind("amount", 100).bind("id", 1),
//!     )
//!     .await;
//! match moved {
//!     Ok(_) => driver.commit().await?,
//!     Err(_) => driver.rollback().await?,
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Pagination
//!
//! ```rust
//! use sqlx_pdo_driver::{build_page_limits, SORT_DESCENDING};
//!
//! let stub = build_page_limits("created_at", SORT_DESCENDING, Some(20), Some(1));
//! let sql = format!("SELECT * FROM posts {stub}");
//! assert_eq!(sql, "SELECT * FROM posts ORDER BY created_at DESC LIMIT 20, 20");
//! ```
//!
//! ## How It Works
//!
//! 1. **Expand**: List parameters become one scalar placeholder per element
//! 2. **Compile**: Named placeholders are replaced by `?` and their order is recorded
//! 3. **Prepare**: The connection compiles the positional SQL; the handle is stored under an identifier
//! 4. **Run**: Each execute or fetch lines the bindings up with the recorded order
//!
//! ## Limitations
//!
//! - Placeholder names must match `[a-zA-Z0-9_]+`
//! - Quotes and comments are skipped by a lexical scan, not a full SQL parser; an unterminated
//!   quote leaves the rest of the statement scanned as plain SQL
//! - Sort fields and directions passed to the pagination helpers are not escaped
//! - A `Driver` is not synchronized; give each task its own connection and driver
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod builder;
pub mod config;
pub mod connection;
pub mod driver;
pub mod environment;
pub mod error;
pub mod importer;
pub mod page;
pub mod registry;
pub mod statement;
pub mod value;

pub use builder::{prepare_bind, ExpandedQuery};
pub use config::Configuration;
pub use connection::Connection;
pub use driver::{Driver, DEFAULT_IDENTIFIER};
pub use environment::Environment;
pub use error::{Error, Result};
pub use importer::{EnvFileImporter, Importer, MapImporter, SystemEnvImporter};
pub use page::{build_page_limits, Pagination, SORT_ASCENDING, SORT_DESCENDING};
pub use registry::StatementRegistry;
pub use statement::PreparedStatement;
pub use value::{Bindings, ExecutionResult, Param, Params, Row, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::{build_page_limits, prepare_bind};
    pub use crate::{Bindings, Driver, ExecutionResult, Params, Row, Value};
}
