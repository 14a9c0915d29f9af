//! The connection surface the driver runs statements against.
//!
//! Implemented for SQLx's MySQL and SQLite connections, and for `&mut C` so a caller can
//! lend a connection to a [`Driver`](crate::Driver) instead of handing it over.

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlRow, MySqlStatement};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow, SqliteStatement};
use sqlx::{Column, Executor, MySql, Row as _, Sqlite, Statement as _, TypeInfo};

use crate::value::{ExecutionResult, Row, Value};

/// A single database connection able to compile and run positional (`?`) statements.
///
/// Every method runs to completion before returning. Result cursors are drained and
/// released inside the call, on failure as well as success.
#[async_trait]
pub trait Connection: Send {
    /// Native handle of a compiled statement.
    type Statement: Send + Sync;

    async fn prepare_statement(&mut self, sql: &str) -> Result<Self::Statement, sqlx::Error>;

    /// Runs a write statement and reports the affected row count and last insert id.
    async fn execute_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<ExecutionResult, sqlx::Error>;

    /// Runs a read statement and collects every row.
    async fn fetch_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<Vec<Row>, sqlx::Error>;

    async fn begin_transaction(&mut self) -> Result<(), sqlx::Error>;

    async fn commit_transaction(&mut self) -> Result<(), sqlx::Error>;

    async fn rollback_transaction(&mut self) -> Result<(), sqlx::Error>;
}

pub(crate) const BEGIN: &str = "BEGIN";
pub(crate) const COMMIT: &str = "COMMIT";
pub(crate) const ROLLBACK: &str = "ROLLBACK";

#[async_trait]
impl Connection for MySqlConnection {
    type Statement = MySqlStatement<'static>;

    async fn prepare_statement(&mut self, sql: &str) -> Result<Self::Statement, sqlx::Error> {
        let statement = Executor::prepare(&mut *self, sql).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    async fn execute_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<ExecutionResult, sqlx::Error> {
        let result = bind_mysql(statement.query(), params)
            .execute(&mut *self)
            .await?;
        Ok(ExecutionResult {
            last_insert_id: insert_id(result.last_insert_id())?,
            row_count: result.rows_affected(),
        })
    }

    async fn fetch_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<Vec<Row>, sqlx::Error> {
        let rows = bind_mysql(statement.query(), params)
            .fetch_all(&mut *self)
            .await?;
        rows.iter().map(decode_mysql_row).collect()
    }

    async fn begin_transaction(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, BEGIN).await?;
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, COMMIT).await?;
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, ROLLBACK).await?;
        Ok(())
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    type Statement = SqliteStatement<'static>;

    async fn prepare_statement(&mut self, sql: &str) -> Result<Self::Statement, sqlx::Error> {
        let statement = Executor::prepare(&mut *self, sql).await?;
        Ok(sqlx::Statement::to_owned(&statement))
    }

    async fn execute_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<ExecutionResult, sqlx::Error> {
        let result = bind_sqlite(statement.query(), params)
            .execute(&mut *self)
            .await?;
        Ok(ExecutionResult {
            last_insert_id: result.last_insert_rowid(),
            row_count: result.rows_affected(),
        })
    }

    async fn fetch_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<Vec<Row>, sqlx::Error> {
        let rows = bind_sqlite(statement.query(), params)
            .fetch_all(&mut *self)
            .await?;
        rows.iter().map(decode_sqlite_row).collect()
    }

    async fn begin_transaction(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, BEGIN).await?;
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, COMMIT).await?;
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, ROLLBACK).await?;
        Ok(())
    }
}

#[async_trait]
impl<C: Connection + ?Sized> Connection for &mut C {
    type Statement = C::Statement;

    async fn prepare_statement(&mut self, sql: &str) -> Result<Self::Statement, sqlx::Error> {
        (**self).prepare_statement(sql).await
    }

    async fn execute_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<ExecutionResult, sqlx::Error> {
        (**self).execute_statement(statement, params).await
    }

    async fn fetch_statement(
        &mut self,
        statement: &Self::Statement,
        params: &[Value],
    ) -> Result<Vec<Row>, sqlx::Error> {
        (**self).fetch_statement(statement, params).await
    }

    async fn begin_transaction(&mut self) -> Result<(), sqlx::Error> {
        (**self).begin_transaction().await
    }

    async fn commit_transaction(&mut self) -> Result<(), sqlx::Error> {
        (**self).commit_transaction().await
    }

    async fn rollback_transaction(&mut self) -> Result<(), sqlx::Error> {
        (**self).rollback_transaction().await
    }
}

fn bind_mysql<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    params: &[Value],
) -> Query<'q, MySql, MySqlArguments> {
    params.iter().fold(query, |query, value| match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
    })
}

fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[Value],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params.iter().fold(query, |query, value| match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Bytes(v) => query.bind(v.clone()),
    })
}

// MySQL reports ids as u64; anything past i64::MAX is refused instead of wrapping.
fn insert_id(id: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(id).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn is_binary_type(name: &str) -> bool {
    name.ends_with("BLOB") || name.contains("BINARY")
}

// Unsigned BIGINT values above i64::MAX come back as text.
fn decode_mysql_row(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let value = if is_binary_type(column.type_info().name()) {
            Value::from(row.try_get_unchecked::<Option<Vec<u8>>, _>(index)?)
        } else if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            Value::from(v)
        } else if let Ok(v) = row.try_get::<Option<u64>, _>(index) {
            v.map_or(Value::Null, |v| {
                i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Int)
            })
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            Value::from(v)
        } else if let Ok(v) = row.try_get::<Option<f32>, _>(index) {
            Value::from(v)
        } else if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
            Value::from(v)
        } else {
            Value::from(row.try_get_unchecked::<Option<Vec<u8>>, _>(index)?)
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

fn decode_sqlite_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::with_capacity(row.len());
    for column in row.columns() {
        let index = column.ordinal();
        let value = if is_binary_type(column.type_info().name()) {
            Value::from(row.try_get_unchecked::<Option<Vec<u8>>, _>(index)?)
        } else if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            Value::from(v)
        } else if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            Value::from(v)
        } else if let Ok(v) = row.try_get_unchecked::<Option<String>, _>(index) {
            Value::from(v)
        } else {
            Value::from(row.try_get_unchecked::<Option<Vec<u8>>, _>(index)?)
        };
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_type_names() {
        assert!(is_binary_type("BLOB"));
        assert!(is_binary_type("MEDIUMBLOB"));
        assert!(is_binary_type("VARBINARY"));
        assert!(!is_binary_type("VARCHAR"));
        assert!(!is_binary_type("BIGINT"));
    }

    #[test]
    fn test_insert_id_out_of_range() {
        assert_eq!(insert_id(42).unwrap(), 42);
        assert_eq!(insert_id(i64::MAX as u64).unwrap(), i64::MAX);
        assert!(matches!(insert_id(u64::MAX), Err(sqlx::Error::Decode(_))));
    }
}
