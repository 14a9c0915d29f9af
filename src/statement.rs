use crate::builder::{build_query, placeholder_order};
use crate::error::Error;
use std::collections::BTreeMap;

use crate::value::{normalize_name, Bindings, Value};

/// A statement compiled by the connection, together with the placeholder order needed to
/// turn named bindings into positional arguments.
///
/// The SQL template keeps its `:name` placeholders; the connection only ever sees the
/// positional (`?`) form. Arguments are rebuilt from the bindings on every run, so one
/// statement serves any number of bind sets.
///
/// # Type Parameters
///
/// * `S` - The connection's native statement handle
#[derive(Debug)]
pub struct PreparedStatement<S> {
    template: String,
    sql: String,
    order: Vec<String>,
    handle: S,
}

impl<S> PreparedStatement<S> {
    pub(crate) fn new(template: String, sql: String, order: Vec<String>, handle: S) -> Self {
        Self {
            template,
            sql,
            order,
            handle,
        }
    }

    /// The SQL as written by the caller, named placeholders included.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The positional SQL sent to the connection.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in argument order, repeats included.
    pub fn placeholders(&self) -> &[String] {
        &self.order
    }

    pub fn handle(&self) -> &S {
        &self.handle
    }

    /// Lines the bindings up with the placeholders.
    ///
    /// Keys may be written with or without the leading `:`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateBind`] when `name` and `:name` are both bound,
    /// [`Error::UnboundPlaceholder`] for a placeholder without a value and
    /// [`Error::UnusedBind`] for a value no placeholder refers to.
    pub fn arguments(&self, bind: &Bindings) -> crate::Result<Vec<Value>> {
        let mut named = BTreeMap::new();
        for (key, value) in bind {
            let name = normalize_name(key);
            if named.contains_key(&name) {
                return Err(Error::DuplicateBind(name));
            }
            named.insert(name, value);
        }

        if let Some(unused) = named.keys().find(|name| !self.order.contains(name)) {
            return Err(Error::UnusedBind(unused.clone()));
        }

        self.order
            .iter()
            .map(|name| {
                named
                    .get(name)
                    .map(|value| (*value).clone())
                    .ok_or_else(|| Error::UnboundPlaceholder(name.clone()))
            })
            .collect()
    }
}

/// Splits a named template into its positional SQL and placeholder order.
pub(crate) fn compile(template: &str) -> crate::Result<(String, Vec<String>)> {
    let order = placeholder_order(template)?;
    let sql = build_query(template)?;
    Ok((sql, order))
}
