use std::collections::HashMap;

use crate::error::Error;
use crate::statement::PreparedStatement;

/// Prepared statements of one connection, keyed by a caller-chosen identifier.
///
/// Separate identifiers let a caller keep several statements alive at once, e.g. a
/// reader walked in a loop that also drives a writer. The registry is not synchronized;
/// share it across tasks only behind the caller's own lock.
#[derive(Debug)]
pub struct StatementRegistry<S> {
    statements: HashMap<String, PreparedStatement<S>>,
}

impl<S> Default for StatementRegistry<S> {
    fn default() -> Self {
        Self {
            statements: HashMap::new(),
        }
    }
}

impl<S> StatementRegistry<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `statement` under `identifier`, returning the statement it displaced.
    pub fn insert(
        &mut self,
        identifier: impl Into<String>,
        statement: PreparedStatement<S>,
    ) -> Option<PreparedStatement<S>> {
        self.statements.insert(identifier.into(), statement)
    }

    /// # Errors
    ///
    /// Returns [`Error::StatementNotFound`] when nothing is prepared under `identifier`.
    pub fn get(&self, identifier: &str) -> crate::Result<&PreparedStatement<S>> {
        self.statements
            .get(identifier)
            .ok_or_else(|| Error::StatementNotFound(identifier.to_owned()))
    }

    /// Drops the statement under `identifier`. Returns whether one was there.
    pub fn clear(&mut self, identifier: &str) -> bool {
        self.statements.remove(identifier).is_some()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.statements.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.statements.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
