use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::importer::Importer;

const KEY_PATTERN: &str = r"^[A-Z0-9_]+$";

static KEY_REGEX: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(KEY_PATTERN));

#[derive(Debug, Clone)]
struct Variable {
    value: String,
    important: bool,
}

/// Upper-cased environment variables, some of which may be locked against overwriting.
///
/// ```
/// use sqlx_pdo_driver::Environment;
///
/// let mut env = Environment::new();
/// env.set("app_env", "production", true)?;
/// assert_eq!(env.get("APP_ENV"), Some("production"));
/// assert!(env.set("APP_ENV", "dev", false).is_err());
/// # Ok::<(), sqlx_pdo_driver::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: BTreeMap<String, Variable>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.variables.contains_key(&key.to_uppercase())
    }

    /// # Errors
    ///
    /// Returns [`Error::EnvironmentKeyNotFound`] for an unknown key.
    pub fn is_important(&self, key: &str) -> crate::Result<bool> {
        let key = key.to_uppercase();
        self.variables
            .get(&key)
            .map(|variable| variable.important)
            .ok_or(Error::EnvironmentKeyNotFound(key))
    }

    /// Sets `key` (upper-cased) to `value`; `important` locks it against later overwrites.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportantEnvironmentKey`] if the key is already set and locked, and
    /// [`Error::InvalidEnvironmentKey`] if it is not made of `A-Z`, `0-9` and `_`.
    pub fn set(&mut self, key: &str, value: impl Into<String>, important: bool) -> crate::Result<()> {
        let key = key.to_uppercase();
        if self.variables.get(&key).is_some_and(|variable| variable.important) {
            return Err(Error::ImportantEnvironmentKey(key));
        }
        let pattern = KEY_REGEX.as_ref().map_err(|e| Error::Parse(e.clone()))?;
        if !pattern.is_match(&key) {
            return Err(Error::InvalidEnvironmentKey(key));
        }
        self.variables.insert(
            key,
            Variable {
                value: value.into(),
                important,
            },
        );
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables
            .get(&key.to_uppercase())
            .map(|variable| variable.value.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Sets every entry of the importer, stopping at the first rejected key.
    pub fn import(&mut self, importer: &impl Importer, important: bool) -> crate::Result<()> {
        for (key, value) in importer.to_map()? {
            self.set(&key, value, important)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::MapImporter;

    #[test]
    fn test_keys_are_upper_cased() {
        let mut env = Environment::new();
        env.set("db_host", "localhost", false).unwrap();

        assert!(env.has("DB_HOST"));
        assert!(env.has("db_host"));
        assert_eq!(env.get("DB_HOST"), Some("localhost"));
        assert_eq!(env.get_or("DB_PORT", "3306"), "3306");
    }

    #[test]
    fn test_important_keys_are_locked() {
        let mut env = Environment::new();
        env.set("SECRET", "a", true).unwrap();

        let err = env.set("secret", "b", false).unwrap_err();
        assert!(matches!(err, Error::ImportantEnvironmentKey(key) if key == "SECRET"));
        assert_eq!(env.get("SECRET"), Some("a"));
        assert!(env.is_important("SECRET").unwrap());
    }

    #[test]
    fn test_plain_keys_can_be_overwritten() {
        let mut env = Environment::new();
        env.set("MODE", "a", false).unwrap();
        env.set("MODE", "b", true).unwrap();

        assert_eq!(env.get("MODE"), Some("b"));
        assert!(env.is_important("MODE").unwrap());
    }

    #[test]
    fn test_invalid_keys_are_rejected() {
        let mut env = Environment::new();

        assert!(matches!(env.set("my-key", "x", false), Err(Error::InvalidEnvironmentKey(_))));
        assert!(matches!(env.set("", "x", false), Err(Error::InvalidEnvironmentKey(_))));
        assert!(env.set("HTTP2_PORT", "8080", false).is_ok());
    }

    #[test]
    fn test_is_important_on_missing_key() {
        let env = Environment::new();
        assert!(matches!(env.is_important("NOPE"), Err(Error::EnvironmentKeyNotFound(key)) if key == "NOPE"));
    }

    #[test]
    fn test_import_applies_importance() {
        let mut env = Environment::new();
        env.import(&MapImporter::new().with("app_env", "test").with("debug", "1"), true)
            .unwrap();

        assert!(env.is_important("APP_ENV").unwrap());
        assert!(env.set("DEBUG", "0", false).is_err());
    }
}
