use std::collections::BTreeMap;

use crate::importer::Importer;

/// Sectioned settings, built explicitly and passed to whatever needs them.
///
/// Each section is filled by one [`Importer`]; importing into an existing section replaces
/// it wholesale.
#[derive(Debug, Clone, Default)]
pub struct Configuration {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns the importer's error; the configuration is left untouched.
    pub fn import(
        &mut self,
        section: impl Into<String>,
        importer: &impl Importer,
    ) -> crate::Result<&mut Self> {
        let values = importer.to_map()?;
        self.sections.insert(section.into(), values);
        Ok(self)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .map(String::as_str)
    }

    pub fn get_or<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(default)
    }

    pub fn section(&self, section: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::MapImporter;

    #[test]
    fn test_get_and_default() {
        let mut config = Configuration::new();
        config
            .import("database", &MapImporter::new().with("host", "db.internal"))
            .unwrap();

        assert_eq!(config.get("database", "host"), Some("db.internal"));
        assert_eq!(config.get("database", "port"), None);
        assert_eq!(config.get("cache", "host"), None);
        assert_eq!(config.get_or("database", "port", "3306"), "3306");
    }

    #[test]
    fn test_import_replaces_section() {
        let mut config = Configuration::new();
        config
            .import("database", &MapImporter::new().with("host", "a").with("user", "app"))
            .unwrap()
            .import("database", &MapImporter::new().with("host", "b"))
            .unwrap();

        assert_eq!(config.get("database", "host"), Some("b"));
        assert_eq!(config.get("database", "user"), None);
        assert_eq!(config.section("database").map(BTreeMap::len), Some(1));
    }
}
