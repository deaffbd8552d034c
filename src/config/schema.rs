//! Configuration source definitions.
//!
//! The backend registry only sees a section-scoped key/value source. The
//! concrete snapshot is a TOML document where every top-level table is a
//! section:
//!
//! ```toml
//! [backend]
//! backends = "tenant-a, tenant-b"
//!
//! [tenant-a]
//! url = "https://cloud.example.com/a/"
//! secret = "..."
//! ```

use std::str::FromStr;

/// Section holding the registry mode settings.
pub const BACKEND_SECTION: &str = "backend";

/// Read-only access to section-scoped configuration values.
pub trait ConfigSource {
    /// Value of `key` in `section` rendered as a string.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Value of `key` in `section` interpreted as a boolean.
    fn get_bool(&self, section: &str, key: &str) -> Option<bool>;
}

/// An immutable configuration snapshot parsed from TOML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSnapshot {
    sections: toml::Table,
}

impl ConfigSnapshot {
    pub fn new(sections: toml::Table) -> Self {
        Self { sections }
    }

    /// All top-level entries, sections or not.
    pub fn sections(&self) -> &toml::Table {
        &self.sections
    }

    fn value(&self, section: &str, key: &str) -> Option<&toml::Value> {
        self.sections.get(section)?.as_table()?.get(key)
    }
}

impl FromStr for ConfigSnapshot {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(toml::from_str(s)?))
    }
}

impl ConfigSource for ConfigSnapshot {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match self.value(section, key)? {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn get_bool(&self, section: &str, key: &str) -> Option<bool> {
        match self.value(section, key)? {
            toml::Value::Boolean(b) => Some(*b),
            toml::Value::String(s) => parse_bool(s),
            toml::Value::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }
}

/// Boolean spellings accepted in string values.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_read_as_strings() {
        let config: ConfigSnapshot = r#"
            [backend]
            secret = "s3cr3t"
            port = 8080
            allowall = true

            [other]
            list = ["a"]
        "#
        .parse()
        .unwrap();

        assert_eq!(config.get_string("backend", "secret").as_deref(), Some("s3cr3t"));
        assert_eq!(config.get_string("backend", "port").as_deref(), Some("8080"));
        assert_eq!(config.get_string("backend", "allowall").as_deref(), Some("true"));
        assert_eq!(config.get_string("other", "list"), None);
        assert_eq!(config.get_string("missing", "secret"), None);
    }

    #[test]
    fn test_bool_spellings() {
        let config: ConfigSnapshot = r#"
            [backend]
            a = true
            b = "yes"
            c = "Off"
            d = "maybe"
        "#
        .parse()
        .unwrap();

        assert_eq!(config.get_bool("backend", "a"), Some(true));
        assert_eq!(config.get_bool("backend", "b"), Some(true));
        assert_eq!(config.get_bool("backend", "c"), Some(false));
        assert_eq!(config.get_bool("backend", "d"), None);
        assert_eq!(config.get_bool("backend", "e"), None);
    }
}
