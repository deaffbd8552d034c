//! Configuration validation.
//!
//! # Responsibilities
//! - Reject documents the registry cannot read (non-section keys, nested values)
//! - Check value types of the registry mode settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Incomplete backend sections are not errors here; the registry skips them
//! - Runs before a snapshot is handed to the registry

use thiserror::Error;

use crate::config::schema::{parse_bool, ConfigSnapshot, BACKEND_SECTION};

/// A schema problem in a configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("top-level key `{0}` is not a section")]
    NotASection(String),

    #[error("`{section}.{key}` must be a string, number or boolean")]
    NotAScalar { section: String, key: String },

    #[error("`backend.allowall` must be a boolean")]
    AllowAllNotBool,
}

/// Validate a snapshot, collecting every problem found.
pub fn validate_config(config: &ConfigSnapshot) -> Result<(), Vec<SchemaError>> {
    let mut errors = Vec::new();

    for (name, value) in config.sections() {
        let Some(section) = value.as_table() else {
            errors.push(SchemaError::NotASection(name.clone()));
            continue;
        };
        for (key, value) in section {
            if matches!(value, toml::Value::Array(_) | toml::Value::Table(_)) {
                errors.push(SchemaError::NotAScalar {
                    section: name.clone(),
                    key: key.clone(),
                });
            }
        }
    }

    let allow_all = config
        .sections()
        .get(BACKEND_SECTION)
        .and_then(|section| section.get("allowall"));
    match allow_all {
        None | Some(toml::Value::Boolean(_)) => {}
        Some(toml::Value::String(s)) if parse_bool(s).is_some() => {}
        Some(_) => errors.push(SchemaError::AllowAllNotBool),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config: ConfigSnapshot = r#"
            [backend]
            allowall = "no"
            backends = "one"

            [one]
            url = "https://one.example.com/"
            secret = "x"
        "#
        .parse()
        .unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config: ConfigSnapshot = r#"
            stray = 1

            [backend]
            allowall = "sometimes"
            backends = ["one", "two"]
        "#
        .parse()
        .unwrap();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&SchemaError::NotASection("stray".into())));
        assert!(errors.contains(&SchemaError::AllowAllNotBool));
        assert!(errors.contains(&SchemaError::NotAScalar {
            section: "backend".into(),
            key: "backends".into(),
        }));
    }
}
