//! Traversal settings loaded from configuration.
//!
//! Applications that want a project-wide traversal policy (for example a
//! lower ceiling on chain length) can keep it in a TOML file:
//!
//! ```toml
//! [traversal]
//! lens = 0
//! depth = 0
//! ceiling = 256
//! ```

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use crate::chain::{DynError, Node};
use crate::selector::Selector;
use crate::traversal::Traversal;

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration file was not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// The configuration could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ConfigError),

    /// The configuration file path is invalid.
    #[error("invalid configuration path: {0}")]
    InvalidPath(String),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Traversal section of the settings.
///
/// Keys left out of the file stay unset, so a selector's own bound policy
/// keeps them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TraversalSettings {
    /// Leading nodes to skip
    #[serde(default)]
    pub lens: Option<usize>,
    /// Maximum hops past the first kept node (0 = unbounded)
    #[serde(default)]
    pub depth: Option<usize>,
    /// Hard cap on nodes walked
    #[serde(default)]
    pub ceiling: Option<usize>,
}

/// Root settings structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub traversal: TraversalSettings,
}

impl Settings {
    /// Load settings from a TOML file, with environment overrides.
    ///
    /// Environment variables use the `CAUSEWAY` prefix and a double
    /// underscore between keys, e.g. `CAUSEWAY__TRAVERSAL__CEILING=64`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be parsed, or
    /// holds an invalid value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();

        let path_str = path
            .to_str()
            .ok_or_else(|| SettingsError::InvalidPath(format!("{:?}", path)))?;

        if !path.exists() {
            return Err(SettingsError::FileNotFound(path_str.to_string()));
        }

        let config = Config::builder()
            .add_source(File::new(path_str, FileFormat::Toml))
            .add_source(
                Environment::with_prefix("CAUSEWAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        tracing::debug!(path = path_str, ?settings, "loaded causeway settings");
        Ok(settings)
    }

    /// Parse settings from a TOML string. No environment overrides apply.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks values the type system cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.traversal.ceiling == Some(0) {
            return Err(SettingsError::Invalid {
                key: "traversal.ceiling",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The configured traversal policy. Only keys present in the
    /// configuration are set.
    pub fn traversal(&self) -> Traversal {
        let TraversalSettings {
            lens,
            depth,
            ceiling,
        } = self.traversal;
        let mut traversal = Traversal::new();
        if let Some(lens) = lens {
            traversal = traversal.with_lens(lens);
        }
        if let Some(depth) = depth {
            traversal = traversal.with_depth(depth);
        }
        if let Some(ceiling) = ceiling {
            traversal = traversal.with_ceiling(ceiling);
        }
        traversal
    }

    /// Evaluates `selector` against `err` under the configured policy.
    ///
    /// [`Selector::query`] always uses the built-in defaults; route queries
    /// through here to have the configuration apply.
    pub fn query<'e, S>(&self, selector: &S, err: &'e DynError) -> Option<Node<'e>>
    where
        S: Selector + ?Sized,
    {
        selector.select(err, self.traversal())
    }

    /// Returns true if `selector` matches `err` under the configured policy.
    pub fn is_in<S>(&self, selector: &S, err: &DynError) -> bool
    where
        S: Selector + ?Sized,
    {
        self.query(selector, err).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::DEFAULT_CEILING;
    use crate::class::Class;
    use crate::lift::Lifter;
    use crate::selector::type_of;
    use crate::wrap::{self, Fundamental};
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.traversal(), Traversal::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_section() {
        let settings: Settings = toml::from_str(
            r#"
            [traversal]
            depth = 3
        "#,
        )
        .unwrap();

        assert_eq!(settings.traversal.lens, None);
        assert_eq!(settings.traversal.depth, Some(3));
        assert_eq!(settings.traversal.ceiling, None);
        assert_eq!(settings.traversal().ceiling(), DEFAULT_CEILING);
    }

    #[test]
    fn test_deserialize_empty() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str() {
        let settings = Settings::from_toml_str(
            r#"
            [traversal]
            lens = 1
            ceiling = 64
        "#,
        )
        .unwrap();

        let traversal = settings.traversal();
        assert_eq!(traversal.lens(), 1);
        assert_eq!(traversal.depth(), 0);
        assert_eq!(traversal.ceiling(), 64);
        assert_eq!(traversal, Traversal::new().with_lens(1).with_ceiling(64));
    }

    #[test]
    fn test_zero_ceiling_rejected() {
        let result = Settings::from_toml_str(
            r#"
            [traversal]
            ceiling = 0
        "#,
        );
        assert!(matches!(
            result,
            Err(SettingsError::Invalid {
                key: "traversal.ceiling",
                ..
            })
        ));
    }

    #[test]
    fn test_load_file_not_found() {
        let result = Settings::load("nonexistent/path/causeway.toml");
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(file, "[traversal]\ndepth = 2\nceiling = 128").expect("Failed to write");

        let settings = Settings::load(file.path()).expect("Failed to load settings");
        assert_eq!(settings.traversal.depth, Some(2));
        assert_eq!(settings.traversal.ceiling, Some(128));
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        writeln!(file, "[traversal\nceiling = ").expect("Failed to write");

        let result = Settings::load(file.path());
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_error_display() {
        let err = SettingsError::FileNotFound("causeway.toml".to_string());
        assert_eq!(
            err.to_string(),
            "configuration file not found: causeway.toml"
        );

        let err = SettingsError::Invalid {
            key: "traversal.ceiling",
            reason: "must be at least 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid setting traversal.ceiling: must be at least 1"
        );
    }

    #[test]
    fn test_query_applies_configured_policy() {
        let settings = Settings::from_toml_str(
            r#"
            [traversal]
            depth = 1
        "#,
        )
        .unwrap();

        let err = wrap::wrap(wrap::new("leaf"), "ctx");
        let leaf = type_of::<Fundamental>();
        assert!(leaf.is_in(&err));
        assert!(!settings.is_in(&leaf, &err));
        assert!(settings.query(&leaf, &err).is_none());
    }

    #[test]
    fn test_configured_lens_reaches_past_shadow() {
        let settings = Settings::from_toml_str("[traversal]\nlens = 1").unwrap();

        let hidden = Class::named("storage");
        let err = Class::named_shadow("api").lift(hidden.error("leaf"));
        assert!(!hidden.is_in(&err));
        assert!(settings.is_in(&hidden, &err));
    }
}
