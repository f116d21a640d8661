//! Validator configuration
//!
//! [`ValExpConfig`] controls message locale, recursion limits, and the two
//! opt-in strictness checks applied while normalizing schemas.

use serde::{Deserialize, Serialize};

use crate::message::{CatalogError, LOCALE_ENV_VAR, Locale};

/// Environment variable overriding [`ValExpConfig::max_depth`].
pub const MAX_DEPTH_ENV_VAR: &str = "OAS_VALEXP_MAX_DEPTH";

/// Environment variable enabling both strict checks (`1`/`true`).
pub const STRICT_ENV_VAR: &str = "OAS_VALEXP_STRICT";

/// Errors raised when a configuration value is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Locale(#[from] CatalogError),

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

/// Settings shared by schema normalization and value validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValExpConfig {
    /// Message locale. `None` uses the process locale.
    pub locale: Option<String>,

    /// Maximum nesting of schemas and values before validation gives up.
    pub max_depth: usize,

    /// Reject schemas that declare more than one of `oneOf`/`anyOf`/`allOf`
    /// instead of honoring only the first by priority.
    pub strict_combinators: bool,

    /// Reject object schemas whose `required` names a property missing from
    /// `properties`.
    pub strict_required: bool,
}

impl ValExpConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Defaults overridden by `OAS_VALEXP_LANG`, `OAS_VALEXP_MAX_DEPTH`, and
    /// `OAS_VALEXP_STRICT`. Unparsable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(tag) = std::env::var(LOCALE_ENV_VAR) {
            config.locale = Some(tag);
        }

        if let Some(depth) = std::env::var(MAX_DEPTH_ENV_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_depth = depth;
        }

        if let Ok(strict) = std::env::var(STRICT_ENV_VAR) {
            let strict = matches!(strict.to_lowercase().as_str(), "1" | "true" | "yes");
            config.strict_combinators = strict;
            config.strict_required = strict;
        }

        config
    }

    /// Reference-compatible settings with both strict checks on.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_combinators: true,
            strict_required: true,
            ..Self::default()
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_locale(mut self, tag: impl Into<String>) -> Self {
        self.locale = Some(tag.into());
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Checks the settings and resolves the effective locale.
    ///
    /// An explicitly configured locale must be a valid tag; an absent one
    /// resolves to [`Locale::process`].
    pub fn resolve_locale(&self) -> Result<Locale, ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        match &self.locale {
            Some(tag) => Ok(Locale::parse(tag)?),
            None => Ok(Locale::process().clone()),
        }
    }
}

impl Default for ValExpConfig {
    fn default() -> Self {
        Self {
            locale: None,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            strict_combinators: false,
            strict_required: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ValExpConfig::default();
        assert_eq!(config.max_depth, 64);
        assert!(!config.strict_combinators);
        assert!(!config.strict_required);
        assert!(config.locale.is_none());
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: ValExpConfig =
            serde_json::from_str(r#"{"locale": "ja", "strict_required": true}"#).unwrap();
        assert_eq!(config.locale.as_deref(), Some("ja"));
        assert!(config.strict_required);
        assert_eq!(config.max_depth, ValExpConfig::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<ValExpConfig, _> = serde_json::from_str(r#"{"strict": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn resolve_locale_validates_tag() {
        let config = ValExpConfig::default().with_locale("ja-JP");
        assert_eq!(config.resolve_locale().unwrap().as_str(), "ja-JP");

        let config = ValExpConfig::default().with_locale("japanese");
        assert!(matches!(config.resolve_locale(), Err(ConfigError::Locale(_))));
    }

    #[test]
    fn zero_depth_is_rejected() {
        let config = ValExpConfig::default().with_max_depth(0);
        assert!(matches!(config.resolve_locale(), Err(ConfigError::ZeroDepth)));
    }

    #[test]
    fn strict_preset() {
        let config = ValExpConfig::strict();
        assert!(config.strict_combinators && config.strict_required);
    }
}
