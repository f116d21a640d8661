//! The [`ValExp`] facade: a parameter plus a message reporter.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::{ConfigError, ValExpConfig};
use crate::error::{ErrorCode, SchemaError, ValidationError};
use crate::message::Reporter;
use crate::parameter::Parameter;
use crate::validate::validate_value;

/// Errors raised while building a [`ValExp`] from explicit settings.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl BuildError {
    /// The schema error code, when the definition itself was rejected.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Config(_) => None,
            Self::Schema(err) => Some(err.code),
        }
    }
}

/// A successful validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// The validated value with defaults applied; `None` when an optional
    /// value was absent and the schema has no default.
    pub value: Option<Value>,
    /// The value as passed in.
    pub input: Option<Value>,
}

impl ValidationResult {
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}

/// Validates runtime values against one parameter definition.
///
/// ```
/// use oas_valexp::ValExp;
/// use serde_json::json;
///
/// let mut valexp = ValExp::new(&json!({
///     "name": "limit",
///     "required": true,
///     "schema": { "type": "integer", "minimum": 1, "maximum": 100 }
/// }))
/// .unwrap();
///
/// assert!(valexp.test(Some(&json!(10))));
/// assert!(!valexp.test(Some(&json!(0))));
/// assert_eq!(valexp.error().unwrap().code.as_str(), "ERR_VALUE_INTEGER_MINIMUM");
/// ```
#[derive(Debug, Clone)]
pub struct ValExp {
    parameter: Parameter,
    config: ValExpConfig,
    reporter: Reporter,
    error: Option<ValidationError>,
}

impl ValExp {
    /// Builds from a raw parameter definition with default settings.
    pub fn new(raw: &Value) -> Result<Self, SchemaError> {
        let parameter = Parameter::from_value(raw)?;
        Ok(Self::from_parts(parameter, ValExpConfig::default(), Reporter::default()))
    }

    /// Builds from a raw parameter definition with explicit settings.
    pub fn with_config(raw: &Value, config: ValExpConfig) -> Result<Self, BuildError> {
        let reporter = Reporter::with_locale(config.resolve_locale()?);
        let parameter =
            Parameter::build(raw, &config).map_err(|v| reporter.schema_error(v))?;
        Ok(Self::from_parts(parameter, config, reporter))
    }

    /// Wraps an already built parameter.
    pub fn from_parameter(parameter: Parameter, config: ValExpConfig) -> Result<Self, ConfigError> {
        let reporter = Reporter::with_locale(config.resolve_locale()?);
        Ok(Self::from_parts(parameter, config, reporter))
    }

    fn from_parts(parameter: Parameter, config: ValExpConfig, reporter: Reporter) -> Self {
        Self {
            parameter,
            config,
            reporter,
            error: None,
        }
    }

    /// Replaces the reporter, e.g. to use a custom message catalog.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    #[must_use]
    pub fn config(&self) -> &ValExpConfig {
        &self.config
    }

    /// The error from the most recent [`test`](Self::test) or
    /// [`exec`](Self::exec) call, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Validates without touching the stored error.
    ///
    /// `None` means the value is absent, which is distinct from JSON `null`.
    pub fn validate(&self, value: Option<&Value>) -> Result<ValidationResult, ValidationError> {
        let parameter = &self.parameter;
        validate_value(
            value,
            parameter.schema(),
            parameter.name(),
            parameter.required(),
            &self.config,
        )
        .map(|validated| ValidationResult {
            value: validated,
            input: value.cloned(),
        })
        .map_err(|v| self.reporter.validation_error(v))
    }

    /// Whether `value` is valid; the error is kept for [`error`](Self::error).
    pub fn test(&mut self, value: Option<&Value>) -> bool {
        self.exec(value).is_some()
    }

    /// Validates `value`, keeping the error for [`error`](Self::error) on
    /// failure and clearing it on success.
    pub fn exec(&mut self, value: Option<&Value>) -> Option<ValidationResult> {
        match self.validate(value) {
            Ok(result) => {
                self.error = None;
                Some(result)
            }
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}

impl fmt::Display for ValExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.parameter, f)
    }
}
