//! Parameter definitions: a named, optionally required, schema.

use std::fmt;

use serde_json::{Value, json};

use crate::config::ValExpConfig;
use crate::error::{ErrorCode, SchemaError, Violation};
use crate::message::Reporter;
use crate::schema::{Schema, normalize};

/// A validated parameter definition.
///
/// Built from a JSON object of the form:
///
/// ```json
/// { "name": "limit", "required": true, "schema": { "type": "integer", "minimum": 1 } }
/// ```
///
/// `required` defaults to `false`. Schema error paths are rooted at
/// `parameter.schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    required: bool,
    schema: Schema,
}

impl Parameter {
    /// Builds a parameter with default settings, rendering failures in the
    /// process locale.
    pub fn from_value(raw: &Value) -> Result<Self, SchemaError> {
        Self::build(raw, &ValExpConfig::default()).map_err(|v| Reporter::default().schema_error(v))
    }

    pub(crate) fn build(raw: &Value, config: &ValExpConfig) -> Result<Self, Violation> {
        let Some(obj) = raw.as_object() else {
            return Err(Violation::new("parameter", ErrorCode::Param));
        };

        let name = match obj.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(Violation::new("parameter.name", ErrorCode::ParamName)),
        };

        let required = match obj.get("required") {
            None => false,
            Some(Value::Bool(required)) => *required,
            Some(_) => return Err(Violation::new("parameter.required", ErrorCode::ParamRequired)),
        };

        let schema = normalize(
            obj.get("schema").unwrap_or(&Value::Null),
            "parameter.schema",
            config,
        )?;

        tracing::debug!(name = %name, required, "parameter built");

        Ok(Self {
            name,
            required,
            schema,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The canonical definition, with `required` always present.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "required": self.required,
            "schema": self.schema.to_json(),
        })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
