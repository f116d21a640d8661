//! Error types for parameter construction and value validation
//!
//! Two error classes share one closed code taxonomy:
//!
//! - [`SchemaError`]: the parameter or schema definition itself is malformed.
//!   Returned from construction; callers treat it as fatal.
//! - [`ValidationError`]: a runtime value does not satisfy the schema.
//!   Returned by value from every validation call.
//!
//! Both carry a path-qualified location, a stable [`ErrorCode`], and a
//! message resolved through the [`message`](crate::message) catalog.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

// ============================================================================
// ERROR CODES
// ============================================================================

/// Broad grouping of an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The parameter envelope (`name`, `required`) is malformed.
    Param,
    /// The schema definition is malformed.
    Schema,
    /// A runtime value violates the schema.
    Value,
}

macro_rules! error_codes {
    ($( $category:ident => { $( $(#[$doc:meta])* $variant:ident = $code:literal, )* } )*) => {
        /// Stable, machine-readable error identifier.
        ///
        /// The string form (`ERR_*`) is the key into the message catalogs
        /// and never changes between releases.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ErrorCode {
            $( $( $(#[$doc])* $variant, )* )*
        }

        impl ErrorCode {
            /// Every code, in declaration order.
            pub const ALL: &'static [ErrorCode] = &[ $( $( ErrorCode::$variant, )* )* ];

            /// The catalog key for this code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $( ErrorCode::$variant => $code, )* )*
                }
            }

            /// The category this code belongs to.
            #[must_use]
            pub const fn category(self) -> ErrorCategory {
                match self {
                    $( $( ErrorCode::$variant => ErrorCategory::$category, )* )*
                }
            }
        }

        impl FromStr for ErrorCode {
            type Err = UnknownErrorCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $( $code => Ok(ErrorCode::$variant), )* )*
                    other => Err(UnknownErrorCode(other.to_owned())),
                }
            }
        }
    };
}

error_codes! {
    Param => {
        /// The parameter is not an object.
        Param = "ERR_PARAM",
        /// `name` is missing, empty, or not a string.
        ParamName = "ERR_PARAM_NAME",
        /// `required` is present but not a boolean.
        ParamRequired = "ERR_PARAM_REQUIRED",
    }
    Schema => {
        /// The schema is not an object.
        Schema = "ERR_SCHEMA",
        SchemaType = "ERR_SCHEMA_TYPE",
        SchemaNullable = "ERR_SCHEMA_NULLABLE",
        SchemaEnum = "ERR_SCHEMA_ENUM",
        SchemaOneOf = "ERR_SCHEMA_ONE_OF",
        SchemaAnyOf = "ERR_SCHEMA_ANY_OF",
        SchemaAllOf = "ERR_SCHEMA_ALL_OF",
        /// More than one of `oneOf`/`anyOf`/`allOf` in strict mode.
        SchemaCombinator = "ERR_SCHEMA_COMBINATOR",
        /// Schema nesting exceeds the configured depth.
        SchemaDepth = "ERR_SCHEMA_DEPTH",
        SchemaMinLength = "ERR_SCHEMA_MIN_LENGTH",
        SchemaMaxLength = "ERR_SCHEMA_MAX_LENGTH",
        SchemaPattern = "ERR_SCHEMA_PATTERN",
        SchemaFormatString = "ERR_SCHEMA_FORMAT_STRING",
        SchemaDefaultString = "ERR_SCHEMA_DEFAULT_STRING",
        SchemaMinimum = "ERR_SCHEMA_MINIMUM",
        SchemaExclusiveMinimum = "ERR_SCHEMA_EXCLUSIVE_MINIMUM",
        SchemaMaximum = "ERR_SCHEMA_MAXIMUM",
        SchemaExclusiveMaximum = "ERR_SCHEMA_EXCLUSIVE_MAXIMUM",
        SchemaMultipleOf = "ERR_SCHEMA_MULTIPLE_OF",
        SchemaFormatInteger = "ERR_SCHEMA_FORMAT_INTEGER",
        SchemaDefaultInteger = "ERR_SCHEMA_DEFAULT_INTEGER",
        SchemaDefaultNumber = "ERR_SCHEMA_DEFAULT_NUMBER",
        SchemaDefaultBoolean = "ERR_SCHEMA_DEFAULT_BOOLEAN",
        SchemaMinItems = "ERR_SCHEMA_MINITEMS",
        SchemaMaxItems = "ERR_SCHEMA_MAXITEMS",
        SchemaUniqueItems = "ERR_SCHEMA_UNIQUE_ITEMS",
        SchemaItems = "ERR_SCHEMA_ITEMS",
        SchemaDefaultArray = "ERR_SCHEMA_DEFAULT_ARRAY",
        SchemaMinProperties = "ERR_SCHEMA_MIN_PROPERTIES",
        SchemaMaxProperties = "ERR_SCHEMA_MAX_PROPERTIES",
        SchemaRequired = "ERR_SCHEMA_REQUIRED",
        SchemaProperties = "ERR_SCHEMA_PROPERTIES",
        SchemaAdditionalProperties = "ERR_SCHEMA_ADDITIONAL_PROPERTIES",
        SchemaDefaultObject = "ERR_SCHEMA_DEFAULT_OBJECT",
    }
    Value => {
        ValueRequired = "ERR_VALUE_REQUIRED",
        /// Value nesting exceeds the configured depth.
        ValueDepth = "ERR_VALUE_DEPTH",
        ValueOneOf = "ERR_VALUE_ONE_OF",
        ValueAnyOf = "ERR_VALUE_ANY_OF",
        ValueAllOf = "ERR_VALUE_ALL_OF",
        ValueEnum = "ERR_VALUE_ENUM",
        ValueStringType = "ERR_VALUE_STRING_TYPE",
        ValueFormatString = "ERR_VALUE_FORMAT_STRING",
        ValueStringMinLength = "ERR_VALUE_STRING_MIN_LENGTH",
        ValueStringMaxLength = "ERR_VALUE_STRING_MAX_LENGTH",
        ValueStringPattern = "ERR_VALUE_STRING_PATTERN",
        ValueNumberType = "ERR_VALUE_NUMBER_TYPE",
        ValueNumberMinimum = "ERR_VALUE_NUMBER_MINIMUM",
        ValueNumberExclusiveMinimum = "ERR_VALUE_NUMBER_EXCLUSIVE_MINIMUM",
        ValueNumberMaximum = "ERR_VALUE_NUMBER_MAXIMUM",
        ValueNumberExclusiveMaximum = "ERR_VALUE_NUMBER_EXCLUSIVE_MAXIMUM",
        ValueNumberMultipleOf = "ERR_VALUE_NUMBER_MULTIPLE_OF",
        ValueIntegerType = "ERR_VALUE_INTEGER_TYPE",
        ValueFormatInteger = "ERR_VALUE_FORMAT_INTEGER",
        ValueIntegerMinimum = "ERR_VALUE_INTEGER_MINIMUM",
        ValueIntegerExclusiveMinimum = "ERR_VALUE_INTEGER_EXCLUSIVE_MINIMUM",
        ValueIntegerMaximum = "ERR_VALUE_INTEGER_MAXIMUM",
        ValueIntegerExclusiveMaximum = "ERR_VALUE_INTEGER_EXCLUSIVE_MAXIMUM",
        ValueIntegerMultipleOf = "ERR_VALUE_INTEGER_MULTIPLE_OF",
        ValueBooleanType = "ERR_VALUE_BOOLEAN_TYPE",
        ValueArrayType = "ERR_VALUE_ARRAY_TYPE",
        ValueArrayMinItems = "ERR_VALUE_ARRAY_MIN_ITEMS",
        ValueArrayMaxItems = "ERR_VALUE_ARRAY_MAX_ITEMS",
        ValueArrayUniqueItems = "ERR_VALUE_ARRAY_UNIQUEITEMS",
        ValueObjectType = "ERR_VALUE_OBJECT_TYPE",
        ValueObjectMinProperties = "ERR_VALUE_OBJECT_MIN_PROPERTIES",
        ValueObjectMaxProperties = "ERR_VALUE_OBJECT_MAX_PROPERTIES",
        ValueObjectRequired = "ERR_VALUE_OBJECT_REQUIRED",
        ValueObjectAdditionalProperties = "ERR_VALUE_OBJECT_ADDITIONAL_PROPERTIES",
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Returned when parsing a string that is not a known `ERR_*` code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code `{0}`")]
pub struct UnknownErrorCode(pub String);

// ============================================================================
// VIOLATION
// ============================================================================

/// Message-free description of a failure: where, what, and the bindings
/// its message template needs.
///
/// The normalizer and the validator only ever produce violations; turning
/// them into [`SchemaError`] / [`ValidationError`] is the reporter's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Dotted / bracketed location, e.g. `params.items[2].name`.
    pub path: String,
    /// What went wrong.
    pub code: ErrorCode,
    /// Template bindings, in insertion order.
    pub params: Vec<(Cow<'static, str>, String)>,
}

impl Violation {
    pub fn new(path: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            path: path.into(),
            code,
            params: Vec::new(),
        }
    }

    /// Adds a template binding.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_param(mut self, key: impl Into<Cow<'static, str>>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Looks up a binding by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// SCHEMA ERROR
// ============================================================================

/// The parameter or schema definition is malformed.
///
/// This signals a programming error in the caller's schema, not bad input
/// data; construction aborts with the first violation found.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("[{path}] {code}: {message}")]
pub struct SchemaError {
    /// Location inside the parameter definition, e.g. `parameter.schema.items.type`.
    pub path: String,
    /// Stable error code (always in the `Param` or `Schema` category).
    pub code: ErrorCode,
    /// Localized message.
    pub message: String,
}

impl SchemaError {
    /// Schema errors are deterministic: the same definition always fails
    /// the same way.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}

// ============================================================================
// VALIDATION ERROR
// ============================================================================

/// A runtime value does not satisfy the parameter's schema.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("[{path}] {code}: {message}")]
pub struct ValidationError {
    /// Location of the offending value, rooted at the parameter name.
    pub path: String,
    /// Stable error code (always in the `Value` category).
    pub code: ErrorCode,
    /// Localized message.
    pub message: String,
    /// Bindings used to render `message`, e.g. `("minLength", "2")`.
    #[serde(serialize_with = "serialize_params")]
    pub params: Vec<(Cow<'static, str>, String)>,
}

impl ValidationError {
    /// Looks up a message binding by key.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
    }
}

fn serialize_params<S: Serializer>(
    params: &[(Cow<'static, str>, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(params.len()))?;
    for (k, v) in params {
        map.serialize_entry(k.as_ref(), v)?;
    }
    map.end()
}

// ============================================================================
// TESTS
// ============================================================================
