//! Canonical schema representation
//!
//! A [`Schema`] is produced once by [`normalize`] from a raw OpenAPI Schema
//! Object and is immutable afterwards. Every invariant the validator relies
//! on is enforced here by construction:
//!
//! - a leaf always has a concrete [`LeafKind`]
//! - `pattern` is always a compiled [`Pattern`]
//! - arrays always carry an `items` schema
//! - `additionalProperties` is always resolved

mod normalize;
mod pattern;

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::error::{ErrorCode, SchemaError};
use crate::json::number_value;
use crate::message::Reporter;

pub use normalize::normalize;
pub use pattern::Pattern;

// ============================================================================
// SCHEMA
// ============================================================================

/// A normalized schema: either a combinator over member schemas or a leaf
/// with a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Combinator(Combinator),
    Leaf(LeafSchema),
}

impl Schema {
    /// Normalizes a raw schema with default settings, rendering failures
    /// through the bundled catalogs in the process locale.
    pub fn from_json(raw: &Value) -> Result<Self, SchemaError> {
        normalize(raw, "schema", &crate::ValExpConfig::default())
            .map_err(|v| Reporter::default().schema_error(v))
    }

    /// The schema default, if this is a leaf that declares one.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Schema::Leaf(leaf) => leaf.default.as_ref(),
            Schema::Combinator(_) => None,
        }
    }

    /// Renders the canonical form back to an OpenAPI Schema Object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Schema::Combinator(c) => {
                let members: Vec<Value> = c.members.iter().map(Schema::to_json).collect();
                json!({ c.kind.keyword(): members })
            }
            Schema::Leaf(leaf) => leaf.to_json(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

// ============================================================================
// COMBINATORS
// ============================================================================

/// `oneOf` / `anyOf` / `allOf` over a non-empty list of members.
#[derive(Debug, Clone, PartialEq)]
pub struct Combinator {
    pub kind: CombinatorKind,
    pub members: Vec<Schema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    OneOf,
    AnyOf,
    AllOf,
}

impl CombinatorKind {
    /// Detection priority: the first keyword present in a raw schema wins.
    pub const PRIORITY: [CombinatorKind; 3] = [Self::OneOf, Self::AnyOf, Self::AllOf];

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::OneOf => "oneOf",
            Self::AnyOf => "anyOf",
            Self::AllOf => "allOf",
        }
    }

    pub(crate) const fn schema_code(self) -> ErrorCode {
        match self {
            Self::OneOf => ErrorCode::SchemaOneOf,
            Self::AnyOf => ErrorCode::SchemaAnyOf,
            Self::AllOf => ErrorCode::SchemaAllOf,
        }
    }

    pub(crate) const fn value_code(self) -> ErrorCode {
        match self {
            Self::OneOf => ErrorCode::ValueOneOf,
            Self::AnyOf => ErrorCode::ValueAnyOf,
            Self::AllOf => ErrorCode::ValueAllOf,
        }
    }

    /// Whether `passed` successful members out of `total` satisfy the
    /// combinator.
    #[must_use]
    pub const fn is_satisfied(self, passed: usize, total: usize) -> bool {
        match self {
            Self::OneOf => passed == 1,
            Self::AnyOf => passed >= 1,
            Self::AllOf => passed == total,
        }
    }
}

// ============================================================================
// LEAVES
// ============================================================================

/// A schema with a concrete type.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSchema {
    pub nullable: bool,
    /// Allowed values; only for string, number, integer and boolean.
    pub enumeration: Option<Vec<Value>>,
    /// Returned when an optional value is absent.
    pub default: Option<Value>,
    pub kind: LeafKind,
}

impl LeafSchema {
    /// A bare leaf of the given kind.
    #[must_use]
    pub fn new(kind: LeafKind) -> Self {
        Self {
            nullable: false,
            enumeration: None,
            default: None,
            kind,
        }
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), self.kind.type_name().into());
        if self.nullable {
            out.insert("nullable".into(), true.into());
        }
        if let Some(values) = &self.enumeration {
            out.insert("enum".into(), Value::Array(values.clone()));
        }
        self.kind.write_keywords(&mut out);
        if let Some(default) = &self.default {
            out.insert("default".into(), default.clone());
        }
        Value::Object(out)
    }
}

/// The six OpenAPI value types, each with its own constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafKind {
    String(StringSchema),
    Number(NumberSchema),
    Integer(NumberSchema),
    Boolean,
    Array(ArraySchema),
    Object(ObjectSchema),
}

impl LeafKind {
    /// The `type` keyword for this kind.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Integer(_) => "integer",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    fn write_keywords(&self, out: &mut Map<String, Value>) {
        match self {
            Self::String(s) => {
                insert_opt(out, "minLength", s.min_length);
                insert_opt(out, "maxLength", s.max_length);
                if let Some(pattern) = &s.pattern {
                    out.insert("pattern".into(), pattern.as_str().into());
                }
                if let Some(format) = s.format {
                    out.insert("format".into(), format.as_str().into());
                }
            }
            Self::Number(n) | Self::Integer(n) => {
                if let Some(min) = n.minimum {
                    out.insert("minimum".into(), number_value(min));
                    if n.exclusive_minimum {
                        out.insert("exclusiveMinimum".into(), true.into());
                    }
                }
                if let Some(max) = n.maximum {
                    out.insert("maximum".into(), number_value(max));
                    if n.exclusive_maximum {
                        out.insert("exclusiveMaximum".into(), true.into());
                    }
                }
                if let Some(mul) = n.multiple_of {
                    out.insert("multipleOf".into(), number_value(mul));
                }
                if let Some(format) = n.format {
                    out.insert("format".into(), format.as_str().into());
                }
            }
            Self::Boolean => {}
            Self::Array(a) => {
                insert_opt(out, "minItems", a.min_items);
                insert_opt(out, "maxItems", a.max_items);
                if a.unique_items {
                    out.insert("uniqueItems".into(), true.into());
                }
                out.insert("items".into(), a.items.to_json());
            }
            Self::Object(o) => {
                insert_opt(out, "minProperties", o.min_properties);
                insert_opt(out, "maxProperties", o.max_properties);
                if !o.required.is_empty() {
                    out.insert("required".into(), json!(o.required));
                }
                if let Some(properties) = &o.properties {
                    let props: Map<String, Value> = properties
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json()))
                        .collect();
                    out.insert("properties".into(), Value::Object(props));
                }
                match &o.additional_properties {
                    AdditionalProperties::Allowed(true) => {}
                    AdditionalProperties::Allowed(false) => {
                        out.insert("additionalProperties".into(), false.into());
                    }
                    AdditionalProperties::Schema(schema) => {
                        out.insert("additionalProperties".into(), schema.to_json());
                    }
                }
            }
        }
    }
}

fn insert_opt(out: &mut Map<String, Value>, key: &str, value: Option<u64>) {
    if let Some(v) = value {
        out.insert(key.into(), v.into());
    }
}

// ============================================================================
// STRING
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<Pattern>,
    pub format: Option<StringFormat>,
}

/// Formats checked for `type: string`. Other OpenAPI formats are rejected
/// during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    DateTime,
    Date,
    Time,
    Byte,
}

impl StringFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
            Self::Time => "time",
            Self::Byte => "byte",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date-time" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "byte" => Some(Self::Byte),
            _ => None,
        }
    }
}

// ============================================================================
// NUMBER / INTEGER
// ============================================================================

/// Constraints shared by `number` and `integer`.
///
/// The exclusive flags only take effect together with their bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSchema {
    pub minimum: Option<f64>,
    pub exclusive_minimum: bool,
    pub maximum: Option<f64>,
    pub exclusive_maximum: bool,
    /// Always greater than zero.
    pub multiple_of: Option<f64>,
    /// Only set for `integer`.
    pub format: Option<IntegerFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerFormat {
    Int32,
    /// Bounded to the IEEE-754 safe-integer range, not the full `i64` range.
    Int64,
}

impl IntegerFormat {
    /// Largest integer exactly representable as an `f64`.
    pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "int32" => Some(Self::Int32),
            "int64" => Some(Self::Int64),
            _ => None,
        }
    }

    /// Inclusive bounds of the format.
    #[must_use]
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Int32 => (i32::MIN as f64, i32::MAX as f64),
            Self::Int64 => (-Self::MAX_SAFE_INTEGER, Self::MAX_SAFE_INTEGER),
        }
    }
}

// ============================================================================
// ARRAY
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySchema {
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub items: Box<Schema>,
}

// ============================================================================
// OBJECT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    /// Always positive.
    pub min_properties: Option<u64>,
    /// Always positive.
    pub max_properties: Option<u64>,
    pub required: Vec<String>,
    /// Declared properties in declaration order.
    pub properties: Option<IndexMap<String, Schema>>,
    pub additional_properties: AdditionalProperties,
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self {
            min_properties: None,
            max_properties: None,
            required: Vec::new(),
            properties: None,
            additional_properties: AdditionalProperties::Allowed(true),
        }
    }
}

impl ObjectSchema {
    /// Whether `key` is a declared property.
    #[must_use]
    pub fn declares(&self, key: &str) -> bool {
        self.properties
            .as_ref()
            .is_some_and(|props| props.contains_key(key))
    }
}

/// Policy for keys not listed in `properties`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}
