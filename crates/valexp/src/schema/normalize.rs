//! Raw schema → canonical [`Schema`]
//!
//! Checks run in a fixed order and the first failure aborts normalization,
//! so a malformed schema always reports the same path and code.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::{
    AdditionalProperties, ArraySchema, Combinator, CombinatorKind, IntegerFormat, LeafKind,
    LeafSchema, NumberSchema, ObjectSchema, Pattern, Schema, StringFormat, StringSchema,
};
use crate::config::ValExpConfig;
use crate::error::{ErrorCode, Violation};
use crate::json::{all_distinct, as_count, as_integral, as_number};

type Object = Map<String, Value>;

const ENUM_TYPES: [&str; 4] = ["string", "number", "integer", "boolean"];

/// Normalizes `raw` into a canonical [`Schema`].
///
/// `path` names the schema's location in error paths, e.g.
/// `parameter.schema`. Fails with the first [`Violation`] found.
pub fn normalize(raw: &Value, path: &str, config: &ValExpConfig) -> Result<Schema, Violation> {
    Normalizer { config }.schema(raw, path, 1)
}

struct Normalizer<'a> {
    config: &'a ValExpConfig,
}

impl Normalizer<'_> {
    fn schema(&self, raw: &Value, path: &str, depth: usize) -> Result<Schema, Violation> {
        if depth > self.config.max_depth {
            return Err(Violation::new(path, ErrorCode::SchemaDepth)
                .with_param("maxDepth", self.config.max_depth));
        }

        let Some(obj) = raw.as_object() else {
            return Err(Violation::new(path, ErrorCode::Schema));
        };

        match self.combinator_kind(obj, path)? {
            Some(kind) => self.combinator(obj, kind, path, depth),
            None => self.leaf(obj, path, depth).map(Schema::Leaf),
        }
    }

    /// The highest-priority combinator keyword present, if any.
    fn combinator_kind(&self, obj: &Object, path: &str) -> Result<Option<CombinatorKind>, Violation> {
        let mut present = CombinatorKind::PRIORITY
            .into_iter()
            .filter(|kind| obj.contains_key(kind.keyword()));

        let Some(kind) = present.next() else {
            return Ok(None);
        };

        let ignored: Vec<&str> = present.map(CombinatorKind::keyword).collect();
        if let Some(first) = ignored.first() {
            if self.config.strict_combinators {
                return Err(at(path, first, ErrorCode::SchemaCombinator));
            }
            tracing::warn!(
                path,
                honored = kind.keyword(),
                ignored = ?ignored,
                "multiple combinators declared, only the first is honored"
            );
        }

        Ok(Some(kind))
    }

    fn combinator(
        &self,
        obj: &Object,
        kind: CombinatorKind,
        path: &str,
        depth: usize,
    ) -> Result<Schema, Violation> {
        let key_path = format!("{path}.{}", kind.keyword());
        let list = match obj.get(kind.keyword()) {
            Some(Value::Array(list)) if !list.is_empty() => list,
            _ => return Err(Violation::new(key_path, kind.schema_code())),
        };

        let members = list
            .iter()
            .enumerate()
            .map(|(i, member)| self.schema(member, &format!("{key_path}[{i}]"), depth + 1))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Schema::Combinator(Combinator { kind, members }))
    }

    fn leaf(&self, obj: &Object, path: &str, depth: usize) -> Result<LeafSchema, Violation> {
        let type_name = get(obj, "type", path, ErrorCode::SchemaType, |v| {
            v.as_str().filter(|t| is_known_type(t))
        })?
        .ok_or_else(|| at(path, "type", ErrorCode::SchemaType))?;

        let nullable =
            get(obj, "nullable", path, ErrorCode::SchemaNullable, Value::as_bool)?.unwrap_or(false);

        let enumeration = get(obj, "enum", path, ErrorCode::SchemaEnum, |v| {
            let list = v.as_array()?;
            let valid = ENUM_TYPES.contains(&type_name)
                && !list.is_empty()
                && all_distinct(list)
                && list.iter().all(|el| matches_type(type_name, el));
            valid.then(|| list.clone())
        })?;

        let kind = match type_name {
            "string" => LeafKind::String(string(obj, path)?),
            "number" => LeafKind::Number(number(obj, path, false)?),
            "integer" => LeafKind::Integer(number(obj, path, true)?),
            "boolean" => LeafKind::Boolean,
            "array" => LeafKind::Array(self.array(obj, path, depth)?),
            _ => LeafKind::Object(self.object(obj, path, depth)?),
        };

        let default = default_value(obj, &kind, path)?;

        Ok(LeafSchema {
            nullable,
            enumeration,
            default,
            kind,
        })
    }

    fn array(&self, obj: &Object, path: &str, depth: usize) -> Result<ArraySchema, Violation> {
        let min_items = get(obj, "minItems", path, ErrorCode::SchemaMinItems, as_count)?;
        let max_items = get(obj, "maxItems", path, ErrorCode::SchemaMaxItems, as_count)?;
        let unique_items =
            get(obj, "uniqueItems", path, ErrorCode::SchemaUniqueItems, Value::as_bool)?
                .unwrap_or(false);

        let items = match obj.get("items") {
            Some(raw @ Value::Object(_)) => self.schema(raw, &format!("{path}.items"), depth + 1)?,
            _ => return Err(at(path, "items", ErrorCode::SchemaItems)),
        };

        Ok(ArraySchema {
            min_items,
            max_items,
            unique_items,
            items: Box::new(items),
        })
    }

    fn object(&self, obj: &Object, path: &str, depth: usize) -> Result<ObjectSchema, Violation> {
        let positive = |v: &Value| as_count(v).filter(|n| *n > 0);
        let min_properties = get(obj, "minProperties", path, ErrorCode::SchemaMinProperties, positive)?;
        let max_properties = get(obj, "maxProperties", path, ErrorCode::SchemaMaxProperties, positive)?;

        let required = get(obj, "required", path, ErrorCode::SchemaRequired, |v| {
            let list = v.as_array().filter(|list| !list.is_empty())?;
            list.iter()
                .map(|name| name.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
        })?
        .unwrap_or_default();

        let additional_properties = match obj.get("additionalProperties") {
            None => AdditionalProperties::Allowed(true),
            Some(_) if !obj.contains_key("properties") => {
                return Err(at(path, "additionalProperties", ErrorCode::SchemaAdditionalProperties));
            }
            Some(Value::Bool(allowed)) => AdditionalProperties::Allowed(*allowed),
            Some(raw @ Value::Object(_)) => AdditionalProperties::Schema(Box::new(self.schema(
                raw,
                &format!("{path}.additionalProperties"),
                depth + 1,
            )?)),
            Some(_) => {
                return Err(at(path, "additionalProperties", ErrorCode::SchemaAdditionalProperties));
            }
        };

        let properties = match obj.get("properties") {
            None => None,
            Some(Value::Object(raw)) => {
                let mut properties = IndexMap::with_capacity(raw.len());
                for (name, raw) in raw {
                    let schema = self.schema(raw, &format!("{path}.properties.{name}"), depth + 1)?;
                    properties.insert(name.clone(), schema);
                }
                Some(properties)
            }
            Some(_) => return Err(at(path, "properties", ErrorCode::SchemaProperties)),
        };

        let schema = ObjectSchema {
            min_properties,
            max_properties,
            required,
            properties,
            additional_properties,
        };

        if self.config.strict_required && !schema.required.iter().all(|name| schema.declares(name)) {
            return Err(at(path, "required", ErrorCode::SchemaRequired));
        }

        Ok(schema)
    }
}

fn string(obj: &Object, path: &str) -> Result<StringSchema, Violation> {
    Ok(StringSchema {
        min_length: get(obj, "minLength", path, ErrorCode::SchemaMinLength, as_count)?,
        max_length: get(obj, "maxLength", path, ErrorCode::SchemaMaxLength, as_count)?,
        pattern: get(obj, "pattern", path, ErrorCode::SchemaPattern, |v| {
            Pattern::new(v.as_str()?).ok()
        })?,
        format: get(obj, "format", path, ErrorCode::SchemaFormatString, |v| {
            StringFormat::parse(v.as_str()?)
        })?,
    })
}

fn number(obj: &Object, path: &str, integer: bool) -> Result<NumberSchema, Violation> {
    let minimum = get(obj, "minimum", path, ErrorCode::SchemaMinimum, as_number)?;
    let exclusive_minimum = minimum.is_some()
        && get(obj, "exclusiveMinimum", path, ErrorCode::SchemaExclusiveMinimum, Value::as_bool)?
            .unwrap_or(false);

    let maximum = get(obj, "maximum", path, ErrorCode::SchemaMaximum, as_number)?;
    let exclusive_maximum = maximum.is_some()
        && get(obj, "exclusiveMaximum", path, ErrorCode::SchemaExclusiveMaximum, Value::as_bool)?
            .unwrap_or(false);

    let multiple_of = get(obj, "multipleOf", path, ErrorCode::SchemaMultipleOf, |v| {
        as_number(v).filter(|n| *n > 0.0)
    })?;

    // `format` on `number` is accepted and ignored.
    let format = if integer {
        get(obj, "format", path, ErrorCode::SchemaFormatInteger, |v| {
            IntegerFormat::parse(v.as_str()?)
        })?
    } else {
        None
    };

    Ok(NumberSchema {
        minimum,
        exclusive_minimum,
        maximum,
        exclusive_maximum,
        multiple_of,
        format,
    })
}

fn default_value(obj: &Object, kind: &LeafKind, path: &str) -> Result<Option<Value>, Violation> {
    let Some(value) = obj.get("default") else {
        return Ok(None);
    };

    let (valid, code) = match kind {
        LeafKind::String(_) => (value.is_string(), ErrorCode::SchemaDefaultString),
        LeafKind::Number(_) => (value.is_number(), ErrorCode::SchemaDefaultNumber),
        LeafKind::Integer(_) => (as_integral(value).is_some(), ErrorCode::SchemaDefaultInteger),
        LeafKind::Boolean => (value.is_boolean(), ErrorCode::SchemaDefaultBoolean),
        LeafKind::Array(_) => (value.is_array(), ErrorCode::SchemaDefaultArray),
        LeafKind::Object(_) => (value.is_object(), ErrorCode::SchemaDefaultObject),
    };

    if valid {
        Ok(Some(value.clone()))
    } else {
        Err(at(path, "default", code))
    }
}

/// Reads an optional keyword, failing with `code` at `path.key` when it is
/// present but `extract` rejects it.
fn get<'v, T>(
    obj: &'v Object,
    key: &str,
    path: &str,
    code: ErrorCode,
    extract: impl FnOnce(&'v Value) -> Option<T>,
) -> Result<Option<T>, Violation> {
    obj.get(key)
        .map(|value| extract(value).ok_or_else(|| at(path, key, code)))
        .transpose()
}

fn at(path: &str, key: &str, code: ErrorCode) -> Violation {
    Violation::new(format!("{path}.{key}"), code)
}

fn is_known_type(name: &str) -> bool {
    matches!(
        name,
        "string" | "number" | "integer" | "boolean" | "array" | "object"
    )
}

fn matches_type(type_name: &str, value: &Value) -> bool {
    match type_name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => as_integral(value).is_some(),
        "boolean" => value.is_boolean(),
        _ => false,
    }
}
