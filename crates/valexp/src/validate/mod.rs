//! Recursive value validation against a canonical [`Schema`]
//!
//! Validation is depth-first and fail-fast: the first violated constraint is
//! reported with the exact path of the offending value. On success the
//! returned value has defaults applied to absent optional properties.
//!
//! Absent (`None`) and JSON `null` are distinct: only absent values are
//! replaced by defaults, and only `null` is accepted by `nullable` schemas.

mod format;
mod number;

use serde_json::{Map, Value};

use crate::config::ValExpConfig;
use crate::error::{ErrorCode, Violation};
use crate::json::{all_distinct, json_eq, utf16_len};
use crate::schema::{
    AdditionalProperties, ArraySchema, Combinator, LeafKind, LeafSchema, ObjectSchema, Schema,
    StringSchema,
};

/// Validates `value` against `schema`, rooting error paths at `path`.
///
/// Returns the validated value, `Ok(None)` when an optional value is absent
/// and the schema has no default.
pub fn validate_value(
    value: Option<&Value>,
    schema: &Schema,
    path: &str,
    required: bool,
    config: &ValExpConfig,
) -> Result<Option<Value>, Violation> {
    let validator = Validator {
        max_depth: config.max_depth,
    };
    validator
        .check(value, schema, path, required, 1)
        .inspect_err(|v| tracing::trace!(path = %v.path, code = %v.code, "value rejected"))
}

struct Validator {
    max_depth: usize,
}

impl Validator {
    /// Handles absence, then defers to [`Validator::present`].
    fn check(
        &self,
        value: Option<&Value>,
        schema: &Schema,
        path: &str,
        required: bool,
        depth: usize,
    ) -> Result<Option<Value>, Violation> {
        match value {
            Some(value) => self.present(value, schema, path, depth).map(Some),
            None if required => Err(Violation::new(path, ErrorCode::ValueRequired)),
            None => Ok(schema.default_value().cloned()),
        }
    }

    fn present(
        &self,
        value: &Value,
        schema: &Schema,
        path: &str,
        depth: usize,
    ) -> Result<Value, Violation> {
        if depth > self.max_depth {
            return Err(
                Violation::new(path, ErrorCode::ValueDepth).with_param("maxDepth", self.max_depth)
            );
        }

        match schema {
            Schema::Combinator(combinator) => self.combinator(value, combinator, path, depth),
            Schema::Leaf(leaf) => self.leaf(value, leaf, path, depth),
        }
    }

    // ========================================================================
    // COMBINATORS
    // ========================================================================

    /// Every member is evaluated; member errors are discarded.
    fn combinator(
        &self,
        value: &Value,
        combinator: &Combinator,
        path: &str,
        depth: usize,
    ) -> Result<Value, Violation> {
        let passed = combinator
            .members
            .iter()
            .filter(|member| self.present(value, member, path, depth + 1).is_ok())
            .count();

        if combinator.kind.is_satisfied(passed, combinator.members.len()) {
            Ok(value.clone())
        } else {
            Err(Violation::new(path, combinator.kind.value_code()))
        }
    }

    // ========================================================================
    // LEAVES
    // ========================================================================

    fn leaf(
        &self,
        value: &Value,
        leaf: &LeafSchema,
        path: &str,
        depth: usize,
    ) -> Result<Value, Violation> {
        if leaf.nullable && value.is_null() {
            return Ok(Value::Null);
        }

        if let Some(allowed) = &leaf.enumeration
            && !allowed.iter().any(|candidate| json_eq(candidate, value))
        {
            return Err(Violation::new(path, ErrorCode::ValueEnum)
                .with_param("enumList", Value::Array(allowed.clone())));
        }

        match &leaf.kind {
            LeafKind::String(schema) => string(value, schema, path),
            LeafKind::Number(schema) => number::check(value, schema, false, path).map(|()| value.clone()),
            LeafKind::Integer(schema) => number::check(value, schema, true, path).map(|()| value.clone()),
            LeafKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err(Violation::new(path, ErrorCode::ValueBooleanType)),
            },
            LeafKind::Array(schema) => self.array(value, schema, path, depth),
            LeafKind::Object(schema) => self.object(value, schema, path, depth),
        }
    }

    fn array(
        &self,
        value: &Value,
        schema: &ArraySchema,
        path: &str,
        depth: usize,
    ) -> Result<Value, Violation> {
        let Value::Array(items) = value else {
            return Err(Violation::new(path, ErrorCode::ValueArrayType));
        };
        let len = items.len() as u64;

        if let Some(min) = schema.min_items
            && len < min
        {
            return Err(Violation::new(path, ErrorCode::ValueArrayMinItems).with_param("minItems", min));
        }
        if let Some(max) = schema.max_items
            && len > max
        {
            return Err(Violation::new(path, ErrorCode::ValueArrayMaxItems).with_param("maxItems", max));
        }
        if schema.unique_items && !all_distinct(items) {
            return Err(Violation::new(path, ErrorCode::ValueArrayUniqueItems));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.present(item, &schema.items, &format!("{path}[{i}]"), depth + 1))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn object(
        &self,
        value: &Value,
        schema: &ObjectSchema,
        path: &str,
        depth: usize,
    ) -> Result<Value, Violation> {
        let Value::Object(entries) = value else {
            return Err(Violation::new(path, ErrorCode::ValueObjectType));
        };
        let len = entries.len() as u64;

        if let Some(min) = schema.min_properties
            && len < min
        {
            return Err(Violation::new(path, ErrorCode::ValueObjectMinProperties)
                .with_param("minProperties", min));
        }
        if let Some(max) = schema.max_properties
            && len > max
        {
            return Err(Violation::new(path, ErrorCode::ValueObjectMaxProperties)
                .with_param("maxProperties", max));
        }

        if let Some(missing) = schema.required.iter().find(|name| !entries.contains_key(*name)) {
            return Err(Violation::new(path, ErrorCode::ValueObjectRequired)
                .with_param("missingPropertyName", missing));
        }

        let undeclared = entries.keys().filter(|key| !schema.declares(key));

        if schema.additional_properties == AdditionalProperties::Allowed(false)
            && let Some(unknown) = undeclared.clone().next()
        {
            return Err(Violation::new(path, ErrorCode::ValueObjectAdditionalProperties)
                .with_param("unknownPropertyName", unknown));
        }

        let mut output = Map::with_capacity(entries.len());

        for (name, property) in schema.properties.iter().flatten() {
            let property_path = format!("{path}.{name}");
            if let Some(validated) =
                self.check(entries.get(name), property, &property_path, false, depth + 1)?
            {
                output.insert(name.clone(), validated);
            }
        }

        for key in undeclared {
            let validated = match &schema.additional_properties {
                AdditionalProperties::Schema(extra) => {
                    self.present(&entries[key], extra, &format!("{path}.{key}"), depth + 1)?
                }
                AdditionalProperties::Allowed(_) => entries[key].clone(),
            };
            output.insert(key.clone(), validated);
        }

        Ok(Value::Object(output))
    }
}

/// Type, format, length bounds and pattern, in that order.
fn string(value: &Value, schema: &StringSchema, path: &str) -> Result<Value, Violation> {
    let Value::String(text) = value else {
        return Err(Violation::new(path, ErrorCode::ValueStringType));
    };

    if let Some(format) = schema.format
        && !format::is_valid(format, text)
    {
        return Err(
            Violation::new(path, ErrorCode::ValueFormatString).with_param("format", format.as_str())
        );
    }

    let len = utf16_len(text);
    if let Some(min) = schema.min_length
        && len < min
    {
        return Err(Violation::new(path, ErrorCode::ValueStringMinLength).with_param("minLength", min));
    }
    if let Some(max) = schema.max_length
        && len > max
    {
        return Err(Violation::new(path, ErrorCode::ValueStringMaxLength).with_param("maxLength", max));
    }

    if let Some(pattern) = &schema.pattern
        && !pattern.matches(text)
    {
        return Err(Violation::new(path, ErrorCode::ValueStringPattern).with_param("pattern", pattern));
    }

    Ok(value.clone())
}
