//! `serde_json::Value` helpers shared by the normalizer and the validator.
//!
//! JSON numbers are treated as IEEE-754 doubles throughout, so `1` and
//! `1.0` are the same value and integrality means "no fractional part".

use serde_json::Value;

/// Value equality with numbers compared numerically.
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Whether all elements are pairwise distinct under [`json_eq`].
pub fn all_distinct(values: &[Value]) -> bool {
    values
        .iter()
        .enumerate()
        .all(|(i, a)| values[..i].iter().all(|b| !json_eq(a, b)))
}

/// The number as `f64`, if the value is a number.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// The number, if the value is a number with no fractional part.
pub fn as_integral(value: &Value) -> Option<f64> {
    as_number(value).filter(|n| n.fract() == 0.0)
}

/// The number as `u64`, if the value is a non-negative integral number.
pub fn as_count(value: &Value) -> Option<u64> {
    as_integral(value).filter(|n| *n >= 0.0).map(|n| n as u64)
}

/// Largest magnitude at which every integer is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// The JSON form of a number: integral values within the safe range become
/// JSON integers, everything else a float.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Shortest decimal form of a number, without a trailing `.0` on integers.
pub fn format_number(n: f64) -> String {
    number_value(n).to_string()
}

/// Length as JavaScript would count it: UTF-16 code units.
pub fn utf16_len(s: &str) -> u64 {
    s.encode_utf16().count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_numerically() {
        assert!(json_eq(&json!(1), &json!(1.0)));
        assert!(!json_eq(&json!(1), &json!("1")));
        assert!(json_eq(&json!([1, {"a": 2.0}]), &json!([1.0, {"a": 2}])));
        assert!(!json_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
    }

    #[test]
    fn distinctness() {
        assert!(all_distinct(&[json!(1), json!(2), json!("1")]));
        assert!(!all_distinct(&[json!(1), json!(2), json!(2.0)]));
        assert!(all_distinct(&[]));
    }

    #[test]
    fn integral_numbers() {
        assert_eq!(as_integral(&json!(3)), Some(3.0));
        assert_eq!(as_integral(&json!(3.0)), Some(3.0));
        assert_eq!(as_integral(&json!(0.1)), None);
        assert_eq!(as_integral(&json!(true)), None);
        assert_eq!(as_count(&json!(-1)), None);
        assert_eq!(as_count(&json!(2)), Some(2));
    }

    #[test]
    fn numbers_render_like_json() {
        assert_eq!(number_value(1.0), json!(1));
        assert_eq!(number_value(-3.0), json!(-3));
        assert_eq!(number_value(0.5), json!(0.5));
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(-2.5), "-2.5");
    }

    #[test]
    fn utf16_length() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("日本"), 2);
        assert_eq!(utf16_len("😀"), 2);
    }
}
