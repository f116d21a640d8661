//! `number` and `integer` checks.

use serde_json::Value;

use crate::error::{ErrorCode, Violation};
use crate::json::{as_number, format_number};
use crate::schema::NumberSchema;

/// Error codes for one numeric kind.
struct NumberCodes {
    type_: ErrorCode,
    minimum: ErrorCode,
    exclusive_minimum: ErrorCode,
    maximum: ErrorCode,
    exclusive_maximum: ErrorCode,
    multiple_of: ErrorCode,
}

const NUMBER: NumberCodes = NumberCodes {
    type_: ErrorCode::ValueNumberType,
    minimum: ErrorCode::ValueNumberMinimum,
    exclusive_minimum: ErrorCode::ValueNumberExclusiveMinimum,
    maximum: ErrorCode::ValueNumberMaximum,
    exclusive_maximum: ErrorCode::ValueNumberExclusiveMaximum,
    multiple_of: ErrorCode::ValueNumberMultipleOf,
};

const INTEGER: NumberCodes = NumberCodes {
    type_: ErrorCode::ValueIntegerType,
    minimum: ErrorCode::ValueIntegerMinimum,
    exclusive_minimum: ErrorCode::ValueIntegerExclusiveMinimum,
    maximum: ErrorCode::ValueIntegerMaximum,
    exclusive_maximum: ErrorCode::ValueIntegerExclusiveMaximum,
    multiple_of: ErrorCode::ValueIntegerMultipleOf,
};

/// Checks type, format, bounds and divisibility in that order.
pub(crate) fn check(
    value: &Value,
    schema: &NumberSchema,
    integer: bool,
    path: &str,
) -> Result<(), Violation> {
    let codes = if integer { &INTEGER } else { &NUMBER };

    let Some(n) = as_number(value).filter(|n| !integer || n.fract() == 0.0) else {
        return Err(Violation::new(path, codes.type_));
    };

    if let Some(format) = schema.format {
        let (min, max) = format.bounds();
        if n < min || n > max {
            return Err(Violation::new(path, ErrorCode::ValueFormatInteger)
                .with_param("format", format.as_str()));
        }
    }

    if let Some(min) = schema.minimum {
        if n < min {
            return Err(Violation::new(path, codes.minimum).with_param("minimum", format_number(min)));
        }
        if schema.exclusive_minimum && n == min {
            return Err(Violation::new(path, codes.exclusive_minimum)
                .with_param("minimum", format_number(min)));
        }
    }

    if let Some(max) = schema.maximum {
        if n > max {
            return Err(Violation::new(path, codes.maximum).with_param("maximum", format_number(max)));
        }
        if schema.exclusive_maximum && n == max {
            return Err(Violation::new(path, codes.exclusive_maximum)
                .with_param("maximum", format_number(max)));
        }
    }

    if let Some(divisor) = schema.multiple_of
        && !is_multiple_of(n, divisor)
    {
        return Err(Violation::new(path, codes.multiple_of)
            .with_param("multipleOf", format_number(divisor)));
    }

    Ok(())
}

/// Divisibility with decimal scaling, so `0.3` is a multiple of `0.1`.
///
/// Both operands are scaled by `10^d`, where `d` is the larger count of
/// decimal places, and rounded to integers before the remainder is taken.
/// `d` covers the value's places too: scaling `0.35` by the divisor's `10`
/// alone would round it to `4` and accept it as a multiple of `0.1`.
fn is_multiple_of(value: f64, divisor: f64) -> bool {
    let places = decimal_places(value).max(decimal_places(divisor));
    let scale = 10_f64.powi(i32::try_from(places).unwrap_or(i32::MAX));
    let scaled_value = (value * scale).round();
    let scaled_divisor = (divisor * scale).round();

    if scaled_value.is_finite() && scaled_divisor.is_finite() && scaled_divisor != 0.0 {
        scaled_value % scaled_divisor == 0.0
    } else {
        value % divisor == 0.0
    }
}

/// Digits after the decimal point in the shortest round-trip form.
fn decimal_places(n: f64) -> usize {
    let text = n.to_string();
    text.split_once('.').map_or(0, |(_, frac)| frac.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::IntegerFormat;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(10.0, 5.0, true)]
    #[case(10.0, 3.0, false)]
    #[case(0.3, 0.1, true)]
    #[case(0.7, 0.1, true)]
    #[case(1.15, 0.05, true)]
    #[case(1.16, 0.05, false)]
    #[case(0.0, 0.5, true)]
    #[case(-4.5, 1.5, true)]
    #[case(5.0, 0.5, true)]
    #[case(0.25, 0.5, false)]
    #[case(0.35, 0.1, false)]
    #[case(0.05, 0.1, false)]
    fn multiples(#[case] value: f64, #[case] divisor: f64, #[case] expected: bool) {
        assert_eq!(is_multiple_of(value, divisor), expected, "{value} % {divisor}");
    }

    #[test]
    fn decimal_places_ignore_integral_values() {
        assert_eq!(decimal_places(3.0), 0);
        assert_eq!(decimal_places(0.125), 3);
        assert_eq!(decimal_places(-2.5), 1);
    }

    #[test]
    fn integer_requires_zero_fraction() {
        let schema = NumberSchema::default();
        assert!(check(&json!(3.0), &schema, true, "n").is_ok());
        let err = check(&json!(3.5), &schema, true, "n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueIntegerType);
        let err = check(&json!("3"), &schema, false, "n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueNumberType);
    }

    #[test]
    fn format_runs_before_bounds() {
        let schema = NumberSchema {
            minimum: Some(0.0),
            format: Some(IntegerFormat::Int32),
            ..NumberSchema::default()
        };
        let err = check(&json!(-2_147_483_649_i64), &schema, true, "n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueFormatInteger);
        assert_eq!(err.param("format"), Some("int32"));

        let err = check(&json!(-1), &schema, true, "n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueIntegerMinimum);
    }

    #[test]
    fn exclusive_bounds() {
        let schema = NumberSchema {
            minimum: Some(1.5),
            exclusive_minimum: true,
            maximum: Some(10.0),
            exclusive_maximum: true,
            ..NumberSchema::default()
        };
        let err = check(&json!(1.5), &schema, false, "n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueNumberExclusiveMinimum);
        assert_eq!(err.param("minimum"), Some("1.5"));

        let err = check(&json!(10), &schema, false, "n").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueNumberExclusiveMaximum);
        assert_eq!(err.param("maximum"), Some("10"));

        assert!(check(&json!(9.99), &schema, false, "n").is_ok());
    }

    #[test]
    fn int64_is_the_safe_integer_range() {
        let schema = NumberSchema {
            format: Some(IntegerFormat::Int64),
            ..NumberSchema::default()
        };
        assert!(check(&json!(9_007_199_254_740_991_i64), &schema, true, "n").is_ok());
        assert!(check(&json!(9_007_199_254_740_993_i64), &schema, true, "n").is_err());
    }
}
