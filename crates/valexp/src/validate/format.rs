//! String format checks for `date-time`, `date`, `time` and `byte`.
//!
//! Dates and times are scanned byte by byte; calendar validity is delegated
//! to `chrono`, base64 decoding to `base64`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;

use crate::schema::StringFormat;

// ============================================================================
// DISPATCH
// ============================================================================

/// Whether `value` is a well-formed instance of `format`.
pub(crate) fn is_valid(format: StringFormat, value: &str) -> bool {
    match format {
        StringFormat::DateTime => is_date_time(value),
        StringFormat::Date => is_date(value),
        StringFormat::Time => is_time(value),
        StringFormat::Byte => is_byte(value),
    }
}

// ============================================================================
// DATE / TIME
// ============================================================================

/// `YYYY-MM-DD`, calendar-valid in the proleptic Gregorian calendar.
///
/// Every four-digit year is accepted, `0000` through `0099` included.
fn is_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    let (Some(hi), Some(lo)) = (parse_two_digits(bytes, 0), parse_two_digits(bytes, 2)) else {
        return false;
    };
    let year = i32::from(hi) * 100 + i32::from(lo);

    let (Some(month), Some(day)) = (parse_two_digits(bytes, 5), parse_two_digits(bytes, 8)) else {
        return false;
    };

    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day)).is_some()
}

/// `HH:MM:SS` with up to three fractional digits, nothing else.
fn is_time(value: &str) -> bool {
    time_prefix(value.as_bytes()) == Some(value.len())
}

/// `<date>T<time><timezone>`.
fn is_date_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 11 || bytes[10] != b'T' {
        return false;
    }
    // The first ten bytes are ASCII once `is_date` accepts them.
    if !value.get(..10).is_some_and(is_date) {
        return false;
    }

    let Some(time_len) = time_prefix(&bytes[11..]) else {
        return false;
    };
    is_timezone(&bytes[11 + time_len..])
}

/// Length of the `HH:MM:SS[.fff]` prefix of `bytes`, if there is one.
fn time_prefix(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < 8 || bytes[2] != b':' || bytes[5] != b':' {
        return None;
    }

    let hour = parse_two_digits(bytes, 0)?;
    let minute = parse_two_digits(bytes, 3)?;
    let second = parse_two_digits(bytes, 6)?;
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let mut pos = 8;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let frac_start = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if !(1..=3).contains(&(pos - frac_start)) {
            return None;
        }
    }

    Some(pos)
}

/// `Z` or `±HH:MM`; offsets run from -12:00 to +14:00 in quarter-hour
/// minutes `00`, `30` and `45`.
fn is_timezone(bytes: &[u8]) -> bool {
    match bytes {
        [b'Z'] => true,
        [sign @ (b'+' | b'-'), _, _, b':', _, _] => {
            let (Some(hour), Some(minute)) = (parse_two_digits(bytes, 1), parse_two_digits(bytes, 4))
            else {
                return false;
            };
            let max_hour = if *sign == b'-' { 12 } else { 14 };
            hour <= max_hour && matches!(minute, 0 | 30 | 45)
        }
        _ => false,
    }
}

/// Parse two ASCII digits at `offset`.
fn parse_two_digits(bytes: &[u8], offset: usize) -> Option<u8> {
    if offset + 2 > bytes.len() {
        return None;
    }
    let d1 = bytes[offset].wrapping_sub(b'0');
    let d2 = bytes[offset + 1].wrapping_sub(b'0');
    if d1 > 9 || d2 > 9 {
        return None;
    }
    Some(d1 * 10 + d2)
}

// ============================================================================
// BYTE
// ============================================================================

/// Standard-alphabet, padded base64.
fn is_byte(value: &str) -> bool {
    STANDARD.decode(value).is_ok()
}
