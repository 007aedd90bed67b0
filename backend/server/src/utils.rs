/// Reads a number the way a browser `parseInt` reads a number input.
///
/// Leading whitespace and one sign are accepted, then as many digits as follow.
/// Anything after the digits is ignored. `None` when no digit is found.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();

    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    if end == 0 {
        return None;
    }

    // saturate instead of failing on absurdly long inputs
    let value = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));

    Some(if negative { -value } else { value })
}

/// Required count: unparseable input becomes `fallback`.
pub fn count_or(input: &str, fallback: i64) -> i64 {
    parse_leading_int(input).unwrap_or(fallback)
}

/// Same as [`count_or`], except a parsed zero also falls back.
pub fn nonzero_or(input: &str, fallback: i64) -> i64 {
    match parse_leading_int(input) {
        Some(0) | None => fallback,
        Some(value) => value,
    }
}

/// Optional amount: unparseable input and zero both mean unset.
pub fn optional_amount(input: &str) -> Option<i64> {
    parse_leading_int(input).filter(|value| *value != 0)
}

/// Free text where blank means absent.
pub fn optional_text(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{count_or, nonzero_or, optional_amount, optional_text, parse_leading_int};

    #[test]
    fn test_basic() {
        assert_eq!(parse_leading_int("42"), Some(42));
        assert_eq!(parse_leading_int("  7"), Some(7));
        assert_eq!(parse_leading_int("+3"), Some(3));
        assert_eq!(parse_leading_int("-12"), Some(-12));
    }

    #[test]
    fn test_trailing_garbage() {
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("1.9"), Some(1));
        assert_eq!(parse_leading_int("10 000"), Some(10));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("- 5"), None);
    }

    #[test]
    fn test_saturates() {
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(count_or("oops", 0), 0);
        assert_eq!(count_or("0", 5), 0);
        assert_eq!(nonzero_or("0", 1), 1);
        assert_eq!(nonzero_or("", 1), 1);
        assert_eq!(nonzero_or("4", 1), 4);
        assert_eq!(optional_amount("0"), None);
        assert_eq!(optional_amount("x"), None);
        assert_eq!(optional_amount("5000000"), Some(5_000_000));
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text("   "), None);
        assert_eq!(optional_text("hi"), Some("hi".to_string()));
    }
}
