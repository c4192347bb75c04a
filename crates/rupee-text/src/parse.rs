//! Lenient numeric parsing for form cells

/// Parse the leading number of a form value
///
/// Accepts leading whitespace, an optional sign, digits with an optional
/// fraction and an optional exponent. Anything after the number is ignored,
/// so `"12 pcs"` reads as `12`. Returns `None` when no digits lead the text.
///
/// # Examples
/// ```
/// use rupee_text::parse_amount;
/// assert_eq!(parse_amount("12.5"), Some(12.5));
/// assert_eq!(parse_amount("  3kg"), Some(3.0));
/// assert_eq!(parse_amount(".5"), Some(0.5));
/// assert_eq!(parse_amount("abc"), None);
/// ```
pub fn parse_amount(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Parse a form value, treating anything unparseable as zero
pub fn parse_amount_or_zero(text: &str) -> f64 {
    parse_amount(text).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_amount("0"), Some(0.0));
        assert_eq!(parse_amount("42"), Some(42.0));
        assert_eq!(parse_amount("-7.25"), Some(-7.25));
        assert_eq!(parse_amount("+3"), Some(3.0));
    }

    #[test]
    fn test_parse_partial_fraction() {
        assert_eq!(parse_amount("5."), Some(5.0));
        assert_eq!(parse_amount(".75"), Some(0.75));
        assert_eq!(parse_amount("."), None);
        assert_eq!(parse_amount("-"), None);
    }

    #[test]
    fn test_parse_trailing_text() {
        assert_eq!(parse_amount("12 pcs"), Some(12.0));
        assert_eq!(parse_amount("1,200"), Some(1.0));
        assert_eq!(parse_amount("  8.5/kg"), Some(8.5));
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!(parse_amount("1e3"), Some(1000.0));
        assert_eq!(parse_amount("2.5E-1"), Some(0.25));
        assert_eq!(parse_amount("4e"), Some(4.0));
        assert_eq!(parse_amount("4e+"), Some(4.0));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount_or_zero("abc"), 0.0);
    }
}
