//! Label text rules.

use core::fmt;

/// Keep only printable ASCII (`' '..='~'`).
///
/// Label fonts cover no more than this range, so anything else is dropped
/// before text is measured or drawn.
pub fn sanitize_label_text(text: &str) -> String {
    text.chars()
        .filter(|ch| matches!(ch, ' '..='~'))
        .collect()
}

/// Primary label line: `"$<price> - <name>"`, or just the name without a price.
pub fn compose_primary_line(name: &str, price: Option<&str>) -> String {
    match price {
        Some(price) => format!("${} - {}", price, name),
        None => name.to_string(),
    }
}

/// Price string rejected by [`validate_price`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceFormatError {
    NotANumber,
    /// Numeric, but not whole dollars or dollars with two cent digits.
    BadFormat,
}

impl fmt::Display for PriceFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => f.write_str("price is not a number"),
            Self::BadFormat => f.write_str("price must be whole dollars or have two cent digits"),
        }
    }
}

impl std::error::Error for PriceFormatError {}

/// Accepts `"12"` and `"12.50"`; rejects `"12.5"`, `".50"`, `"abc"`.
pub fn validate_price(price: &str) -> Result<(), PriceFormatError> {
    let trimmed = price.trim();
    if trimmed.is_empty() || trimmed.parse::<f64>().map_or(true, |v| !v.is_finite()) {
        return Err(PriceFormatError::NotANumber);
    }
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if is_digits(price) {
        return Ok(());
    }
    match price.split_once('.') {
        Some((dollars, cents)) if is_digits(dollars) && cents.len() == 2 && is_digits(cents) => {
            Ok(())
        }
        _ => Err(PriceFormatError::BadFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_non_printable_and_extended_chars() {
        assert_eq!(sanitize_label_text("Jalapeño\tPepper\u{1F336}"), "JalapeoPepper");
        assert_eq!(sanitize_label_text("4\" Pot ~ Blue"), "4\" Pot ~ Blue");
        assert_eq!(sanitize_label_text("\u{7f}\u{0}"), "");
    }

    #[test]
    fn primary_line_prefixes_price_when_present() {
        assert_eq!(compose_primary_line("Aloe", Some("4.99")), "$4.99 - Aloe");
        assert_eq!(compose_primary_line("Fern", None), "Fern");
        assert_eq!(compose_primary_line("", None), "");
    }

    #[test]
    fn price_validation_accepts_whole_and_two_decimal_prices() {
        assert_eq!(validate_price("12"), Ok(()));
        assert_eq!(validate_price("4.99"), Ok(()));
        assert_eq!(validate_price("0.50"), Ok(()));
    }

    #[test]
    fn price_validation_rejects_bad_shapes() {
        assert_eq!(validate_price("abc"), Err(PriceFormatError::NotANumber));
        assert_eq!(validate_price(""), Err(PriceFormatError::NotANumber));
        assert_eq!(validate_price("4.9"), Err(PriceFormatError::BadFormat));
        assert_eq!(validate_price("4.999"), Err(PriceFormatError::BadFormat));
        assert_eq!(validate_price(".50"), Err(PriceFormatError::BadFormat));
        assert_eq!(validate_price("-4.00"), Err(PriceFormatError::BadFormat));
        assert_eq!(validate_price(" 4.00"), Err(PriceFormatError::BadFormat));
    }
}
