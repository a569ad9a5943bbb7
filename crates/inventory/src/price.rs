use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult};

/// Unit price in the smallest currency unit (cents).
///
/// Never negative. Parsing accepts `.` or `,` as the decimal separator since
/// spreadsheets exported with Spanish locales use the comma.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        if cents < 0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self(cents))
    }

    /// Convert a decimal amount (as received in JSON) to cents, rounding to
    /// the nearest cent.
    pub fn from_decimal(amount: f64) -> DomainResult<Self> {
        if !amount.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if amount < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Self::from_cents((amount * 100.0).round() as i64)
    }

    /// Parse a textual amount such as `1250.50`, `89,99` or `$12`.
    ///
    /// Digits past the second decimal are rounded half-up.
    pub fn parse(input: &str) -> DomainResult<Self> {
        let raw = input.trim();
        let raw = raw.strip_prefix('$').unwrap_or(raw).trim();
        if raw.starts_with('-') {
            return Err(DomainError::validation("price cannot be negative"));
        }

        let normalized = raw.replace(',', ".");
        let (whole, fraction) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(DomainError::validation(format!("invalid price: {input:?}")));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| DomainError::validation(format!("invalid price: {input:?}")))?
        };

        let digits: Vec<i64> = fraction
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(i64::from)
            .collect();
        let tenths = digits.first().copied().unwrap_or(0);
        let hundredths = digits.get(1).copied().unwrap_or(0);
        let round_up = digits.get(2).is_some_and(|d| *d >= 5);

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(|| DomainError::validation(format!("price out of range: {input:?}")))?;

        Self::from_cents(cents)
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    pub fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Total value of `quantity` units, in cents.
    pub fn times(self, quantity: i64) -> i64 {
        self.0.saturating_mul(quantity)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        format_cents(self.0, f)
    }
}

/// Render a cent amount with two decimals (`123456` → `1234.56`).
pub fn format_cents(cents: i64, f: &mut impl core::fmt::Write) -> core::fmt::Result {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Convenience wrapper around [`format_cents`] returning a `String`.
pub fn cents_to_string(cents: i64) -> String {
    let mut out = String::new();
    let _ = format_cents(cents, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_decimal_amounts() {
        assert_eq!(Price::parse("12").unwrap().cents(), 1200);
        assert_eq!(Price::parse("1250.50").unwrap().cents(), 125050);
        assert_eq!(Price::parse("89,99").unwrap().cents(), 8999);
        assert_eq!(Price::parse(" $7.5 ").unwrap().cents(), 750);
        assert_eq!(Price::parse(".25").unwrap().cents(), 25);
    }

    #[test]
    fn rounds_extra_fraction_digits_half_up() {
        assert_eq!(Price::parse("0.125").unwrap().cents(), 13);
        assert_eq!(Price::parse("0.124").unwrap().cents(), 12);
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert!(Price::parse("-1").is_err());
        assert!(Price::parse("abc").is_err());
        assert!(Price::parse("").is_err());
        assert!(Price::parse("1.2.3").is_err());
        assert!(Price::from_decimal(f64::NAN).is_err());
        assert!(Price::from_cents(-5).is_err());
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Price::parse("120").unwrap().to_string(), "120.00");
        assert_eq!(Price::from_decimal(89.99).unwrap().to_string(), "89.99");
        assert_eq!(cents_to_string(-150), "-1.50");
    }

    #[test]
    fn times_multiplies_quantity() {
        let price = Price::parse("2.50").unwrap();
        assert_eq!(price.times(4), 1000);
        assert_eq!(Price::from_cents(i64::MAX).unwrap().times(2), i64::MAX);
    }
}
