//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. Budget allocations arrive as free text written with locale
//! separators ("1.500.000,50"), so parsing and formatting are driven by a
//! [`NumberFormat`]. On the wire amounts travel as decimal numbers of whole
//! currency units.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Separators used when reading and writing amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub thousands: char,
    pub decimal: char,
}

impl NumberFormat {
    /// es-AR convention: `1.234.567,89`
    pub const fn es_ar() -> Self {
        Self {
            thousands: '.',
            decimal: ',',
        }
    }

    /// en-US convention: `1,234,567.89`
    pub const fn en_us() -> Self {
        Self {
            thousands: ',',
            decimal: '.',
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::es_ar()
    }
}

/// A monetary amount stored as cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Create a Money amount from cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole currency units
    ///
    /// # Examples
    /// ```
    /// use gastos::models::Money;
    /// assert_eq!(Money::from_units(1_000_000).cents(), 100_000_000);
    /// ```
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Convert a decimal number of currency units, rounding to the cent
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units, truncated toward zero
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// The cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// The amount as a decimal number of units (wire representation)
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// `None` when the result does not fit
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// `None` when the result does not fit
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Sum that reports overflow instead of clamping
    pub fn checked_sum<I: IntoIterator<Item = Self>>(iter: I) -> Option<Self> {
        iter.into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Parse free text written with the given separators
    ///
    /// Accepts an optional sign and currency symbol, thousands separators and
    /// up to two fraction digits: `"$ 1.500.000"`, `"-1.234,5"`, `"2500"`.
    /// A single thousands separator followed by one or two digits is read as
    /// a decimal point, so `"1500.50"` still means 1500.50 under es-AR.
    pub fn parse_localized(s: &str, format: &NumberFormat) -> Result<Self, MoneyParseError> {
        let invalid = || MoneyParseError::InvalidFormat(s.trim().to_string());

        let mut text: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if text.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let mut negative = false;
        if let Some(rest) = text.strip_prefix('-') {
            negative = true;
            text = rest.to_string();
        }
        if let Some(rest) = text.strip_prefix('$') {
            text = rest.to_string();
        }
        if !negative {
            if let Some(rest) = text.strip_prefix('-') {
                negative = true;
                text = rest.to_string();
            }
        }

        let (int_part, frac_part) = match text.rfind(format.decimal) {
            Some(pos) => {
                let int_part = &text[..pos];
                let frac_part = &text[pos + format.decimal.len_utf8()..];
                (strip_grouping(int_part, format.thousands).ok_or_else(invalid)?, frac_part.to_string())
            }
            None => split_undecided(&text, format.thousands).ok_or_else(invalid)?,
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || frac_part.len() > 2
        {
            return Err(invalid());
        }

        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };
        let cents: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac_part.parse().map_err(|_| invalid())?,
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or(MoneyParseError::Overflow)?;

        Ok(Self(if negative { -total } else { total }))
    }

    /// Parse using the default (es-AR) separators
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        Self::parse_localized(s, &NumberFormat::default())
    }

    /// Format with symbol and grouping, using `decimals` fraction digits (0 or 2)
    pub fn format_with(&self, format: &NumberFormat, symbol: &str, decimals: usize) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        if decimals == 0 {
            let units = (abs + 50) / 100;
            format!("{}{}{}", sign, symbol, group_digits(units, format.thousands))
        } else {
            format!(
                "{}{}{}{}{:02}",
                sign,
                symbol,
                group_digits(abs / 100, format.thousands),
                format.decimal,
                abs % 100
            )
        }
    }

    /// Totals are shown without decimals
    pub fn format_total(&self, format: &NumberFormat, symbol: &str) -> String {
        self.format_with(format, symbol, 0)
    }

    /// Source amounts show cents only when they carry them
    pub fn format_amount(&self, format: &NumberFormat, symbol: &str) -> String {
        let decimals = if self.cents_part() == 0 { 0 } else { 2 };
        self.format_with(format, symbol, decimals)
    }
}

fn group_digits(mut value: u64, separator: char) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut groups = Vec::new();
    while value > 0 {
        groups.push(value % 1000);
        value /= 1000;
    }
    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(g) = groups.pop() {
        out.push(separator);
        out.push_str(&format!("{:03}", g));
    }
    out
}

/// Remove well-formed thousands grouping ("1.234.567" -> "1234567")
fn strip_grouping(text: &str, separator: char) -> Option<String> {
    if !text.contains(separator) {
        return Some(text.to_string());
    }
    let groups: Vec<&str> = text.split(separator).collect();
    let first_ok = (1..=3).contains(&groups[0].len());
    let rest_ok = groups[1..].iter().all(|g| g.len() == 3);
    if first_ok && rest_ok {
        Some(groups.concat())
    } else {
        None
    }
}

/// Text without the decimal separator: either grouped digits or a single
/// thousands-separator used as a decimal point ("1500.5")
fn split_undecided(text: &str, separator: char) -> Option<(String, String)> {
    if let Some(grouped) = strip_grouping(text, separator) {
        return Some((grouped, String::new()));
    }
    let parts: Vec<&str> = text.split(separator).collect();
    if parts.len() == 2 && (1..=2).contains(&parts[1].len()) {
        return Some((parts[0].to_string(), parts[1].to_string()));
    }
    None
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_amount(&NumberFormat::default(), "$"))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.cents_part() == 0 {
            serializer.serialize_i64(self.units())
        } else {
            serializer.serialize_f64(self.to_decimal())
        }
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        v.checked_mul(100)
            .map(Money)
            .ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map_err(|_| E::custom("amount out of range"))
            .and_then(|v| self.visit_i64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        Money::from_decimal(v).ok_or_else(|| E::custom("amount out of range"))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        parse_wire_text(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Strings on the wire are normally plain decimals ("1500.5"); older records
/// may carry display text, so fall back to the es-AR reading
fn parse_wire_text(text: &str) -> Result<Money, MoneyParseError> {
    if let Ok(value) = text.trim().parse::<f64>() {
        if let Some(money) = Money::from_decimal(value) {
            return Ok(money);
        }
    }
    Money::parse(text)
}

/// Serde helper that never fails: null, missing or non-numeric amounts load as zero
pub mod lenient {
    use super::{parse_wire_text, Money};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawAmount>::deserialize(deserializer)?;
        let amount = match raw {
            Some(RawAmount::Number(value)) => Money::from_decimal(value),
            Some(RawAmount::Text(text)) => parse_wire_text(&text).ok(),
            Some(RawAmount::Other(_)) | None => None,
        };
        if amount.is_none() {
            tracing::debug!("non-numeric amount treated as zero");
        }
        Ok(amount.unwrap_or_default())
    }
}

// The operators saturate at the i64 bounds; use the checked_* methods where
// an overflow has to be reported.
impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    Empty,
    InvalidFormat(String),
    Overflow,
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::Empty => write!(f, "Amount is empty"),
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid amount: {}", s),
            MoneyParseError::Overflow => write!(f, "Amount is too large"),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_es_ar_grouping() {
        assert_eq!(Money::parse("1.000.000").unwrap(), Money::from_units(1_000_000));
        assert_eq!(Money::parse("$ 1.500.000,50").unwrap().cents(), 150_000_050);
        assert_eq!(Money::parse("2500").unwrap(), Money::from_units(2500));
        assert_eq!(Money::parse("-1.234,5").unwrap().cents(), -123_450);
        assert_eq!(Money::parse(",75").unwrap().cents(), 75);
    }

    #[test]
    fn test_parse_dot_as_decimal_when_not_grouping() {
        assert_eq!(Money::parse("1500.50").unwrap().cents(), 150_050);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
    }

    #[test]
    fn test_parse_en_us() {
        let fmt = NumberFormat::en_us();
        assert_eq!(
            Money::parse_localized("1,234,567.89", &fmt).unwrap().cents(),
            123_456_789
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse("   "), Err(MoneyParseError::Empty));
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.23.4").is_err());
        assert!(Money::parse("12,345").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic_near_the_limit() {
        let huge = Money::parse("90.000.000.000.000.000").unwrap();
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(Money::checked_sum([huge, huge]), None);
        assert_eq!(
            Money::checked_sum([huge, Money::from_units(-1)]),
            Some(Money::from_cents(huge.cents() - 100))
        );
        assert_eq!((-huge).checked_sub(huge), None);

        assert_eq!([huge, huge].iter().sum::<Money>(), Money::from_cents(i64::MAX));
        assert_eq!(-huge - huge, Money::from_cents(i64::MIN));
        assert_eq!(Money::from_cents(i64::MIN).abs(), Money::from_cents(i64::MAX));
    }

    #[test]
    fn test_format_total_rounds_to_units() {
        let fmt = NumberFormat::default();
        assert_eq!(Money::from_units(1_100_000).format_total(&fmt, "$"), "$1.100.000");
        assert_eq!(Money::from_units(-100_000).format_total(&fmt, "$"), "-$100.000");
        assert_eq!(Money::from_cents(150).format_total(&fmt, "$"), "$2");
        assert_eq!(Money::zero().format_total(&fmt, "$"), "$0");
    }

    #[test]
    fn test_format_amount_shows_cents_only_when_present() {
        let fmt = NumberFormat::default();
        assert_eq!(Money::from_cents(123_450).format_amount(&fmt, "$"), "$1.234,50");
        assert_eq!(Money::from_units(300_000).format_amount(&fmt, "$"), "$300.000");
        assert_eq!(format!("{}", Money::from_cents(-5)), "-$0,05");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_units(300_000);
        let b = Money::from_units(800_000);
        assert_eq!(a + b, Money::from_units(1_100_000));
        assert_eq!(a - b, Money::from_units(-500_000));
        let total: Money = [a, b].iter().sum();
        assert_eq!(total, Money::from_units(1_100_000));
    }

    #[test]
    fn test_wire_form_is_decimal_units() {
        assert_eq!(serde_json::to_string(&Money::from_units(1500)).unwrap(), "1500");
        assert_eq!(serde_json::to_string(&Money::from_cents(1050)).unwrap(), "10.5");

        let m: Money = serde_json::from_str("10.5").unwrap();
        assert_eq!(m.cents(), 1050);
        let m: Money = serde_json::from_str("\"1.234,50\"").unwrap();
        assert_eq!(m.cents(), 123_450);
        assert!(serde_json::from_str::<Money>("\"n/a\"").is_err());
    }

    #[test]
    fn test_lenient_amounts_default_to_zero() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "lenient::deserialize")]
            net: Money,
        }

        let row: Row = serde_json::from_str(r#"{"net": "n/a"}"#).unwrap();
        assert!(row.net.is_zero());
        let row: Row = serde_json::from_str(r#"{"net": null}"#).unwrap();
        assert!(row.net.is_zero());
        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert!(row.net.is_zero());
        let row: Row = serde_json::from_str(r#"{"net": {"x": 1}}"#).unwrap();
        assert!(row.net.is_zero());
        let row: Row = serde_json::from_str(r#"{"net": 300000}"#).unwrap();
        assert_eq!(row.net, Money::from_units(300_000));
    }
}
