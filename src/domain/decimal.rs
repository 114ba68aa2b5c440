//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Quantities, prices and money amounts all flow through this type. Parsing is
//! lossless and formatting never uses exponent notation, so CSV output is
//! stable across runs.

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;

/// Lossless decimal numeric type for quantities and money.
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub fn new(value: RustDecimal) -> Self {
        Decimal(value)
    }

    /// Build `num * 10^-scale`, e.g. `from_parts(1, 9)` is `0.000000001`.
    pub const fn from_parts(num: i64, scale: u32) -> Self {
        Decimal(RustDecimal::from_parts(
            num.unsigned_abs() as u32,
            0,
            0,
            num < 0,
            scale,
        ))
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// Leading/trailing whitespace is ignored. Scientific notation is accepted.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        let s = s.trim();
        RustDecimal::from_str(s)
            .or_else(|_| RustDecimal::from_scientific(s))
            .map(Decimal)
    }

    /// Format as a canonical string (trailing zeros stripped, no exponent).
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub const fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// True if the value has a fractional part (e.g. 2.5 shares).
    pub fn is_fractional(&self) -> bool {
        !self.0.fract().is_zero()
    }

    pub fn abs(&self) -> Decimal {
        Decimal(self.0.abs())
    }

    /// `None` if the sum does not fit.
    pub fn checked_add(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_add(rhs.0).map(Decimal)
    }

    pub fn checked_sub(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_sub(rhs.0).map(Decimal)
    }

    /// `None` if the product does not fit.
    pub fn checked_mul(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// `None` on overflow or division by zero.
    pub fn checked_div(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Round to `dp` decimal places using banker's rounding.
    pub fn round_dp(&self, dp: u32) -> Decimal {
        Decimal(self.0.round_dp(dp))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

// Arithmetic operations
impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + d)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::zero(), |acc, d| acc + *d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_parse_trims_and_formats_without_trailing_zeros() {
        assert_eq!(d(" 100.10 ").to_canonical_string(), "100.1");
        assert_eq!(d("3000").to_canonical_string(), "3000");
    }

    #[test]
    fn test_parse_scientific_notation() {
        assert_eq!(d("1e-9"), Decimal::from_parts(1, 9));
        assert_eq!(d("2.5e3").to_canonical_string(), "2500");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Decimal::from_str_canonical("ten").is_err());
        assert!(Decimal::from_str_canonical("").is_err());
    }

    #[test]
    fn test_from_parts() {
        assert_eq!(Decimal::from_parts(1, 12).to_canonical_string(), "0.000000000001");
        assert_eq!(Decimal::from_parts(-15, 1), d("-1.5"));
    }

    #[test]
    fn test_unit_cost_arithmetic() {
        // (100 * 100 + 10) / 100
        let unit = (d("100") * d("100") + d("10")) / d("100");
        assert_eq!(unit.to_canonical_string(), "100.1");
    }

    #[test]
    fn test_assign_ops_and_sum() {
        let mut total = Decimal::zero();
        total += d("10.5");
        total -= d("0.5");
        assert_eq!(total, d("10"));

        let values = vec![d("1.25"), d("2.75"), d("-1")];
        let by_ref: Decimal = values.iter().sum();
        let by_val: Decimal = values.into_iter().sum();
        assert_eq!(by_ref, d("3"));
        assert_eq!(by_val, d("3"));
    }

    #[test]
    fn test_is_fractional() {
        assert!(d("2.5").is_fractional());
        assert!(!d("2.000").is_fractional());
    }

    #[test]
    fn test_min_and_sign() {
        assert_eq!(d("5").min(d("3")), d("3"));
        assert_eq!(d("-1").min(d("3")), d("-1"));
        assert!(d("0.1").is_positive());
        assert!(d("-0.1").is_negative());
        assert!(!Decimal::zero().is_positive());
        assert!(!Decimal::zero().is_negative());
    }

    #[test]
    fn test_round_dp() {
        let third = d("10") / d("3");
        assert_eq!(third.round_dp(4).to_canonical_string(), "3.3333");
    }

    #[test]
    fn test_json_serialization_is_number() {
        let json = serde_json::to_value(d("123.456")).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "123.456");
    }

    #[test]
    fn test_checked_ops_report_overflow() {
        let big = d("100000000000000000");
        let price = d("1000000000000");
        assert_eq!(big.checked_mul(price), None);
        assert_eq!(d("2").checked_mul(d("3")), Some(d("6")));
        assert_eq!(d("1").checked_div(Decimal::zero()), None);
        assert_eq!(d("-2.5").abs(), d("2.5"));

        let max = Decimal::new(RustDecimal::MAX);
        assert_eq!(max.checked_add(d("1")), None);
        assert_eq!(max.checked_sub(d("1")), Some(max - d("1")));
    }
}
