//! Fixed-point arithmetic for prices, volumes and token amounts.
//!
//! Every quantity is an unsigned integer mantissa with an explicit number of
//! decimal places. Prices and volumes on orders always carry
//! [`PRICE_DECIMALS`] / [`VOLUME_DECIMALS`] places; token amounts carry the
//! token's own precision. Nothing here touches floating point.
//!
//! Products of two `u128` mantissas are taken in a 256-bit intermediate
//! ([`mul_div_floor`]) so that rescaling a product never overflows before
//! the final truncating division. Truncation is always toward zero.

use std::cmp::Ordering;
use std::fmt;

use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{PRICE_DECIMALS, VOLUME_DECIMALS};
use crate::{ClearswapError, Result};

/// `10^exp`, or `None` if it does not fit in a `u128` (exp > 38).
#[must_use]
pub fn pow10(exp: u32) -> Option<u128> {
    10u128.checked_pow(exp)
}

/// `floor(a * b / d)` computed with a 256-bit intermediate product.
///
/// Returns `None` if `d` is zero or the quotient does not fit in a `u128`.
#[must_use]
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    widening_mul(a, b)
        .checked_div(U256::from(d))
        .and_then(to_u128)
}

/// Full product of two `u128`s; cannot overflow 256 bits.
fn widening_mul(a: u128, b: u128) -> U256 {
    U256::from(a) * U256::from(b)
}

fn to_u128(value: U256) -> Option<u128> {
    (value.bits() <= 128).then(|| value.low_u128())
}

// ---------------------------------------------------------------------------
// Fixed
// ---------------------------------------------------------------------------

/// A non-negative fixed-point number: `mantissa × 10^-decimals`.
///
/// Equality is structural (`0.5` with one place differs from `0.50` with
/// two); use [`Fixed::value_cmp`] to compare values across scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fixed {
    mantissa: u128,
    decimals: u32,
}

impl Fixed {
    #[must_use]
    pub const fn new(mantissa: u128, decimals: u32) -> Self {
        Self { mantissa, decimals }
    }

    #[must_use]
    pub const fn zero(decimals: u32) -> Self {
        Self::new(0, decimals)
    }

    #[must_use]
    pub const fn mantissa(&self) -> u128 {
        self.mantissa
    }

    #[must_use]
    pub const fn decimals(&self) -> u32 {
        self.decimals
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// Convert a decimal into a fixed-point value with `decimals` places.
    ///
    /// Rejects negative values and values with more fractional digits than
    /// `decimals`; nothing is rounded.
    pub fn from_decimal(value: Decimal, decimals: u32) -> Result<Self> {
        let value = value.normalize();
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ClearswapError::InvalidOrder {
                reason: format!("negative amount {value}"),
            });
        }
        let scale = value.scale();
        if scale > decimals {
            return Err(ClearswapError::InvalidOrder {
                reason: format!("{value} has more than {decimals} decimal places"),
            });
        }
        let mantissa = pow10(decimals - scale)
            .and_then(|factor| value.mantissa().unsigned_abs().checked_mul(factor))
            .ok_or_else(|| {
                ClearswapError::ArithmeticOverflow(format!("{value} at {decimals} decimals"))
            })?;
        Ok(Self::new(mantissa, decimals))
    }

    /// Lossless conversion to a [`Decimal`], if it fits (at most 28 places
    /// and a 96-bit mantissa).
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let mantissa = i128::try_from(self.mantissa).ok()?;
        Decimal::try_from_i128_with_scale(mantissa, self.decimals).ok()
    }

    /// Change the number of decimal places. Scaling down truncates toward
    /// zero; scaling up fails with `ArithmeticOverflow` if the mantissa
    /// would not fit.
    pub fn rescale(&self, decimals: u32) -> Result<Self> {
        match decimals.cmp(&self.decimals) {
            Ordering::Equal => Ok(*self),
            Ordering::Less => {
                let mantissa = pow10(self.decimals - decimals)
                    .map_or(0, |divisor| self.mantissa / divisor);
                Ok(Self::new(mantissa, decimals))
            }
            Ordering::Greater => pow10(decimals - self.decimals)
                .and_then(|factor| self.mantissa.checked_mul(factor))
                .map(|mantissa| Self::new(mantissa, decimals))
                .ok_or_else(|| {
                    ClearswapError::ArithmeticOverflow(format!(
                        "rescaling {self} to {decimals} decimals"
                    ))
                }),
        }
    }

    /// `self × other`, truncated to `decimals` places.
    ///
    /// The full-precision product has `self.decimals + other.decimals`
    /// places and is held in 256 bits until the final division.
    pub fn mul_truncate(&self, other: &Self, decimals: u32) -> Result<Self> {
        let product_decimals = self.decimals + other.decimals;
        let overflow = || {
            ClearswapError::ArithmeticOverflow(format!("{self} × {other} at {decimals} decimals"))
        };
        if decimals > product_decimals {
            let factor = pow10(decimals - product_decimals).ok_or_else(overflow)?;
            return self
                .mantissa
                .checked_mul(other.mantissa)
                .and_then(|product| product.checked_mul(factor))
                .map(|mantissa| Self::new(mantissa, decimals))
                .ok_or_else(overflow);
        }
        let mut product = widening_mul(self.mantissa, other.mantissa);
        let mut remaining = product_decimals - decimals;
        while remaining > 0 && !product.is_zero() {
            let step = remaining.min(38);
            let divisor = pow10(step).ok_or_else(overflow)?;
            product /= U256::from(divisor);
            remaining -= step;
        }
        let mantissa = to_u128(product).ok_or_else(overflow)?;
        Ok(Self::new(mantissa, decimals))
    }

    /// Compare numeric values regardless of scale. Exact.
    #[must_use]
    pub fn value_cmp(&self, other: &Self) -> Ordering {
        if self.decimals == other.decimals {
            return self.mantissa.cmp(&other.mantissa);
        }
        let (coarse, fine, flipped) = if self.decimals < other.decimals {
            (self, other, false)
        } else {
            (other, self, true)
        };
        let (quotient, remainder) = match pow10(fine.decimals - coarse.decimals) {
            Some(divisor) => (fine.mantissa / divisor, fine.mantissa % divisor),
            None => (0, fine.mantissa),
        };
        let ordering = coarse
            .mantissa
            .cmp(&quotient)
            .then(if remainder > 0 {
                Ordering::Less
            } else {
                Ordering::Equal
            });
        if flipped { ordering.reverse() } else { ordering }
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.to_string();
        let places = self.decimals as usize;
        if places == 0 {
            return write!(f, "{digits}");
        }
        let padded = format!("{digits:0>width$}", width = places + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - places);
        let frac_part = frac_part.trim_end_matches('0');
        if frac_part.is_empty() {
            write!(f, "{int_part}")
        } else {
            write!(f, "{int_part}.{frac_part}")
        }
    }
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// Order price: priority token per non-priority token, [`PRICE_DECIMALS`]
/// places. The wrapped value is the raw mantissa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct Price(pub u128);

impl Price {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Fixed::from_decimal(value, PRICE_DECIMALS).map(|fixed| Self(fixed.mantissa()))
    }

    #[must_use]
    pub const fn to_fixed(self) -> Fixed {
        Fixed::new(self.0, PRICE_DECIMALS)
    }

    #[must_use]
    pub fn to_decimal(self) -> Option<Decimal> {
        self.to_fixed().to_decimal()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fixed())
    }
}

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// Order volume in the non-priority token, [`VOLUME_DECIMALS`] places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct Volume(pub u128);

impl Volume {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u128 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Fixed::from_decimal(value, VOLUME_DECIMALS).map(|fixed| Self(fixed.mantissa()))
    }

    #[must_use]
    pub const fn to_fixed(self) -> Fixed {
        Fixed::new(self.0, VOLUME_DECIMALS)
    }

    #[must_use]
    pub fn to_decimal(self) -> Option<Decimal> {
        self.to_fixed().to_decimal()
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fixed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_floor_full_width_product() {
        // (2^128 - 1)^2 / (2^128 - 1) = 2^128 - 1
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, u128::MAX), Some(u128::MAX));
    }

    #[test]
    fn mul_div_floor_beyond_u128_intermediate() {
        // 10^30 * 10^30 / 10^25 = 10^35, product alone overflows u128.
        let ten30 = pow10(30).unwrap();
        assert_eq!(
            mul_div_floor(ten30, ten30, pow10(25).unwrap()),
            pow10(35)
        );
    }

    #[test]
    fn mul_div_floor_truncates_toward_zero() {
        assert_eq!(mul_div_floor(7, 3, 2), Some(10));
        assert_eq!(mul_div_floor(1, 1, 3), Some(0));
    }

    #[test]
    fn mul_div_floor_rejects_zero_divisor_and_overflow() {
        assert_eq!(mul_div_floor(1, 1, 0), None);
        assert_eq!(mul_div_floor(u128::MAX, u128::MAX, 1), None);
    }

    #[test]
    fn from_decimal_exact() {
        let fixed = Fixed::from_decimal(Decimal::new(95, 2), 12).unwrap();
        assert_eq!(fixed.mantissa(), 950_000_000_000);
        assert_eq!(fixed.decimals(), 12);
    }

    #[test]
    fn from_decimal_rejects_excess_precision() {
        let err = Fixed::from_decimal(Decimal::new(1, 13), 12).unwrap_err();
        assert!(matches!(err, ClearswapError::InvalidOrder { .. }));
    }

    #[test]
    fn from_decimal_rejects_negative() {
        assert!(Fixed::from_decimal(Decimal::new(-1, 0), 12).is_err());
    }

    #[test]
    fn rescale_down_truncates() {
        let fixed = Fixed::new(1_999_999_999_999, 12);
        assert_eq!(fixed.rescale(9).unwrap(), Fixed::new(1_999_999_999, 9));
    }

    #[test]
    fn rescale_up_checks_overflow() {
        let fixed = Fixed::new(u128::MAX / 10, 0);
        assert!(fixed.rescale(1).is_ok());
        assert!(fixed.rescale(2).is_err());
    }

    #[test]
    fn mul_truncate_keeps_sub_unit_precision() {
        // 1 × 0.0000000000015 at 18 places = 0.0000000000015
        let volume = Fixed::new(1_000_000_000_000, 12);
        let price = Fixed::new(15, 13);
        let product = volume.mul_truncate(&price, 18).unwrap();
        assert_eq!(product, Fixed::new(1_500_000, 18));
    }

    #[test]
    fn value_cmp_across_scales() {
        let half = Fixed::new(5, 1);
        let half_wide = Fixed::new(50, 2);
        let slightly_more = Fixed::new(501, 3);
        assert_eq!(half.value_cmp(&half_wide), Ordering::Equal);
        assert_eq!(half.value_cmp(&slightly_more), Ordering::Less);
        assert_eq!(slightly_more.value_cmp(&half), Ordering::Greater);
    }

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(format!("{}", Fixed::new(975_000_000_000, 12)), "0.975");
        assert_eq!(format!("{}", Fixed::new(2_000_000_000, 9)), "2");
        assert_eq!(format!("{}", Fixed::new(15, 13)), "0.0000000000015");
        assert_eq!(format!("{}", Fixed::new(42, 0)), "42");
    }

    #[test]
    fn to_decimal_roundtrip() {
        let value = Decimal::new(1_025_641_025_641, 12);
        let volume = Volume::from_decimal(value).unwrap();
        assert_eq!(volume.to_decimal(), Some(value));
    }

    #[test]
    fn price_ordering_is_numeric() {
        let low = Price::from_decimal(Decimal::new(95, 2)).unwrap();
        let high = Price::from_decimal(Decimal::ONE).unwrap();
        assert!(low < high);
    }
}
