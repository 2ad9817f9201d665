//! Modular exponentiation over arbitrary-precision integers.
//!
//! Operands travel on the wire as `i64`, but the intermediate products of
//! square-and-multiply are computed with [`BigUint`] so they never overflow.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::error::{DhError, Result};

/// Compute `base^exponent mod modulus`.
///
/// The result always lies in `[0, modulus)`. Fails if `modulus <= 0` or if
/// `base` or `exponent` is negative.
pub fn modexp(base: i64, exponent: i64, modulus: i64) -> Result<i64> {
    if modulus <= 0 {
        return Err(DhError::Arithmetic(format!(
            "modulus must be positive, got {modulus}"
        )));
    }
    if base < 0 || exponent < 0 {
        return Err(DhError::Arithmetic(format!(
            "base and exponent must be non-negative, got {base}^{exponent}"
        )));
    }

    let big_base = BigUint::from(base as u64);
    let big_exp = BigUint::from(exponent as u64);
    let big_mod = BigUint::from(modulus as u64);

    // result < modulus <= i64::MAX, so narrowing cannot fail
    big_base
        .modpow(&big_exp, &big_mod)
        .to_i64()
        .ok_or_else(|| DhError::Arithmetic("result exceeds wire integer width".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Naive reference: repeated multiplication with reduction at each step.
    fn reference(base: i64, exponent: i64, modulus: i64) -> i64 {
        let m = i128::from(modulus);
        let b = i128::from(base) % m;
        let mut acc = 1i128 % m;
        for _ in 0..exponent {
            acc = acc * b % m;
        }
        acc as i64
    }

    #[test]
    fn test_known_values() {
        assert_eq!(modexp(5, 6, 23).unwrap(), 8);
        assert_eq!(modexp(5, 15, 23).unwrap(), 19);
        assert_eq!(modexp(53, 77, 123457).unwrap(), reference(53, 77, 123457));
    }

    #[test]
    fn test_zero_exponent() {
        assert_eq!(modexp(7, 0, 23).unwrap(), 1);
        assert_eq!(modexp(0, 0, 5).unwrap(), 1);
    }

    #[test]
    fn test_large_operands_do_not_overflow() {
        // (2^62)^2 would overflow i64 and even naive u64 squaring
        let base = 1i64 << 62;
        let modulus = i64::MAX;
        let result = modexp(base, 99, modulus).unwrap();
        assert!((0..modulus).contains(&result));
    }

    #[test]
    fn test_rejects_non_positive_modulus() {
        assert!(matches!(modexp(5, 3, 0), Err(DhError::Arithmetic(_))));
        assert!(matches!(modexp(5, 3, -23), Err(DhError::Arithmetic(_))));
    }

    #[test]
    fn test_rejects_negative_operands() {
        assert!(modexp(-5, 3, 23).is_err());
        assert!(modexp(5, -3, 23).is_err());
    }

    proptest! {
        #[test]
        fn prop_matches_reference(
            base in 1i64..100_000,
            exponent in 0i64..200,
            modulus in 2i64..200_000,
        ) {
            let result = modexp(base, exponent, modulus).unwrap();
            prop_assert_eq!(result, reference(base, exponent, modulus));
            prop_assert!((0..modulus).contains(&result));
        }

        #[test]
        fn prop_zero_exponent_is_one(base in 0i64..i64::MAX, modulus in 2i64..i64::MAX) {
            prop_assert_eq!(modexp(base, 0, modulus).unwrap(), 1);
        }
    }
}
