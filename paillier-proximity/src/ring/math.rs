//! Implementation of ring ops using arbitrary-precision modular arithmetic.

use crate::errors::ProximityError;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

use serde::{Deserialize, Serialize};

/// Represents a finite ring Z_m using modular arithmetic.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Ring {
    modulus: BigUint,
}

impl Ring {
    /// Create a new Ring with the given modulus.
    ///
    /// The modulus must be greater than 1.
    pub fn try_with(modulus: BigUint) -> Result<Self, ProximityError> {
        if modulus <= BigUint::one() {
            return Err(ProximityError::InvalidModulus(format!(
                "Modulus must be greater than 1, got {}",
                modulus
            )));
        }

        Ok(Ring { modulus })
    }

    /// Returns the modulus of the ring.
    ///
    /// # Example
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use paillier_proximity::ring::Ring;
    /// let ring = Ring::try_with(BigUint::from(13u32)).unwrap();
    /// assert_eq!(ring.modulus(), &BigUint::from(13u32));
    /// ```
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Reduces a non-negative value into `[0, modulus)`.
    pub fn reduce(&self, value: &BigUint) -> BigUint {
        value % &self.modulus
    }

    /// Normalizes a signed value to be within the range `[0, modulus - 1]`.
    ///
    /// Handles negative values correctly by adding the modulus.
    ///
    /// # Example
    ///
    /// ```
    /// # use num_bigint::{BigInt, BigUint};
    /// # use paillier_proximity::ring::Ring;
    /// let ring = Ring::try_with(BigUint::from(10u32)).unwrap();
    /// assert_eq!(ring.normalize(&BigInt::from(15)), BigInt::from(5));
    /// assert_eq!(ring.normalize(&BigInt::from(-3)), BigInt::from(7));
    /// assert_eq!(ring.normalize_unsigned(&BigInt::from(10)), BigUint::from(0u32));
    /// ```
    pub fn normalize(&self, value: &BigInt) -> BigInt {
        let m = BigInt::from(self.modulus.clone());
        value.mod_floor(&m)
    }

    /// Same as [`Ring::normalize`] but returns the unsigned representative.
    pub fn normalize_unsigned(&self, value: &BigInt) -> BigUint {
        // mod_floor with a positive modulus is never negative
        self.normalize(value).magnitude().clone()
    }

    /// Computes `(a + b) mod modulus`.
    pub fn add(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a + b) % &self.modulus
    }

    /// Computes `(a * b) mod modulus`.
    ///
    /// # Example
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use paillier_proximity::ring::Ring;
    /// let ring = Ring::try_with(BigUint::from(10u32)).unwrap();
    /// let seven = BigUint::from(7u32);
    /// let five = BigUint::from(5u32);
    /// assert_eq!(ring.mul(&seven, &five), BigUint::from(5u32)); // 35 mod 10 = 5
    /// ```
    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.modulus
    }

    /// Computes the modular multiplicative inverse `a^-1 mod modulus`.
    ///
    /// The inverse exists if and only if `gcd(a, modulus) == 1`.
    ///
    /// # Errors
    ///
    /// Returns `ProximityError::NoInverse` if the inverse does not exist, including for `a = 0`.
    ///
    /// # Example
    ///
    /// ```
    /// # use num_bigint::BigUint;
    /// # use paillier_proximity::ring::Ring;
    /// let ring = Ring::try_with(BigUint::from(10u32)).unwrap();
    /// assert_eq!(ring.inv(&BigUint::from(3u32)).unwrap(), BigUint::from(7u32));
    /// assert!(ring.inv(&BigUint::from(2u32)).is_err()); // gcd(2, 10) = 2
    /// assert!(ring.inv(&BigUint::from(0u32)).is_err());
    /// ```
    pub fn inv(&self, a: &BigUint) -> Result<BigUint, ProximityError> {
        let a_norm = self.reduce(a);
        if a_norm.is_zero() {
            return Err(ProximityError::NoInverse(format!(
                "Cannot invert 0 in mod {}",
                self.modulus
            )));
        }

        a_norm.modinv(&self.modulus).ok_or_else(|| {
            ProximityError::NoInverse(format!(
                "Modular inverse does not exist for {} mod {} (gcd={})",
                a_norm,
                self.modulus,
                a_norm.gcd(&self.modulus)
            ))
        })
    }

    /// Computes `base^exp mod modulus` for a signed exponent.
    ///
    /// A negative exponent is evaluated as `(base^-1)^|exp|`, so it only succeeds when
    /// `base` is a unit of the ring.
    ///
    /// # Example
    ///
    /// ```
    /// # use num_bigint::{BigInt, BigUint};
    /// # use paillier_proximity::ring::Ring;
    /// let ring = Ring::try_with(BigUint::from(11u32)).unwrap();
    /// let two = BigUint::from(2u32);
    /// assert_eq!(ring.pow(&two, &BigInt::from(3)).unwrap(), BigUint::from(8u32));
    /// assert_eq!(ring.pow(&two, &BigInt::from(-1)).unwrap(), BigUint::from(6u32));
    /// ```
    pub fn pow(&self, base: &BigUint, exp: &BigInt) -> Result<BigUint, ProximityError> {
        match exp.sign() {
            Sign::Minus => {
                let base_inv = self.inv(base)?;
                Ok(base_inv.modpow(exp.magnitude(), &self.modulus))
            }
            _ => Ok(base.modpow(exp.magnitude(), &self.modulus)),
        }
    }

    /// Maps a representative in `[0, modulus)` to the centered range `(-m/2, m/2]`.
    ///
    /// # Example
    ///
    /// ```
    /// # use num_bigint::{BigInt, BigUint};
    /// # use paillier_proximity::ring::Ring;
    /// let ring = Ring::try_with(BigUint::from(11u32)).unwrap();
    /// assert_eq!(ring.lift(&BigUint::from(3u32)), BigInt::from(3));
    /// assert_eq!(ring.lift(&BigUint::from(10u32)), BigInt::from(-1));
    /// ```
    pub fn lift(&self, value: &BigUint) -> BigInt {
        let value = self.reduce(value);
        let half = &self.modulus >> 1u32;
        if value > half {
            BigInt::from(value) - BigInt::from(self.modulus.clone())
        } else {
            BigInt::from(value)
        }
    }

    /// Whether a signed value lies strictly inside `(-modulus, modulus)`, i.e. it can
    /// be reduced into the ring without losing information about its sign.
    pub fn admits_signed(&self, value: &BigInt) -> bool {
        value.magnitude() < &self.modulus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(m: u32) -> Ring {
        Ring::try_with(BigUint::from(m)).unwrap()
    }

    fn big(v: u32) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_ring_creation() {
        assert!(Ring::try_with(big(11)).is_ok());
        assert!(Ring::try_with(big(25)).is_ok());
        assert!(Ring::try_with(big(1)).is_err());
        assert!(Ring::try_with(big(0)).is_err());
    }

    #[test]
    fn test_element_normalization() {
        let ring = ring(11);
        assert_eq!(ring.normalize_unsigned(&BigInt::from(5)), big(5));
        assert_eq!(ring.normalize_unsigned(&BigInt::from(16)), big(5));
        assert_eq!(ring.normalize_unsigned(&BigInt::from(-6)), big(5));
    }

    #[test]
    fn test_addition() {
        let ring = ring(11);
        assert_eq!(ring.add(&big(5), &big(8)), big(2));
        assert_eq!(ring.add(&big(0), &big(10)), big(10));
    }

    #[test]
    fn test_multiplication() {
        let ring = ring(11);
        assert_eq!(ring.mul(&big(5), &big(8)), big(7));
        assert_eq!(ring.mul(&big(9), &big(8)), big(6));
    }

    #[test]
    fn test_inversion() -> Result<(), ProximityError> {
        let ring = ring(11);
        assert_eq!(ring.inv(&big(5))?, big(9));

        let composite = Ring::try_with(big(15))?;
        assert!(matches!(
            composite.inv(&big(6)),
            Err(ProximityError::NoInverse(_))
        ));
        Ok(())
    }

    #[test]
    fn test_signed_pow_agrees_with_inverse() -> Result<(), ProximityError> {
        let ring = ring(101);
        let base = big(17);
        let forward = ring.pow(&base, &BigInt::from(5))?;
        let backward = ring.pow(&base, &BigInt::from(-5))?;
        assert_eq!(ring.mul(&forward, &backward), big(1));
        assert_eq!(ring.pow(&base, &BigInt::from(0))?, big(1));
        Ok(())
    }

    #[test]
    fn test_lift_is_centered() {
        let ring = ring(10);
        assert_eq!(ring.lift(&big(5)), BigInt::from(5));
        assert_eq!(ring.lift(&big(6)), BigInt::from(-4));
        assert_eq!(ring.lift(&big(0)), BigInt::from(0));
    }

    #[test]
    fn test_admits_signed() {
        let ring = ring(10);
        assert!(ring.admits_signed(&BigInt::from(9)));
        assert!(ring.admits_signed(&BigInt::from(-9)));
        assert!(!ring.admits_signed(&BigInt::from(10)));
        assert!(!ring.admits_signed(&BigInt::from(-10)));
    }
}
