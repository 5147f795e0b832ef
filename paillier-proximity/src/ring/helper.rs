use crate::errors::ProximityError;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

use rand::CryptoRng;

/// Returns a non-negative integer uniformly distributed in `[0, 2^bits)`.
pub fn random_bits<R: CryptoRng + ?Sized>(bits: u64, rng: &mut R) -> BigUint {
    let nbytes = bits.div_ceil(8) as usize;
    let mut bytes = vec![0u8; nbytes];
    rng.fill_bytes(&mut bytes);

    if let Some(first) = bytes.first_mut() {
        // mask off any extra MSBs so the value < 2^bits
        let excess = 8 * nbytes as u64 - bits;
        if excess > 0 {
            *first &= 0xFFu8 >> excess;
        }
    }

    BigUint::from_bytes_be(&bytes)
}

/// Returns an integer uniformly distributed in `[0, bound)` by rejection sampling.
///
/// # Errors
///
/// Returns `ProximityError::Domain` if `bound` is zero.
pub fn random_below<R: CryptoRng + ?Sized>(
    bound: &BigUint,
    rng: &mut R,
) -> Result<BigUint, ProximityError> {
    if bound.is_zero() {
        return Err(ProximityError::Domain(
            "Cannot sample below an empty bound".to_string(),
        ));
    }

    let bits = bound.bits();
    loop {
        let candidate = random_bits(bits, rng);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Returns a unit of Z_m drawn uniformly from `[1, modulus)` with `gcd(r, modulus) == 1`.
///
/// For an RSA-style modulus non-units are found with negligible probability, so the
/// loop almost always finishes on the first draw.
pub fn random_unit<R: CryptoRng + ?Sized>(
    modulus: &BigUint,
    rng: &mut R,
) -> Result<BigUint, ProximityError> {
    if modulus <= &BigUint::one() {
        return Err(ProximityError::InvalidModulus(format!(
            "Modulus must be greater than 1, got {}",
            modulus
        )));
    }

    loop {
        let candidate = random_below(modulus, rng)?;
        if !candidate.is_zero() && candidate.gcd(modulus).is_one() {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_bits_respects_width() {
        let mut rng = StdRng::seed_from_u64(7);
        for bits in [1u64, 7, 8, 9, 63, 130] {
            for _ in 0..50 {
                assert!(random_bits(bits, &mut rng).bits() <= bits);
            }
        }
        assert!(random_bits(0, &mut rng).is_zero());
    }

    #[test]
    fn test_random_below_stays_in_range() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(11);
        let bound = BigUint::from(1000u32);
        for _ in 0..200 {
            assert!(random_below(&bound, &mut rng)? < bound);
        }
        assert!(random_below(&BigUint::zero(), &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn test_random_unit_is_coprime() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(13);
        let modulus = BigUint::from(2u32 * 3 * 5 * 7 * 11);
        for _ in 0..100 {
            let unit = random_unit(&modulus, &mut rng)?;
            assert!(!unit.is_zero());
            assert!(unit.gcd(&modulus).is_one());
        }
        assert!(random_unit(&BigUint::one(), &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() -> Result<(), ProximityError> {
        let bound = BigUint::from(u64::MAX) * 3u32;
        let a = random_below(&bound, &mut StdRng::seed_from_u64(99))?;
        let b = random_below(&bound, &mut StdRng::seed_from_u64(99))?;
        assert_eq!(a, b);
        Ok(())
    }
}
