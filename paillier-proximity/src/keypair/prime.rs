use crate::errors::ProximityError;
use crate::ring::random_bits;

use num_bigint::BigUint;
use num_prime::nt_funcs::is_prime;
use num_traits::One;

use rand::CryptoRng;

use tracing::trace;

/// Candidates drawn per bit of prime size before giving up. Prime density among odd
/// k-bit integers is roughly 2 / (k ln 2), so this leaves an astronomically small
/// failure probability for any k where primes exist.
const ATTEMPTS_PER_BIT: u64 = 64;

/// Largest prime size accepted anywhere in the crate.
pub const MAX_PRIME_BITS: u64 = 4096;

/// Returns a random probable prime in `[2^(bits-1), 2^bits)`.
///
/// Candidates have their top bit forced (so they are exactly `bits` long) and their
/// low bit forced (odd), then go through the BPSW test of `num-prime`.
///
/// # Errors
///
/// Returns `ProximityError::KeyGeneration` if `bits` is outside `[2, MAX_PRIME_BITS]`
/// or if no prime was found within the attempt bound.
pub fn generate_prime<R: CryptoRng + ?Sized>(
    bits: u64,
    rng: &mut R,
) -> Result<BigUint, ProximityError> {
    if bits < 2 {
        return Err(ProximityError::KeyGeneration(format!(
            "Primes need at least 2 bits, got {}",
            bits
        )));
    }
    if bits > MAX_PRIME_BITS {
        return Err(ProximityError::KeyGeneration(format!(
            "Primes are limited to {} bits, got {}",
            MAX_PRIME_BITS, bits
        )));
    }

    let top = BigUint::one() << (bits - 1);
    let max_attempts = ATTEMPTS_PER_BIT * bits;

    for attempt in 1..=max_attempts {
        let candidate = random_bits(bits, rng) | &top | BigUint::one();
        if is_prime(&candidate, None).probably() {
            trace!(bits, attempt, "prime found");
            return Ok(candidate);
        }
    }

    Err(ProximityError::KeyGeneration(format!(
        "No {}-bit prime found after {} candidates",
        bits, max_attempts
    )))
}
