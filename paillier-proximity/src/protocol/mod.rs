//! # Protocols
//!
//! Two-party protocols between Alice, who owns the key pair and decrypts, and Bob, who
//! only ever computes on ciphertexts. Each protocol module exposes the individual
//! steps (so a transport can sit between them) and a `run_*` function that plays both
//! roles in-process.
//!
//! All three build on the squared-distance expansion
//! `(xA−xB)² + (yA−yB)² = xA² + yA² + xB² + yB² − 2(xA·xB + yA·yB)`.

pub mod bounded;
pub mod exact;
pub mod messages;
pub mod threshold;

pub use bounded::{Location, run_bounded_location, run_bounded_location_with};
pub use exact::{run_exact_distance, run_exact_distance_with};
pub use messages::{
    CandidateTable, DistanceShare, EncryptedCoordinates, EncryptedPosition, LocationQuery,
    LocationTables, Message, ProximityQuery,
};
pub use threshold::{Proximity, run_threshold_proximity, run_threshold_proximity_with};

use crate::cipher::Ciphertext;
use crate::errors::ProximityError;
use crate::keypair::PublicKey;

use num_bigint::{BigInt, BigUint};

use rand::CryptoRng;

use serde::{Deserialize, Serialize};

/// A party's private position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// `x² + y²`, computed without overflow.
    pub fn squared_norm(&self) -> BigInt {
        let x = BigInt::from(self.x);
        let y = BigInt::from(self.y);
        &x * &x + &y * &y
    }

    /// Ensures the squared distance to any other admissible coordinate stays below N/2.
    ///
    /// Each party checks its own position against `8·(x² + y²) < N`. If both pass, the
    /// squared distance is at most `2·(‖A‖² + ‖B‖²) < N/2`, so it never wraps modulo N.
    pub fn check_fits(&self, public_key: &PublicKey) -> Result<(), ProximityError> {
        let limit = BigInt::from(public_key.n().clone());
        if self.squared_norm() * 8 >= limit {
            return Err(ProximityError::Domain(format!(
                "Coordinate is too large for a {}-bit modulus",
                public_key.n().bits()
            )));
        }
        Ok(())
    }
}

impl From<(i64, i64)> for Coordinate {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Alice's side: encrypts `[x], [y], [x²], [y²]`.
pub(crate) fn encrypt_position<R: CryptoRng + ?Sized>(
    public_key: &PublicKey,
    position: &Coordinate,
    rng: &mut R,
) -> Result<EncryptedPosition, ProximityError> {
    position.check_fits(public_key)?;

    let x = BigInt::from(position.x);
    let y = BigInt::from(position.y);

    Ok(EncryptedPosition {
        public_key: public_key.clone(),
        x: public_key.encrypt(&x, rng)?,
        y: public_key.encrypt(&y, rng)?,
        x_squared: public_key.encrypt(&(&x * &x), rng)?,
        y_squared: public_key.encrypt(&(&y * &y), rng)?,
    })
}

/// Bob's side: `[xB² + yB² − 2(xA·xB + yA·yB)]` from Alice's `[xA], [yA]`.
pub(crate) fn bob_distance_terms<R: CryptoRng + ?Sized>(
    public_key: &PublicKey,
    x: &Ciphertext,
    y: &Ciphertext,
    position: &Coordinate,
    rng: &mut R,
) -> Result<Ciphertext, ProximityError> {
    position.check_fits(public_key)?;

    let x_cross = public_key.scalar_mul(x, &BigInt::from(position.x))?;
    let y_cross = public_key.scalar_mul(y, &BigInt::from(position.y))?;
    let cross = public_key.add(&x_cross, &y_cross)?;
    let cross = public_key.scalar_mul(&cross, &BigInt::from(-2))?;

    public_key.add_plain(&cross, &position.squared_norm(), rng)
}

/// Bob's side: `[D]`, the encrypted squared distance, kept under Alice's key.
pub(crate) fn encrypted_squared_distance<R: CryptoRng + ?Sized>(
    alice: &EncryptedPosition,
    position: &Coordinate,
    rng: &mut R,
) -> Result<Ciphertext, ProximityError> {
    let public_key = &alice.public_key;
    let bob_terms = bob_distance_terms(public_key, &alice.x, &alice.y, position, rng)?;
    let alice_terms = public_key.add(&alice.x_squared, &alice.y_squared)?;
    public_key.add(&bob_terms, &alice_terms)
}

/// Bob's side: `[D − i]` for a candidate index `i`.
pub(crate) fn candidate_difference<R: CryptoRng + ?Sized>(
    public_key: &PublicKey,
    squared_distance: &Ciphertext,
    index: usize,
    rng: &mut R,
) -> Result<Ciphertext, ProximityError> {
    let candidate = public_key.encrypt(&BigInt::from(index), rng)?;
    public_key.sub(squared_distance, &candidate)
}

/// Rejects tables whose size does not fit below the plaintext modulus.
///
/// Candidates are compared modulo N, so `i` and `i + N` would be indistinguishable.
pub(crate) fn check_table_fits(
    public_key: &PublicKey,
    table_size: usize,
) -> Result<(), ProximityError> {
    if &BigUint::from(table_size) >= public_key.n() {
        return Err(ProximityError::InvalidParameters(format!(
            "{} candidates do not fit a {}-bit modulus",
            table_size,
            public_key.n().bits()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::keypair::KeyPair;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_encrypted_squared_distance_matches_cleartext() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(31);
        let keys = KeyPair::generate(48, &mut rng)?;
        let pk = &keys.public_key;

        let cases = [
            ((10, 10), (21, 13), 130),
            ((0, 0), (3, 4), 25),
            ((-5, 7), (2, -1), 113),
            ((4, 4), (4, 4), 0),
        ];
        for (alice, bob, expected) in cases {
            let position = encrypt_position(pk, &Coordinate::from(alice), &mut rng)?;
            let d = encrypted_squared_distance(&position, &Coordinate::from(bob), &mut rng)?;
            assert_eq!(keys.secret_key.decrypt(pk, &d)?, BigUint::from(expected as u32));
        }
        Ok(())
    }

    #[test]
    fn test_candidate_difference() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(32);
        let keys = KeyPair::generate(48, &mut rng)?;
        let pk = &keys.public_key;

        let d = pk.encrypt(&BigInt::from(9), &mut rng)?;
        let at = candidate_difference(pk, &d, 9, &mut rng)?;
        let below = candidate_difference(pk, &d, 12, &mut rng)?;
        assert_eq!(keys.secret_key.decrypt_signed(pk, &at)?, BigInt::from(0));
        assert_eq!(keys.secret_key.decrypt_signed(pk, &below)?, BigInt::from(-3));
        Ok(())
    }

    #[test]
    fn test_coordinate_must_fit_modulus() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(33);
        let keys = KeyPair::generate(16, &mut rng)?;
        let pk = &keys.public_key;

        assert!(Coordinate::new(3, 4).check_fits(pk).is_ok());
        assert!(matches!(
            Coordinate::new(i64::MAX, i64::MIN).check_fits(pk),
            Err(ProximityError::Domain(_))
        ));
        assert!(encrypt_position(pk, &Coordinate::new(1 << 20, 0), &mut rng).is_err());
        Ok(())
    }

    #[test]
    fn test_table_must_fit_modulus() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(34);
        let keys = KeyPair::generate(4, &mut rng)?;
        let pk = &keys.public_key;

        assert!(check_table_fits(pk, 100).is_ok());
        assert!(check_table_fits(pk, 1 << 20).is_err());
        Ok(())
    }
}
