//! Exact distance: Alice learns the Euclidean distance, nobody learns the other's position.
//!
//! 1. Alice sends `[xA]` and `[yA]` to Bob.
//! 2. Bob sends `[xB² + yB² − 2(xA·xB + yA·yB)]` back.
//! 3. Alice decrypts, adds `xA² + yA²` and takes the square root.

use crate::errors::ProximityError;
use crate::keypair::{KeyPair, SharedParams};
use crate::protocol::messages::{DistanceShare, EncryptedCoordinates};
use crate::protocol::{Coordinate, bob_distance_terms};

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use rand::CryptoRng;

use tracing::{debug, info, instrument};

/// Alice's state between sending her coordinates and receiving Bob's share.
#[derive(Debug)]
pub struct AliceSession {
    key_pair: KeyPair,
    position: Coordinate,
}

impl AliceSession {
    /// KEYGEN and ENCRYPT_COORDS: generates a fresh key pair for this run and
    /// encrypts Alice's coordinates under it.
    pub fn start<R: CryptoRng + ?Sized>(
        params: &SharedParams,
        position: Coordinate,
        rng: &mut R,
    ) -> Result<(Self, EncryptedCoordinates), ProximityError> {
        let key_pair = KeyPair::generate_with(params, rng)?;
        let public_key = &key_pair.public_key;
        position.check_fits(public_key)?;

        let request = EncryptedCoordinates {
            public_key: public_key.clone(),
            x: public_key.encrypt(&BigInt::from(position.x), rng)?,
            y: public_key.encrypt(&BigInt::from(position.y), rng)?,
        };
        debug!("alice encrypted her coordinates");

        Ok((Self { key_pair, position }, request))
    }

    /// FINALIZE: decrypts Bob's share and completes the squared distance.
    pub fn finish(self, reply: DistanceShare) -> Result<f64, ProximityError> {
        let public_key = &self.key_pair.public_key;
        let share = self.key_pair.secret_key.decrypt(public_key, &reply.share)?;

        let own_terms = public_key.encode(&self.position.squared_norm())?;
        let squared = public_key.plaintext_ring().add(&share, &own_terms);

        let squared = squared.to_f64().ok_or_else(|| {
            ProximityError::Domain("Squared distance is not representable as f64".to_string())
        })?;
        Ok(squared.sqrt())
    }
}

/// Bob's side of the exact distance protocol. Bob never holds a secret key.
#[derive(Debug, Clone)]
pub struct BobSession {
    position: Coordinate,
}

impl BobSession {
    pub fn new(position: Coordinate) -> Self {
        Self { position }
    }

    /// COMPUTE: combines Alice's ciphertexts with Bob's cleartext coordinates.
    pub fn respond<R: CryptoRng + ?Sized>(
        &self,
        request: &EncryptedCoordinates,
        rng: &mut R,
    ) -> Result<DistanceShare, ProximityError> {
        let share = bob_distance_terms(
            &request.public_key,
            &request.x,
            &request.y,
            &self.position,
            rng,
        )?;
        debug!("bob computed the encrypted distance share");
        Ok(DistanceShare { share })
    }
}

/// Runs the exact distance protocol with default parameters and the thread RNG.
pub fn run_exact_distance(alice: Coordinate, bob: Coordinate) -> Result<f64, ProximityError> {
    run_exact_distance_with(&SharedParams::default(), alice, bob, &mut rand::rng())
}

/// Runs the exact distance protocol, playing both roles in-process.
#[instrument(skip_all, fields(prime_bits = params.prime_bits))]
pub fn run_exact_distance_with<R: CryptoRng + ?Sized>(
    params: &SharedParams,
    alice: Coordinate,
    bob: Coordinate,
    rng: &mut R,
) -> Result<f64, ProximityError> {
    let (alice_session, request) = AliceSession::start(params, alice, rng)?;
    let reply = BobSession::new(bob).respond(&request, rng)?;
    let distance = alice_session.finish(reply)?;
    info!("exact distance protocol finished");
    Ok(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn params() -> SharedParams {
        SharedParams::try_with(64, 16, 1 << 16).unwrap()
    }

    #[test]
    fn test_three_four_five() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(100);
        let distance = run_exact_distance_with(
            &params(),
            Coordinate::new(0, 0),
            Coordinate::new(3, 4),
            &mut rng,
        )?;
        assert_eq!(distance, 5.0);
        Ok(())
    }

    #[test]
    fn test_identical_coordinates() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(101);
        let distance = run_exact_distance_with(
            &params(),
            Coordinate::new(1, 1),
            Coordinate::new(1, 1),
            &mut rng,
        )?;
        assert_eq!(distance, 0.0);
        Ok(())
    }

    #[test]
    fn test_negative_coordinates() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(102);
        let distance = run_exact_distance_with(
            &params(),
            Coordinate::new(-6, 2),
            Coordinate::new(6, -3),
            &mut rng,
        )?;
        assert_eq!(distance, 13.0);
        Ok(())
    }

    #[test]
    fn test_bob_rejects_oversized_position() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(103);
        let small = SharedParams::try_with(8, 16, 16)?;
        let (_alice, request) = AliceSession::start(&small, Coordinate::new(1, 1), &mut rng)?;
        let bob = BobSession::new(Coordinate::new(1 << 30, 1 << 30));
        assert!(matches!(
            bob.respond(&request, &mut rng),
            Err(ProximityError::Domain(_))
        ));
        Ok(())
    }
}
