//! Threshold proximity: Alice learns only whether Bob is within distance T.
//!
//! 1. Alice sends `[xA], [yA], [xA²], [yA²]` and T to Bob.
//! 2. Bob computes `[D]`, the squared distance, and for every `i` in `[0, T²)` the entry
//!    `[(D − i)·rᵢ]` with a fresh unit `rᵢ`. He shuffles the T² entries and sends them.
//! 3. Alice decrypts every entry. A zero means `D = i` for some `i < T²`, i.e. Bob is near.
//!
//! Non-matching entries decrypt to `(D − i)·rᵢ`, uniformly spread over the non-zero
//! residues, so the only information Alice gets is whether a zero occurred. The cost is
//! T² encryptions and T² decryptions.

use crate::errors::ProximityError;
use crate::keypair::{KeyPair, SharedParams};
use crate::protocol::messages::{CandidateTable, ProximityQuery};
use crate::protocol::{
    Coordinate, candidate_difference, check_table_fits, encrypt_position,
    encrypted_squared_distance,
};
use crate::ring::random_unit;

use num_bigint::BigInt;
use num_traits::Zero;

use rand::CryptoRng;
use rand::seq::SliceRandom;

use serde::{Deserialize, Serialize};

use tracing::{debug, info, instrument};

/// Outcome of the threshold proximity protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proximity {
    /// The squared distance is below T².
    Near,
    /// No candidate matched; Bob is at distance T or more.
    Far,
}

impl Proximity {
    pub fn is_near(&self) -> bool {
        matches!(self, Proximity::Near)
    }
}

/// Alice's state between sending her query and receiving Bob's candidate table.
#[derive(Debug)]
pub struct AliceSession {
    key_pair: KeyPair,
    table_size: usize,
}

impl AliceSession {
    pub fn start<R: CryptoRng + ?Sized>(
        params: &SharedParams,
        position: Coordinate,
        threshold: u64,
        rng: &mut R,
    ) -> Result<(Self, ProximityQuery), ProximityError> {
        let table_size = params.table_size(threshold)?;
        let key_pair = KeyPair::generate_with(params, rng)?;
        check_table_fits(&key_pair.public_key, table_size)?;

        let query = ProximityQuery {
            position: encrypt_position(&key_pair.public_key, &position, rng)?,
            threshold,
        };
        debug!(threshold, table_size, "alice sent proximity query");

        Ok((
            Self {
                key_pair,
                table_size,
            },
            query,
        ))
    }

    /// Decrypts the whole table and reports whether any entry is zero.
    pub fn finish(self, table: CandidateTable) -> Result<Proximity, ProximityError> {
        if table.entries.len() != self.table_size {
            return Err(ProximityError::ProtocolMismatch(format!(
                "Expected {} candidates, received {}",
                self.table_size,
                table.entries.len()
            )));
        }

        let KeyPair {
            public_key,
            secret_key,
        } = &self.key_pair;

        let mut near = false;
        for entry in &table.entries {
            // every entry is decrypted, a match does not cut the scan short
            near |= secret_key.decrypt(public_key, entry)?.is_zero();
        }

        Ok(if near { Proximity::Near } else { Proximity::Far })
    }
}

/// Bob's side of the threshold proximity protocol.
#[derive(Debug, Clone)]
pub struct BobSession {
    params: SharedParams,
    position: Coordinate,
}

impl BobSession {
    /// `params` bounds the table Bob is willing to build for a query.
    pub fn new(params: SharedParams, position: Coordinate) -> Self {
        Self { params, position }
    }

    /// Builds and shuffles the T² candidate entries `[(D − i)·rᵢ]`.
    pub fn respond<R: CryptoRng + ?Sized>(
        &self,
        query: &ProximityQuery,
        rng: &mut R,
    ) -> Result<CandidateTable, ProximityError> {
        let public_key = &query.position.public_key;
        let table_size = self.params.table_size(query.threshold)?;
        check_table_fits(public_key, table_size)?;

        let squared_distance = encrypted_squared_distance(&query.position, &self.position, rng)?;

        let mut entries = Vec::with_capacity(table_size);
        for index in 0..table_size {
            let difference = candidate_difference(public_key, &squared_distance, index, rng)?;
            let r = BigInt::from(random_unit(public_key.n(), rng)?);
            entries.push(public_key.scalar_mul(&difference, &r)?);
        }
        entries.shuffle(rng);
        debug!(table_size, "bob built candidate table");

        Ok(CandidateTable { entries })
    }
}

/// Runs the threshold proximity protocol with default parameters and the thread RNG.
pub fn run_threshold_proximity(
    alice: Coordinate,
    bob: Coordinate,
    threshold: u64,
) -> Result<Proximity, ProximityError> {
    run_threshold_proximity_with(
        &SharedParams::default(),
        alice,
        bob,
        threshold,
        &mut rand::rng(),
    )
}

/// Runs the threshold proximity protocol, playing both roles in-process.
#[instrument(skip_all, fields(prime_bits = params.prime_bits, threshold = threshold))]
pub fn run_threshold_proximity_with<R: CryptoRng + ?Sized>(
    params: &SharedParams,
    alice: Coordinate,
    bob: Coordinate,
    threshold: u64,
    rng: &mut R,
) -> Result<Proximity, ProximityError> {
    let (alice_session, query) = AliceSession::start(params, alice, threshold, rng)?;
    let table = BobSession::new(params.clone(), bob).respond(&query, rng)?;
    let outcome = alice_session.finish(table)?;
    info!(?outcome, "threshold proximity protocol finished");
    Ok(outcome)
}
