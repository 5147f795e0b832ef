//! Bounded location: Alice learns Bob's coordinates only if he is closer than the bound.
//!
//! 1. Alice sends `[xA], [yA], [xA²], [yA²]` and the bound B to Bob.
//! 2. Bob computes `[D]` and, for every `i` in `[0, B²)`, the entries
//!    `[(D − i)·rᵢ + xB]` and `[(D − i)·r'ᵢ + yB]` with independent units `rᵢ`, `r'ᵢ`.
//!    Each table is shuffled on its own.
//! 3. Alice decrypts both tables. The entry with `i = D` carries Bob's coordinate in the
//!    clear; every other entry is masked by a random multiple.

use crate::cipher::Ciphertext;
use crate::errors::ProximityError;
use crate::keypair::{KeyPair, PublicKey, SharedParams};
use crate::protocol::messages::{LocationQuery, LocationTables};
use crate::protocol::{
    Coordinate, candidate_difference, check_table_fits, encrypt_position,
    encrypted_squared_distance,
};
use crate::ring::random_unit;

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

use rand::CryptoRng;
use rand::seq::SliceRandom;

use serde::{Deserialize, Serialize};

use tracing::{debug, info, instrument};

/// Outcome of the bounded location protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// Bob's position, recovered because his squared distance is below B².
    Within(Coordinate),
    OutOfRange,
}

impl Location {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Location::Within(coordinate) => Some(*coordinate),
            Location::OutOfRange => None,
        }
    }
}

/// Alice's state between sending her query and receiving Bob's tables.
#[derive(Debug)]
pub struct AliceSession {
    key_pair: KeyPair,
    position: Coordinate,
    bound: u64,
    table_size: usize,
}

impl AliceSession {
    pub fn start<R: CryptoRng + ?Sized>(
        params: &SharedParams,
        position: Coordinate,
        bound: u64,
        rng: &mut R,
    ) -> Result<(Self, LocationQuery), ProximityError> {
        let table_size = params.table_size(bound)?;
        let key_pair = KeyPair::generate_with(params, rng)?;
        check_table_fits(&key_pair.public_key, table_size)?;

        let query = LocationQuery {
            position: encrypt_position(&key_pair.public_key, &position, rng)?,
            bound,
        };
        debug!(bound, table_size, "alice sent location query");

        Ok((
            Self {
                key_pair,
                position,
                bound,
                table_size,
            },
            query,
        ))
    }

    /// Scans both tables in order and keeps the first plausible value of each axis.
    pub fn finish(self, tables: LocationTables) -> Result<Location, ProximityError> {
        for (axis, table) in [("x", &tables.x_table), ("y", &tables.y_table)] {
            if table.len() != self.table_size {
                return Err(ProximityError::ProtocolMismatch(format!(
                    "Expected {} {} candidates, received {}",
                    self.table_size,
                    axis,
                    table.len()
                )));
            }
        }

        let mut x = None;
        let mut y = None;
        for (x_entry, y_entry) in tables.x_table.iter().zip(&tables.y_table) {
            if x.is_none() {
                x = self.match_axis(x_entry, self.position.x)?;
            }
            if y.is_none() {
                y = self.match_axis(y_entry, self.position.y)?;
            }
            if x.is_some() && y.is_some() {
                break;
            }
        }

        Ok(match (x, y) {
            (Some(x), Some(y)) => Location::Within(Coordinate::new(x, y)),
            _ => Location::OutOfRange,
        })
    }

    /// Decrypts one entry and returns it if it lies within the bound of `own`.
    fn match_axis(&self, entry: &Ciphertext, own: i64) -> Result<Option<i64>, ProximityError> {
        let KeyPair {
            public_key,
            secret_key,
        } = &self.key_pair;

        let value = secret_key.decrypt_signed(public_key, entry)?;
        if (&value - BigInt::from(own)).magnitude() > &BigUint::from(self.bound) {
            return Ok(None);
        }

        value.to_i64().map(Some).ok_or_else(|| {
            ProximityError::Domain("Recovered coordinate does not fit in i64".to_string())
        })
    }
}

/// Bob's side of the bounded location protocol.
#[derive(Debug, Clone)]
pub struct BobSession {
    params: SharedParams,
    position: Coordinate,
}

impl BobSession {
    /// `params` bounds the tables Bob is willing to build for a query.
    pub fn new(params: SharedParams, position: Coordinate) -> Self {
        Self { params, position }
    }

    /// Builds the two masked coordinate tables and shuffles each independently.
    pub fn respond<R: CryptoRng + ?Sized>(
        &self,
        query: &LocationQuery,
        rng: &mut R,
    ) -> Result<LocationTables, ProximityError> {
        let public_key = &query.position.public_key;
        let table_size = self.params.table_size(query.bound)?;
        check_table_fits(public_key, table_size)?;

        let squared_distance = encrypted_squared_distance(&query.position, &self.position, rng)?;
        let x = BigInt::from(self.position.x);
        let y = BigInt::from(self.position.y);

        let mut x_table = Vec::with_capacity(table_size);
        let mut y_table = Vec::with_capacity(table_size);
        for index in 0..table_size {
            let difference = candidate_difference(public_key, &squared_distance, index, rng)?;
            x_table.push(masked_entry(public_key, &difference, &x, rng)?);
            y_table.push(masked_entry(public_key, &difference, &y, rng)?);
        }
        x_table.shuffle(rng);
        y_table.shuffle(rng);
        debug!(table_size, "bob built location tables");

        Ok(LocationTables { x_table, y_table })
    }
}

/// `[difference·r + value]` with a fresh unit `r`.
fn masked_entry<R: CryptoRng + ?Sized>(
    public_key: &PublicKey,
    difference: &Ciphertext,
    value: &BigInt,
    rng: &mut R,
) -> Result<Ciphertext, ProximityError> {
    let r = BigInt::from(random_unit(public_key.n(), rng)?);
    let masked = public_key.scalar_mul(difference, &r)?;
    public_key.add_plain(&masked, value, rng)
}

/// Runs the bounded location protocol with default parameters and the thread RNG.
pub fn run_bounded_location(
    alice: Coordinate,
    bob: Coordinate,
    bound: u64,
) -> Result<Location, ProximityError> {
    run_bounded_location_with(&SharedParams::default(), alice, bob, bound, &mut rand::rng())
}

/// Runs the bounded location protocol, playing both roles in-process.
#[instrument(skip_all, fields(prime_bits = params.prime_bits, bound = bound))]
pub fn run_bounded_location_with<R: CryptoRng + ?Sized>(
    params: &SharedParams,
    alice: Coordinate,
    bob: Coordinate,
    bound: u64,
    rng: &mut R,
) -> Result<Location, ProximityError> {
    let (alice_session, query) = AliceSession::start(params, alice, bound, rng)?;
    let tables = BobSession::new(params.clone(), bob).respond(&query, rng)?;
    let location = alice_session.finish(tables)?;
    info!(
        within = location.coordinate().is_some(),
        "bounded location protocol finished"
    );
    Ok(location)
}
