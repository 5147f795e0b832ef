//! Privacy-preserving distance protocols over a Paillier-style additively homomorphic
//! cryptosystem.
//!
//! Alice owns a key pair and decrypts; Bob only combines her ciphertexts with his own
//! cleartext position. Three protocols are provided:
//!
//! - [`run_exact_distance`]: Alice learns the Euclidean distance.
//! - [`run_threshold_proximity`]: Alice learns only whether the distance is below T.
//! - [`run_bounded_location`]: Alice learns Bob's position only if it is closer than B.
//!
//! ```
//! use paillier_proximity::{Coordinate, SharedParams, run_exact_distance_with};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let params = SharedParams::try_with(32, 16, 1 << 10).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//! let distance = run_exact_distance_with(
//!     &params,
//!     Coordinate::new(0, 0),
//!     Coordinate::new(3, 4),
//!     &mut rng,
//! )
//! .unwrap();
//! assert_eq!(distance, 5.0);
//! ```

pub mod cipher;
pub mod errors;
pub mod keypair;
pub mod protocol;
pub mod ring;

pub use cipher::Ciphertext;
pub use errors::ProximityError;
pub use keypair::{KeyPair, PublicKey, SecretKey, SharedParams, generate_prime};
pub use protocol::{
    Coordinate, Location, Message, Proximity, run_bounded_location, run_bounded_location_with,
    run_exact_distance, run_exact_distance_with, run_threshold_proximity,
    run_threshold_proximity_with,
};
