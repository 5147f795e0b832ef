//! Key material: prime generation, the public/secret key pair and the parameters a
//! protocol session is run with.

pub mod keys;
pub mod prime;
pub mod shared_params;

pub use keys::{KeyPair, PublicKey, SecretKey};
pub use prime::generate_prime;
pub use shared_params::SharedParams;
