use crate::errors::ProximityError;
use crate::keypair::prime::generate_prime;
use crate::keypair::shared_params::SharedParams;
use crate::ring::Ring;

use num_bigint::BigUint;
use num_traits::One;

use rand::CryptoRng;

use serde::{Deserialize, Serialize};

use std::fmt;

use tracing::{debug, trace};

/// Public key: the composite modulus N = p·q.
///
/// Plaintexts live in Z_N and ciphertexts in Z_{N²}; both rings are kept alongside
/// the modulus so every cipher operation reduces with the right one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PublicKeyRepr", into = "PublicKeyRepr")]
pub struct PublicKey {
    plaintext_ring: Ring,
    ciphertext_ring: Ring,
}

/// Wire form of a [`PublicKey`]: only N travels, N² is recomputed on import.
#[derive(Serialize, Deserialize)]
struct PublicKeyRepr {
    n: BigUint,
}

impl TryFrom<PublicKeyRepr> for PublicKey {
    type Error = ProximityError;

    fn try_from(repr: PublicKeyRepr) -> Result<Self, Self::Error> {
        PublicKey::try_with(repr.n)
    }
}

impl From<PublicKey> for PublicKeyRepr {
    fn from(key: PublicKey) -> Self {
        PublicKeyRepr {
            n: key.plaintext_ring.modulus().clone(),
        }
    }
}

impl PublicKey {
    /// Builds a public key from its modulus.
    pub fn try_with(n: BigUint) -> Result<Self, ProximityError> {
        let n_squared = &n * &n;
        Ok(Self {
            plaintext_ring: Ring::try_with(n)?,
            ciphertext_ring: Ring::try_with(n_squared)?,
        })
    }

    /// The modulus N.
    pub fn n(&self) -> &BigUint {
        self.plaintext_ring.modulus()
    }

    /// N², the ciphertext modulus.
    pub fn n_squared(&self) -> &BigUint {
        self.ciphertext_ring.modulus()
    }

    /// Z_N, where plaintexts are interpreted.
    pub fn plaintext_ring(&self) -> &Ring {
        &self.plaintext_ring
    }

    /// Z_{N²}, where ciphertexts are combined.
    pub fn ciphertext_ring(&self) -> &Ring {
        &self.ciphertext_ring
    }

    /// Exports the public key to a JSON string.
    pub fn to_json(&self) -> Result<String, ProximityError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Imports a public key from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, ProximityError> {
        Ok(serde_json::from_str(json_str)?)
    }
}

/// Secret key: the decryption exponent D = N⁻¹ mod Φ, where Φ = (p-1)(q-1).
///
/// The key remembers which modulus it belongs to so it refuses to decrypt under a
/// foreign public key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    n: BigUint,
    d: BigUint,
}

impl SecretKey {
    pub(crate) fn exponent(&self) -> &BigUint {
        &self.d
    }

    /// Fails with `ProtocolMismatch` unless this key was generated together with `public_key`.
    pub fn check_pair(&self, public_key: &PublicKey) -> Result<(), ProximityError> {
        if &self.n != public_key.n() {
            return Err(ProximityError::ProtocolMismatch(
                "Secret key does not belong to the given public key".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("n_bits", &self.n.bits())
            .field("d", &"<redacted>")
            .finish()
    }
}

/// A freshly generated public/secret key pair, owned by Alice for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

impl KeyPair {
    /// Generates a key pair from two distinct `bits`-bit primes with default retry limits.
    pub fn generate<R: CryptoRng + ?Sized>(
        bits: u64,
        rng: &mut R,
    ) -> Result<Self, ProximityError> {
        let params = SharedParams {
            prime_bits: bits,
            ..SharedParams::default()
        };
        Self::generate_with(&params, rng)
    }

    /// Generates a key pair according to `params`.
    ///
    /// 1. Draw primes p and q, redrawing q while it equals p.
    /// 2. N = p·q, Φ = (p-1)(q-1).
    /// 3. D = N⁻¹ mod Φ. When gcd(N, Φ) != 1 the pair is discarded and new primes drawn.
    ///
    /// # Errors
    ///
    /// Returns `ProximityError::KeyGeneration` once `params.max_keygen_attempts` prime
    /// pairs have been rejected, which in practice means `prime_bits` is too small.
    pub fn generate_with<R: CryptoRng + ?Sized>(
        params: &SharedParams,
        rng: &mut R,
    ) -> Result<Self, ProximityError> {
        let bits = params.prime_bits;

        for attempt in 1..=params.max_keygen_attempts {
            let p = generate_prime(bits, rng)?;
            let Some(q) = distinct_prime(&p, bits, params.max_keygen_attempts, rng)? else {
                trace!(attempt, "could not draw q distinct from p");
                continue;
            };

            let n = &p * &q;
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());

            let Some(d) = n.modinv(&phi) else {
                trace!(attempt, "gcd(N, phi) != 1, regenerating primes");
                continue;
            };

            debug!(prime_bits = bits, modulus_bits = n.bits(), attempt, "key pair generated");

            return Ok(KeyPair {
                public_key: PublicKey::try_with(n.clone())?,
                secret_key: SecretKey { n, d },
            });
        }

        Err(ProximityError::KeyGeneration(format!(
            "No usable {}-bit prime pair after {} attempts",
            bits, params.max_keygen_attempts
        )))
    }
}

fn distinct_prime<R: CryptoRng + ?Sized>(
    p: &BigUint,
    bits: u64,
    max_draws: usize,
    rng: &mut R,
) -> Result<Option<BigUint>, ProximityError> {
    for _ in 0..max_draws {
        let q = generate_prime(bits, rng)?;
        if &q != p {
            return Ok(Some(q));
        }
    }
    Ok(None)
}
