use crate::errors::ProximityError;
use crate::keypair::PublicKey;

use num_bigint::BigUint;

use serde::{Deserialize, Serialize};

/// An element of Z_{N²} produced by [`PublicKey::encrypt`] or a homomorphic operation.
///
/// The ciphertext carries the modulus N² it lives in, so combining values from two
/// different key pairs is caught instead of yielding meaningless arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ciphertext {
    value: BigUint,
    n_squared: BigUint,
}

impl Ciphertext {
    /// Wraps a raw value received for `public_key`.
    ///
    /// # Errors
    ///
    /// Returns `ProximityError::Domain` if `value` is not in `[0, N²)`.
    pub fn try_with(value: BigUint, public_key: &PublicKey) -> Result<Self, ProximityError> {
        let ciphertext = Self {
            value,
            n_squared: public_key.n_squared().clone(),
        };
        ciphertext.check_range()?;
        Ok(ciphertext)
    }

    pub(crate) fn from_parts(value: BigUint, public_key: &PublicKey) -> Self {
        Self {
            value,
            n_squared: public_key.n_squared().clone(),
        }
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn n_squared(&self) -> &BigUint {
        &self.n_squared
    }

    fn check_range(&self) -> Result<(), ProximityError> {
        if self.value >= self.n_squared {
            return Err(ProximityError::Domain(format!(
                "Ciphertext of {} bits is outside [0, N²) for a {}-bit N²",
                self.value.bits(),
                self.n_squared.bits()
            )));
        }
        Ok(())
    }

    /// Checks that the ciphertext was produced under `public_key` and is in range.
    ///
    /// Deserialized ciphertexts skip [`Ciphertext::try_with`], so every cipher
    /// operation revalidates its operands here.
    pub fn check_key(&self, public_key: &PublicKey) -> Result<(), ProximityError> {
        if &self.n_squared != public_key.n_squared() {
            return Err(ProximityError::ProtocolMismatch(
                "Ciphertext was produced under a different public key".to_string(),
            ));
        }
        self.check_range()
    }
}
