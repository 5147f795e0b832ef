use crate::errors::ProximityError;
use crate::keypair::prime::MAX_PRIME_BITS;

use serde::{Deserialize, Serialize};

/// Prime size used by the reference protocol runs.
pub const DEFAULT_PRIME_BITS: u64 = 128;
/// Prime pairs key generation may reject before giving up.
pub const DEFAULT_MAX_KEYGEN_ATTEMPTS: usize = 16;
/// Largest candidate table a party agrees to build or decrypt.
pub const DEFAULT_MAX_TABLE_SIZE: usize = 1 << 20;

/// Parameters shared by Alice and Bob for a protocol session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedParams {
    /// Bit length k of each prime factor; the modulus N has about 2k bits.
    pub prime_bits: u64,
    /// Number of prime pairs key generation may draw before reporting failure.
    pub max_keygen_attempts: usize,
    /// Upper bound on the size of a candidate table (threshold² or bound²).
    pub max_table_size: usize,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self {
            prime_bits: DEFAULT_PRIME_BITS,
            max_keygen_attempts: DEFAULT_MAX_KEYGEN_ATTEMPTS,
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }
}

impl SharedParams {
    /// Creates a new SharedParams instance with the given parameters.
    pub fn try_with(
        prime_bits: u64,
        max_keygen_attempts: usize,
        max_table_size: usize,
    ) -> Result<Self, ProximityError> {
        let params = Self {
            prime_bits,
            max_keygen_attempts,
            max_table_size,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), ProximityError> {
        if !(2..=MAX_PRIME_BITS).contains(&self.prime_bits) {
            return Err(ProximityError::InvalidParameters(format!(
                "Prime size must be between 2 and {} bits, got {}",
                MAX_PRIME_BITS, self.prime_bits
            )));
        }

        if self.max_keygen_attempts == 0 {
            return Err(ProximityError::InvalidParameters(
                "Key generation needs at least one attempt".to_string(),
            ));
        }

        if self.max_table_size == 0 {
            return Err(ProximityError::InvalidParameters(
                "Candidate tables must be allowed at least one entry".to_string(),
            ));
        }

        Ok(())
    }

    /// Number of candidates for a threshold or bound `radius`, i.e. `radius²`.
    ///
    /// # Errors
    ///
    /// Returns `ProximityError::InvalidParameters` if `radius` is zero or the table would
    /// exceed `max_table_size`.
    pub fn table_size(&self, radius: u64) -> Result<usize, ProximityError> {
        if radius == 0 {
            return Err(ProximityError::InvalidParameters(
                "Radius must be positive".to_string(),
            ));
        }

        let size = radius
            .checked_mul(radius)
            .and_then(|s| usize::try_from(s).ok())
            .filter(|&s| s <= self.max_table_size)
            .ok_or_else(|| {
                ProximityError::InvalidParameters(format!(
                    "Radius {} needs more than {} candidates",
                    radius, self.max_table_size
                ))
            })?;

        Ok(size)
    }

    /// Exports the parameters to a JSON string.
    pub fn to_json(&self) -> Result<String, ProximityError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Imports parameters from a JSON string, validating them.
    pub fn from_json(json_str: &str) -> Result<Self, ProximityError> {
        let params: SharedParams = serde_json::from_str(json_str)?;
        params.validate()?;
        Ok(params)
    }
}
