#[derive(thiserror::Error, Debug)]
pub enum ProximityError {
    /// Primes or the secret exponent could not be produced within the retry bound.
    #[error("KeyGeneration: {0}")]
    KeyGeneration(String),
    /// A plaintext, ciphertext or scalar outside the range an operation accepts.
    #[error("Domain: {0}")]
    Domain(String),
    /// Ciphertexts (or a ciphertext and a key) belonging to different key pairs.
    #[error("ProtocolMismatch: {0}")]
    ProtocolMismatch(String),
    /// Error when trying to find a modular inverse that doesn't exist (gcd(a, m) != 1).
    #[error("NoInverse: {0}")]
    NoInverse(String),
    /// Error when creating a ring with an invalid modulus (m <= 1).
    #[error("InvalidModulus: {0}")]
    InvalidModulus(String),

    #[error("InvalidParameters: {0}")]
    InvalidParameters(String),

    #[error("Data serialization: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl ProximityError {
    /// Domain errors are surfaced to the caller as-is; inverse failures inside the
    /// cipher are domain errors from the caller's point of view.
    pub(crate) fn into_domain(self) -> Self {
        match self {
            ProximityError::NoInverse(msg) => ProximityError::Domain(msg),
            other => other,
        }
    }
}
