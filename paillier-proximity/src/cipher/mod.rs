//! # Cipher
//!
//! Randomized encryption, decryption and the homomorphic operators.
//!
//! Encryption of `m` under N is `c = (1 + m·N) · r^N mod N²` with a fresh unit `r`.
//! Decryption recovers the blinding term from `r' = c^D mod N`, where `D = N⁻¹ mod Φ`,
//! and computes `m = ((c · r'^(-N) mod N²) - 1) / N`. This is not the textbook
//! λ/μ decryption; it is checked by the round-trip tests below.
//!
//! Negative exponents are always evaluated as positive powers of the modular inverse,
//! both in [`PublicKey::scalar_mul`] and in the `r'^(-N)` term of decryption.

pub mod ciphertext;

pub use ciphertext::Ciphertext;

use crate::errors::ProximityError;
use crate::keypair::{PublicKey, SecretKey};
use crate::ring::random_unit;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

use rand::CryptoRng;

impl PublicKey {
    /// Reduces a signed plaintext into `[0, N)`.
    ///
    /// Any `m` with `-N < m < N` is accepted and negatives map to `N + m`.
    ///
    /// # Errors
    ///
    /// Returns `ProximityError::Domain` for `|m| >= N`, which could not be reduced
    /// without silently wrapping.
    pub fn encode(&self, m: &BigInt) -> Result<BigUint, ProximityError> {
        let ring = self.plaintext_ring();
        if !ring.admits_signed(m) {
            return Err(ProximityError::Domain(format!(
                "Plaintext of {} bits does not fit a {}-bit modulus",
                m.bits(),
                self.n().bits()
            )));
        }
        Ok(ring.normalize_unsigned(m))
    }

    /// Encrypts `m` with a fresh blinding factor drawn from `rng`.
    pub fn encrypt<R: CryptoRng + ?Sized>(
        &self,
        m: &BigInt,
        rng: &mut R,
    ) -> Result<Ciphertext, ProximityError> {
        let m = self.encode(m)?;
        let ring = self.ciphertext_ring();

        let r = random_unit(self.n(), rng)?;
        let blinding = r.modpow(self.n(), ring.modulus());
        let message = ring.reduce(&(BigUint::one() + &m * self.n()));

        Ok(Ciphertext::from_parts(ring.mul(&message, &blinding), self))
    }

    /// Returns a ciphertext of `(m1 + m2) mod N`.
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, ProximityError> {
        c1.check_key(self)?;
        c2.check_key(self)?;

        let value = self.ciphertext_ring().mul(c1.value(), c2.value());
        Ok(Ciphertext::from_parts(value, self))
    }

    /// Returns a ciphertext of `(k · m) mod N`.
    ///
    /// For negative `k` the ciphertext is inverted mod N² first; this fails with
    /// `ProximityError::Domain` if `c` is not a unit.
    pub fn scalar_mul(&self, c: &Ciphertext, k: &BigInt) -> Result<Ciphertext, ProximityError> {
        c.check_key(self)?;

        let value = self
            .ciphertext_ring()
            .pow(c.value(), k)
            .map_err(ProximityError::into_domain)?;
        Ok(Ciphertext::from_parts(value, self))
    }

    /// Returns a ciphertext of `-m mod N`.
    pub fn negate(&self, c: &Ciphertext) -> Result<Ciphertext, ProximityError> {
        self.scalar_mul(c, &BigInt::from(-1))
    }

    /// Returns a ciphertext of `(m1 - m2) mod N`.
    pub fn sub(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, ProximityError> {
        let negated = self.negate(c2)?;
        self.add(c1, &negated)
    }

    /// Adds a cleartext constant by folding in a fresh encryption of it.
    pub fn add_plain<R: CryptoRng + ?Sized>(
        &self,
        c: &Ciphertext,
        k: &BigInt,
        rng: &mut R,
    ) -> Result<Ciphertext, ProximityError> {
        let encrypted = self.encrypt(k, rng)?;
        self.add(c, &encrypted)
    }
}

impl SecretKey {
    /// Decrypts `c` to its plaintext in `[0, N)`.
    ///
    /// # Errors
    ///
    /// * `ProtocolMismatch` if `c` or `public_key` does not belong to this key.
    /// * `Domain` if `c` is out of range or is not a well-formed encryption.
    pub fn decrypt(
        &self,
        public_key: &PublicKey,
        c: &Ciphertext,
    ) -> Result<BigUint, ProximityError> {
        self.check_pair(public_key)?;
        c.check_key(public_key)?;

        let n = public_key.n();
        let ring = public_key.ciphertext_ring();

        // r' = c^D mod N recovers the blinding factor r mod N
        let r = c.value().modpow(self.exponent(), n);
        let minus_n = -BigInt::from(n.clone());
        let unblind = ring.pow(&r, &minus_n).map_err(ProximityError::into_domain)?;

        // 1 + m·N
        let message = ring.mul(c.value(), &unblind);
        if message.is_zero() {
            return Err(ProximityError::Domain(
                "Ciphertext is not a valid encryption under this key".to_string(),
            ));
        }

        let (m, remainder) = (message - BigUint::one()).div_rem(n);
        if !remainder.is_zero() {
            return Err(ProximityError::Domain(
                "Ciphertext is not a valid encryption under this key".to_string(),
            ));
        }

        Ok(m)
    }

    /// Decrypts `c` and maps the plaintext to the centered range `(-N/2, N/2]`.
    pub fn decrypt_signed(
        &self,
        public_key: &PublicKey,
        c: &Ciphertext,
    ) -> Result<BigInt, ProximityError> {
        let m = self.decrypt(public_key, c)?;
        Ok(public_key.plaintext_ring().lift(&m))
    }
}
