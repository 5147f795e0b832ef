//! Payloads exchanged between Alice and Bob.
//!
//! Every transfer in a protocol is one of these values, so swapping the in-process
//! handoff for a real transport only means shipping [`Message`]s.

use crate::cipher::Ciphertext;
use crate::errors::ProximityError;
use crate::keypair::PublicKey;

use serde::{Deserialize, Serialize};

/// Alice → Bob, exact distance: her public key and encrypted coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedCoordinates {
    pub public_key: PublicKey,
    pub x: Ciphertext,
    pub y: Ciphertext,
}

/// Alice's encrypted coordinates together with their encrypted squares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPosition {
    pub public_key: PublicKey,
    pub x: Ciphertext,
    pub y: Ciphertext,
    pub x_squared: Ciphertext,
    pub y_squared: Ciphertext,
}

/// Bob → Alice, exact distance: `[xB² + yB² − 2(xA·xB + yA·yB)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceShare {
    pub share: Ciphertext,
}

/// Alice → Bob, threshold proximity: position plus the agreed threshold T.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityQuery {
    pub position: EncryptedPosition,
    pub threshold: u64,
}

/// Bob → Alice, threshold proximity: T² shuffled entries `[(D − i)·rᵢ]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTable {
    pub entries: Vec<Ciphertext>,
}

/// Alice → Bob, bounded location: position plus the agreed bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationQuery {
    pub position: EncryptedPosition,
    pub bound: u64,
}

/// Bob → Alice, bounded location: independently shuffled x and y tables,
/// `[(D − i)·rᵢ + xB]` and `[(D − i)·r'ᵢ + yB]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationTables {
    pub x_table: Vec<Ciphertext>,
    pub y_table: Vec<Ciphertext>,
}

/// Envelope for every payload, tagged so the receiver can dispatch on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    EncryptedCoordinates(EncryptedCoordinates),
    DistanceShare(DistanceShare),
    ProximityQuery(ProximityQuery),
    CandidateTable(CandidateTable),
    LocationQuery(LocationQuery),
    LocationTables(LocationTables),
}

impl Message {
    pub fn to_json(&self) -> Result<String, ProximityError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json_str: &str) -> Result<Self, ProximityError> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Short name of the payload, for logs and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::EncryptedCoordinates(_) => "EncryptedCoordinates",
            Message::DistanceShare(_) => "DistanceShare",
            Message::ProximityQuery(_) => "ProximityQuery",
            Message::CandidateTable(_) => "CandidateTable",
            Message::LocationQuery(_) => "LocationQuery",
            Message::LocationTables(_) => "LocationTables",
        }
    }
}

macro_rules! impl_message_payload {
    ($($payload:ident),* $(,)?) => {
        $(
            impl From<$payload> for Message {
                fn from(payload: $payload) -> Self {
                    Message::$payload(payload)
                }
            }

            impl TryFrom<Message> for $payload {
                type Error = ProximityError;

                fn try_from(message: Message) -> Result<Self, Self::Error> {
                    match message {
                        Message::$payload(payload) => Ok(payload),
                        other => Err(ProximityError::ProtocolMismatch(format!(
                            "Expected {}, received {}",
                            stringify!($payload),
                            other.kind()
                        ))),
                    }
                }
            }
        )*
    };
}

impl_message_payload!(
    EncryptedCoordinates,
    DistanceShare,
    ProximityQuery,
    CandidateTable,
    LocationQuery,
    LocationTables,
);

#[cfg(test)]
mod tests {
    use super::*;

    use crate::keypair::KeyPair;

    use num_bigint::BigInt;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_envelope_json_preserves_payload() -> Result<(), ProximityError> {
        let mut rng = StdRng::seed_from_u64(21);
        let keys = KeyPair::generate(32, &mut rng)?;
        let pk = &keys.public_key;

        let share = DistanceShare {
            share: pk.encrypt(&BigInt::from(-7), &mut rng)?,
        };
        let json = Message::from(share.clone()).to_json()?;
        let received = DistanceShare::try_from(Message::from_json(&json)?)?;

        assert_eq!(received, share);
        assert_eq!(
            keys.secret_key.decrypt_signed(pk, &received.share)?,
            BigInt::from(-7)
        );
        Ok(())
    }

    #[test]
    fn test_unexpected_payload_is_a_mismatch() {
        let message = Message::CandidateTable(CandidateTable { entries: vec![] });
        assert!(matches!(
            LocationTables::try_from(message),
            Err(ProximityError::ProtocolMismatch(_))
        ));
    }
}
