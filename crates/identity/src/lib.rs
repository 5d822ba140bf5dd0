//! # Euclid Identity Crate
//!
//! Every persisted entity in Euclid is keyed by an [`Identifier`]: 18 bytes
//! drawn from the operating system's secure random source. Its text form is
//! the URL-safe base64 encoding of those bytes, which is always 24 characters
//! long and never padded.
//!
//! ```
//! use euclid_identity::Identifier;
//!
//! let id = Identifier::generate().expect("entropy source available");
//! let token = id.encode();
//! assert_eq!(token.len(), 24);
//! assert_eq!(Identifier::decode(&token), Ok(id));
//! ```

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[cfg(feature = "sqlx")]
mod sqlite;

/// Number of random bytes in an identifier.
pub const IDENTIFIER_LEN: usize = 18;

/// Length of the encoded text form.
pub const ENCODED_LEN: usize = 24;

/// Opaque, immutable entity identifier.
///
/// Equality and hashing compare the raw bytes only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; IDENTIFIER_LEN]);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("identifier is not valid url-safe base64: {0}")]
    InvalidEncoding(String),

    #[error("identifier must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// The secure random source could not supply bytes.
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct EntropySourceUnavailable(#[from] rand::Error);

impl Identifier {
    /// Draw a fresh identifier from the OS random source.
    ///
    /// There is no fallback generator: if the OS source fails the caller gets
    /// [`EntropySourceUnavailable`] and must not mint an identifier.
    pub fn generate() -> Result<Self, EntropySourceUnavailable> {
        let mut bytes = [0u8; IDENTIFIER_LEN];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(bytes))
    }

    pub const fn from_bytes(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let bytes: [u8; IDENTIFIER_LEN] =
            bytes.try_into().map_err(|_| DecodeError::InvalidLength {
                expected: IDENTIFIER_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|error| DecodeError::InvalidEncoding(error.to_string()))?;
        Self::from_slice(&bytes)
    }
}

/// Fail fast when the OS random source is unusable.
///
/// Called once at startup so the process refuses to serve instead of
/// discovering the problem on the first write.
pub fn ensure_entropy_source() -> Result<(), EntropySourceUnavailable> {
    Identifier::generate().map(|_| ())
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.encode())
    }
}

impl FromStr for Identifier {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::decode(&token).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn zero_identifier_round_trips() {
        let zero = Identifier::from_bytes([0u8; IDENTIFIER_LEN]);
        let token = zero.encode();

        assert_eq!(token, "AAAAAAAAAAAAAAAAAAAAAAAA");
        assert_eq!(Identifier::decode(&token).unwrap(), zero);
    }

    #[test]
    fn random_identifiers_round_trip() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let bytes: [u8; IDENTIFIER_LEN] = rng.gen();
            let id = Identifier::from_bytes(bytes);
            let token = id.encode();

            assert_eq!(token.len(), ENCODED_LEN);
            assert_eq!(Identifier::decode(&token).unwrap(), id);
        }
    }

    #[test]
    fn encoding_is_url_safe() {
        let id = Identifier::from_bytes([0xFB; IDENTIFIER_LEN]);
        let token = id.encode();

        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
        assert!(!token.contains('='));
        assert!(token.contains('-') || token.contains('_'));
    }

    #[rstest]
    #[case::not_base64("!!!not-base64!!!")]
    #[case::standard_alphabet("++++++++++++++++++++++++")]
    #[case::padded("AAAAAAAAAAAAAAAAAAAAAA==")]
    #[case::whitespace(" AAAAAAAAAAAAAAAAAAAAAAA")]
    fn malformed_tokens_are_rejected(#[case] token: &str) {
        assert!(matches!(
            Identifier::decode(token),
            Err(DecodeError::InvalidEncoding(_))
        ));
    }

    #[rstest]
    #[case::empty("", 0)]
    #[case::ten_bytes("AAAAAAAAAAAAAA", 10)]
    #[case::nineteen_bytes("AAAAAAAAAAAAAAAAAAAAAAAAAA", 19)]
    fn wrong_length_tokens_are_rejected(#[case] token: &str, #[case] actual: usize) {
        assert_eq!(
            Identifier::decode(token),
            Err(DecodeError::InvalidLength {
                expected: IDENTIFIER_LEN,
                actual,
            })
        );
    }

    #[test]
    fn equality_is_bytewise() {
        let mut bytes = [7u8; IDENTIFIER_LEN];
        let a = Identifier::from_bytes(bytes);
        let b = Identifier::from_bytes(bytes);
        bytes[IDENTIFIER_LEN - 1] = 8;
        let c = Identifier::from_bytes(bytes);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn prefixes_never_form_identifiers() {
        let bytes = [3u8; IDENTIFIER_LEN];
        assert!(Identifier::from_slice(&bytes[..IDENTIFIER_LEN - 1]).is_err());
        assert!(Identifier::from_slice(&[3u8; IDENTIFIER_LEN + 1]).is_err());
        assert_eq!(
            Identifier::from_slice(&bytes).unwrap(),
            Identifier::from_bytes(bytes)
        );
    }

    #[test]
    fn generated_identifiers_are_distinct() {
        let ids: HashSet<Identifier> = (0..10_000)
            .map(|_| Identifier::generate().unwrap())
            .collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn entropy_probe_succeeds() {
        assert!(ensure_entropy_source().is_ok());
    }

    #[test]
    fn serde_uses_text_form() {
        let id = Identifier::generate().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.encode()));

        let parsed: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<Identifier>("\"short\"").is_err());
    }

    #[test]
    fn from_str_and_display_agree() {
        let id = Identifier::generate().unwrap();
        let parsed: Identifier = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }
}
