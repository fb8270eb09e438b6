use std::{convert::TryFrom, fmt};

use anyhow::Error;
use ring::digest::{self, SHA256};
use serde::{Deserialize, Serialize};

/// `algorithm:hex` pairs accepted by [`Digest::parse`], with the
/// hex length each algorithm mandates.
const ALGORITHMS: [(&str, usize); 3] =
    [("sha256", 64), ("sha384", 96), ("sha512", 128)];

const CANONICAL_ALGORITHM: &str = "sha256";

/// Content address of a byte sequence, `algorithm:hex` on the
/// wire. Valid by construction: a `Digest` either came out of
/// [`Digest::parse`] or was computed from bytes, so downstream
/// code never re-validates it.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    /// Validates `input` as an `algorithm:hex` digest string.
    #[fehler::throws]
    pub fn parse(input: &str) -> Self {
        let mut parts = input.splitn(2, ':');
        let algorithm = parts.next().unwrap_or_default();
        let encoded = parts.next().unwrap_or_default();

        let expected_length = ALGORITHMS
            .iter()
            .find(|(name, _)| *name == algorithm)
            .map(|(_, length)| *length);

        match expected_length {
            None => {
                anyhow::bail!("unsupported digest algorithm in '{}'", input)
            }
            Some(length) if encoded.len() != length => {
                anyhow::bail!("invalid digest length in '{}'", input)
            }
            _ => {}
        }

        let hex_only = encoded
            .chars()
            .all(|x| x.is_ascii_digit() || ('a'..='f').contains(&x));

        if !hex_only {
            anyhow::bail!("invalid digest encoding in '{}'", input);
        }

        Self(input.into())
    }

    /// Content address of `bytes` under the canonical algorithm.
    /// Equal bytes always produce an equal digest.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let hash = digest::digest(&SHA256, bytes);

        Self(format!("{}:{}", CANONICAL_ALGORITHM, hex::encode(hash)))
    }

    pub fn algorithm(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    pub fn encoded(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Digest {
    type Error = Error;

    fn try_from(input: String) -> Result<Self, Error> {
        Self::parse(&input)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

#[cfg(test)]
mod tests {
    use super::Digest;

    #[test]
    fn test_from_bytes() {
        let digest = Digest::from_bytes(b"hello world");

        assert_eq!(
            digest.as_str(),
            "sha256:b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee\
             9088f7ace2efcde9"
        );
        assert_eq!(digest, Digest::from_bytes(b"hello world"));
        assert_eq!(digest.algorithm(), "sha256");
        assert_eq!(digest.encoded().len(), 64);
    }

    #[test]
    fn test_parse() {
        let input = Digest::from_bytes(b"lorem ipsum");

        let digest = Digest::parse(input.as_str())
            .expect("failed to parse a well-formed digest");

        assert_eq!(digest, input);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        let samples = [
            "",
            "sha256",
            "sha256:",
            "sha256:abc123",
            "md5:d41d8cd98f00b204e9800998ecf8427e",
            "sha256:Z94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee\
             9088f7ace2efcde9",
        ];

        for sample in &samples {
            assert!(
                Digest::parse(sample).is_err(),
                "expected '{}' to be rejected",
                sample
            );
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let digest = Digest::from_bytes(b"dolor sit amet");

        let serialized = serde_json::to_string(&digest)
            .expect("failed to serialize digest");

        assert_eq!(
            serialized,
            format!("\"{}\"", digest.as_str())
        );

        let deserialized: Digest = serde_json::from_str(&serialized)
            .expect("failed to deserialize digest");

        assert_eq!(deserialized, digest);

        let err = serde_json::from_str::<Digest>("\"sha256:nope\"");
        assert!(err.is_err());
    }
}
