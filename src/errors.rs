use std::fmt;

use inhalt::digest::Digest;

/// A blob the store has no content for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBlobError {
    pub digest: Digest,
}

impl fmt::Display for UnknownBlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown blob {}", self.digest)
    }
}

impl std::error::Error for UnknownBlobError {}

/// A manifest revision the repository has no record of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownManifestError {
    pub digest: Digest,
}

impl fmt::Display for UnknownManifestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown manifest {}", self.digest)
    }
}

impl std::error::Error for UnknownManifestError {}

/// One broken reference found while verifying a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    UnknownManifest(Digest),
    UnknownBlob(Digest),
    Other(String),
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownManifest(digest) => {
                write!(f, "unknown manifest {}", digest)
            }
            Self::UnknownBlob(digest) => {
                write!(f, "unknown blob {}", digest)
            }
            Self::Other(message) => f.write_str(message),
        }
    }
}

/// Every broken reference found while verifying a manifest,
/// reported together so a caller sees the complete picture in
/// one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationError {
    pub failures: Vec<VerificationFailure>,
}

impl VerificationError {
    pub fn record(&mut self, failure: VerificationFailure) {
        self.failures.push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "manifest verification failed:")?;

        for failure in &self.failures {
            write!(f, " [{}]", failure)?;
        }

        Ok(())
    }
}

impl std::error::Error for VerificationError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_verification_error_lists_every_failure() {
        let first = Digest::from_bytes(b"first");
        let second = Digest::from_bytes(b"second");

        let mut error = VerificationError::default();
        assert!(error.is_empty());

        error.record(VerificationFailure::UnknownManifest(first.clone()));
        error.record(VerificationFailure::UnknownBlob(second.clone()));

        let rendered = error.to_string();

        assert!(rendered.contains(first.as_str()));
        assert!(rendered.contains(second.as_str()));
    }
}
