use anyhow::Error;
use inhalt::digest::Digest;

/// Manifest-scoped existence view of a repository.
///
/// Implementations answer for manifests only, never raw blobs,
/// so signature or config content cannot masquerade as a
/// manifest.
pub trait ManifestsView {
    fn exists(&self, digest: &Digest) -> Result<bool, Error>;
}
