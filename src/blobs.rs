use anyhow::Error;
use driver::{PathNotFoundError, StorageDriver};
use inhalt::{descriptor::Descriptor, digest::Digest};

use crate::{
    errors::UnknownBlobError,
    paths::{path_for, PathSpec},
};

/// Media type reported by [`BlobStore::stat`], which knows the
/// bytes but not what they claim to be.
const OCTET_STREAM: &str = "application/octet-stream";

/// Content-addressable view over the storage driver. Bytes land
/// under their own digest, so identical payloads target the
/// identical path and concurrent puts converge instead of
/// clobbering each other.
pub struct BlobStore<'a, T: StorageDriver> {
    driver: &'a T,
}

impl<'a, T: StorageDriver> BlobStore<'a, T> {
    pub fn new(driver: &'a T) -> Self {
        Self { driver }
    }

    /// Writes `content` and returns its descriptor. Putting the
    /// same bytes twice is a no-op.
    #[fehler::throws]
    pub fn put(&self, media_type: &str, content: &[u8]) -> Descriptor {
        let digest = Digest::from_bytes(content);
        let path = path_for(PathSpec::BlobData { digest: &digest })?;

        log::debug!("writing blob {} ({} bytes)", digest, content.len());

        self.driver.put_content(&path, content)?;

        Descriptor {
            media_type: media_type.into(),
            digest,
            size: content.len() as u64,
        }
    }

    /// Describes a stored blob without reading it. Absence is an
    /// [`UnknownBlobError`].
    #[fehler::throws]
    pub fn stat(&self, digest: &Digest) -> Descriptor {
        let path = path_for(PathSpec::BlobData { digest })?;

        match self.driver.stat(&path) {
            Ok(size) => Descriptor {
                media_type: OCTET_STREAM.into(),
                digest: digest.clone(),
                size,
            },
            Err(err)
                if err.downcast_ref::<PathNotFoundError>().is_some() =>
            {
                fehler::throw!(UnknownBlobError {
                    digest: digest.clone()
                })
            }
            Err(err) => fehler::throw!(err),
        }
    }

    /// Reads a stored blob back. Absence is an
    /// [`UnknownBlobError`].
    #[fehler::throws]
    pub fn get(&self, digest: &Digest) -> Vec<u8> {
        let path = path_for(PathSpec::BlobData { digest })?;

        match self.driver.get_content(&path) {
            Ok(content) => content,
            Err(err)
                if err.downcast_ref::<PathNotFoundError>().is_some() =>
            {
                fehler::throw!(UnknownBlobError {
                    digest: digest.clone()
                })
            }
            Err(err) => fehler::throw!(err),
        }
    }

    /// Whether the blob exists. Driver failures other than
    /// absence still propagate.
    #[fehler::throws]
    pub fn exists(&self, digest: &Digest) -> bool {
        match self.stat(digest) {
            Ok(_) => true,
            Err(err)
                if err.downcast_ref::<UnknownBlobError>().is_some() =>
            {
                false
            }
            Err(err) => fehler::throw!(err),
        }
    }
}

#[cfg(test)]
mod test {
    use driver::MemoryDriver;

    use super::*;

    #[test]
    fn test_round_trip() {
        let driver = MemoryDriver::new();
        let blobs = BlobStore::new(&driver);

        let descriptor = blobs
            .put("application/vnd.oci.image.config.v1+json", b"{}")
            .expect("failed to put blob");

        assert_eq!(descriptor.digest, Digest::from_bytes(b"{}"));
        assert_eq!(descriptor.size, 2);

        let content = blobs
            .get(&descriptor.digest)
            .expect("failed to get blob");
        assert_eq!(content, b"{}");

        let statted = blobs
            .stat(&descriptor.digest)
            .expect("failed to stat blob");
        assert_eq!(statted.size, 2);
        assert_eq!(statted.digest, descriptor.digest);

        assert!(blobs
            .exists(&descriptor.digest)
            .expect("failed to check blob existence"));
    }

    #[test]
    fn test_put_is_idempotent() {
        let driver = MemoryDriver::new();
        let blobs = BlobStore::new(&driver);

        let first = blobs
            .put("application/json", b"lorem ipsum")
            .expect("failed to put blob");
        let second = blobs
            .put("application/json", b"lorem ipsum")
            .expect("failed to put blob again");

        assert_eq!(first.digest, second.digest);
    }

    #[test]
    fn test_absent_blob_is_unknown() {
        let driver = MemoryDriver::new();
        let blobs = BlobStore::new(&driver);

        let digest = Digest::from_bytes(b"never stored");

        let err = blobs.stat(&digest).unwrap_err();
        let unknown = err
            .downcast_ref::<UnknownBlobError>()
            .expect("expected an unknown blob error");
        assert_eq!(unknown.digest, digest);

        assert!(blobs.get(&digest).is_err());
        assert!(!blobs
            .exists(&digest)
            .expect("failed to check blob existence"));
    }
}
