use anyhow::Error;
use driver::StorageDriver;
use inhalt::{
    digest::Digest,
    index::{DecodedIndex, SCHEMA_VERSION},
};

use crate::{
    blobs::BlobStore,
    errors::{
        UnknownBlobError, VerificationError, VerificationFailure,
    },
    links::LinkedStore,
    manifests::ManifestsView,
    paths::{path_for, PathSpec},
};

/// Accepts manifest indexes into a repository: verifies their
/// cross-references, persists the canonical bytes, and records
/// referrer metadata for every referenced manifest.
pub struct IndexStore<'a, T: StorageDriver> {
    driver: &'a T,
    repository: &'a str,
    manifests: &'a dyn ManifestsView,
}

impl<'a, T: StorageDriver> IndexStore<'a, T> {
    pub(crate) fn new(
        driver: &'a T,
        repository: &'a str,
        manifests: &'a dyn ManifestsView,
    ) -> Self {
        Self {
            driver,
            repository,
            manifests,
        }
    }

    /// Stores `index` and returns the digest of its canonical
    /// bytes.
    ///
    /// Unless `skip_dependency_verification` is set, every
    /// referenced manifest and the config blob must already be
    /// stored; broken references are collected into one
    /// [`VerificationError`] rather than reported one at a time.
    /// Referrer links are recorded after the payload is
    /// persisted; a linking failure is reported without rolling
    /// the payload back, and retrying the put re-verifies and
    /// re-links idempotently.
    #[fehler::throws]
    pub fn put(
        &self,
        index: &DecodedIndex,
        skip_dependency_verification: bool,
    ) -> Digest {
        log::debug!(
            "putting manifest index into '{}'",
            self.repository
        );

        self.verify(index, skip_dependency_verification)?;

        let (media_type, payload) = index.payload();
        let revision =
            BlobStore::new(self.driver).put(media_type, payload)?;

        self.link_referrer_metadata(index)?;

        revision.digest
    }

    /// The store only accepts content it can vouch for: a
    /// supported schema version and, unless skipped, references
    /// that all resolve. Trust policies beyond that are the
    /// consumers' business.
    #[fehler::throws]
    fn verify(
        &self,
        index: &DecodedIndex,
        skip_dependency_verification: bool,
    ) {
        let schema_version = index.index().schema_version;

        if schema_version != SCHEMA_VERSION {
            anyhow::bail!(
                "unrecognized manifest list schema version {}",
                schema_version
            );
        }

        if skip_dependency_verification {
            return;
        }

        let mut verification = VerificationError::default();

        for reference in index.references() {
            match self.manifests.exists(&reference.digest) {
                Ok(true) => {}
                Ok(false) => verification.record(
                    VerificationFailure::UnknownManifest(
                        reference.digest,
                    ),
                ),
                Err(err) => {
                    verification.record(VerificationFailure::Other(
                        err.to_string(),
                    ));
                    verification.record(
                        VerificationFailure::UnknownManifest(
                            reference.digest,
                        ),
                    );
                }
            }
        }

        let config = &index.index().config;

        match BlobStore::new(self.driver).stat(&config.digest) {
            Ok(_) => {}
            Err(err)
                if err.downcast_ref::<UnknownBlobError>().is_some() =>
            {
                verification.record(VerificationFailure::UnknownBlob(
                    config.digest.clone(),
                ));
            }
            Err(err) => verification
                .record(VerificationFailure::Other(err.to_string())),
        }

        if !verification.is_empty() {
            fehler::throw!(verification);
        }
    }

    /// Records, for every manifest the index references, that
    /// the config blob refers to it under the config's media
    /// type.
    #[fehler::throws]
    fn link_referrer_metadata(&self, index: &DecodedIndex) {
        let config = &index.index().config;

        for reference in index.references() {
            self.referrer_metadata_store(
                reference.digest,
                &config.media_type,
            )?
            .link(&config.digest)?;
        }
    }

    /// The referrer relation rides the common link engine, keyed
    /// by the referenced manifest and tagged with the metadata
    /// media type.
    #[fehler::throws]
    fn referrer_metadata_store(
        &self,
        manifest: Digest,
        media_type: &str,
    ) -> LinkedStore<'a, T> {
        let root = path_for(PathSpec::ReferrerMetadataRoot {
            name: self.repository,
            revision: &manifest,
            media_type,
        })?;

        let repository = self.repository;
        let media_type = media_type.to_string();

        LinkedStore::new(self.driver, root, move |config| {
            path_for(PathSpec::ReferrerMetadataLink {
                name: repository,
                revision: &manifest,
                media_type: &media_type,
                config,
            })
        })
    }
}
