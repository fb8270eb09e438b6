use anyhow::Error;
use driver::StorageDriver;
use inhalt::digest::Digest;
use serde::{Deserialize, Serialize};

use crate::{
    errors::UnknownManifestError,
    links::LinkedStore,
    manifests::ManifestsView,
    paths::{path_for, PathSpec},
};

/// Signatures linked to the manifest revisions of one
/// repository.
pub struct SignatureStore<'a, T: StorageDriver> {
    driver: &'a T,
    repository: &'a str,
    manifests: &'a dyn ManifestsView,
}

impl<'a, T: StorageDriver> SignatureStore<'a, T> {
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

    /// Every signature digest linked to `manifest`. A manifest
    /// nothing was ever linked to reads as an empty list, not an
    /// error.
    #[fehler::throws]
    pub fn all(&self, manifest: &Digest) -> Vec<Digest> {
        let mut signatures = vec![];

        self.linked_store(manifest)?.enumerate(|signature| {
            signatures.push(signature);
            Ok(())
        })?;

        signatures
    }

    /// Links `signature` to `manifest`. The signature content
    /// must already be stored as a manifest; a dangling link is
    /// never created. Linking the same signature twice is a
    /// no-op.
    #[fehler::throws]
    pub fn link(&self, manifest: &Digest, signature: &Digest) {
        if !self.manifests.exists(signature)? {
            fehler::throw!(UnknownManifestError {
                digest: signature.clone()
            });
        }

        self.linked_store(manifest)?.link(signature)?;
    }

    /// Signature links for one revision share the common link
    /// engine, so every relation is managed through the same
    /// code path.
    #[fehler::throws]
    fn linked_store(
        &self,
        manifest: &Digest,
    ) -> LinkedStore<'a, T> {
        let root = path_for(PathSpec::ManifestSignaturesRoot {
            name: self.repository,
            revision: manifest,
        })?;

        let repository = self.repository;
        let revision = manifest.clone();

        LinkedStore::new(self.driver, root, move |signature| {
            path_for(PathSpec::ManifestSignatureLink {
                name: repository,
                revision: &revision,
                signature,
            })
        })
    }
}

/// Wire shape of a signature enumeration response. `signatures`
/// is always present, `[]` when nothing is linked.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct SignaturesResponse {
    pub digest: Digest,
    pub signatures: Vec<Digest>,
}
