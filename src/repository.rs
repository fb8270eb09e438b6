use anyhow::Error;
use driver::StorageDriver;

use crate::{
    blobs::BlobStore,
    indexes::IndexStore,
    manifests::ManifestsView,
    paths,
    signatures::SignatureStore,
};

/// A named namespace within the registry. Manifest and signature
/// links live under the repository; blob content is shared
/// registry-wide.
pub struct Repository<'a, T: StorageDriver> {
    name: String,
    driver: &'a T,
}

impl<'a, T: StorageDriver> Repository<'a, T> {
    /// Binds `name` to the registry behind `driver`. The name is
    /// validated here once; every store handed out below trusts
    /// it.
    #[fehler::throws]
    pub fn new(driver: &'a T, name: &str) -> Self {
        paths::validate_repository_name(name)?;

        Self {
            name: name.into(),
            driver,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registry-wide content-addressable blob view.
    pub fn blobs(&self) -> BlobStore<'a, T> {
        BlobStore::new(self.driver)
    }

    /// Signatures linked to this repository's manifests.
    /// `manifests` is the manifest-scoped existence view used to
    /// vet signature content.
    pub fn signatures(
        &'a self,
        manifests: &'a dyn ManifestsView,
    ) -> SignatureStore<'a, T> {
        SignatureStore::new(self.driver, &self.name, manifests)
    }

    /// The manifest index ingestion pipeline for this
    /// repository.
    pub fn indexes(
        &'a self,
        manifests: &'a dyn ManifestsView,
    ) -> IndexStore<'a, T> {
        IndexStore::new(self.driver, &self.name, manifests)
    }
}
