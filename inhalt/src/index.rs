use anyhow::Error;
use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use super::{
    descriptor::Descriptor,
    digest::Digest,
    manifest::Manifest,
};

/// Media type this codec accepts.
pub const MEDIA_TYPE: &str = "application/vnd.oci.image.index.v2+json";

/// Advertised by [`DecodedIndex::payload`] when the payload does
/// not declare a media type itself.
const DEFAULT_MEDIA_TYPE: &str =
    "application/vnd.oci.image.index.v1+json";

/// The only manifest list schema version the store accepts.
pub const SCHEMA_VERSION: u32 = 2;

/// A manifest list augmented with a `config` descriptor: the
/// wire format of an image index whose referenced manifests
/// share one configuration blob.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ManifestIndex {
    #[serde(rename = "schemaVersion")]
    pub schema_version: u32,
    #[serde(rename = "mediaType")]
    pub media_type: Option<String>,
    pub manifests: Vec<PlatformManifest>,
    pub config: Descriptor,
    pub annotations: Option<HashMap<String, String>>,
}

/// One referenced manifest together with the platform it
/// targets.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlatformManifest {
    #[serde(flatten)]
    pub descriptor: Descriptor,
    pub platform: Option<Platform>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Platform {
    pub architecture: String,
    pub os: String,
    #[serde(rename = "os.version")]
    pub os_version: Option<String>,
    #[serde(rename = "os.features")]
    pub os_features: Option<Vec<String>>,
    pub variant: Option<String>,
}

/// A parsed index paired with the exact bytes it was parsed
/// from. The digest of an index is computed over those canonical
/// bytes, so they are retained verbatim and never re-encoded;
/// the pair is immutable after construction.
#[derive(Debug, Clone)]
pub struct DecodedIndex {
    index: ManifestIndex,
    canonical: Vec<u8>,
}

impl DecodedIndex {
    /// Deserializes `content`, keeping it as the canonical form.
    /// A declared media type other than [`MEDIA_TYPE`] is
    /// rejected here, before the index gets anywhere near
    /// storage.
    #[fehler::throws]
    pub fn parse(content: &[u8]) -> Self {
        let index: ManifestIndex = serde_json::from_slice(content)?;

        if let Some(media_type) = &index.media_type {
            if media_type != MEDIA_TYPE {
                anyhow::bail!(
                    "if present, mediaType in image index should be \
                     '{}' not '{}'",
                    MEDIA_TYPE,
                    media_type
                );
            }
        }

        Self {
            index,
            canonical: content.to_vec(),
        }
    }

    pub fn index(&self) -> &ManifestIndex {
        &self.index
    }

    /// Descriptors of every manifest the index references.
    pub fn references(&self) -> Vec<Descriptor> {
        self.index
            .manifests
            .iter()
            .map(|manifest| manifest.descriptor.clone())
            .collect()
    }

    /// The media type to advertise and the canonical bytes. The
    /// bytes are the original input; re-encoding them would move
    /// the content address.
    pub fn payload(&self) -> (&str, &[u8]) {
        let media_type = self
            .index
            .media_type
            .as_deref()
            .unwrap_or(DEFAULT_MEDIA_TYPE);

        (media_type, &self.canonical)
    }

    /// Content address of the canonical bytes.
    pub fn digest(&self) -> Digest {
        Digest::from_bytes(&self.canonical)
    }

    pub fn descriptor(&self) -> Descriptor {
        Descriptor {
            media_type: MEDIA_TYPE.into(),
            digest: self.digest(),
            size: self.canonical.len() as u64,
        }
    }
}

impl Manifest for DecodedIndex {
    fn references(&self) -> Vec<Descriptor> {
        DecodedIndex::references(self)
    }

    fn payload(&self) -> (&str, &[u8]) {
        DecodedIndex::payload(self)
    }
}
