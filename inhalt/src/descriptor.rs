use serde::{Deserialize, Serialize};

use super::digest::Digest;

/// Describes stored content without containing it. Immutable
/// once created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub digest: Digest,
    pub size: u64,
}
