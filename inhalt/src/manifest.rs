use anyhow::Error;

use std::collections::{hash_map::Entry, HashMap};

use super::{
    descriptor::Descriptor,
    index::{self, DecodedIndex},
};

/// Behavior shared by every stored manifest kind.
pub trait Manifest {
    /// Descriptors of every object this manifest references.
    fn references(&self) -> Vec<Descriptor>;

    /// The media type to advertise plus the canonical bytes.
    fn payload(&self) -> (&str, &[u8]);
}

/// Parses one manifest kind out of its canonical bytes.
pub type ParseFn =
    fn(&[u8]) -> Result<(Box<dyn Manifest>, Descriptor), Error>;

/// Maps declared media types to their codecs. Built once at
/// startup and passed by reference wherever manifests are
/// decoded; there is no process-wide table behind it.
pub struct ManifestRegistry {
    codecs: HashMap<String, ParseFn>,
}

impl ManifestRegistry {
    pub fn new() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// A registry pre-populated with every codec this crate
    /// ships.
    #[fehler::throws]
    pub fn defaults() -> Self {
        let mut registry = Self::new();

        registry.register(index::MEDIA_TYPE, |content| {
            let decoded = DecodedIndex::parse(content)?;
            let descriptor = decoded.descriptor();

            Ok((Box::new(decoded) as Box<dyn Manifest>, descriptor))
        })?;

        registry
    }

    /// Registers `codec` for `media_type`. A media type can only
    /// be claimed once.
    #[fehler::throws]
    pub fn register(&mut self, media_type: &str, codec: ParseFn) {
        match self.codecs.entry(media_type.into()) {
            Entry::Occupied(_) => anyhow::bail!(
                "manifest codec for '{}' is already registered",
                media_type
            ),
            Entry::Vacant(slot) => {
                slot.insert(codec);
            }
        }
    }

    /// Dispatches `content` to the codec registered for
    /// `media_type`, yielding the decoded manifest and its
    /// descriptor.
    #[fehler::throws]
    pub fn parse(
        &self,
        media_type: &str,
        content: &[u8],
    ) -> (Box<dyn Manifest>, Descriptor) {
        let codec = self.codecs.get(media_type).ok_or_else(|| {
            anyhow::anyhow!(
                "unsupported manifest media type '{}'",
                media_type
            )
        })?;

        codec(content)?
    }
}

impl Default for ManifestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{index, Descriptor, ManifestRegistry};
    use crate::digest::Digest;

    #[test]
    fn test_dispatch() {
        let registry = ManifestRegistry::defaults()
            .expect("failed to build the default registry");

        let fixture = test_helpers::bytes_fixture!("index.json");

        let (manifest, descriptor) = registry
            .parse(index::MEDIA_TYPE, fixture)
            .expect("failed to parse through the registry");

        assert_eq!(descriptor.digest, Digest::from_bytes(fixture));
        assert_eq!(descriptor.media_type, index::MEDIA_TYPE);
        assert_eq!(manifest.references().len(), 2);
    }

    #[test]
    fn test_unknown_media_type() {
        let registry = ManifestRegistry::defaults()
            .expect("failed to build the default registry");

        let err = registry
            .parse("application/octet-stream", b"{}")
            .unwrap_err();

        assert!(err
            .to_string()
            .contains("unsupported manifest media type"));
    }

    #[test]
    fn test_duplicate_registration() {
        fn reject(
            _: &[u8],
        ) -> anyhow::Result<(
            Box<dyn super::Manifest>,
            Descriptor,
        )> {
            anyhow::bail!("unused")
        }

        let mut registry = ManifestRegistry::defaults()
            .expect("failed to build the default registry");

        let err = registry.register(index::MEDIA_TYPE, reject).unwrap_err();

        assert!(err.to_string().contains("already registered"));
    }
}
