//! Content-addressable artifact store of a container-image
//! registry. Persists immutable, digest-keyed objects through a
//! flat storage driver and maintains mutable relationship links
//! between them: signatures attached to manifest revisions and
//! referrer metadata recorded when a manifest index is accepted.

pub mod blobs;
pub mod errors;
pub mod indexes;
pub mod links;
pub mod manifests;
pub mod paths;
pub mod repository;
pub mod signatures;
