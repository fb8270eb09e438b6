mod filesystem;
mod memory;

use std::fmt;

use anyhow::Error;

pub use filesystem::FilesystemDriver;
pub use memory::MemoryDriver;

/// Raised when a path has nothing stored behind it.
///
/// Callers that want to treat absence as a normal condition
/// recover this type with [`anyhow::Error::downcast_ref`]; any
/// other driver failure stays opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNotFoundError {
    pub path: String,
}

impl fmt::Display for PathNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path not found: {}", self.path)
    }
}

impl std::error::Error for PathNotFoundError {}

/// Flat byte-addressable storage with directory-style
/// enumeration. Paths are `/`-separated, rooted at the driver's
/// namespace; the driver neither interprets them nor offers
/// anything transactional on top.
pub trait StorageDriver {
    /// Creates or overwrites the object at `path`.
    fn put_content(&self, path: &str, content: &[u8]) -> Result<(), Error>;

    /// Reads the object at `path`. Absence is a
    /// [`PathNotFoundError`].
    fn get_content(&self, path: &str) -> Result<Vec<u8>, Error>;

    /// Byte size of the object at `path`. Absence is a
    /// [`PathNotFoundError`].
    fn stat(&self, path: &str) -> Result<u64, Error>;

    /// Names of the immediate children under `path`. An absent
    /// prefix is a [`PathNotFoundError`]; ordering is whatever
    /// the engine yields.
    fn list(&self, path: &str) -> Result<Vec<String>, Error>;
}
