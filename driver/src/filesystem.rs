use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Error;

use super::{PathNotFoundError, StorageDriver};

/// Stores objects as plain files under a root directory. Every
/// driver path maps to the same file across restarts.
pub struct FilesystemDriver {
    root: PathBuf,
}

impl FilesystemDriver {
    #[fehler::throws]
    pub fn new(root: impl AsRef<Path>) -> Self {
        fs::create_dir_all(root.as_ref())?;

        Self {
            root: root.as_ref().into(),
        }
    }

    fn target(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl StorageDriver for FilesystemDriver {
    #[fehler::throws]
    fn put_content(&self, path: &str, content: &[u8]) {
        let target = self.target(path);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        /* Scratch file + rename: readers never observe partial
         * writes, and concurrent writers of identical content
         * converge on the same final bytes. */
        let scratch = target.with_extension("scratch");
        fs::write(&scratch, content)?;
        fs::rename(&scratch, &target)?;
    }

    #[fehler::throws]
    fn get_content(&self, path: &str) -> Vec<u8> {
        match fs::read(self.target(path)) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fehler::throw!(PathNotFoundError { path: path.into() })
            }
            result => result?,
        }
    }

    #[fehler::throws]
    fn stat(&self, path: &str) -> u64 {
        match fs::metadata(self.target(path)) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fehler::throw!(PathNotFoundError { path: path.into() })
            }
            result => result?.len(),
        }
    }

    #[fehler::throws]
    fn list(&self, path: &str) -> Vec<String> {
        let entries = match fs::read_dir(self.target(path)) {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fehler::throw!(PathNotFoundError { path: path.into() })
            }
            result => result?,
        };

        let mut children = vec![];

        for entry in entries {
            children.push(entry?.file_name().to_string_lossy().into_owned());
        }

        children
    }
}
