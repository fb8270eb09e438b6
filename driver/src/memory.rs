use std::{
    collections::{BTreeMap, BTreeSet},
    sync::RwLock,
};

use anyhow::Error;

use super::{PathNotFoundError, StorageDriver};

/// Keeps objects in process memory. Directories exist only as
/// key prefixes, the same way an object store presents them.
/// Suited to tests and ephemeral registries.
#[derive(Default)]
pub struct MemoryDriver {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

impl StorageDriver for MemoryDriver {
    #[fehler::throws]
    fn put_content(&self, path: &str, content: &[u8]) {
        let mut objects =
            self.objects.write().unwrap_or_else(|err| err.into_inner());

        objects.insert(normalize(path), content.to_vec());
    }

    #[fehler::throws]
    fn get_content(&self, path: &str) -> Vec<u8> {
        let objects =
            self.objects.read().unwrap_or_else(|err| err.into_inner());

        match objects.get(&normalize(path)) {
            Some(content) => content.clone(),
            None => {
                fehler::throw!(PathNotFoundError { path: path.into() })
            }
        }
    }

    #[fehler::throws]
    fn stat(&self, path: &str) -> u64 {
        let objects =
            self.objects.read().unwrap_or_else(|err| err.into_inner());

        match objects.get(&normalize(path)) {
            Some(content) => content.len() as u64,
            None => {
                fehler::throw!(PathNotFoundError { path: path.into() })
            }
        }
    }

    #[fehler::throws]
    fn list(&self, path: &str) -> Vec<String> {
        let objects =
            self.objects.read().unwrap_or_else(|err| err.into_inner());

        let prefix = format!("{}/", normalize(path));

        let children: BTreeSet<_> = objects
            .keys()
            .filter_map(|key| key.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(String::from)
            .collect();

        if children.is_empty() {
            fehler::throw!(PathNotFoundError { path: path.into() });
        }

        children.into_iter().collect()
    }
}
