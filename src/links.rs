use anyhow::Error;
use driver::{PathNotFoundError, StorageDriver};
use inhalt::digest::Digest;

/// Resolves the marker path recording that a target digest is
/// linked.
type LinkPathFn<'a> = Box<dyn Fn(&Digest) -> Result<String, Error> + 'a>;

/// One engine for every link relation. A relation configures the
/// engine with its marker-path strategy and its enumeration
/// root; the engine never touches a path those two did not
/// produce. Links are markers only: creating or removing one
/// never affects the blob it points at.
pub struct LinkedStore<'a, T: StorageDriver> {
    driver: &'a T,
    root_path: String,
    link_path: LinkPathFn<'a>,
}

impl<'a, T: StorageDriver> LinkedStore<'a, T> {
    pub fn new(
        driver: &'a T,
        root_path: String,
        link_path: impl Fn(&Digest) -> Result<String, Error> + 'a,
    ) -> Self {
        Self {
            driver,
            root_path,
            link_path: Box::new(link_path),
        }
    }

    /// Records a link to `target`. Linking the same target twice
    /// is a no-op, not an error.
    #[fehler::throws]
    pub fn link(&self, target: &Digest) {
        let path = (self.link_path)(target)?;

        log::debug!("linking {} at {}", target, path);

        self.driver.put_content(&path, target.as_str().as_bytes())?;
    }

    /// Whether a link to `target` exists under this relation.
    /// Only absence maps to `false`; other driver failures
    /// propagate.
    #[fehler::throws]
    pub fn stat(&self, target: &Digest) -> bool {
        let path = (self.link_path)(target)?;

        match self.driver.stat(&path) {
            Ok(_) => true,
            Err(err)
                if err.downcast_ref::<PathNotFoundError>().is_some() =>
            {
                false
            }
            Err(err) => fehler::throw!(err),
        }
    }

    /// Invokes `visit` with every linked digest, in whatever
    /// order the driver enumerates. A relation root that was
    /// never written reads as zero links — this is the single
    /// place that normalization happens, so relation consumers
    /// stay free of absent-path handling. Every other failure,
    /// including a visitor error, propagates verbatim.
    #[fehler::throws]
    pub fn enumerate(
        &self,
        mut visit: impl FnMut(Digest) -> Result<(), Error>,
    ) {
        let algorithms = match self.driver.list(&self.root_path) {
            Err(err)
                if err.downcast_ref::<PathNotFoundError>().is_some() =>
            {
                return;
            }
            result => result?,
        };

        for algorithm in algorithms {
            let algorithm_path =
                format!("{}/{}", self.root_path, algorithm);

            for entry in self.driver.list(&algorithm_path)? {
                let link_path =
                    format!("{}/{}/link", algorithm_path, entry);

                let content = self.driver.get_content(&link_path)?;
                let target =
                    Digest::parse(std::str::from_utf8(&content)?)?;

                visit(target)?;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use driver::MemoryDriver;

    use super::*;
    use crate::paths::{path_for, PathSpec};

    fn store<'a>(
        driver: &'a MemoryDriver,
        revision: &'a Digest,
    ) -> LinkedStore<'a, MemoryDriver> {
        let root = path_for(PathSpec::ManifestSignaturesRoot {
            name: "library/nginx",
            revision,
        })
        .expect("failed to resolve the signatures root");

        LinkedStore::new(driver, root, move |signature| {
            path_for(PathSpec::ManifestSignatureLink {
                name: "library/nginx",
                revision,
                signature,
            })
        })
    }

    fn collect(store: &LinkedStore<'_, MemoryDriver>) -> Vec<Digest> {
        let mut linked = vec![];

        store
            .enumerate(|target| {
                linked.push(target);
                Ok(())
            })
            .expect("failed to enumerate links");

        linked
    }

    #[test]
    fn test_absent_root_reads_as_zero_links() {
        let driver = MemoryDriver::new();
        let revision = Digest::from_bytes(b"manifest");

        let store = store(&driver, &revision);

        assert!(collect(&store).is_empty());
    }

    #[test]
    fn test_link_stat_enumerate() {
        let driver = MemoryDriver::new();
        let revision = Digest::from_bytes(b"manifest");
        let first = Digest::from_bytes(b"first signature");
        let second = Digest::from_bytes(b"second signature");

        let store = store(&driver, &revision);

        assert!(!store.stat(&first).expect("failed to stat link"));

        store.link(&first).expect("failed to link");
        store.link(&second).expect("failed to link");

        assert!(store.stat(&first).expect("failed to stat link"));
        assert!(store.stat(&second).expect("failed to stat link"));

        let mut linked = collect(&store);
        linked.sort();

        let mut expected = vec![first, second];
        expected.sort();

        assert_eq!(linked, expected);
    }

    #[test]
    fn test_relinking_is_a_no_op() {
        let driver = MemoryDriver::new();
        let revision = Digest::from_bytes(b"manifest");
        let signature = Digest::from_bytes(b"signature");

        let store = store(&driver, &revision);

        store.link(&signature).expect("failed to link");
        store.link(&signature).expect("failed to relink");

        assert_eq!(collect(&store), vec![signature]);
    }

    #[test]
    fn test_visitor_errors_propagate() {
        let driver = MemoryDriver::new();
        let revision = Digest::from_bytes(b"manifest");
        let signature = Digest::from_bytes(b"signature");

        let store = store(&driver, &revision);
        store.link(&signature).expect("failed to link");

        let err = store
            .enumerate(|_| anyhow::bail!("visitor declined"))
            .unwrap_err();

        assert!(err.to_string().contains("visitor declined"));
    }
}
