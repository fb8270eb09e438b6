//! Helpers shared by the crates' test suites.

/// Reads a fixture from the crate's `test/resources` directory
/// as a string.
#[macro_export]
macro_rules! fixture {
    ($file:expr) => {
        include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/test/resources/",
            $file
        ))
    };
}

/// Reads a fixture from the crate's `test/resources` directory
/// as raw bytes.
#[macro_export]
macro_rules! bytes_fixture {
    ($file:expr) => {
        include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/test/resources/",
            $file
        ))
    };
}
