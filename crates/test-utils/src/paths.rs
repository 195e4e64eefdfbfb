//! Scratch directories for test output.

/// Prefix of every directory made by [`temp_test_dir`].
pub const TEST_DIR_PREFIX: &str = "iric-test-";

/// A fresh directory, removed when the returned guard is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(TEST_DIR_PREFIX)
        .tempdir()
        .expect("Failed to create temporary test directory")
}
