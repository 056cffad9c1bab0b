//! Scratch directories for tests
//!
//! `TMPDIR` may be relative (e.g. `tmp`), which would place scratch trees
//! under the working directory; fall back to `/tmp` then.

use std::env;
use std::path::PathBuf;

/// Absolute directory to create scratch directories in
pub fn temp_dir_base() -> PathBuf {
    let dir = env::temp_dir();
    if dir.is_absolute() {
        dir
    } else {
        PathBuf::from("/tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }
}
