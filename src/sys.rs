//! # System functions
//!
//! Convenience wrappers around common system-level operations that take an
//! opinionated stance on how to interpret errors.
use std::env;
use std::path::{Path, PathBuf};

pub trait AsString {
    fn as_string(&self) -> String;
}

impl AsString for PathBuf {
    fn as_string(&self) -> String {
        self.display().to_string()
    }
}

impl AsString for Path {
    fn as_string(&self) -> String {
        self.display().to_string()
    }
}

/// Returns the `HOME` path as derived from the environment, or `"."` if `HOME` is
/// not set.
pub fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns a lexicographically-sorted list of files and directories contained
/// in `dir`, quietly discarding any I/O errors when reading the directory.
pub fn list_dir<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut entries = match dir.as_ref().read_dir() {
        Ok(entries) => entries
            .flat_map(|entry| entry.ok().map(|e| e.path()))
            .collect(),
        Err(_) => vec![],
    };
    entries.sort();
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn list_sorted_entries() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.toml", "a.toml", "c.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let names = list_dir(dir.path())
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.toml", "b.toml", "c.txt"]);
    }

    #[test]
    fn list_missing_dir() {
        assert!(list_dir("/no/such/hydro/dir").is_empty());
    }
}
