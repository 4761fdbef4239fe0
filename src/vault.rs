//! Read access to the notes vault
//!
//! Paths are vault-relative, written with forward slashes the way notes
//! reference each other (`0_DASHBOARDS/ZEUS_CONSTITUTION.md`).
//!
//! Every read is confined to the vault root. A path that resolves outside
//! it (through `..`, an absolute path or a symlink) is refused.

use crate::core::error::{GemHookError, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Looks up documents by vault-relative path
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when no document exists at `path`, otherwise its full text verbatim
    fn lookup(&self, path: &str) -> Result<Option<String>>;
}

/// A vault backed by a directory on disk
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a vault-relative path against the vault root
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Read a note the user has open; a missing note is an error here
    pub fn read_note(&self, path: &Path) -> Result<String> {
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        Ok(fs::read_to_string(self.confine(&full)?)?)
    }

    /// Canonical form of `full`, or `PermissionDenied` when it lies outside the root
    fn confine(&self, full: &Path) -> io::Result<PathBuf> {
        let root = fs::canonicalize(&self.root)?;
        let real = fs::canonicalize(full)?;
        if real.starts_with(&root) {
            Ok(real)
        } else {
            tracing::warn!(path = %full.display(), "refusing path outside the vault");
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "path is outside the vault",
            ))
        }
    }
}

impl DocumentStore for FsVault {
    fn lookup(&self, path: &str) -> Result<Option<String>> {
        let full = self.resolve(path);
        if !full.is_file() {
            tracing::debug!(path, "context document not found");
            return Ok(None);
        }

        // The file can vanish or become unreadable between the check and the read.
        self.confine(&full)
            .and_then(fs::read_to_string)
            .map(Some)
            .map_err(|source| GemHookError::ContextRead {
                path: path.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::new(dir.path());
        assert!(vault.lookup("0_DASHBOARDS/ZEUS_CONSTITUTION.md").unwrap().is_none());
    }

    #[test]
    fn test_lookup_returns_text_verbatim() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("0_DASHBOARDS")).unwrap();
        let text = "  persona X\n\twith whitespace  \n";
        fs::write(dir.path().join("0_DASHBOARDS/ZEUS_CONSTITUTION.md"), text).unwrap();

        let vault = FsVault::new(dir.path());
        assert_eq!(
            vault.lookup("0_DASHBOARDS/ZEUS_CONSTITUTION.md").unwrap(),
            Some(text.to_string())
        );
        assert_eq!(
            vault.lookup("/0_DASHBOARDS/ZEUS_CONSTITUTION.md").unwrap(),
            Some(text.to_string())
        );
    }

    #[test]
    fn test_directory_is_not_a_document() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("notes")).unwrap();
        let vault = FsVault::new(dir.path());
        assert!(vault.lookup("notes").unwrap().is_none());
    }

    #[test]
    fn test_unreadable_document_is_context_read_error() {
        let dir = TempDir::new().unwrap();
        // Invalid UTF-8 exists but cannot be read as text.
        fs::write(dir.path().join("ctx.md"), [0xff, 0xfe, 0xfd]).unwrap();
        let vault = FsVault::new(dir.path());
        assert!(matches!(
            vault.lookup("ctx.md"),
            Err(GemHookError::ContextRead { .. })
        ));
    }

    #[test]
    fn test_read_note_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let vault = FsVault::new(dir.path());
        assert!(vault.read_note(Path::new("nope.md")).is_err());
    }

    /// A vault at `<tmp>/vault` with a readable file beside it at `<tmp>/secret.md`
    fn vault_with_neighbour() -> (TempDir, FsVault) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("vault/notes")).unwrap();
        fs::write(dir.path().join("vault/notes/today.md"), "inside").unwrap();
        fs::write(dir.path().join("secret.md"), "outside").unwrap();
        let vault = FsVault::new(dir.path().join("vault"));
        (dir, vault)
    }

    #[test]
    fn test_lookup_refuses_parent_dir_escape() {
        let (_dir, vault) = vault_with_neighbour();

        match vault.lookup("../secret.md") {
            Err(GemHookError::ContextRead { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected refusal, got {:?}", other),
        }
        assert!(vault.lookup("../missing.md").unwrap().is_none());
        assert_eq!(
            vault.lookup("notes/../notes/today.md").unwrap().as_deref(),
            Some("inside")
        );
    }

    #[test]
    fn test_read_note_refuses_paths_outside_vault() {
        let (dir, vault) = vault_with_neighbour();

        assert!(vault.read_note(Path::new("../secret.md")).is_err());
        assert!(vault.read_note(&dir.path().join("secret.md")).is_err());
        assert_eq!(
            vault
                .read_note(&dir.path().join("vault/notes/today.md"))
                .unwrap(),
            "inside"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_out_of_vault_is_refused() {
        let (dir, vault) = vault_with_neighbour();
        std::os::unix::fs::symlink(
            dir.path().join("secret.md"),
            dir.path().join("vault/link.md"),
        )
        .unwrap();

        assert!(vault.lookup("link.md").is_err());
        assert!(vault.read_note(Path::new("link.md")).is_err());
    }
}
