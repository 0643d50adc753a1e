//! Working-root containment for file and archive-entry paths
//!
//! A candidate is either resolved to a location inside the root or
//! rejected; it is never silently re-rooted.
//!
//! - Relative candidates are joined to the root; `..` may not climb above it
//! - Absolute candidates must already have the root as prefix
//! - The deepest existing ancestor is canonicalized and re-checked, so a
//!   symlink cannot lead a read or a create out of the root
//! - Archive entries use `/` separators and must stay inside the archive

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};

/// A path that would leave its containment boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityError {
    #[error("path '{path}' escapes working root '{root}'")]
    EscapesRoot { path: String, root: String },

    #[error("absolute path '{path}' is outside working root '{root}'")]
    OutsideRoot { path: String, root: String },

    #[error("archive entry '{entry}' is not a relative path inside the archive")]
    InvalidArchiveEntry { entry: String },
}

/// A path proven to lie inside the working root.
///
/// Not `Clone`: each resolution backs exactly one open or staged write.
#[derive(Debug)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub(crate) fn open(self) -> io::Result<File> {
        File::open(&self.0)
    }

    /// Creates a temporary sibling of the target; nothing appears at the
    /// target itself until `StagedFile::commit`.
    pub(crate) fn stage(self) -> io::Result<StagedFile> {
        let parent = match self.0.parent() {
            Some(parent) => parent.to_path_buf(),
            None => return Err(io::Error::new(io::ErrorKind::InvalidInput, "path has no parent")),
        };
        fs::create_dir_all(&parent)?;

        let name = self
            .0
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = parent.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
        let file = OpenOptions::new().write(true).create_new(true).open(&temp)?;

        Ok(StagedFile {
            temp,
            target: self.0,
            file,
            committed: false,
        })
    }
}

/// A file written beside its destination and renamed into place on commit.
///
/// Dropped without a commit, the temporary file is removed, so a failed
/// write leaves neither a partial output nor a stray temp file.
#[derive(Debug)]
pub(crate) struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
    file: File,
    committed: bool,
}

impl StagedFile {
    pub(crate) fn file(&mut self) -> &mut File {
        &mut self.file
    }

    /// Syncs the temporary file and renames it over the target.
    pub(crate) fn commit(mut self) -> io::Result<PathBuf> {
        self.file.sync_all()?;
        fs::rename(&self.temp, &self.target)?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp);
        }
    }
}

/// Resolves candidate paths against a working root
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for `root`.
    ///
    /// An existing root is canonicalized so later prefix checks compare
    /// like with like.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = fs::canonicalize(&root).unwrap_or_else(|_| lexical_normalize(&root));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `candidate` to a path inside the root.
    ///
    /// # Errors
    ///
    /// Returns `SecurityError` if the candidate, after normalization and
    /// canonicalization of its deepest existing ancestor, is not inside the
    /// root.
    pub fn resolve(&self, candidate: impl AsRef<Path>) -> Result<ResolvedPath, SecurityError> {
        let candidate = candidate.as_ref();
        let result = self.resolve_inner(candidate);
        if let Err(e) = &result {
            let path = candidate.display().to_string();
            let reason = e.to_string();
            log_event_with_fields(
                Event::PathRejected,
                &[("path", path.as_str()), ("reason", reason.as_str())],
            );
        }
        result
    }

    fn resolve_inner(&self, candidate: &Path) -> Result<ResolvedPath, SecurityError> {
        let escapes = || SecurityError::EscapesRoot {
            path: candidate.display().to_string(),
            root: self.root.display().to_string(),
        };

        let joined = if candidate.is_absolute() {
            let normalized = lexical_normalize(candidate);
            if !normalized.starts_with(&self.root) {
                return Err(SecurityError::OutsideRoot {
                    path: candidate.display().to_string(),
                    root: self.root.display().to_string(),
                });
            }
            normalized
        } else {
            let mut stack: Vec<&std::ffi::OsStr> = Vec::new();
            for component in candidate.components() {
                match component {
                    Component::Normal(part) => stack.push(part),
                    Component::CurDir => {}
                    Component::ParentDir => {
                        if stack.pop().is_none() {
                            return Err(escapes());
                        }
                    }
                    Component::RootDir | Component::Prefix(_) => return Err(escapes()),
                }
            }
            let mut joined = self.root.clone();
            joined.extend(stack);
            joined
        };

        // Symlinks inside the root may point outside it, at the target or at
        // any directory above a target not created yet
        let mut existing = joined.as_path();
        let mut pending = Vec::new();
        while existing != self.root && fs::symlink_metadata(existing).is_err() {
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    pending.push(name);
                    existing = parent;
                }
                _ => break,
            }
        }

        // A dangling link fails to canonicalize and is rejected with the rest
        let mut resolved = if existing == self.root {
            self.root.clone()
        } else {
            fs::canonicalize(existing).map_err(|_| escapes())?
        };
        if !resolved.starts_with(&self.root) {
            return Err(escapes());
        }
        resolved.extend(pending.iter().rev());

        Ok(ResolvedPath(resolved))
    }

    /// Normalizes an archive entry name to a `/`-separated relative path.
    ///
    /// Backslashes are treated as separators, `.` segments dropped and `..`
    /// segments may not climb out of the archive.
    pub fn archive_entry(entry: &str) -> Result<String, SecurityError> {
        let invalid = || SecurityError::InvalidArchiveEntry {
            entry: entry.to_string(),
        };

        let unified = entry.replace('\\', "/");
        let bytes = unified.as_bytes();
        let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
        if unified.starts_with('/') || has_drive {
            return Err(invalid());
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in unified.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(invalid());
                    }
                }
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Err(invalid());
        }
        Ok(segments.join("/"))
    }
}

/// Resolves `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
