//! Slash-separated tree paths and their native, canonical forms

use std::io;
use std::path::{Component, Path, PathBuf};

/// A path inside a tree, written with `/` separators.
///
/// Tree definitions always use forward slashes regardless of platform.
/// A leading slash does not make the path absolute: every `TreePath`
/// is relative to the root of the tree it is applied to. Empty segments
/// (from leading, trailing or doubled slashes) are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePath {
    segments: Vec<String>,
}

impl TreePath {
    pub fn new(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_owned)
            .collect();
        Self { segments }
    }

    /// Path segments in order, without separators.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Join onto `root` using the platform's native separator.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        native.extend(&self.segments);
        native
    }
}

impl From<&str> for TreePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Canonicalize `path`, resolving symlinks in the part that exists.
///
/// Unlike [`std::fs::canonicalize`], the path does not need to exist:
/// the longest existing ancestor is canonicalized and the missing tail
/// is appended to it. `..` in the missing tail removes the previous
/// segment, like `realpath` does. Uses `dunce` so Windows results stay
/// free of verbatim `\\?\` prefixes.
pub fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut missing: Vec<Component<'_>> = Vec::new();

    loop {
        match dunce::canonicalize(existing) {
            Ok(mut resolved) => {
                for component in missing.iter().rev() {
                    match component {
                        Component::ParentDir => {
                            resolved.pop();
                        }
                        other => resolved.push(other),
                    }
                }
                return Ok(resolved);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let last = existing.components().next_back();
                match (existing.parent(), last) {
                    (Some(parent), Some(last @ (Component::Normal(_) | Component::ParentDir))) => {
                        missing.push(last);
                        existing = if parent.as_os_str().is_empty() {
                            Path::new(".")
                        } else {
                            parent
                        };
                    }
                    _ => return Err(err),
                }
            }
            Err(err) => return Err(err),
        }
    }
}
