//! [`FilesystemTree`]: an owned root directory populated from tree definitions

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::{MkOptions, TreeConfig};
use crate::item::TreeItem;
use crate::manifest::TreeManifest;
use crate::path::{TreePath, canonicalize_lenient};
use crate::{Error, Result, io};

/// Prefix of temporary root directories.
pub const DEFAULT_PREFIX: &str = "filesystem-tree-";

/// A directory tree on disk, owned by this value.
///
/// The root is either a fresh temporary directory or a path supplied by the
/// caller. It is only deleted by an explicit [`FilesystemTree::remove`] (or
/// by [`FilesystemTree::scoped`] / [`TreeGuard`] on a clean exit). Dropping
/// the tree leaves everything on disk.
///
/// # Example
///
/// ```
/// use filesystem_tree::{FilesystemTree, tree};
///
/// let fs = FilesystemTree::with_items(tree![
///     "some/dir",
///     ("some/dir/file.txt", "Greetings, program!"),
/// ])?;
/// assert!(fs.resolve("some/dir")?.is_dir());
/// assert_eq!(fs.read_to_string("some/dir/file.txt")?, "Greetings, program!");
/// fs.remove()?;
/// # Ok::<(), filesystem_tree::Error>(())
/// ```
#[derive(Debug)]
pub struct FilesystemTree {
    root: PathBuf,
    config: TreeConfig,
}

/// Construction options for [`FilesystemTree`].
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    root: Option<PathBuf>,
    prefix: Option<String>,
    should_dedent: Option<bool>,
    encoding: Option<String>,
}

impl TreeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing path as the root instead of a temporary directory.
    ///
    /// The path is used as given and is not created up front.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Name prefix for the temporary root. Ignored when a root is supplied.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn should_dedent(mut self, should_dedent: bool) -> Self {
        self.should_dedent = Some(should_dedent);
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Allocate the root without writing anything.
    pub fn build(self) -> Result<FilesystemTree> {
        self.build_with(std::iter::empty::<TreeItem>())
    }

    /// Allocate the root and run `items` through [`FilesystemTree::mk`].
    ///
    /// If an item fails, the error is returned and whatever was already
    /// created (including a temporary root) stays on disk.
    pub fn build_with<I>(self, items: I) -> Result<FilesystemTree>
    where
        I: IntoIterator,
        I::Item: Into<TreeItem>,
    {
        let defaults = TreeConfig::default();
        let config = TreeConfig {
            should_dedent: self.should_dedent.unwrap_or(defaults.should_dedent),
            encoding: self.encoding.unwrap_or(defaults.encoding),
        };

        let root = match self.root {
            Some(root) => root,
            None => allocate_root(self.prefix.as_deref().unwrap_or(DEFAULT_PREFIX))?,
        };

        let tree = FilesystemTree { root, config };
        tree.mk(items)?;
        Ok(tree)
    }
}

fn allocate_root(prefix: &str) -> Result<PathBuf> {
    let temp = tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .map_err(|e| Error::io(std::env::temp_dir(), e))?;
    let path = temp.keep();
    let root = dunce::canonicalize(&path).map_err(|e| Error::io(&path, e))?;
    tracing::info!(?root, "Allocated filesystem tree root");
    Ok(root)
}

impl FilesystemTree {
    /// A tree rooted in a fresh temporary directory, with default settings.
    pub fn new() -> Result<Self> {
        TreeOptions::new().build()
    }

    /// A tree rooted in a fresh temporary directory, populated with `items`.
    pub fn with_items<I>(items: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<TreeItem>,
    {
        TreeOptions::new().build_with(items)
    }

    pub fn options() -> TreeOptions {
        TreeOptions::new()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Mutable instance configuration. Changes apply to later `mk` calls.
    pub fn config_mut(&mut self) -> &mut TreeConfig {
        &mut self.config
    }

    pub fn set_should_dedent(&mut self, should_dedent: bool) {
        self.config.should_dedent = should_dedent;
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.config.encoding = encoding.into();
    }

    /// Build `items` under the root, in order, with the instance configuration.
    ///
    /// See [`FilesystemTree::mk_with`].
    pub fn mk<I>(&self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<TreeItem>,
    {
        self.mk_with(items, &MkOptions::default())
    }

    /// Build `items` under the root, in order.
    ///
    /// Directory markers are created with all missing ancestors and are a
    /// no-op if the directory exists. File specs get their parent created,
    /// their content dedented and encoded per the resolved configuration,
    /// and are written over any existing file.
    ///
    /// Processing stops at the first failure. Items before it stay on disk.
    pub fn mk_with<I>(&self, items: I, options: &MkOptions) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<TreeItem>,
    {
        for item in items {
            self.apply(item.into(), options)?;
        }
        Ok(())
    }

    /// Build untyped items, parsing each one as it is reached.
    ///
    /// An item that is not a string or a 2 to 4 element array fails with an
    /// invalid-argument error after every earlier item has been written.
    pub fn mk_values<'a, I>(&self, values: I, options: &MkOptions) -> Result<()>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        for (index, value) in values.into_iter().enumerate() {
            let item = TreeItem::from_value(value, index)?;
            self.apply(item, options)?;
        }
        Ok(())
    }

    /// Load a manifest file and build its tree with the overrides it declares.
    pub fn mk_manifest(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let manifest = TreeManifest::load(path)?;
        tracing::debug!(?path, items = manifest.tree.len(), "Building tree from manifest");
        self.mk_values(&manifest.tree, &manifest.options())
    }

    fn apply(&self, item: TreeItem, options: &MkOptions) -> Result<()> {
        match item {
            TreeItem::Directory(path) => {
                let native = TreePath::new(&path).to_native(&self.root);
                io::ensure_dir(&native)
            }
            TreeItem::File(spec) => {
                let effective = self.config.resolve(options, &spec);
                let native = TreePath::new(&spec.path).to_native(&self.root);

                if let Some(parent) = native.parent() {
                    io::ensure_dir(parent)?;
                }

                let bytes = spec.content.render(effective, &native)?;
                io::write_file(&native, &bytes)
            }
        }
    }

    /// Absolute, canonical form of `path` under the root.
    ///
    /// `path` uses `/` separators; an empty path names the root itself.
    /// Symlinks are resolved for the part of the path that exists, so the
    /// result is stable for comparisons even before the path is created.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let native = TreePath::new(path).to_native(&self.root);
        canonicalize_lenient(&native).map_err(|e| Error::io(&native, e))
    }

    /// Whether `path` (relative to the root) exists.
    pub fn exists(&self, path: &str) -> bool {
        TreePath::new(path).to_native(&self.root).exists()
    }

    /// Read a file under the root.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let native = TreePath::new(path).to_native(&self.root);
        std::fs::read(&native).map_err(|e| Error::io(&native, e))
    }

    /// Read a UTF-8 file under the root.
    pub fn read_to_string(&self, path: &str) -> Result<String> {
        let native = TreePath::new(path).to_native(&self.root);
        std::fs::read_to_string(&native).map_err(|e| Error::io(&native, e))
    }

    /// Recursively delete the root. A no-op if it is already gone.
    pub fn remove(&self) -> Result<()> {
        if io::remove_dir_tree(&self.root)? {
            tracing::info!(root = ?self.root, "Removed filesystem tree");
        }
        Ok(())
    }

    /// Run `f` against this tree, removing the root only if `f` succeeds.
    ///
    /// When `f` returns an error (or panics) the tree is left on disk so it
    /// can be inspected.
    pub fn scoped<T, E, F>(mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut FilesystemTree) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        match f(&mut self) {
            Ok(value) => {
                self.remove()?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(root = ?self.root, "Scope failed; keeping filesystem tree");
                Err(err)
            }
        }
    }

    /// Wrap the tree in a guard that removes it when dropped, unless the
    /// thread is panicking.
    pub fn into_guard(self) -> TreeGuard {
        TreeGuard { tree: Some(self) }
    }
}

/// Removes its tree on drop during normal exit; keeps it during a panic.
///
/// ```
/// use filesystem_tree::FilesystemTree;
///
/// let root = {
///     let fs = FilesystemTree::new()?.into_guard();
///     fs.mk(["scratch"])?;
///     fs.root().to_path_buf()
/// };
/// assert!(!root.exists());
/// # Ok::<(), filesystem_tree::Error>(())
/// ```
#[derive(Debug)]
pub struct TreeGuard {
    tree: Option<FilesystemTree>,
}

impl TreeGuard {
    /// Disarm the guard and take the tree back.
    pub fn keep(mut self) -> FilesystemTree {
        self.tree.take().expect("guard holds its tree until dropped")
    }
}

impl Deref for TreeGuard {
    type Target = FilesystemTree;

    fn deref(&self) -> &FilesystemTree {
        self.tree.as_ref().expect("guard holds its tree until dropped")
    }
}

impl DerefMut for TreeGuard {
    fn deref_mut(&mut self) -> &mut FilesystemTree {
        self.tree.as_mut().expect("guard holds its tree until dropped")
    }
}

impl Drop for TreeGuard {
    fn drop(&mut self) {
        let Some(tree) = self.tree.take() else {
            return;
        };
        if std::thread::panicking() {
            tracing::warn!(root = ?tree.root, "Panic in progress; keeping filesystem tree");
        } else if let Err(e) = tree.remove() {
            tracing::warn!(root = ?tree.root, error = %e, "Failed to remove filesystem tree");
        }
    }
}
