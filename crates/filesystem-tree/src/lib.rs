//! Declarative on-disk directory trees for test fixtures
//!
//! A [`FilesystemTree`] owns a root directory (a fresh temporary directory
//! by default) and builds files and directories under it from a compact
//! tree definition:
//!
//! ```
//! use filesystem_tree::{FilesystemTree, MkOptions, tree};
//!
//! let fs = FilesystemTree::new()?;
//! fs.mk(tree![
//!     "empty/dir",
//!     ("config/app.toml", "
//!         [server]
//!         port = 8080
//!     "),
//!     ("raw.bin", b"\x00\xff"),
//! ])?;
//! fs.mk_with(tree![("kept.txt", "    indented")], &MkOptions::new().should_dedent(false))?;
//!
//! assert_eq!(fs.read_to_string("config/app.toml")?, "\n[server]\nport = 8080\n");
//! assert_eq!(fs.read_to_string("kept.txt")?, "    indented");
//! fs.remove()?;
//! # Ok::<(), filesystem_tree::Error>(())
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod io;
pub mod item;
pub mod logging;
pub mod manifest;
pub mod path;
pub mod tree;

pub use config::{EffectiveConfig, MkOptions, TreeConfig};
pub use encoding::TextEncoding;
pub use error::{Error, Result};
pub use item::{Content, FileSpec, TreeItem};
pub use manifest::{ManifestFormat, TreeManifest};
pub use path::TreePath;
pub use tree::{DEFAULT_PREFIX, FilesystemTree, TreeGuard, TreeOptions};
