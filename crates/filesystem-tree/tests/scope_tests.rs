//! Cleanup on clean exit, preservation on failure

use filesystem_tree::{Error, FilesystemTree, tree};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;

#[derive(Debug)]
enum TestError {
    Tree(Error),
    Assertion(&'static str),
}

impl From<Error> for TestError {
    fn from(e: Error) -> Self {
        Self::Tree(e)
    }
}

#[test]
fn scoped_removes_on_success() {
    let mut root = PathBuf::new();
    let value = FilesystemTree::new()
        .unwrap()
        .scoped(|fs| -> Result<u32, Error> {
            fs.mk(tree![("f.txt", "x")])?;
            root = fs.root().to_path_buf();
            Ok(42)
        })
        .unwrap();

    assert_eq!(value, 42);
    assert!(!root.as_os_str().is_empty());
    assert!(!root.exists());
}

#[test]
fn scoped_keeps_tree_on_error() {
    let mut root = PathBuf::new();
    let result = FilesystemTree::new()
        .unwrap()
        .scoped(|fs| -> Result<(), TestError> {
            fs.mk(tree![("evidence.txt", "look at me")])?;
            root = fs.root().to_path_buf();
            Err(TestError::Assertion("fixture check failed"))
        });

    assert!(matches!(result, Err(TestError::Assertion(_))));
    assert_eq!(
        std::fs::read_to_string(root.join("evidence.txt")).unwrap(),
        "look at me"
    );
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn scoped_keeps_tree_when_mk_fails() {
    let mut root = PathBuf::new();
    let result = FilesystemTree::new()
        .unwrap()
        .scoped(|fs| -> Result<(), TestError> {
            root = fs.root().to_path_buf();
            fs.mk(tree![("ok.txt", "x", true, "no-such-encoding")])?;
            Ok(())
        });

    assert!(matches!(
        result,
        Err(TestError::Tree(Error::UnknownEncoding { .. }))
    ));
    assert!(root.is_dir());
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn scoped_can_mutate_instance_config() {
    FilesystemTree::new()
        .unwrap()
        .scoped(|fs| -> Result<(), Error> {
            fs.set_should_dedent(false);
            fs.mk(tree![("f.txt", "  x")])?;
            assert_eq!(fs.read_to_string("f.txt")?, "  x");
            Ok(())
        })
        .unwrap();
}

#[test]
fn guard_removes_on_drop() {
    let root = {
        let guard = FilesystemTree::with_items(tree![("a/b.txt", "x")])
            .unwrap()
            .into_guard();
        guard.root().to_path_buf()
    };
    assert!(!root.exists());
}

#[test]
fn guard_keeps_tree_on_panic() {
    let fs = FilesystemTree::new().unwrap();
    let root = fs.root().to_path_buf();

    let outcome: std::thread::Result<()> = catch_unwind(AssertUnwindSafe(move || {
        let guard = fs.into_guard();
        guard.mk(tree![("evidence.txt", "x")]).unwrap();
        panic!("simulated test failure");
    }));

    assert!(outcome.is_err());
    assert!(root.join("evidence.txt").is_file());
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn guard_deref_mut_changes_config() {
    let mut guard = FilesystemTree::new().unwrap().into_guard();
    guard.set_encoding("utf-16be");
    guard.mk(tree![("f.txt", "A")]).unwrap();
    assert_eq!(guard.read("f.txt").unwrap(), vec![0x00, 0x41]);
}

#[test]
fn dropping_a_plain_tree_keeps_it() {
    let root = FilesystemTree::new().unwrap().root().to_path_buf();
    assert!(root.is_dir());
    std::fs::remove_dir_all(&root).unwrap();
}
