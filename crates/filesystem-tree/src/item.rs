//! Tree definition items
//!
//! A tree definition is an ordered list of [`TreeItem`]s. Typed callers
//! build items with `From` conversions that mirror the compact tuple
//! notation:
//!
//! - `"some/dir"` is a directory marker
//! - `("path", content)` is a file
//! - `("path", content, dedent)` overrides dedenting for that file
//! - `("path", content, dedent, "encoding")` also overrides the encoding
//!
//! Untyped definitions (JSON, YAML or TOML values) go through
//! [`TreeItem::from_value`], which is where malformed items are rejected.

use std::borrow::Cow;
use std::path::Path;

use serde_json::Value;

use crate::config::EffectiveConfig;
use crate::encoding::TextEncoding;
use crate::{Error, Result};

/// One entry of a tree definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeItem {
    /// Ensure this directory and all of its ancestors exist.
    Directory(String),
    /// Write a file, creating its ancestors first.
    File(FileSpec),
}

/// A file to write, with optional per-item configuration overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: String,
    pub content: Content,
    pub should_dedent: Option<bool>,
    pub encoding: Option<String>,
}

/// File content as supplied by the caller.
///
/// Only [`Content::Text`] is dedented and encoded. [`Content::Bytes`] is
/// written verbatim whatever the resolved configuration says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
}

impl TreeItem {
    pub fn dir(path: impl Into<String>) -> Self {
        Self::Directory(path.into())
    }

    pub fn file(path: impl Into<String>, content: impl Into<Content>) -> Self {
        Self::File(FileSpec::new(path, content))
    }

    /// The slash-separated path this item targets.
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(path) => path,
            Self::File(spec) => &spec.path,
        }
    }

    /// Parse an untyped item.
    ///
    /// A string is a directory marker. An array of 2 to 4 elements is a file
    /// spec: `[path, content, dedent?, encoding?]` where content is a string
    /// or an array of byte values, dedent is a boolean, an integer (zero is
    /// false) or `null`, and encoding is a string or `null`. A `null` field
    /// counts as not given.
    ///
    /// `index` is the item's position in its batch and is only used to
    /// label errors.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFileSpec`] for arrays of any other length and
    /// [`Error::InvalidItem`] for every other malformed shape.
    pub fn from_value(value: &Value, index: usize) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidItem {
            index,
            reason: reason.to_string(),
        };

        let fields = match value {
            Value::String(path) => return Ok(Self::Directory(path.clone())),
            Value::Array(fields) => fields,
            other => {
                return Err(invalid(&format!(
                    "expected a string or an array, found {}",
                    kind_of(other)
                )));
            }
        };

        if !(2..=4).contains(&fields.len()) {
            return Err(Error::InvalidFileSpec {
                index,
                len: fields.len(),
            });
        }

        let path = fields[0]
            .as_str()
            .ok_or_else(|| invalid("file path must be a string"))?;

        let content = match &fields[1] {
            Value::String(text) => Content::Text(text.clone()),
            Value::Array(values) => values
                .iter()
                .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
                .collect::<Option<Vec<u8>>>()
                .map(Content::Bytes)
                .ok_or_else(|| invalid("byte content must only contain integers 0-255"))?,
            _ => return Err(invalid("file content must be a string or an array of bytes")),
        };

        let should_dedent = match fields.get(2) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::Number(n)) => Some(n.as_f64().is_some_and(|n| n != 0.0)),
            Some(_) => return Err(invalid("dedent flag must be a boolean or a number")),
        };

        let encoding = match fields.get(3) {
            None | Some(Value::Null) => None,
            Some(Value::String(label)) => Some(label.clone()),
            Some(_) => return Err(invalid("encoding must be a string")),
        };

        Ok(Self::File(FileSpec {
            path: path.to_string(),
            content,
            should_dedent,
            encoding,
        }))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl FileSpec {
    pub fn new(path: impl Into<String>, content: impl Into<Content>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            should_dedent: None,
            encoding: None,
        }
    }

    pub fn should_dedent(mut self, should_dedent: bool) -> Self {
        self.should_dedent = Some(should_dedent);
        self
    }

    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

impl From<FileSpec> for TreeItem {
    fn from(spec: FileSpec) -> Self {
        Self::File(spec)
    }
}

impl From<&str> for TreeItem {
    fn from(path: &str) -> Self {
        Self::Directory(path.to_string())
    }
}

impl From<String> for TreeItem {
    fn from(path: String) -> Self {
        Self::Directory(path)
    }
}

impl<P, C> From<(P, C)> for TreeItem
where
    P: Into<String>,
    C: Into<Content>,
{
    fn from((path, content): (P, C)) -> Self {
        Self::File(FileSpec::new(path, content))
    }
}

impl<P, C> From<(P, C, bool)> for TreeItem
where
    P: Into<String>,
    C: Into<Content>,
{
    fn from((path, content, should_dedent): (P, C, bool)) -> Self {
        Self::File(FileSpec::new(path, content).should_dedent(should_dedent))
    }
}

impl<P, C, E> From<(P, C, bool, E)> for TreeItem
where
    P: Into<String>,
    C: Into<Content>,
    E: Into<String>,
{
    fn from((path, content, should_dedent, encoding): (P, C, bool, E)) -> Self {
        Self::File(
            FileSpec::new(path, content)
                .should_dedent(should_dedent)
                .encoding(encoding),
        )
    }
}

impl Content {
    /// The bytes to write for this content.
    ///
    /// Text is dedented first (when enabled) and then encoded. Bytes pass
    /// through untouched, even when dedenting is enabled. `path` only labels
    /// encoding errors.
    pub fn render(&self, config: EffectiveConfig<'_>, path: &Path) -> Result<Cow<'_, [u8]>> {
        let text = match self {
            Self::Bytes(bytes) => return Ok(Cow::Borrowed(bytes)),
            Self::Text(text) => text,
        };

        let encoding = TextEncoding::for_label(config.encoding)?;
        let unencodable = || Error::Unencodable {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        };

        if config.should_dedent {
            let dedented = dedent(text);
            encoding
                .encode(&dedented)
                .map(|bytes| Cow::Owned(bytes.into_owned()))
                .ok_or_else(unencodable)
        } else {
            encoding.encode(text).ok_or_else(unencodable)
        }
    }
}

/// Remove the longest run of leading spaces and tabs shared by every line.
///
/// Lines made only of spaces and tabs are emptied and do not count towards
/// the shared margin. Only `\n` ends a line, and every terminator is kept,
/// so `\r\n` input stays `\r\n`. Other whitespace (`\u{3000}`, `\u{a0}`)
/// is content, not indentation.
pub(crate) fn dedent(text: &str) -> String {
    let lines: Vec<(&str, &str)> = text
        .split_inclusive('\n')
        .map(|line| match line.strip_suffix('\n') {
            Some(body) => (body, "\n"),
            None => (line, ""),
        })
        .collect();

    let margin = lines
        .iter()
        .map(|(body, _)| *body)
        .filter(|body| !body.chars().all(is_indent))
        .map(|body| &body[..body.len() - body.trim_start_matches(is_indent).len()])
        .reduce(common_prefix)
        .unwrap_or("");

    let mut dedented = String::with_capacity(text.len());
    for (body, newline) in lines {
        if !body.chars().all(is_indent) {
            dedented.push_str(body.strip_prefix(margin).unwrap_or(body));
        }
        dedented.push_str(newline);
    }
    dedented
}

fn is_indent(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn common_prefix<'a>(a: &'a str, b: &'a str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for Content {
    fn from(bytes: &[u8; N]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

/// Build a `Vec<TreeItem>` from heterogeneous items.
///
/// ```
/// use filesystem_tree::{tree, TreeItem};
///
/// let items: Vec<TreeItem> = tree![
///     "some/dir",
///     ("some/dir/file.txt", "Greetings, program!"),
///     ("raw.bin", b"\x00\x01"),
///     ("keep.txt", "    indented", false),
/// ];
/// assert_eq!(items.len(), 4);
/// ```
#[macro_export]
macro_rules! tree {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::TreeItem::from($item)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn string_is_directory() {
        assert_eq!(TreeItem::from("a/b"), TreeItem::Directory("a/b".into()));
        assert_eq!(
            TreeItem::from_value(&json!("a/b"), 0).unwrap(),
            TreeItem::dir("a/b")
        );
    }

    #[test]
    fn tuples_become_file_specs() {
        let item = TreeItem::from(("f.txt", "x", false, "latin1"));
        assert_eq!(
            item,
            TreeItem::File(FileSpec {
                path: "f.txt".into(),
                content: Content::Text("x".into()),
                should_dedent: Some(false),
                encoding: Some("latin1".into()),
            })
        );
    }

    #[test]
    fn byte_literals_are_bytes() {
        let item = TreeItem::from(("f.bin", b"\xff\x00"));
        assert_eq!(item, TreeItem::file("f.bin", vec![0xffu8, 0x00]));
    }

    #[test]
    fn value_with_all_fields() {
        let item = TreeItem::from_value(&json!(["f.txt", "  x", 1, "utf-16le"]), 0).unwrap();
        assert_eq!(
            item,
            TreeItem::from(FileSpec::new("f.txt", "  x").should_dedent(true).encoding("utf-16le"))
        );
    }

    #[test]
    fn value_with_null_fields_leaves_them_unset() {
        let item = TreeItem::from_value(&json!(["f.txt", "x", null, null]), 0).unwrap();
        assert_eq!(item, TreeItem::file("f.txt", "x"));
    }

    #[test]
    fn value_zero_is_false() {
        let item = TreeItem::from_value(&json!(["f.txt", "x", 0]), 0).unwrap();
        assert_eq!(item, TreeItem::from(("f.txt", "x", false)));
    }

    #[test]
    fn value_byte_array_content() {
        let item = TreeItem::from_value(&json!(["f.bin", [0, 255, 10]]), 0).unwrap();
        assert_eq!(item, TreeItem::file("f.bin", vec![0u8, 255, 10]));
    }

    #[test]
    fn non_string_non_array_is_invalid() {
        let err = TreeItem::from_value(&json!(123), 7).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(matches!(err, Error::InvalidItem { index: 7, .. }));
    }

    #[test]
    fn wrong_arity_is_invalid() {
        for value in [json!([]), json!(["only-path"]), json!(["a", "b", true, "utf-8", "extra"])] {
            let err = TreeItem::from_value(&value, 0).unwrap_err();
            assert!(matches!(err, Error::InvalidFileSpec { .. }), "{value}");
        }
    }

    #[test]
    fn wrongly_typed_fields_are_invalid() {
        for value in [
            json!([1, "x"]),
            json!(["f", {"a": 1}]),
            json!(["f", [256]]),
            json!(["f", "x", "yes"]),
            json!(["f", "x", true, 8]),
        ] {
            let err = TreeItem::from_value(&value, 0).unwrap_err();
            assert!(matches!(err, Error::InvalidItem { .. }), "{value}");
        }
    }

    fn effective(should_dedent: bool, encoding: &str) -> EffectiveConfig<'_> {
        EffectiveConfig {
            should_dedent,
            encoding,
        }
    }

    #[test]
    fn render_dedents_text() {
        let content = Content::from("\n    Here is a list:\n        - one\n    ");
        let bytes = content.render(effective(true, "utf-8"), Path::new("f")).unwrap();
        assert_eq!(&*bytes, b"\nHere is a list:\n    - one\n".as_slice());
    }

    #[test]
    fn render_blank_lines_become_empty() {
        let content = Content::from("  a\n   \n  b\n");
        let bytes = content.render(effective(true, "utf-8"), Path::new("f")).unwrap();
        assert_eq!(&*bytes, b"a\n\nb\n".as_slice());
    }

    #[test]
    fn dedent_keeps_crlf_terminators() {
        assert_eq!(dedent("  a\r\n  b\r\n"), "a\r\nb\r\n");
        assert_eq!(dedent("x\r\ny"), "x\r\ny");
    }

    #[test]
    fn dedent_crlf_blank_line_is_content() {
        // `\r` is not indentation, so this line still sets the margin.
        assert_eq!(dedent("    a\r\n  \r\n    b"), "  a\r\n\r\n  b");
    }

    #[test]
    fn dedent_ignores_non_ascii_whitespace() {
        assert_eq!(dedent("\u{3000}x"), "\u{3000}x");
        assert_eq!(dedent("  \u{a0}x\n  y"), "\u{a0}x\ny");
    }

    #[test]
    fn dedent_margin_is_common_prefix_of_tabs_and_spaces() {
        assert_eq!(dedent("\t  a\n\t b\n"), " a\nb\n");
        assert_eq!(dedent(" \ta\n\t b\n"), " \ta\n\t b\n");
    }

    #[test]
    fn dedent_empties_whitespace_only_lines() {
        assert_eq!(dedent("  a\n \t \n  b"), "a\n\nb");
        assert_eq!(dedent("   "), "");
        assert_eq!(dedent(""), "");
    }

    #[test]
    fn render_crlf_text_byte_for_byte() {
        let content = Content::from("x\r\ny");
        let bytes = content
            .render(effective(true, "utf-8"), Path::new("f"))
            .unwrap();
        assert_eq!(&*bytes, b"x\r\ny".as_slice());
    }

    #[test]
    fn render_without_dedent_keeps_text() {
        let content = Content::from("    Greetings, program!");
        let bytes = content.render(effective(false, "utf-8"), Path::new("f")).unwrap();
        assert_eq!(&*bytes, b"    Greetings, program!".as_slice());
    }

    #[test]
    fn render_passes_bytes_through() {
        let content = Content::from(b"    raw");
        let bytes = content.render(effective(true, "no-such-encoding"), Path::new("f")).unwrap();
        assert_eq!(&*bytes, b"    raw".as_slice());
    }

    #[test]
    fn render_reports_unknown_encoding() {
        let err = Content::from("x")
            .render(effective(true, "no-such-encoding"), Path::new("f"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownEncoding { .. }));
    }

    #[test]
    fn render_reports_unencodable_text() {
        let err = Content::from("\u{2603}")
            .render(effective(true, "latin1"), Path::new("snow.txt"))
            .unwrap_err();
        match err {
            Error::Unencodable { path, encoding } => {
                assert_eq!(path, Path::new("snow.txt"));
                assert_eq!(encoding, "ISO-8859-1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tree_macro_mixes_shapes() {
        let items = crate::tree!["d", ("f", "x"), ("g", "y", true)];
        assert_eq!(items[0], TreeItem::dir("d"));
        assert_eq!(items[1], TreeItem::file("f", "x"));
        assert_eq!(items[2].path(), "g");
    }
}
