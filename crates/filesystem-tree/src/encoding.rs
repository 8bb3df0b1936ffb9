//! Named text encodings used to turn text content into bytes

use std::borrow::Cow;

use crate::{Error, Result};

/// The encoding used when nothing else is configured.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// A text encoding resolved from a label such as `"utf-8"` or `"latin-1"`.
///
/// Labels follow the WHATWG Encoding Standard as implemented by
/// `encoding_rs`, matched case-insensitively. Labels that only differ from a
/// known label by `-` or `_` (`"latin-1"`, `"utf_8"`) are accepted too.
///
/// A few labels are encoded here instead of through `encoding_rs`:
///
/// - `ascii`, `us-ascii`: strict 7-bit. WHATWG would give windows-1252.
/// - `latin-1`, `iso-8859-1`: true ISO-8859-1, U+0000 to U+00FF only.
///   WHATWG would give windows-1252, which maps `€` and friends into
///   0x80-0x9F.
/// - UTF-16 and UTF-32, which `encoding_rs` cannot encode. The bare
///   `utf-16` and `utf-32` labels write a little-endian byte order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    kind: Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Whatwg(&'static encoding_rs::Encoding),
    Ascii,
    Latin1,
    Utf16 { big_endian: bool, bom: bool },
    Utf32 { big_endian: bool, bom: bool },
}

impl Kind {
    /// Labels whose WHATWG meaning differs from what callers ask for, or
    /// that `encoding_rs` has no encoder for. `compact` is lowercase with
    /// `-` and `_` removed.
    fn builtin(compact: &str) -> Option<Self> {
        let kind = match compact {
            "ascii" | "usascii" | "us" | "646" => Self::Ascii,
            "latin1" | "latin" | "l1" | "iso88591" | "iso885911987" | "cp819" | "8859" => {
                Self::Latin1
            }
            "utf32" => Self::Utf32 {
                big_endian: false,
                bom: true,
            },
            "utf32le" => Self::Utf32 {
                big_endian: false,
                bom: false,
            },
            "utf32be" => Self::Utf32 {
                big_endian: true,
                bom: false,
            },
            _ => return None,
        };
        Some(kind)
    }
}

impl TextEncoding {
    pub fn utf8() -> Self {
        Self {
            kind: Kind::Whatwg(encoding_rs::UTF_8),
        }
    }

    /// Resolve an encoding label.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEncoding`] if the label names no encoding that
    /// can be written.
    pub fn for_label(label: &str) -> Result<Self> {
        let unknown = || Error::UnknownEncoding {
            label: label.to_string(),
        };

        let compact: String = label
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        if let Some(kind) = Kind::builtin(&compact) {
            return Ok(Self { kind });
        }

        let encoding = encoding_rs::Encoding::for_label(label.trim().as_bytes())
            .or_else(|| encoding_rs::Encoding::for_label(compact.as_bytes()))
            .ok_or_else(unknown)?;

        if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
            return Ok(Self {
                kind: Kind::Utf16 {
                    big_endian: encoding == encoding_rs::UTF_16BE,
                    bom: compact == "utf16",
                },
            });
        }

        // `replacement` and friends decode only; their encoder emits UTF-8.
        if encoding.output_encoding() != encoding {
            return Err(unknown());
        }

        Ok(Self {
            kind: Kind::Whatwg(encoding),
        })
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self.kind {
            Kind::Whatwg(encoding) => encoding.name(),
            Kind::Ascii => "US-ASCII",
            Kind::Latin1 => "ISO-8859-1",
            Kind::Utf16 { bom: true, .. } => "UTF-16",
            Kind::Utf16 {
                big_endian: true, ..
            } => "UTF-16BE",
            Kind::Utf16 { .. } => "UTF-16LE",
            Kind::Utf32 { bom: true, .. } => "UTF-32",
            Kind::Utf32 {
                big_endian: true, ..
            } => "UTF-32BE",
            Kind::Utf32 { .. } => "UTF-32LE",
        }
    }

    /// Encode `text`, or `None` if it contains characters this encoding
    /// cannot represent.
    pub fn encode<'a>(&self, text: &'a str) -> Option<Cow<'a, [u8]>> {
        match self.kind {
            Kind::Whatwg(encoding) => {
                let (bytes, _, had_unmappable) = encoding.encode(text);
                (!had_unmappable).then_some(bytes)
            }
            Kind::Ascii => text.is_ascii().then_some(Cow::Borrowed(text.as_bytes())),
            Kind::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).ok())
                .collect::<Option<Vec<u8>>>()
                .map(Cow::Owned),
            Kind::Utf16 { big_endian, bom } => {
                let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
                let units = bom.then_some(0xFEFF).into_iter().chain(text.encode_utf16());
                for unit in units {
                    if big_endian {
                        bytes.extend_from_slice(&unit.to_be_bytes());
                    } else {
                        bytes.extend_from_slice(&unit.to_le_bytes());
                    }
                }
                Some(Cow::Owned(bytes))
            }
            Kind::Utf32 { big_endian, bom } => {
                let mut bytes = Vec::with_capacity(text.len() * 4 + 4);
                let units = bom
                    .then_some(0xFEFF)
                    .into_iter()
                    .chain(text.chars().map(u32::from));
                for unit in units {
                    if big_endian {
                        bytes.extend_from_slice(&unit.to_be_bytes());
                    } else {
                        bytes.extend_from_slice(&unit.to_le_bytes());
                    }
                }
                Some(Cow::Owned(bytes))
            }
        }
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::for_label(s)
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
