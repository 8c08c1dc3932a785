//! Character sets usable for percent-encoding and signing keys.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::CodecError;

/// Character set used to turn text into bytes before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    /// UTF-8 (the default).
    #[default]
    Utf8,
    /// ISO-8859-1: one byte per character, code points U+0000..=U+00FF.
    Latin1,
    /// US-ASCII: code points U+0000..=U+007F.
    Ascii,
}

impl Charset {
    /// Look up a charset by IANA name or alias (case-insensitive).
    pub fn for_name(name: &str) -> Result<Self, CodecError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "iso-8859-1" | "iso_8859-1" | "iso8859-1" | "iso-ir-100" | "latin1" | "l1"
            | "cp819" | "ibm819" => Ok(Self::Latin1),
            "us-ascii" | "ascii" | "iso646-us" | "us" | "ansi_x3.4-1968" | "cp367" => {
                Ok(Self::Ascii)
            }
            _ => Err(CodecError::UnsupportedCharset(name.to_owned())),
        }
    }

    /// Canonical IANA name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Latin1 => "ISO-8859-1",
            Self::Ascii => "US-ASCII",
        }
    }

    /// Encode text into bytes of this charset.
    ///
    /// UTF-8 borrows the input; the single-byte charsets fail on the first
    /// character outside their range.
    pub fn encode(self, text: &str) -> Result<Cow<'_, [u8]>, CodecError> {
        let max = match self {
            Self::Utf8 => return Ok(Cow::Borrowed(text.as_bytes())),
            Self::Latin1 => 0xFF,
            Self::Ascii => 0x7F,
        };
        if text.is_ascii() {
            return Ok(Cow::Borrowed(text.as_bytes()));
        }
        text.chars()
            .map(|ch| {
                u8::try_from(u32::from(ch))
                    .ok()
                    .filter(|b| u32::from(*b) <= max)
                    .ok_or(CodecError::Unmappable { charset: self, ch })
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Cow::Owned)
    }

    /// Decode bytes of this charset into text.
    pub fn decode(self, bytes: &[u8]) -> Result<String, CodecError> {
        match self {
            Self::Utf8 => Ok(std::str::from_utf8(bytes)?.to_owned()),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii() {
                        Ok(char::from(b))
                    } else {
                        Err(CodecError::InvalidByte {
                            charset: self,
                            byte: b,
                        })
                    }
                })
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_name(s)
    }
}
