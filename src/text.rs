//! Text encodings used for string payloads.

use crate::error::{Result, SerializerError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Bytes occupied by one ASCII character in this encoding.
    ///
    /// Length-prefixed strings store a character count computed as
    /// `encoded_len / char_byte_width()`, so for UTF-8 the count is really a
    /// byte count. Save files depend on that arithmetic.
    pub fn char_byte_width(self) -> usize {
        match self {
            TextEncoding::Utf8 | TextEncoding::Latin1 => 1,
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
        }
    }

    pub fn encode(self, s: &str) -> Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(s.as_bytes().to_vec()),
            TextEncoding::Latin1 => s
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c)).map_err(|_| {
                        SerializerError::Format(format!("{c:?} is not representable in Latin-1"))
                    })
                })
                .collect(),
            TextEncoding::Utf16Le => Ok(s.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Ok(s.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        }
    }

    /// Decode `bytes`, returning `None` if they are not valid in this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            TextEncoding::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Utf16Le | TextEncoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return None;
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| {
                        let pair = [pair[0], pair[1]];
                        if self == TextEncoding::Utf16Le {
                            u16::from_le_bytes(pair)
                        } else {
                            u16::from_be_bytes(pair)
                        }
                    })
                    .collect();
                String::from_utf16(&units).ok()
            }
        }
    }
}
