// src/config.rs
use crate::error::{Result, SerializerError};
use crate::text::TextEncoding;

/// Byte order of multi-byte primitives in the target format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Whatever the host uses; never reversed.
    Default,
    #[default]
    Little,
    Big,
}

impl ByteOrder {
    /// Whether values must be byte-reversed on this host.
    pub fn reverses_on_host(self) -> bool {
        match self {
            ByteOrder::Default => false,
            ByteOrder::Little => cfg!(target_endian = "big"),
            ByteOrder::Big => cfg!(target_endian = "little"),
        }
    }
}

/// How strings are delimited in the stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StringFraming {
    /// 7-bit variable-length byte count, then the encoded bytes.
    #[default]
    Standard,
    /// Characters until a zero character of `char_byte_width` bytes.
    NullTerminated,
    /// 32-bit character count, then `count * char_byte_width` bytes.
    LengthPrefixed,
}

/// Storage width of a boolean.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoolWidth {
    #[default]
    One,
    Two,
    Four,
    Eight,
}

impl BoolWidth {
    pub fn from_bytes(n: usize) -> Result<Self> {
        match n {
            1 => Ok(BoolWidth::One),
            2 => Ok(BoolWidth::Two),
            4 => Ok(BoolWidth::Four),
            8 => Ok(BoolWidth::Eight),
            _ => Err(SerializerError::Unsupported("bool width must be 1, 2, 4 or 8 bytes")),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            BoolWidth::One => 1,
            BoolWidth::Two => 2,
            BoolWidth::Four => 4,
            BoolWidth::Eight => 8,
        }
    }
}

/// Per-platform primitive layout.
/// Build with `SerializerSettings::builder().foo(...).build()`; immutable afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerializerSettings {
    byte_order: ByteOrder,
    string_framing: StringFraming,
    bool_width: BoolWidth,
    text_encoding: TextEncoding,
}

impl SerializerSettings {
    /// Start building settings with defaults.
    ///
    /// Defaults:
    /// - byte_order     = Little
    /// - string_framing = Standard
    /// - bool_width     = One
    /// - text_encoding  = Utf8
    pub fn builder() -> SerializerSettingsBuilder {
        SerializerSettingsBuilder {
            settings: SerializerSettings::default(),
        }
    }

    pub fn little_endian() -> Self {
        Self::builder().byte_order(ByteOrder::Little).build()
    }

    pub fn big_endian() -> Self {
        Self::builder().byte_order(ByteOrder::Big).build()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn string_framing(&self) -> StringFraming {
        self.string_framing
    }

    pub fn bool_width(&self) -> BoolWidth {
        self.bool_width
    }

    pub fn text_encoding(&self) -> TextEncoding {
        self.text_encoding
    }

    /// Derived from the text encoding; see [`TextEncoding::char_byte_width`].
    pub fn char_byte_width(&self) -> usize {
        self.text_encoding.char_byte_width()
    }

    pub fn reverses_bytes(&self) -> bool {
        self.byte_order.reverses_on_host()
    }
}

/// Fluent builder for `SerializerSettings`.
#[derive(Clone, Debug)]
pub struct SerializerSettingsBuilder {
    settings: SerializerSettings,
}

impl SerializerSettingsBuilder {
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.settings.byte_order = order;
        self
    }
    pub fn string_framing(mut self, framing: StringFraming) -> Self {
        self.settings.string_framing = framing;
        self
    }
    pub fn bool_width(mut self, width: BoolWidth) -> Self {
        self.settings.bool_width = width;
        self
    }
    pub fn text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.settings.text_encoding = encoding;
        self
    }

    pub fn build(self) -> SerializerSettings {
        self.settings
    }
}
