//! Data-table file types and their payload decoders.
//!
//! This module defines the [`FileType`] enum naming the SLC data-table files
//! the crate understands, and [`TypedData`], the decoded form of a reply
//! payload. Decoding is selected by explicit matching on the closed list;
//! there is no code-driven dispatch.
//!
//! # File Types Overview
//!
//! | File type | Letter | Code | Decoded as |
//! |-----------|:------:|:----:|------------|
//! | Status | S | 0x84 | raw bytes |
//! | Bit | B | 0x85 | 16-bit words |
//! | Timer | T | 0x86 | 16-bit signed integers |
//! | Counter | C | 0x87 | 16-bit signed integers |
//! | Control | R | 0x88 | 16-bit signed integers |
//! | Integer | N | 0x89 | 16-bit signed integers |
//! | Float | F | 0x8A | 32-bit IEEE-754 floats |
//! | OutputLogic | O | 0x8B | 16-bit words |
//! | InputLogic | I | 0x8C | 16-bit words |
//! | Ascii | A | 0x8E | raw bytes |
//!
//! All multi-byte values are little-endian on the wire.
//!
//! # Example
//!
//! ```
//! use ab_df1::FileType;
//!
//! assert_eq!(FileType::Integer.element_width(), 2);
//! assert_eq!(FileType::Float.element_width(), 4);
//! assert_eq!(FileType::Integer.to_string(), "N");
//! ```

use crate::error::{Df1Error, Result};

/// Data-table file types addressable through protected typed commands.
///
/// The list is closed: file types the protocol defines but this crate cannot
/// decode (string and BCD files) are deliberately absent, so every variant
/// that can be constructed can also be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    /// S file - processor status words.
    Status,
    /// B file - bit (binary) words.
    Bit,
    /// T file - timer structures (status, preset, accumulator words).
    Timer,
    /// C file - counter structures (status, preset, accumulator words).
    Counter,
    /// R file - control structures.
    Control,
    /// N file - 16-bit signed integers.
    Integer,
    /// F file - 32-bit IEEE-754 floats.
    Float,
    /// O file - output image words.
    OutputLogic,
    /// I file - input image words.
    InputLogic,
    /// A file - raw ASCII bytes.
    Ascii,
}

impl FileType {
    /// Returns the wire code identifying this file type in command payloads.
    pub(crate) fn code(self) -> u8 {
        match self {
            FileType::Status => 0x84,
            FileType::Bit => 0x85,
            FileType::Timer => 0x86,
            FileType::Counter => 0x87,
            FileType::Control => 0x88,
            FileType::Integer => 0x89,
            FileType::Float => 0x8A,
            FileType::OutputLogic => 0x8B,
            FileType::InputLogic => 0x8C,
            FileType::Ascii => 0x8E,
        }
    }

    /// Bytes occupied by one element of this file type.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::FileType;
    ///
    /// assert_eq!(FileType::Timer.element_width(), 2);
    /// assert_eq!(FileType::Ascii.element_width(), 1);
    /// ```
    pub fn element_width(self) -> usize {
        match self {
            FileType::Status | FileType::Ascii => 1,
            FileType::Float => 4,
            FileType::Bit
            | FileType::Timer
            | FileType::Counter
            | FileType::Control
            | FileType::Integer
            | FileType::OutputLogic
            | FileType::InputLogic => 2,
        }
    }

    /// Whether the protected typed write command accepts this file type.
    ///
    /// # Example
    ///
    /// ```
    /// use ab_df1::FileType;
    ///
    /// assert!(FileType::Integer.supports_typed_write());
    /// assert!(!FileType::Status.supports_typed_write());
    /// ```
    pub fn supports_typed_write(self) -> bool {
        matches!(
            self,
            FileType::Integer
                | FileType::Bit
                | FileType::OutputLogic
                | FileType::Control
                | FileType::Float
        )
    }

    /// Whether the masked write command accepts this file type.
    ///
    /// Masks are 16 bits wide, so only word-sized files qualify.
    pub fn supports_masked_write(self) -> bool {
        matches!(
            self,
            FileType::Integer | FileType::Bit | FileType::OutputLogic
        )
    }

    /// Decodes a reply payload according to this file type.
    pub fn decode(self, data: &[u8]) -> Result<TypedData> {
        match self {
            FileType::Timer | FileType::Counter | FileType::Control | FileType::Integer => {
                decode_integers(data).map(TypedData::Integers)
            }
            FileType::Bit | FileType::OutputLogic | FileType::InputLogic => {
                decode_words(data).map(TypedData::Words)
            }
            FileType::Float => decode_floats(data).map(TypedData::Floats),
            FileType::Status | FileType::Ascii => Ok(TypedData::Bytes(data.to_vec())),
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Status => write!(f, "S"),
            FileType::Bit => write!(f, "B"),
            FileType::Timer => write!(f, "T"),
            FileType::Counter => write!(f, "C"),
            FileType::Control => write!(f, "R"),
            FileType::Integer => write!(f, "N"),
            FileType::Float => write!(f, "F"),
            FileType::OutputLogic => write!(f, "O"),
            FileType::InputLogic => write!(f, "I"),
            FileType::Ascii => write!(f, "A"),
        }
    }
}

/// Reply payload decoded according to its file type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedData {
    /// 16-bit signed little-endian values.
    Integers(Vec<i16>),
    /// 16-bit unsigned words, as used by bit and image files.
    Words(Vec<u16>),
    /// 32-bit IEEE-754 little-endian values.
    Floats(Vec<f32>),
    /// Uninterpreted bytes.
    Bytes(Vec<u8>),
}

impl TypedData {
    fn kind_name(&self) -> &'static str {
        match self {
            TypedData::Integers(_) => "integers",
            TypedData::Words(_) => "words",
            TypedData::Floats(_) => "floats",
            TypedData::Bytes(_) => "bytes",
        }
    }

    /// Unwraps the integer form.
    ///
    /// # Errors
    ///
    /// Returns `Df1Error::InvalidParameter` when the payload decoded to a
    /// different shape.
    pub fn into_integers(self) -> Result<Vec<i16>> {
        match self {
            TypedData::Integers(values) => Ok(values),
            other => Err(Df1Error::invalid_parameter(
                "data",
                format!("expected integers, decoded {}", other.kind_name()),
            )),
        }
    }

    /// Unwraps the word form.
    pub fn into_words(self) -> Result<Vec<u16>> {
        match self {
            TypedData::Words(values) => Ok(values),
            other => Err(Df1Error::invalid_parameter(
                "data",
                format!("expected words, decoded {}", other.kind_name()),
            )),
        }
    }

    /// Unwraps the float form.
    pub fn into_floats(self) -> Result<Vec<f32>> {
        match self {
            TypedData::Floats(values) => Ok(values),
            other => Err(Df1Error::invalid_parameter(
                "data",
                format!("expected floats, decoded {}", other.kind_name()),
            )),
        }
    }

    /// Unwraps the raw byte form.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            TypedData::Bytes(values) => Ok(values),
            other => Err(Df1Error::invalid_parameter(
                "data",
                format!("expected bytes, decoded {}", other.kind_name()),
            )),
        }
    }
}

pub(crate) fn decode_integers(data: &[u8]) -> Result<Vec<i16>> {
    if data.len() % 2 != 0 {
        return Err(Df1Error::invalid_reply(format!(
            "integer payload length {} is not a multiple of 2",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

pub(crate) fn decode_words(data: &[u8]) -> Result<Vec<u16>> {
    if data.len() % 2 != 0 {
        return Err(Df1Error::invalid_reply(format!(
            "word payload length {} is not a multiple of 2",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

pub(crate) fn decode_floats(data: &[u8]) -> Result<Vec<f32>> {
    if data.len() % 4 != 0 {
        return Err(Df1Error::invalid_reply(format!(
            "float payload length {} is not a multiple of 4",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(4)
        .map(|quad| f32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(FileType::Status.code(), 0x84);
        assert_eq!(FileType::Bit.code(), 0x85);
        assert_eq!(FileType::Timer.code(), 0x86);
        assert_eq!(FileType::Counter.code(), 0x87);
        assert_eq!(FileType::Control.code(), 0x88);
        assert_eq!(FileType::Integer.code(), 0x89);
        assert_eq!(FileType::Float.code(), 0x8A);
        assert_eq!(FileType::OutputLogic.code(), 0x8B);
        assert_eq!(FileType::InputLogic.code(), 0x8C);
        assert_eq!(FileType::Ascii.code(), 0x8E);
    }

    #[test]
    fn test_decode_integers() {
        let data = FileType::Integer.decode(&[0x0B, 0x00, 0x0C, 0x00]).unwrap();
        assert_eq!(data, TypedData::Integers(vec![11, 12]));
        // Sign extension through the full 16-bit range.
        let data = FileType::Integer.decode(&[0xFF, 0xFF, 0x00, 0x80]).unwrap();
        assert_eq!(data, TypedData::Integers(vec![-1, i16::MIN]));
    }

    #[test]
    fn test_decode_integers_rejects_odd_length() {
        assert!(matches!(
            FileType::Integer.decode(&[0x0B, 0x00, 0x0C]),
            Err(Df1Error::InvalidReply { .. })
        ));
    }

    #[test]
    fn test_decode_words() {
        let data = FileType::Bit.decode(&[0x00, 0x80, 0x01, 0x00]).unwrap();
        assert_eq!(data, TypedData::Words(vec![0x8000, 0x0001]));
    }

    #[test]
    fn test_decode_floats() {
        let data = FileType::Float.decode(&[0x00, 0x00, 0xC0, 0x3F]).unwrap();
        assert_eq!(data, TypedData::Floats(vec![1.5]));
        assert!(matches!(
            FileType::Float.decode(&[0x00, 0x00, 0xC0]),
            Err(Df1Error::InvalidReply { .. })
        ));
    }

    #[test]
    fn test_decode_bytes_passthrough() {
        let data = FileType::Ascii.decode(&[0x41, 0x42]).unwrap();
        assert_eq!(data, TypedData::Bytes(vec![0x41, 0x42]));
    }

    #[test]
    fn test_typed_data_accessors() {
        assert_eq!(
            TypedData::Integers(vec![1]).into_integers().unwrap(),
            vec![1]
        );
        assert!(TypedData::Integers(vec![1]).into_floats().is_err());
        assert_eq!(
            TypedData::Words(vec![0x8000]).into_words().unwrap(),
            vec![0x8000]
        );
        assert!(TypedData::Bytes(vec![0]).into_words().is_err());
    }

    #[test]
    fn test_write_support() {
        assert!(FileType::Integer.supports_typed_write());
        assert!(FileType::Float.supports_typed_write());
        assert!(FileType::Control.supports_typed_write());
        assert!(!FileType::Timer.supports_typed_write());
        assert!(!FileType::InputLogic.supports_typed_write());

        assert!(FileType::Bit.supports_masked_write());
        assert!(!FileType::Float.supports_masked_write());
        assert!(!FileType::Counter.supports_masked_write());
    }

    #[test]
    fn test_display_letters() {
        assert_eq!(FileType::Integer.to_string(), "N");
        assert_eq!(FileType::Float.to_string(), "F");
        assert_eq!(FileType::Bit.to_string(), "B");
        assert_eq!(FileType::Timer.to_string(), "T");
        assert_eq!(FileType::OutputLogic.to_string(), "O");
    }
}
