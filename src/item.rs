//! SECS-II item tree: the tagged, optionally nested payload of a data message.

use crate::Error;

/// The 6-bit format code occupying the top bits of an item's format byte.
///
/// Values match the codes defined by the SECS-II standard (SEMI E5); the low
/// 2 bits of the on-wire format byte are `length_bits`, not part of this code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCode {
    List,
    Binary,
    Boolean,
    Ascii,
    Jis8,
    Int1,
    Int2,
    Int4,
    Int8,
    Uint1,
    Uint2,
    Uint4,
    Uint8,
    Float4,
    Float8,
}

impl FormatCode {
    /// Decodes the top 6 bits of a format byte (i.e. `byte >> 2`).
    pub fn from_top6(code: u8) -> Option<Self> {
        Some(match code {
            0b000000 => FormatCode::List,
            0b001000 => FormatCode::Binary,
            0b001001 => FormatCode::Boolean,
            0b010000 => FormatCode::Ascii,
            0b010001 => FormatCode::Jis8,
            0b011000 => FormatCode::Int8,
            0b011001 => FormatCode::Int1,
            0b011010 => FormatCode::Int2,
            0b011100 => FormatCode::Int4,
            0b100000 => FormatCode::Float8,
            0b100100 => FormatCode::Float4,
            0b101000 => FormatCode::Uint8,
            0b101001 => FormatCode::Uint1,
            0b101010 => FormatCode::Uint2,
            0b101100 => FormatCode::Uint4,
            _ => return None,
        })
    }

    /// The element size in bytes for leaf variants. Lists have no fixed
    /// element size; their `length_bits` encodes a child *count*, not bytes.
    pub fn element_size(self) -> usize {
        match self {
            FormatCode::List => 0,
            FormatCode::Binary
            | FormatCode::Boolean
            | FormatCode::Ascii
            | FormatCode::Jis8
            | FormatCode::Int1
            | FormatCode::Uint1 => 1,
            FormatCode::Int2 | FormatCode::Uint2 => 2,
            FormatCode::Int4 | FormatCode::Uint4 | FormatCode::Float4 => 4,
            FormatCode::Int8 | FormatCode::Uint8 | FormatCode::Float8 => 8,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, FormatCode::List)
    }
}

/// A decoded SECS-II item: either a leaf with a typed payload, or a list of
/// child items in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    List(Vec<Item>),
    Binary(Vec<u8>),
    Boolean(Vec<bool>),
    /// Raw bytes of an ASCII item. Not guaranteed to be valid UTF-8 on
    /// malformed input; use [`Item::as_ascii_lossy`] for display purposes.
    Ascii(Vec<u8>),
    /// Raw bytes of a JIS-8 item. JIS-8 is not a UTF-8-compatible encoding,
    /// so no string conversion is offered here.
    Jis8(Vec<u8>),
    Int1(Vec<i8>),
    Int2(Vec<i16>),
    Int4(Vec<i32>),
    Int8(Vec<i64>),
    Uint1(Vec<u8>),
    Uint2(Vec<u16>),
    Uint4(Vec<u32>),
    Uint8(Vec<u64>),
    Float4(Vec<f32>),
    Float8(Vec<f64>),
}

impl Item {
    pub fn format_code(&self) -> FormatCode {
        match self {
            Item::List(_) => FormatCode::List,
            Item::Binary(_) => FormatCode::Binary,
            Item::Boolean(_) => FormatCode::Boolean,
            Item::Ascii(_) => FormatCode::Ascii,
            Item::Jis8(_) => FormatCode::Jis8,
            Item::Int1(_) => FormatCode::Int1,
            Item::Int2(_) => FormatCode::Int2,
            Item::Int4(_) => FormatCode::Int4,
            Item::Int8(_) => FormatCode::Int8,
            Item::Uint1(_) => FormatCode::Uint1,
            Item::Uint2(_) => FormatCode::Uint2,
            Item::Uint4(_) => FormatCode::Uint4,
            Item::Uint8(_) => FormatCode::Uint8,
            Item::Float4(_) => FormatCode::Float4,
            Item::Float8(_) => FormatCode::Float8,
        }
    }

    /// Renders an ASCII item's bytes as a `String`, replacing invalid
    /// sequences with the Unicode replacement character.
    pub fn as_ascii_lossy(&self) -> Option<String> {
        match self {
            Item::Ascii(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        }
    }

    /// Decodes a leaf item's payload. `bytes.len()` must be a multiple of
    /// `format.element_size()`; violating this is the caller's (the state
    /// machine's) protocol error to raise, not this function's panic.
    pub(crate) fn decode_leaf(format: FormatCode, bytes: &[u8]) -> Result<Item, Error> {
        let elem = format.element_size();
        if elem > 0 && bytes.len() % elem != 0 {
            return Err(Error::Protocol(format!(
                "item payload of {} bytes is not a multiple of element size {elem}",
                bytes.len()
            )));
        }
        Ok(match format {
            FormatCode::List => unreachable!("lists are assembled via the item stack, not decode_leaf"),
            FormatCode::Binary => Item::Binary(bytes.to_vec()),
            FormatCode::Boolean => Item::Boolean(bytes.iter().map(|&b| b != 0).collect()),
            FormatCode::Ascii => Item::Ascii(bytes.to_vec()),
            FormatCode::Jis8 => Item::Jis8(bytes.to_vec()),
            FormatCode::Int1 => Item::Int1(bytes.iter().map(|&b| b as i8).collect()),
            FormatCode::Uint1 => Item::Uint1(bytes.to_vec()),
            FormatCode::Int2 => Item::Int2(
                bytes
                    .chunks_exact(2)
                    .map(|c| i16::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Uint2 => Item::Uint2(
                bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Int4 => Item::Int4(
                bytes
                    .chunks_exact(4)
                    .map(|c| i32::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Uint4 => Item::Uint4(
                bytes
                    .chunks_exact(4)
                    .map(|c| u32::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Float4 => Item::Float4(
                bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Int8 => Item::Int8(
                bytes
                    .chunks_exact(8)
                    .map(|c| i64::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Uint8 => Item::Uint8(
                bytes
                    .chunks_exact(8)
                    .map(|c| u64::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
            FormatCode::Float8 => Item::Float8(
                bytes
                    .chunks_exact(8)
                    .map(|c| f64::from_be_bytes(c.try_into().unwrap()))
                    .collect(),
            ),
        })
    }
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::List(children) => write!(f, "L[{}]", children.len()),
            Item::Binary(b) => write!(f, "B[{}]", b.len()),
            Item::Boolean(b) => write!(f, "BOOLEAN[{}]", b.len()),
            Item::Ascii(b) => write!(f, "A\"{}\"", String::from_utf8_lossy(b)),
            Item::Jis8(b) => write!(f, "J[{}]", b.len()),
            Item::Int1(v) => write!(f, "I1{v:?}"),
            Item::Int2(v) => write!(f, "I2{v:?}"),
            Item::Int4(v) => write!(f, "I4{v:?}"),
            Item::Int8(v) => write!(f, "I8{v:?}"),
            Item::Uint1(v) => write!(f, "U1{v:?}"),
            Item::Uint2(v) => write!(f, "U2{v:?}"),
            Item::Uint4(v) => write!(f, "U4{v:?}"),
            Item::Uint8(v) => write!(f, "U8{v:?}"),
            Item::Float4(v) => write!(f, "F4{v:?}"),
            Item::Float8(v) => write!(f, "F8{v:?}"),
        }
    }
}
