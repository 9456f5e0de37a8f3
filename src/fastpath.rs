//! The non-streaming fast path: when a message's entire body is already
//! buffered, parse its item tree with ordinary recursion instead of driving
//! the stack machine. Produces item trees identical to the slow path; see
//! [`crate::decoder`] for the resumable equivalent.

use crate::error::Error;
use crate::item::{FormatCode, Item};

/// Parses exactly one item (recursively, for lists) from the front of
/// `bytes`, returning the item and the number of bytes consumed.
pub fn parse_item(bytes: &[u8]) -> Result<(Item, usize), Error> {
    if bytes.is_empty() {
        return Err(Error::Protocol("item header truncated".into()));
    }
    let format_byte = bytes[0];
    let code = format_byte >> 2;
    let length_bits = format_byte & 0x3;
    if length_bits == 0 {
        return Err(Error::Protocol(
            "length_bits == 0 is not valid on the wire".into(),
        ));
    }
    let format = FormatCode::from_top6(code)
        .ok_or_else(|| Error::Protocol(format!("unknown item format code {code:#08b}")))?;
    let length_bits = length_bits as usize;
    if bytes.len() < 1 + length_bits {
        return Err(Error::Protocol("item length field truncated".into()));
    }
    let mut len_buf = [0u8; 4];
    len_buf[4 - length_bits..].copy_from_slice(&bytes[1..1 + length_bits]);
    let length = u32::from_be_bytes(len_buf);
    let header_len = 1 + length_bits;

    if format.is_list() {
        let mut children = Vec::with_capacity(length as usize);
        let mut used = header_len;
        for _ in 0..length {
            let (child, consumed) = parse_item(&bytes[used..])?;
            children.push(child);
            used += consumed;
        }
        Ok((Item::List(children), used))
    } else {
        let payload_len = length as usize;
        if bytes.len() < header_len + payload_len {
            return Err(Error::Protocol("item payload truncated".into()));
        }
        let item = Item::decode_leaf(format, &bytes[header_len..header_len + payload_len])?;
        Ok((item, header_len + payload_len))
    }
}
