//! A minimal wire encoder used only to build fixtures for the integration
//! tests below. Not part of the library's public API: encoding a message is
//! explicitly out of scope for `hsms-codec` itself.

#![allow(dead_code)]

use hsms_codec::{FormatCode, Header, Item, HEADER_LEN};

pub fn encode_item(item: &Item, out: &mut Vec<u8>) {
    match item {
        Item::List(children) => {
            write_format_and_len(out, FormatCode::List, children.len() as u32);
            for child in children {
                encode_item(child, out);
            }
        }
        Item::Binary(b) => write_leaf(out, FormatCode::Binary, b),
        Item::Boolean(b) => {
            let bytes: Vec<u8> = b.iter().map(|&v| v as u8).collect();
            write_leaf(out, FormatCode::Boolean, &bytes);
        }
        Item::Ascii(b) => write_leaf(out, FormatCode::Ascii, b),
        Item::Jis8(b) => write_leaf(out, FormatCode::Jis8, b),
        Item::Int1(v) => write_leaf(out, FormatCode::Int1, &v.iter().map(|&x| x as u8).collect::<Vec<_>>()),
        Item::Uint1(v) => write_leaf(out, FormatCode::Uint1, v),
        Item::Int2(v) => write_leaf_be(out, FormatCode::Int2, v, |x| x.to_be_bytes().to_vec()),
        Item::Uint2(v) => write_leaf_be(out, FormatCode::Uint2, v, |x| x.to_be_bytes().to_vec()),
        Item::Int4(v) => write_leaf_be(out, FormatCode::Int4, v, |x| x.to_be_bytes().to_vec()),
        Item::Uint4(v) => write_leaf_be(out, FormatCode::Uint4, v, |x| x.to_be_bytes().to_vec()),
        Item::Int8(v) => write_leaf_be(out, FormatCode::Int8, v, |x| x.to_be_bytes().to_vec()),
        Item::Uint8(v) => write_leaf_be(out, FormatCode::Uint8, v, |x| x.to_be_bytes().to_vec()),
        Item::Float4(v) => write_leaf_be(out, FormatCode::Float4, v, |x| x.to_be_bytes().to_vec()),
        Item::Float8(v) => write_leaf_be(out, FormatCode::Float8, v, |x| x.to_be_bytes().to_vec()),
    }
}

fn write_leaf_be<T: Copy>(out: &mut Vec<u8>, format: FormatCode, v: &[T], to_be: impl Fn(T) -> Vec<u8>) {
    let mut bytes = Vec::with_capacity(v.len() * format.element_size());
    for &x in v {
        bytes.extend_from_slice(&to_be(x));
    }
    write_leaf(out, format, &bytes);
}

fn write_leaf(out: &mut Vec<u8>, format: FormatCode, payload: &[u8]) {
    write_format_and_len(out, format, payload.len() as u32);
    out.extend_from_slice(payload);
}

fn write_format_and_len(out: &mut Vec<u8>, format: FormatCode, len: u32) {
    let length_bits: u8 = if len <= 0xFF {
        1
    } else if len <= 0xFFFF {
        2
    } else {
        3
    };
    let code = top6(format);
    out.push((code << 2) | length_bits);
    let be = len.to_be_bytes();
    out.extend_from_slice(&be[4 - length_bits as usize..]);
}

fn top6(format: FormatCode) -> u8 {
    match format {
        FormatCode::List => 0b000000,
        FormatCode::Binary => 0b001000,
        FormatCode::Boolean => 0b001001,
        FormatCode::Ascii => 0b010000,
        FormatCode::Jis8 => 0b010001,
        FormatCode::Int8 => 0b011000,
        FormatCode::Int1 => 0b011001,
        FormatCode::Int2 => 0b011010,
        FormatCode::Int4 => 0b011100,
        FormatCode::Float8 => 0b100000,
        FormatCode::Float4 => 0b100100,
        FormatCode::Uint8 => 0b101000,
        FormatCode::Uint1 => 0b101001,
        FormatCode::Uint2 => 0b101010,
        FormatCode::Uint4 => 0b101100,
    }
}

/// Builds a complete message: length prefix + header + optional item body.
pub fn encode_message(header: &Header, item: Option<&Item>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(item) = item {
        encode_item(item, &mut body);
    }
    let total_length = (HEADER_LEN + body.len()) as u32;

    let mut header_bytes = [0u8; HEADER_LEN];
    header.encode(&mut header_bytes);

    let mut out = Vec::with_capacity(4 + total_length as usize);
    out.extend_from_slice(&total_length.to_be_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&body);
    out
}

use hsms_codec::{Decoder, DecoderConfig};
use std::sync::{Arc, Mutex};

/// A `Decoder` plus capture buffers for both upcalls, for tests that only
/// care what arrived and in what order.
pub struct Harness {
    pub decoder: Decoder,
    pub controls: Arc<Mutex<Vec<Header>>>,
    pub datas: Arc<Mutex<Vec<(Header, Option<Item>)>>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        let controls = Arc::new(Mutex::new(Vec::new()));
        let datas = Arc::new(Mutex::new(Vec::new()));
        let controls_clone = controls.clone();
        let datas_clone = datas.clone();
        let decoder = Decoder::new(
            config,
            move |header| controls_clone.lock().unwrap().push(header),
            move |header, message| datas_clone.lock().unwrap().push((header, message.item)),
        );
        Harness {
            decoder,
            controls,
            datas,
        }
    }

    /// Writes `bytes` into the writable tail and runs `decode` over them,
    /// returning the decoder's `in_message` result. Writes in several rounds
    /// if `bytes` is larger than the current writable tail, mirroring how a
    /// real transport read loop can only fill what's currently available.
    pub fn feed(&self, bytes: &[u8]) -> bool {
        let mut offset = 0;
        let mut in_message = false;
        while offset < bytes.len() {
            let remaining = &bytes[offset..];
            let n = self.decoder.fill_writable_tail(|tail| {
                let take = remaining.len().min(tail.len());
                tail[..take].copy_from_slice(&remaining[..take]);
                take
            });
            offset += n;
            in_message = self.decoder.decode(n as isize).unwrap();
        }
        in_message
    }
}

pub fn select_req_header() -> Header {
    Header {
        device_id: 1,
        reply_expected: false,
        s: 0,
        f: 0,
        message_type: hsms_codec::MessageType::SelectReq,
        system_bytes: 2,
    }
}

pub fn data_header(s: u8, f: u8, reply_expected: bool, system_bytes: i32) -> Header {
    Header {
        device_id: 1,
        reply_expected,
        s,
        f,
        message_type: hsms_codec::MessageType::DataMessage,
        system_bytes,
    }
}
