//! The decoder's error model: stalls are invisible, caller misuse is
//! `InvalidArgument`, and framing/semantic anomalies are `Protocol` errors
//! that poison the decoder until `reset()`.

mod common;

use common::{data_header, select_req_header, Harness};
use hsms_codec::Error;

#[test]
fn decode_with_non_positive_count_is_invalid_argument() {
    let h = Harness::new();
    let err = h.decoder.decode(0).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    let err = h.decoder.decode(-1).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    // A bad call leaves the decoder usable afterward.
    assert!(!h.decoder.is_poisoned());
}

#[test]
fn control_message_with_declared_nonzero_body_is_a_protocol_error() {
    let h = Harness::new();
    let mut header = select_req_header();
    header.message_type = hsms_codec::MessageType::SelectReq;
    let mut wire = common::encode_message(&header, None);
    // Declare a body that was never written: bump the length prefix by 3
    // without adding any payload bytes, then pad so the decoder actually
    // sees three body bytes to reject.
    let declared_len = u32::from_be_bytes(wire[0..4].try_into().unwrap()) + 3;
    wire[0..4].copy_from_slice(&declared_len.to_be_bytes());
    wire.extend_from_slice(&[0u8; 3]);

    let n = h.decoder.fill_writable_tail(|tail| {
        tail[..wire.len()].copy_from_slice(&wire);
        wire.len()
    });
    let result = h.decoder.decode(n as isize);
    assert!(matches!(result, Err(Error::Protocol(_))));
    assert!(h.decoder.is_poisoned());
}

#[test]
fn length_bits_zero_is_a_protocol_error() {
    let h = Harness::new();
    let header = data_header(1, 1, false, 1);
    let mut wire = common::encode_message(&header, None);
    // Append one item header byte with length_bits == 0 (format=ASCII, low
    // 2 bits zero) and bump the declared length to cover it.
    wire.extend_from_slice(&[0b01000000]);
    let new_len = (wire.len() - 4) as u32;
    wire[0..4].copy_from_slice(&new_len.to_be_bytes());

    let n = h.decoder.fill_writable_tail(|tail| {
        tail[..wire.len()].copy_from_slice(&wire);
        wire.len()
    });
    let result = h.decoder.decode(n as isize);
    assert!(matches!(result, Err(Error::Protocol(_))));
    assert!(h.decoder.is_poisoned());
}

#[test]
fn unknown_format_code_is_a_protocol_error() {
    let h = Harness::new();
    let header = data_header(1, 1, false, 1);
    let mut wire = common::encode_message(&header, None);
    // 0b111111 is not a defined SECS-II format code; length_bits = 1.
    wire.extend_from_slice(&[0b11111101, 0x00]);
    let new_len = (wire.len() - 4) as u32;
    wire[0..4].copy_from_slice(&new_len.to_be_bytes());

    let n = h.decoder.fill_writable_tail(|tail| {
        tail[..wire.len()].copy_from_slice(&wire);
        wire.len()
    });
    let result = h.decoder.decode(n as isize);
    assert!(matches!(result, Err(Error::Protocol(_))));
}

#[test]
fn item_payload_overflowing_declared_message_body_is_a_protocol_error() {
    // Declares a message body of exactly 2 bytes (an ASCII item's format
    // and length bytes, nothing else) but the item claims a 5-byte
    // payload. The item header is fed on its own so the whole body isn't
    // buffered yet and the decoder commits to the slow, resumable item
    // path instead of the fast whole-body path; by the time the 5 payload
    // bytes arrive, `message_remaining` has already dropped to 0, so
    // consuming them overflows the message's declared length rather than
    // merely running past a truncated buffer.
    let header = data_header(1, 1, false, 1);
    let mut header_bytes = [0u8; hsms_codec::HEADER_LEN];
    header.encode(&mut header_bytes);

    let declared_total_length: u32 = (hsms_codec::HEADER_LEN + 2) as u32;
    let mut wire = Vec::new();
    wire.extend_from_slice(&declared_total_length.to_be_bytes());
    wire.extend_from_slice(&header_bytes);
    wire.push(0b01000001); // ASCII, length_bits = 1
    wire.push(5); // claims a 5-byte payload
    wire.extend_from_slice(&[b'x'; 5]); // present on the wire, but outside the declared body

    let h = Harness::new();
    assert!(h.feed(&wire[0..14])); // length prefix + header only; message still in progress
    // Item header + length: still no error, just advances the state machine.
    let n = h.decoder.fill_writable_tail(|tail| {
        tail[..2].copy_from_slice(&wire[14..16]);
        2
    });
    h.decoder.decode(n as isize).unwrap();
    assert!(!h.decoder.is_poisoned());

    // The payload bytes push item-framing consumption past message_remaining.
    let n = h.decoder.fill_writable_tail(|tail| {
        tail[..5].copy_from_slice(&wire[16..21]);
        5
    });
    let result = h.decoder.decode(n as isize);
    assert!(matches!(result, Err(Error::Protocol(_))));
    assert!(h.decoder.is_poisoned());
}

#[test]
fn declared_length_shorter_than_header_is_a_protocol_error() {
    let h = Harness::new();
    let mut wire = vec![0u8; 14];
    wire[0..4].copy_from_slice(&9u32.to_be_bytes()); // shorter than HEADER_LEN=10

    let n = h.decoder.fill_writable_tail(|tail| {
        tail[..wire.len()].copy_from_slice(&wire);
        wire.len()
    });
    let result = h.decoder.decode(n as isize);
    assert!(matches!(result, Err(Error::Protocol(_))));
}
