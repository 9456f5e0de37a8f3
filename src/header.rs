//! The fixed 10-byte HSMS message header.

/// The length of an encoded [`Header`] in bytes.
pub const HEADER_LEN: usize = 10;

/// Distinguishes a data message from the HSMS session-management control
/// messages. Values match the HSMS standard's `message_type` byte.
///
/// Framing only needs to know whether a message carries an item tree
/// (`DataMessage`) or not (everything else); this enum does not validate
/// HSMS session semantics (e.g. that a `SelectRsp` is only legal after a
/// `SelectReq`), which remains the connection object's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    DataMessage,
    SelectReq,
    SelectRsp,
    DeselectReq,
    DeselectRsp,
    LinktestReq,
    LinktestRsp,
    RejectReq,
    SeparateReq,
    /// A `message_type` byte not in the HSMS standard. Framing still works —
    /// only the data/control distinction matters here — so unknown values
    /// round-trip instead of becoming a protocol error.
    Reserved(u8),
}

impl MessageType {
    pub fn is_data_message(self) -> bool {
        matches!(self, MessageType::DataMessage)
    }
}

impl From<u8> for MessageType {
    fn from(byte: u8) -> Self {
        match byte {
            0 => MessageType::DataMessage,
            1 => MessageType::SelectReq,
            2 => MessageType::SelectRsp,
            3 => MessageType::DeselectReq,
            4 => MessageType::DeselectRsp,
            5 => MessageType::LinktestReq,
            6 => MessageType::LinktestRsp,
            7 => MessageType::RejectReq,
            9 => MessageType::SeparateReq,
            other => MessageType::Reserved(other),
        }
    }
}

impl From<MessageType> for u8 {
    fn from(mt: MessageType) -> Self {
        match mt {
            MessageType::DataMessage => 0,
            MessageType::SelectReq => 1,
            MessageType::SelectRsp => 2,
            MessageType::DeselectReq => 3,
            MessageType::DeselectRsp => 4,
            MessageType::LinktestReq => 5,
            MessageType::LinktestRsp => 6,
            MessageType::RejectReq => 7,
            MessageType::SeparateReq => 9,
            MessageType::Reserved(b) => b,
        }
    }
}

/// The fixed 10-byte record that precedes every message's item tree (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub device_id: u16,
    pub reply_expected: bool,
    /// 7-bit stream code.
    pub s: u8,
    pub f: u8,
    pub message_type: MessageType,
    /// Correlation id, signed per the wire format's 32-bit big-endian field.
    pub system_bytes: i32,
}

impl Header {
    /// Writes the 10-byte header encoding into `out`.
    ///
    /// `out` must be exactly [`HEADER_LEN`] bytes; this mirrors the
    /// triviality of the decode direction and keeps both halves of the codec
    /// allocation-free.
    pub fn encode(&self, out: &mut [u8; HEADER_LEN]) {
        out[0..2].copy_from_slice(&self.device_id.to_be_bytes());
        let s_byte = (self.s & 0x7f) | if self.reply_expected { 0x80 } else { 0 };
        out[2] = s_byte;
        out[3] = self.f;
        out[4] = 0;
        out[5] = self.message_type.into();
        out[6..10].copy_from_slice(&self.system_bytes.to_be_bytes());
    }

    /// Decodes a 10-byte header record.
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Header {
        let device_id = u16::from_be_bytes([bytes[0], bytes[1]]);
        let reply_expected = bytes[2] & 0x80 != 0;
        let s = bytes[2] & 0x7f;
        let f = bytes[3];
        let message_type = MessageType::from(bytes[5]);
        let system_bytes = i32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        Header {
            device_id,
            reply_expected,
            s,
            f,
            message_type,
            system_bytes,
        }
    }
}

impl std::fmt::Display for Header {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "S{}F{}{} dev={} sys={}",
            self.s,
            self.f,
            if self.reply_expected { "W" } else { "" },
            self.device_id,
            self.system_bytes
        )
    }
}
