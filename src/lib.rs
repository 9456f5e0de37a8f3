//! A streaming decoder for the HSMS/SECS-II wire protocol — the framing and
//! payload language used to connect semiconductor manufacturing equipment.
//!
//! The decoder ingests a byte stream delivered in arbitrary-sized chunks (as
//! it arrives from a transport socket) and emits fully-reconstructed
//! messages — a [`Header`] plus an optional, recursively-structured
//! [`Item`] tree — to two upcall handlers. It performs no I/O of its own: the
//! TCP transport, the HSMS select/linktest/separate session state machine,
//! reply correlation, and SML pretty-printing are all external collaborators.
//!
//! # Example
//!
//! ```
//! use hsms_codec::{Decoder, DecoderConfig};
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//!
//! let decoder = Decoder::new(
//!     DecoderConfig::default(),
//!     |_header| {},
//!     move |_header, message| seen_clone.lock().unwrap().push(message),
//! );
//!
//! // Empty-body data message: S1F1, reply expected, system bytes = 3.
//! let wire: [u8; 14] = [
//!     0x00, 0x00, 0x00, 0x0A, 0x00, 0x01, 0x81, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03,
//! ];
//! let n = decoder.fill_writable_tail(|tail| {
//!     tail[..wire.len()].copy_from_slice(&wire);
//!     wire.len()
//! });
//! let in_message = decoder.decode(n as isize).unwrap();
//! assert!(!in_message);
//! assert_eq!(seen.lock().unwrap().len(), 1);
//! ```

mod buffer;
mod config;
mod decoder;
mod error;
mod fastpath;
mod header;
mod item;
mod spinlock;
mod state;

pub use config::DecoderConfig;
pub use decoder::{Decoder, SecsMessage};
pub use error::Error;
pub use header::{Header, MessageType, HEADER_LEN};
pub use item::{FormatCode, Item};
