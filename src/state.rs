//! The five-step pull-parser state and the iterative list-assembly stack.

use crate::header::Header;
use crate::item::{FormatCode, Item};

/// The five steps of the framing pipeline. Each step reads a fixed or
/// known-dynamic slice starting at the buffer's decode cursor; if the bytes
/// aren't there yet, the same step is re-entered on the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Length,
    Header,
    ItemHeader,
    ItemLen,
    ItemBody,
}

/// An unclosed list ancestor of the item currently being parsed: how many
/// children it still expects, and the ones it has already collected, in
/// insertion order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub target_arity: u32,
    pub children: Vec<Item>,
}

impl Frame {
    pub fn is_complete(&self) -> bool {
        self.children.len() as u32 == self.target_arity
    }
}

/// All state the state machine needs to resume across an arbitrary number of
/// `decode` calls.
#[derive(Debug)]
pub struct ParserState {
    pub step: Step,
    /// Bytes of the current message not yet consumed from the wire. Covers
    /// the remaining header bytes until `Header` completes, then only body
    /// bytes.
    pub message_remaining: u64,
    /// The declared total length `L` of the message currently in progress
    /// (header + body). Retained only to bias the buffer manager's
    /// reallocation floor toward whole-message residency; zero when no
    /// message is in progress.
    pub total_length: u64,
    pub current_format: Option<FormatCode>,
    pub current_length_bits: u8,
    pub current_item_length: u32,
    pub current_header: Option<Header>,
    pub stack: Vec<Frame>,
}

impl ParserState {
    pub fn new() -> Self {
        ParserState {
            step: Step::Length,
            message_remaining: 0,
            total_length: 0,
            current_format: None,
            current_length_bits: 0,
            current_item_length: 0,
            current_header: None,
            stack: Vec::new(),
        }
    }

    /// Returns to a fresh `Length` step after a message has been fully
    /// dispatched (or after a caller-initiated reset).
    pub fn reset(&mut self) {
        self.step = Step::Length;
        self.message_remaining = 0;
        self.total_length = 0;
        self.current_format = None;
        self.current_length_bits = 0;
        self.current_item_length = 0;
        self.current_header = None;
        self.stack.clear();
    }

    pub fn in_message(&self) -> bool {
        self.step != Step::Length
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}
