//! The decoder: receive buffer, framing state machine, and item stack bound
//! together behind one exclusive lock.

use crate::buffer::ReceiveBuffer;
use crate::config::DecoderConfig;
use crate::error::Error;
use crate::fastpath;
use crate::header::{Header, HEADER_LEN};
use crate::item::{FormatCode, Item};
use crate::spinlock::Spinlock;
use crate::state::{Frame, ParserState, Step};

/// The decoded body of a data message: the stream/function pair, whether a
/// reply is expected, and the root item (absent for an empty body).
///
/// `s`, `f`, and `reply_expected` duplicate fields already present on the
/// accompanying [`Header`] passed alongside this type to
/// [`on_data_message`](Decoder::new) upcalls; both are delivered because the
/// wire-level spec models the decoded message as its own value distinct from
/// the header record it was framed with.
#[derive(Debug, Clone, PartialEq)]
pub struct SecsMessage {
    pub s: u8,
    pub f: u8,
    pub reply_expected: bool,
    pub item: Option<Item>,
}

type ControlHandler = Box<dyn FnMut(Header) + Send>;
type DataHandler = Box<dyn FnMut(Header, SecsMessage) + Send>;

struct Inner {
    buffer: ReceiveBuffer,
    state: ParserState,
    poisoned: Option<String>,
    on_control_message: ControlHandler,
    on_data_message: DataHandler,
}

/// Outcome of advancing exactly one step of the framing pipeline.
enum StepOutcome {
    /// The step consumed bytes (or dispatched a message) and the driver
    /// should immediately re-evaluate — possibly a different step.
    Progress,
    /// Not enough bytes are buffered to complete the current step; `usize`
    /// is the shortfall.
    Stall(usize),
}

impl Inner {
    fn run_to_stall(&mut self) -> Result<usize, Error> {
        loop {
            match self.step_once() {
                Ok(StepOutcome::Progress) => continue,
                Ok(StepOutcome::Stall(need)) => return Ok(need),
                Err(e) => {
                    let reason = e.to_string();
                    #[cfg(feature = "logwise")]
                    logwise::error_sync!(
                        "Decoder: entering poisoned state: {reason}",
                        reason = reason.clone()
                    );
                    self.poisoned = Some(reason);
                    return Err(e);
                }
            }
        }
    }

    fn step_once(&mut self) -> Result<StepOutcome, Error> {
        match self.state.step {
            Step::Length => self.step_length(),
            Step::Header => self.step_header(),
            Step::ItemHeader => self.step_item_header(),
            Step::ItemLen => self.step_item_len(),
            Step::ItemBody => self.step_item_body(),
        }
    }

    fn consume_message_bytes(&mut self, n: u64) -> Result<(), Error> {
        if n > self.state.message_remaining {
            return Err(Error::Protocol(format!(
                "item framing consumed {n} bytes but only {} remained in the message body",
                self.state.message_remaining
            )));
        }
        self.state.message_remaining -= n;
        Ok(())
    }

    fn step_length(&mut self) -> Result<StepOutcome, Error> {
        let avail = self.buffer.unread_len();
        if avail < 4 {
            return Ok(StepOutcome::Stall(4 - avail));
        }
        let bytes: [u8; 4] = self.buffer.unread()[..4].try_into().unwrap();
        self.buffer.advance_decode(4);
        let total_length = u32::from_be_bytes(bytes) as u64;
        if total_length < HEADER_LEN as u64 {
            return Err(Error::Protocol(format!(
                "declared message length {total_length} is shorter than the header"
            )));
        }
        self.state.total_length = total_length;
        self.state.message_remaining = total_length;
        self.state.step = Step::Header;
        Ok(StepOutcome::Progress)
    }

    fn step_header(&mut self) -> Result<StepOutcome, Error> {
        let avail = self.buffer.unread_len();
        if avail < HEADER_LEN {
            return Ok(StepOutcome::Stall(HEADER_LEN - avail));
        }
        let bytes: [u8; HEADER_LEN] = self.buffer.unread()[..HEADER_LEN].try_into().unwrap();
        self.buffer.advance_decode(HEADER_LEN);
        let header = Header::decode(&bytes);
        self.consume_message_bytes(HEADER_LEN as u64)?;
        self.state.current_header = Some(header);

        if self.state.message_remaining == 0 {
            if header.message_type.is_data_message() {
                self.dispatch_data(header, None);
            } else {
                (self.on_control_message)(header);
            }
            self.state.reset();
            return Ok(StepOutcome::Progress);
        }

        if !header.message_type.is_data_message() {
            return Err(Error::Protocol(format!(
                "control message {:?} declared a non-empty body ({} bytes)",
                header.message_type, self.state.message_remaining
            )));
        }

        // Fast path (§4.3): if the whole body is already buffered, parse it
        // with ordinary recursion instead of driving the stack machine.
        let body_len = self.state.message_remaining as usize;
        if self.buffer.unread_len() >= body_len {
            let body = &self.buffer.unread()[..body_len];
            let (item, consumed) = fastpath::parse_item(body)?;
            if consumed != body_len {
                return Err(Error::Protocol(format!(
                    "item tree consumed {consumed} bytes but the message body is {body_len}"
                )));
            }
            self.buffer.advance_decode(body_len);
            self.dispatch_data(header, Some(item));
            self.state.reset();
            return Ok(StepOutcome::Progress);
        }

        self.state.step = Step::ItemHeader;
        Ok(StepOutcome::Progress)
    }

    fn step_item_header(&mut self) -> Result<StepOutcome, Error> {
        let avail = self.buffer.unread_len();
        if avail < 1 {
            return Ok(StepOutcome::Stall(1 - avail));
        }
        let byte = self.buffer.unread()[0];
        self.buffer.advance_decode(1);
        self.consume_message_bytes(1)?;

        let length_bits = byte & 0x3;
        if length_bits == 0 {
            return Err(Error::Protocol(
                "length_bits == 0 is not valid on the wire".into(),
            ));
        }
        let code = byte >> 2;
        let format = FormatCode::from_top6(code)
            .ok_or_else(|| Error::Protocol(format!("unknown item format code {code:#08b}")))?;

        self.state.current_format = Some(format);
        self.state.current_length_bits = length_bits;
        self.state.step = Step::ItemLen;
        Ok(StepOutcome::Progress)
    }

    fn step_item_len(&mut self) -> Result<StepOutcome, Error> {
        let length_bits = self.state.current_length_bits as usize;
        let avail = self.buffer.unread_len();
        if avail < length_bits {
            return Ok(StepOutcome::Stall(length_bits - avail));
        }
        let bytes = &self.buffer.unread()[..length_bits];
        let mut len_buf = [0u8; 4];
        len_buf[4 - length_bits..].copy_from_slice(bytes);
        let length = u32::from_be_bytes(len_buf);
        self.buffer.advance_decode(length_bits);
        self.consume_message_bytes(length_bits as u64)?;

        self.state.current_item_length = length;
        self.state.step = Step::ItemBody;
        Ok(StepOutcome::Progress)
    }

    fn step_item_body(&mut self) -> Result<StepOutcome, Error> {
        let format = self.state.current_format.expect("format set by ItemHeader");
        let length = self.state.current_item_length;

        if format.is_list() {
            if length > 0 {
                self.state.stack.push(Frame {
                    target_arity: length,
                    children: Vec::with_capacity(length as usize),
                });
                self.state.step = Step::ItemHeader;
                return Ok(StepOutcome::Progress);
            }
            return self.complete_item(Item::List(Vec::new()));
        }

        let need_bytes = length as usize;
        let avail = self.buffer.unread_len();
        if avail < need_bytes {
            return Ok(StepOutcome::Stall(need_bytes - avail));
        }
        let bytes = &self.buffer.unread()[..need_bytes];
        let item = Item::decode_leaf(format, bytes)?;
        self.buffer.advance_decode(need_bytes);
        self.consume_message_bytes(need_bytes as u64)?;
        self.complete_item(item)
    }

    /// Folds a just-produced item into its parent list (if any), repeatedly
    /// closing out any ancestor frames that just reached their target arity,
    /// and dispatches the message once the root item is known.
    fn complete_item(&mut self, mut item: Item) -> Result<StepOutcome, Error> {
        loop {
            if self.state.stack.is_empty() {
                let header = self
                    .state
                    .current_header
                    .expect("header decoded before any item");
                self.dispatch_data(header, Some(item));
                self.state.reset();
                return Ok(StepOutcome::Progress);
            }

            let frame_complete = {
                let frame = self.state.stack.last_mut().unwrap();
                frame.children.push(item);
                frame.is_complete()
            };
            if !frame_complete {
                self.state.step = Step::ItemHeader;
                return Ok(StepOutcome::Progress);
            }
            let frame = self.state.stack.pop().unwrap();
            item = Item::List(frame.children);
        }
    }

    fn dispatch_data(&mut self, header: Header, item: Option<Item>) {
        let message = SecsMessage {
            s: header.s,
            f: header.f,
            reply_expected: header.reply_expected,
            item,
        };
        (self.on_data_message)(header, message);
    }
}

/// A streaming HSMS/SECS-II decoder.
///
/// Feed it bytes as they arrive (in any chunking) via [`Decoder::fill_writable_tail`]
/// followed by [`Decoder::decode`]; completed messages are delivered through the
/// two upcalls supplied to [`Decoder::new`]. See the crate documentation for the
/// full contract.
///
/// All state transitions happen inside `decode`/`reset`, which take this
/// codebase's [`Spinlock`] rather than a raw `&mut self`, so a `Decoder` can be
/// shared as `Arc<Decoder>` across a thread that reads the transport and a
/// thread that happens to call `reset` on disconnect, without an outer mutex.
pub struct Decoder {
    inner: Spinlock<Inner>,
}

impl Decoder {
    /// Creates a decoder with the given configuration and upcall handlers.
    ///
    /// `on_control_message` fires once per complete control message (always
    /// zero body). `on_data_message` fires once per complete data message,
    /// with `item` absent when the message's body is empty.
    pub fn new(
        config: DecoderConfig,
        on_control_message: impl FnMut(Header) + Send + 'static,
        on_data_message: impl FnMut(Header, SecsMessage) + Send + 'static,
    ) -> Self {
        Decoder {
            inner: Spinlock::new(Inner {
                buffer: ReceiveBuffer::new(&config),
                state: ParserState::new(),
                poisoned: None,
                on_control_message: Box::new(on_control_message),
                on_data_message: Box::new(on_data_message),
            }),
        }
    }

    /// Remaining capacity in the buffer's writable tail.
    pub fn writable_tail_len(&self) -> usize {
        self.inner.with_mut(|inner| inner.buffer.writable_tail_len())
    }

    /// Runs `f` against the current writable tail slice and returns its
    /// result. `f` should write new bytes starting at index 0 and return how
    /// many bytes it wrote; the decoder commits exactly that many.
    ///
    /// This takes the place of the bare `writable_tail()` accessor: this
    /// codebase's spinlock only ever hands out scoped access via a closure
    /// (see [`Spinlock::with_mut`]), since a `&mut [u8]` borrow cannot
    /// safely outlive the lock's critical section. Follow the call
    /// immediately with [`Decoder::decode`] passing the same count.
    pub fn fill_writable_tail(&self, f: impl FnOnce(&mut [u8]) -> usize) -> usize {
        self.inner.with_mut(|inner| {
            let n = f(inner.buffer.writable_tail());
            inner.buffer.commit_write(n);
            n
        })
    }

    /// Advances the state machine over `n_new_bytes` freshly written into
    /// the writable tail (see [`Decoder::fill_writable_tail`]).
    ///
    /// Returns `Ok(true)` if the decoder is mid-message (has consumed a
    /// length prefix but not yet dispatched), `Ok(false)` if it is sitting
    /// idle at a fresh message boundary. `n_new_bytes` must already have been
    /// committed via `fill_writable_tail`; this method does not re-commit it.
    pub fn decode(&self, n_new_bytes: isize) -> Result<bool, Error> {
        if n_new_bytes <= 0 {
            return Err(Error::InvalidArgument(format!(
                "decode() requires n_new_bytes > 0, got {n_new_bytes}"
            )));
        }
        self.inner.with_mut(|inner| {
            if let Some(reason) = &inner.poisoned {
                return Err(Error::Protocol(format!(
                    "decoder is poisoned until reset(): {reason}"
                )));
            }
            let need = inner.run_to_stall()?;
            let total_length = inner.state.total_length;
            inner.buffer.reconcile(need, total_length);
            Ok(inner.state.in_message())
        })
    }

    /// Whether the decoder is poisoned by a prior `Error::Protocol` and
    /// requires `reset()` before it will accept more bytes.
    pub fn is_poisoned(&self) -> bool {
        self.inner.with_mut(|inner| inner.poisoned.is_some())
    }

    /// Abandons any partially-parsed message, clears the poisoned flag, and
    /// returns the parser to a fresh `Length` step. Buffer capacity (but not
    /// its contents) is retained, so the decoder is reusable across
    /// reconnections without a fresh allocation.
    pub fn reset(&self) {
        self.inner.with_mut(|inner| {
            #[cfg(feature = "logwise")]
            {
                if let Some(reason) = &inner.poisoned {
                    logwise::info_sync!(
                        "Decoder: reset() clearing poisoned state: {reason}",
                        reason = reason.clone()
                    );
                } else {
                    logwise::info_sync!("Decoder: reset()");
                }
            }
            inner.state.reset();
            inner.buffer.reset_cursors();
            inner.poisoned = None;
        });
    }
}

// `Inner` holds `Box<dyn FnMut + Send>` upcalls, which are not `Sync`, so the
// auto-derived impl stops at `Send`. Every access to `Inner` is mediated by
// `Spinlock::with_mut`'s mutual exclusion, so sharing `&Decoder` across
// threads is sound regardless of `Inner`'s own `Sync`-ness.
unsafe impl Sync for Decoder {}
