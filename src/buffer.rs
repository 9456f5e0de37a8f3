//! The contiguous, reusable receive buffer.
//!
//! A [`ReceiveBuffer`] owns one growable byte region with two cursors:
//! `write_offset` (next byte the transport may fill) and `decode_offset`
//! (next byte the state machine has not yet consumed). The invariant
//! `0 <= decode_offset <= write_offset <= capacity` holds across every public
//! method here.

use crate::config::DecoderConfig;

#[derive(Debug)]
pub struct ReceiveBuffer {
    data: Vec<u8>,
    write_offset: usize,
    decode_offset: usize,
    growth_factor: usize,
    floor_divisor: usize,
}

impl ReceiveBuffer {
    pub fn new(config: &DecoderConfig) -> Self {
        ReceiveBuffer {
            data: vec![0u8; config.initial_buffer_size.max(1)],
            write_offset: 0,
            decode_offset: 0,
            growth_factor: config.growth_factor.max(1),
            floor_divisor: config.floor_divisor.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    pub fn decode_offset(&self) -> usize {
        self.decode_offset
    }

    /// Bytes written but not yet consumed by the state machine.
    pub fn unread_len(&self) -> usize {
        self.write_offset - self.decode_offset
    }

    /// The slice the transport may write new bytes into.
    pub fn writable_tail(&mut self) -> &mut [u8] {
        &mut self.data[self.write_offset..]
    }

    pub fn writable_tail_len(&self) -> usize {
        self.data.len() - self.write_offset
    }

    /// Records that the caller has written `n` bytes into the writable tail.
    pub fn commit_write(&mut self, n: usize) {
        debug_assert!(n <= self.writable_tail_len());
        self.write_offset += n;
    }

    /// The unread region `[decode_offset, write_offset)`.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.decode_offset..self.write_offset]
    }

    /// Advances the decode cursor past `n` consumed bytes.
    pub fn advance_decode(&mut self, n: usize) {
        debug_assert!(self.decode_offset + n <= self.write_offset);
        self.decode_offset += n;
    }

    /// Resets both cursors to the start of the buffer without touching
    /// capacity. Used both by a clean post-dispatch reconciliation and by
    /// [`crate::Decoder::reset`].
    pub fn reset_cursors(&mut self) {
        self.write_offset = 0;
        self.decode_offset = 0;
    }

    /// Applies the §4.2 buffer-management policy after a `decode` call has
    /// run the state machine to a stall or a clean message boundary.
    ///
    /// `need` is the shortfall the stalled step reported (0 if the state
    /// machine did not stall, i.e. it is sitting fresh at the `Length` step
    /// with nothing buffered). `message_total_length` is the total length
    /// `L` of the message currently in progress, used only for the
    /// reallocation floor; pass `0` when no message is in progress.
    pub fn reconcile(&mut self, need: usize, message_total_length: u64) {
        let remain = self.unread_len();
        if remain == 0 {
            if need > self.capacity() {
                let new_capacity = need * self.growth_factor;
                #[cfg(feature = "logwise")]
                logwise::debug_sync!(
                    "ReceiveBuffer: reallocating {old} -> {new} (drained, need={need})",
                    old = self.capacity(),
                    new = new_capacity,
                    need = need
                );
                self.reallocate(new_capacity, &[]);
            }
            self.reset_cursors();
            return;
        }

        let required = remain + need;
        if required > self.capacity() {
            let floor = (message_total_length as usize) / self.floor_divisor;
            let new_capacity = floor.max(required) * self.growth_factor;
            #[cfg(feature = "logwise")]
            logwise::debug_sync!(
                "ReceiveBuffer: reallocating {old} -> {new} (remain={remain}, need={need}, floor={floor})",
                old = self.capacity(),
                new = new_capacity,
                remain = remain,
                need = need,
                floor = floor
            );
            let unread_start = self.decode_offset;
            let unread_end = self.write_offset;
            // Vec::clone_from_slice needs an owned copy before the old
            // buffer is dropped; take it via to_vec since the old and new
            // buffers cannot coexist as borrows of `self`.
            let suffix = self.data[unread_start..unread_end].to_vec();
            self.reallocate(new_capacity, &suffix);
        } else if required > self.writable_tail_len() {
            #[cfg(feature = "logwise")]
            logwise::debug_sync!(
                "ReceiveBuffer: compacting {remain} unread bytes to the front (capacity={cap})",
                remain = remain,
                cap = self.capacity()
            );
            self.data.copy_within(self.decode_offset..self.write_offset, 0);
            self.write_offset = remain;
            self.decode_offset = 0;
        }
        // else: the tail already has enough room; no-op.
    }

    fn reallocate(&mut self, new_capacity: usize, suffix: &[u8]) {
        let mut data = vec![0u8; new_capacity.max(suffix.len()).max(1)];
        data[..suffix.len()].copy_from_slice(suffix);
        self.data = data;
        self.write_offset = suffix.len();
        self.decode_offset = 0;
    }
}
