//! Tunable knobs for the receive buffer's growth policy.

/// Configuration for a [`crate::Decoder`].
///
/// The only piece of configuration the spec names directly is the initial
/// buffer capacity; the two growth-policy constants are broken out here
/// (rather than hardcoded in the buffer manager) so they can be tuned without
/// touching the state machine, matching this codebase's habit of keeping
/// magic numbers behind a small config struct rather than inline in the hot
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Capacity the receive buffer is allocated with at construction.
    pub initial_buffer_size: usize,
    /// Growth multiplier applied to a reallocation target. The spec calls
    /// for doubling (`<< 1`); exposed here as a multiplier rather than a
    /// shift so a value other than 2 can be configured if ever needed.
    pub growth_factor: usize,
    /// Divisor applied to the current message's total length when computing
    /// the reallocation floor in the "bytes remain unconsumed" branch of the
    /// buffer manager (spec: `message_total_length / 2`).
    pub floor_divisor: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            initial_buffer_size: 4096,
            growth_factor: 2,
            floor_divisor: 2,
        }
    }
}

impl DecoderConfig {
    /// Shorthand for the common case of only wanting to choose the initial
    /// capacity and otherwise accept the default growth policy.
    pub fn with_initial_buffer_size(initial_buffer_size: usize) -> Self {
        DecoderConfig {
            initial_buffer_size,
            ..Default::default()
        }
    }
}
