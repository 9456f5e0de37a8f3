//! Error types for the HSMS/SECS-II decoder.

/// Errors surfaced by [`crate::Decoder::decode`].
///
/// Per the decoder's error model, a stall (not enough bytes yet to finish the
/// current step) is not an error at all — it is silently absorbed and observed
/// only through the `in_message` return value. Everything here is either a
/// caller contract violation or a fatal framing/semantic anomaly that poisons
/// the decoder until [`crate::Decoder::reset`] is called.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `decode` was called with `n_new_bytes <= 0`. State is left untouched.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A framing or semantic anomaly that the decoder cannot recover from
    /// without a `reset`: an unknown format code, `length_bits == 0` on an
    /// item that requires one, a payload length overflowing the declared
    /// message body, or the decode cursor drifting past the write cursor.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Reserved for callers that compose the decoder with a real transport
    /// and want to unify error handling under one enum. The decoder itself
    /// performs no I/O and never constructs this variant.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
