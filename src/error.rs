//! Error types shared by the coder, the framer and the link layer.

use thiserror::Error;

/// The error type for every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Input violated a width or bit-domain constraint.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The sample source failed to produce a reading.
    #[error("Sample source failed: {0}")]
    Source(String),

    /// The frame sink rejected a frame.
    #[error("Transport failed: {0}")]
    Transport(String),

    /// An I/O error from a writer-backed sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sample source has no further samples.
    #[error("Sample source exhausted")]
    SourceExhausted,

    /// The supervisory loop gave up after too many consecutive failures.
    #[error("Giving up after {attempts} consecutive failures: {last}")]
    RetriesExhausted {
        attempts: u32,
        /// The failure that exhausted the retry budget
        #[source]
        last: Box<Error>,
    },
}

/// A convenience `Result` alias using the crate's `Error` type.
pub type Result<T> = std::result::Result<T, Error>;
