//! Error types for the proving pipeline.
//!
//! Every fallible operation in the crate returns [`Result`] with one of the
//! enumerated kinds below. Cryptographic failures are deterministic for a
//! given input, so none of these are retryable. Error payloads name the
//! check that failed; they never carry witness values.

use thiserror::Error;

/// Errors raised by circuit compilation, setup, proving and verification.
#[derive(Debug, Error)]
pub enum Error {
    /// The circuit description is malformed.
    #[error("circuit compilation failed: {0}")]
    Compile(String),

    /// An SRS and an evaluation domain have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// The SRS does not carry enough G1 powers for this circuit.
    #[error("SRS too small: need {needed} G1 powers, have {available}")]
    InsufficientSrs { needed: usize, available: usize },

    /// The witness does not satisfy every constraint of the circuit.
    #[error("unsatisfied witness: {0}")]
    UnsatisfiedWitness(String),

    /// Byte input (SRS, proof or key encoding) is truncated or malformed.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The proof was rejected.
    #[error("verification failed: {0}")]
    Verification(&'static str),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
