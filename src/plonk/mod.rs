//! The PLONK protocol: key derivation, proving and verification.
//!
//! Follows "PLONK: Permutations over Lagrange-bases for Oecumenical
//! Noninteractive arguments of Knowledge" (Gabizon, Williamson,
//! Ciobotaru, 2019), sections 6-8.

pub mod permutation;
pub mod prover;
pub mod setup;
pub mod types;
pub mod verifier;

pub use prover::{prove, ProverConfig};
pub use setup::{setup, PROTOCOL_MARGIN};
pub use types::{Proof, ProvingKey, VerifyingKey};
pub use verifier::verify;
