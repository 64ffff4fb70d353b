//! PLONK zero-knowledge proof engine over KZG commitments.
//!
//! A prover demonstrates, without revealing private inputs, that an
//! assignment satisfies an arithmetic circuit; a verifier (off-chain or
//! a generated contract) checks the proof with one pairing equation.
//! Implements the protocol of "PLONK: Permutations over Lagrange-bases
//! for Oecumenical Noninteractive arguments of Knowledge" (Gabizon,
//! Williamson, Ciobotaru, 2019) on BLS12-381.
//!
//! Pipeline: [`Circuit`] → [`Circuit::compile`] → [`ConstraintSystem`];
//! constraint system + [`Srs`] → [`setup`] → ([`ProvingKey`],
//! [`VerifyingKey`]); proving key + [`Witness`] → [`prove`] → [`Proof`];
//! proof + verifying key + public inputs → [`verify`].
//!
//! # Modules
//! - `field`, `curve`: adapters over the arkworks BLS12-381 arithmetic
//! - `polynomial`, `fft`: coefficient/evaluation-form polynomial engine
//! - `kzg`: SRS management and polynomial commitments
//! - `transcript`: Fiat-Shamir challenge derivation
//! - `circuit`: circuit construction and compilation
//! - `plonk`: setup, prover and verifier
//! - `codec`: byte-exact SRS/proof/key encodings
//! - `solidity`: verifier-contract source export

pub mod circuit;
pub mod codec;
pub mod curve;
pub mod error;
pub mod fft;
pub mod field;
pub mod kzg;
pub mod plonk;
pub mod polynomial;
pub mod solidity;
pub mod transcript;

pub use circuit::{Circuit, ConstraintSystem, Variable, Witness};
pub use curve::{G1Affine, G1Projective, G2Affine};
pub use error::{Error, Result};
pub use field::Fr;
pub use fft::Domain;
pub use kzg::{Commitment, LagrangeSrs, OpeningProof, Srs};
pub use plonk::{prove, setup, verify, Proof, ProverConfig, ProvingKey, VerifyingKey};
pub use polynomial::Polynomial;
pub use transcript::Transcript;
