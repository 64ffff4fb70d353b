//! PLONK key and proof types.

use crate::circuit::ConstraintSystem;
use crate::curve::{G1Affine, G2Affine};
use crate::fft::Domain;
use crate::field::Fr;
use crate::kzg::Srs;
use crate::plonk::permutation::Permutation;
use crate::polynomial::Polynomial;
use serde::{Deserialize, Serialize};

/// Everything the prover needs for one circuit. Derived once by
/// [`crate::plonk::setup`], immutable, safe to share across concurrent
/// proofs for different witnesses.
#[derive(Clone, Debug)]
pub struct ProvingKey {
    /// The compiled circuit this key proves.
    pub(crate) cs: ConstraintSystem,
    /// Evaluation domain of size `cs.n`.
    pub(crate) domain: Domain,
    /// The SRS the keys were derived from.
    pub(crate) srs: Srs,

    // Selector polynomials in coefficient form.
    pub(crate) q_m: Polynomial,
    pub(crate) q_l: Polynomial,
    pub(crate) q_r: Polynomial,
    pub(crate) q_o: Polynomial,
    pub(crate) q_c: Polynomial,

    // Permutation polynomials S_σ1, S_σ2, S_σ3 and the raw permutation.
    pub(crate) s_sigma1: Polynomial,
    pub(crate) s_sigma2: Polynomial,
    pub(crate) s_sigma3: Polynomial,
    pub(crate) permutation: Permutation,

    /// First Lagrange basis polynomial, for the `z(ω^0) = 1` constraint.
    pub(crate) l1: Polynomial,
}

impl ProvingKey {
    /// Domain size.
    pub fn n(&self) -> usize {
        self.cs.n
    }

    /// Number of public inputs the circuit declares.
    pub fn num_public_inputs(&self) -> usize {
        self.cs.num_public
    }
}

/// The small verification-side key: commitments, domain parameters and
/// the G2 points for the pairing check. Orders of magnitude smaller
/// than the [`ProvingKey`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyingKey {
    /// Domain size (power of two).
    pub n: usize,
    /// Number of public inputs, bound to rows `0..num_public`.
    pub num_public: usize,
    /// Domain generator ω.
    pub omega: Fr,
    /// Coset shifts for the wire columns b and c.
    pub k1: Fr,
    pub k2: Fr,

    // Commitments to the selector polynomials.
    pub q_m_comm: G1Affine,
    pub q_l_comm: G1Affine,
    pub q_r_comm: G1Affine,
    pub q_o_comm: G1Affine,
    pub q_c_comm: G1Affine,

    // Commitments to the permutation polynomials.
    pub s_sigma1_comm: G1Affine,
    pub s_sigma2_comm: G1Affine,
    pub s_sigma3_comm: G1Affine,

    /// `[1]₂`.
    pub g2_generator: G2Affine,
    /// `[τ]₂`.
    pub g2_tau: G2Affine,
}

/// A PLONK proof: round commitments, evaluations at the challenge
/// point, and the two batched opening proofs. Fixed size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    // Round 1: wire polynomial commitments.
    pub a_comm: G1Affine,
    pub b_comm: G1Affine,
    pub c_comm: G1Affine,

    // Round 2: grand-product commitment.
    pub z_comm: G1Affine,

    // Round 3: split quotient commitments.
    pub t_lo_comm: G1Affine,
    pub t_mid_comm: G1Affine,
    pub t_hi_comm: G1Affine,

    // Round 4: evaluations at ζ (and ζω for z).
    pub a_eval: Fr,
    pub b_eval: Fr,
    pub c_eval: Fr,
    pub s_sigma1_eval: Fr,
    pub s_sigma2_eval: Fr,
    pub z_omega_eval: Fr,

    // Round 5: opening proofs at ζ and ζω.
    pub w_zeta_comm: G1Affine,
    pub w_zeta_omega_comm: G1Affine,
}
