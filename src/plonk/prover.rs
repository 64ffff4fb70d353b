//! PLONK prover.
//!
//! The five Fiat-Shamir rounds:
//! 1. commit to the wire polynomials a, b, c;
//! 2. challenges β, γ, then commit to the grand product z;
//! 3. challenge α, then commit to the split quotient t_lo, t_mid, t_hi;
//! 4. evaluation challenge ζ (outside the domain), evaluations at ζ and ζω;
//! 5. challenge v, then the two batched KZG opening proofs.
//!
//! The witness is checked against every constraint before any curve
//! work, and the vanishing-polynomial division is re-checked on the
//! domain mid-protocol.

use crate::error::{Error, Result};
use crate::fft::Domain;
use crate::field::Fr;
use crate::circuit::Witness;
use crate::kzg::Commitment;
use crate::plonk::types::{Proof, ProvingKey};
use crate::polynomial::Polynomial;
use crate::transcript::{Transcript, PROTOCOL_LABEL};
use rand::{CryptoRng, Rng};
use rayon::prelude::*;
use tracing::debug;

/// Prover options.
///
/// `hiding` controls zero-knowledge blinding of the committed
/// polynomials. It is an explicit choice: with blinding on, fresh
/// randomness is drawn from the caller's RNG for every proof and two
/// proofs of the same witness differ bytewise; with blinding off the
/// prover is fully deterministic and proofs carry no randomness.
#[derive(Clone, Copy, Debug)]
pub struct ProverConfig {
    pub hiding: bool,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig { hiding: true }
    }
}

/// Number of blinding scalars a hiding proof consumes: two per wire
/// polynomial, three for the grand product, two for the quotient split.
const NUM_BLINDS: usize = 11;

/// Produce a proof that `witness` satisfies the circuit of `pk`.
///
/// Fails with [`Error::UnsatisfiedWitness`] before any commitment work
/// if the witness violates a gate or copy constraint.
pub fn prove<R: Rng + CryptoRng>(
    pk: &ProvingKey,
    witness: &Witness,
    config: &ProverConfig,
    rng: &mut R,
) -> Result<Proof> {
    pk.cs.check_witness(witness)?;

    let n = pk.cs.n;
    let domain = &pk.domain;
    let omega = domain.omega;
    let k1 = pk.permutation.k1;
    let k2 = pk.permutation.k2;
    let public_inputs: Vec<Fr> = witness.public_inputs().to_vec();

    let blinds: Vec<Fr> = (0..NUM_BLINDS)
        .map(|_| {
            if config.hiding {
                Fr::random(rng)
            } else {
                Fr::zero()
            }
        })
        .collect();

    let mut transcript = Transcript::new(PROTOCOL_LABEL);
    transcript.absorb_u64("n", n as u64);
    transcript.absorb_u64("num_public", public_inputs.len() as u64);
    for (i, pi) in public_inputs.iter().enumerate() {
        transcript.absorb_fr(&format!("pi_{i}"), pi);
    }

    // ---- Round 1: wire polynomials ----
    let (a_evals, b_evals, c_evals) = pk.cs.wire_values(witness);
    let z_h = Polynomial::vanishing(n);

    let blind_wire = |evals: &[Fr], b_hi: Fr, b_lo: Fr| -> Polynomial {
        let base = Polynomial::from_evaluations(evals, domain);
        &base + &(&Polynomial::from_coeffs(vec![b_lo, b_hi]) * &z_h)
    };
    let a_poly = blind_wire(&a_evals, blinds[0], blinds[1]);
    let b_poly = blind_wire(&b_evals, blinds[2], blinds[3]);
    let c_poly = blind_wire(&c_evals, blinds[4], blinds[5]);

    let a_comm = Commitment::commit(&a_poly, &pk.srs)?.point;
    let b_comm = Commitment::commit(&b_poly, &pk.srs)?.point;
    let c_comm = Commitment::commit(&c_poly, &pk.srs)?.point;

    transcript.absorb_g1("a_comm", &a_comm);
    transcript.absorb_g1("b_comm", &b_comm);
    transcript.absorb_g1("c_comm", &c_comm);

    let beta = transcript.squeeze_challenge("beta");
    let gamma = transcript.squeeze_challenge("gamma");

    // ---- Round 2: grand product ----
    let omega_powers: Vec<Fr> = domain.elements().collect();
    let s1 = &pk.permutation.s_sigma1_evals;
    let s2 = &pk.permutation.s_sigma2_evals;
    let s3 = &pk.permutation.s_sigma3_evals;

    let mut denominators: Vec<Fr> = (0..n)
        .map(|i| {
            (a_evals[i] + beta * s1[i] + gamma)
                * (b_evals[i] + beta * s2[i] + gamma)
                * (c_evals[i] + beta * s3[i] + gamma)
        })
        .collect();
    if denominators.iter().any(|d| d.is_zero()) {
        return Err(Error::UnsatisfiedWitness(
            "grand-product denominator vanished for the drawn challenges".to_string(),
        ));
    }
    Fr::batch_inverse(&mut denominators);

    let mut z_evals = vec![Fr::one(); n];
    for i in 0..(n - 1) {
        let numerator = (a_evals[i] + beta * omega_powers[i] + gamma)
            * (b_evals[i] + beta * k1 * omega_powers[i] + gamma)
            * (c_evals[i] + beta * k2 * omega_powers[i] + gamma);
        z_evals[i + 1] = z_evals[i] * numerator * denominators[i];
    }

    let z_blind = Polynomial::from_coeffs(vec![blinds[8], blinds[7], blinds[6]]);
    let z_poly = &Polynomial::from_evaluations(&z_evals, domain) + &(&z_blind * &z_h);
    let z_comm = Commitment::commit(&z_poly, &pk.srs)?.point;

    transcript.absorb_g1("z_comm", &z_comm);
    let alpha = transcript.squeeze_challenge("alpha");

    // ---- Round 3: quotient ----
    let pi_evals: Vec<Fr> = (0..n)
        .map(|i| pk.cs.public_input_eval(&public_inputs, i))
        .collect();
    let pi_poly = Polynomial::from_evaluations(&pi_evals, domain);

    // The combined constraint must vanish on the whole domain, or the
    // division by Z_H below would leave a remainder. The precheck
    // guarantees this; verify it anyway before spending curve work.
    for i in 0..n {
        let gate = pk.cs.q_m[i] * a_evals[i] * b_evals[i]
            + pk.cs.q_l[i] * a_evals[i]
            + pk.cs.q_r[i] * b_evals[i]
            + pk.cs.q_o[i] * c_evals[i]
            + pk.cs.q_c[i]
            + pi_evals[i];
        let perm = z_evals[i]
            * (a_evals[i] + beta * omega_powers[i] + gamma)
            * (b_evals[i] + beta * k1 * omega_powers[i] + gamma)
            * (c_evals[i] + beta * k2 * omega_powers[i] + gamma)
            - z_evals[(i + 1) % n]
                * (a_evals[i] + beta * s1[i] + gamma)
                * (b_evals[i] + beta * s2[i] + gamma)
                * (c_evals[i] + beta * s3[i] + gamma);
        let l1_term = if i == 0 { z_evals[0] - Fr::one() } else { Fr::zero() };
        let residual = gate + alpha * perm + alpha.square() * l1_term;
        if !residual.is_zero() {
            return Err(Error::UnsatisfiedWitness(format!(
                "vanishing division leaves a remainder at row {i}"
            )));
        }
    }

    // Blinded operands push deg(t) to 3n+5, so evaluate the quotient on
    // a coset of the smallest power-of-two domain that can carry it.
    let ext_n = (3 * n + 6).next_power_of_two();
    let ext_domain = Domain::new(ext_n).ok_or_else(|| {
        Error::SizeMismatch(format!(
            "field has no multiplicative subgroup of order {ext_n}"
        ))
    })?;
    let mut coset_shift = Fr::from_u64(7);
    while coset_shift.pow(ext_n as u64) == Fr::one() {
        coset_shift = coset_shift + Fr::one();
    }

    let a_coset = a_poly.evaluate_coset(&ext_domain, coset_shift);
    let b_coset = b_poly.evaluate_coset(&ext_domain, coset_shift);
    let c_coset = c_poly.evaluate_coset(&ext_domain, coset_shift);
    let z_coset = z_poly.evaluate_coset(&ext_domain, coset_shift);
    let z_omega_coset = z_poly.shift(omega).evaluate_coset(&ext_domain, coset_shift);

    let q_m_coset = pk.q_m.evaluate_coset(&ext_domain, coset_shift);
    let q_l_coset = pk.q_l.evaluate_coset(&ext_domain, coset_shift);
    let q_r_coset = pk.q_r.evaluate_coset(&ext_domain, coset_shift);
    let q_o_coset = pk.q_o.evaluate_coset(&ext_domain, coset_shift);
    let q_c_coset = pk.q_c.evaluate_coset(&ext_domain, coset_shift);
    let s1_coset = pk.s_sigma1.evaluate_coset(&ext_domain, coset_shift);
    let s2_coset = pk.s_sigma2.evaluate_coset(&ext_domain, coset_shift);
    let s3_coset = pk.s_sigma3.evaluate_coset(&ext_domain, coset_shift);
    let l1_coset = pk.l1.evaluate_coset(&ext_domain, coset_shift);
    let pi_coset = pi_poly.evaluate_coset(&ext_domain, coset_shift);

    let mut coset_points = Vec::with_capacity(ext_n);
    let mut x = coset_shift;
    for _ in 0..ext_n {
        coset_points.push(x);
        x = x * ext_domain.omega;
    }

    // Z_H(shift·Ω^i) = shift^n·Ω^{ni} - 1 cycles with period ext_n/n;
    // invert each distinct value once.
    let period = ext_n / n;
    let shift_n = coset_shift.pow(n as u64);
    let omega_ext_n = ext_domain.omega.pow(n as u64);
    let mut z_h_inv = Vec::with_capacity(period);
    let mut rotation = Fr::one();
    for _ in 0..period {
        z_h_inv.push(shift_n * rotation - Fr::one());
        rotation = rotation * omega_ext_n;
    }
    if z_h_inv.iter().any(|v| v.is_zero()) {
        return Err(Error::SizeMismatch(
            "quotient coset intersects the evaluation domain".to_string(),
        ));
    }
    Fr::batch_inverse(&mut z_h_inv);

    let alpha_sq = alpha.square();
    let t_coset: Vec<Fr> = (0..ext_n)
        .into_par_iter()
        .map(|i| {
            let x = coset_points[i];
            let gate = q_m_coset[i] * a_coset[i] * b_coset[i]
                + q_l_coset[i] * a_coset[i]
                + q_r_coset[i] * b_coset[i]
                + q_o_coset[i] * c_coset[i]
                + q_c_coset[i]
                + pi_coset[i];
            let perm = z_coset[i]
                * (a_coset[i] + beta * x + gamma)
                * (b_coset[i] + beta * k1 * x + gamma)
                * (c_coset[i] + beta * k2 * x + gamma)
                - z_omega_coset[i]
                    * (a_coset[i] + beta * s1_coset[i] + gamma)
                    * (b_coset[i] + beta * s2_coset[i] + gamma)
                    * (c_coset[i] + beta * s3_coset[i] + gamma);
            let l1_term = l1_coset[i] * (z_coset[i] - Fr::one());
            (gate + alpha * perm + alpha_sq * l1_term) * z_h_inv[i % period]
        })
        .collect();

    let t_poly = ext_domain.coset_ifft(&t_coset, coset_shift);
    if t_poly.coeffs.len() > 3 * n + 6 {
        return Err(Error::UnsatisfiedWitness(format!(
            "quotient degree {} exceeds the protocol bound",
            t_poly.degree()
        )));
    }

    // Split t = t_lo + X^n·t_mid + X^{2n}·t_hi, with cross-terms so the
    // three blinded limbs still sum back to t.
    let mut t_lo_coeffs = vec![Fr::zero(); n + 1];
    let mut t_mid_coeffs = vec![Fr::zero(); n + 1];
    let mut t_hi_coeffs = vec![Fr::zero(); n + 6];
    for (i, coeff) in t_poly.coeffs.iter().enumerate() {
        if i < n {
            t_lo_coeffs[i] = *coeff;
        } else if i < 2 * n {
            t_mid_coeffs[i - n] = *coeff;
        } else {
            t_hi_coeffs[i - 2 * n] = *coeff;
        }
    }
    let (b10, b11) = (blinds[9], blinds[10]);
    t_lo_coeffs[n] += b10;
    t_mid_coeffs[0] -= b10;
    t_mid_coeffs[n] += b11;
    t_hi_coeffs[0] -= b11;

    let t_lo = Polynomial::from_coeffs(t_lo_coeffs);
    let t_mid = Polynomial::from_coeffs(t_mid_coeffs);
    let t_hi = Polynomial::from_coeffs(t_hi_coeffs);

    let t_lo_comm = Commitment::commit(&t_lo, &pk.srs)?.point;
    let t_mid_comm = Commitment::commit(&t_mid, &pk.srs)?.point;
    let t_hi_comm = Commitment::commit(&t_hi, &pk.srs)?.point;

    transcript.absorb_g1("t_lo_comm", &t_lo_comm);
    transcript.absorb_g1("t_mid_comm", &t_mid_comm);
    transcript.absorb_g1("t_hi_comm", &t_hi_comm);

    let zeta = transcript.squeeze_challenge_outside_domain("zeta", n);

    // ---- Round 4: evaluations ----
    let a_bar = a_poly.evaluate(&zeta);
    let b_bar = b_poly.evaluate(&zeta);
    let c_bar = c_poly.evaluate(&zeta);
    let s1_bar = pk.s_sigma1.evaluate(&zeta);
    let s2_bar = pk.s_sigma2.evaluate(&zeta);
    let zeta_omega = zeta * omega;
    let z_omega_bar = z_poly.evaluate(&zeta_omega);

    transcript.absorb_fr("a_zeta", &a_bar);
    transcript.absorb_fr("b_zeta", &b_bar);
    transcript.absorb_fr("c_zeta", &c_bar);
    transcript.absorb_fr("s_sigma1_zeta", &s1_bar);
    transcript.absorb_fr("s_sigma2_zeta", &s2_bar);
    transcript.absorb_fr("z_zeta_omega", &z_omega_bar);

    let v = transcript.squeeze_challenge("v");

    // ---- Round 5: linearization and openings ----
    let z_h_zeta = domain.vanishing_eval(&zeta);
    let l1_zeta = domain.lagrange_eval(0, &zeta);

    let wire_product = (a_bar + beta * zeta + gamma)
        * (b_bar + beta * k1 * zeta + gamma)
        * (c_bar + beta * k2 * zeta + gamma);
    let sigma_product = (a_bar + beta * s1_bar + gamma) * (b_bar + beta * s2_bar + gamma);

    let mut r_poly = &pk.q_m * (a_bar * b_bar);
    r_poly = &r_poly + &(&pk.q_l * a_bar);
    r_poly = &r_poly + &(&pk.q_r * b_bar);
    r_poly = &r_poly + &(&pk.q_o * c_bar);
    r_poly = &r_poly + &pk.q_c;
    r_poly = &r_poly + &(&z_poly * (alpha * wire_product + alpha_sq * l1_zeta));
    r_poly = &r_poly - &(&pk.s_sigma3 * (alpha * beta * z_omega_bar * sigma_product));

    let zeta_n = zeta.pow(n as u64);
    let zeta_2n = zeta_n * zeta_n;
    let t_combined = &(&t_lo + &(&t_mid * zeta_n)) + &(&t_hi * zeta_2n);
    r_poly = &r_poly - &(&t_combined * z_h_zeta);

    let r_zeta = r_poly.evaluate(&zeta);

    let v2 = v * v;
    let v3 = v2 * v;
    let v4 = v3 * v;
    let v5 = v4 * v;

    let mut w_zeta_num = &r_poly - &Polynomial::constant(r_zeta);
    w_zeta_num = &w_zeta_num + &(&(&a_poly - &Polynomial::constant(a_bar)) * v);
    w_zeta_num = &w_zeta_num + &(&(&b_poly - &Polynomial::constant(b_bar)) * v2);
    w_zeta_num = &w_zeta_num + &(&(&c_poly - &Polynomial::constant(c_bar)) * v3);
    w_zeta_num = &w_zeta_num + &(&(&pk.s_sigma1 - &Polynomial::constant(s1_bar)) * v4);
    w_zeta_num = &w_zeta_num + &(&(&pk.s_sigma2 - &Polynomial::constant(s2_bar)) * v5);
    let w_zeta_poly = w_zeta_num.div_by_linear(&zeta);

    let w_zeta_omega_poly =
        (&z_poly - &Polynomial::constant(z_omega_bar)).div_by_linear(&zeta_omega);

    let w_zeta_comm = Commitment::commit(&w_zeta_poly, &pk.srs)?.point;
    let w_zeta_omega_comm = Commitment::commit(&w_zeta_omega_poly, &pk.srs)?.point;

    transcript.absorb_g1("w_zeta_comm", &w_zeta_comm);
    transcript.absorb_g1("w_zeta_omega_comm", &w_zeta_omega_comm);

    debug!(n, hiding = config.hiding, "proof generated");

    Ok(Proof {
        a_comm,
        b_comm,
        c_comm,
        z_comm,
        t_lo_comm,
        t_mid_comm,
        t_hi_comm,
        a_eval: a_bar,
        b_eval: b_bar,
        c_eval: c_bar,
        s_sigma1_eval: s1_bar,
        s_sigma2_eval: s2_bar,
        z_omega_eval: z_omega_bar,
        w_zeta_comm,
        w_zeta_omega_comm,
    })
}
