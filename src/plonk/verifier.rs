//! PLONK verifier.
//!
//! Replays the Fiat-Shamir transcript over the proof's commitments and
//! the public inputs, evaluates the few scalars the check needs
//! (`Z_H(ζ)`, `L_1(ζ)`, `PI(ζ)`, the linearization constant r₀), and
//! accepts iff one batched pairing equation holds. The full polynomials
//! are never reconstructed, and nothing here branches on secret data:
//! the verifier holds none, and its work depends only on the
//! public-input length.

use crate::curve::{pairing_check, G1Affine, G1Projective};
use crate::error::{Error, Result};
use crate::fft::Domain;
use crate::field::Fr;
use crate::plonk::types::{Proof, VerifyingKey};
use crate::transcript::{Transcript, PROTOCOL_LABEL};
use tracing::debug;

/// Verify a proof against a verifying key and the claimed public
/// inputs. Returns `Ok(())` on acceptance, [`Error::Verification`]
/// otherwise, never a partial success.
pub fn verify(vk: &VerifyingKey, public_inputs: &[Fr], proof: &Proof) -> Result<()> {
    if public_inputs.len() != vk.num_public {
        return Err(Error::Verification("public input count mismatch"));
    }

    let n = vk.n;
    let omega = vk.omega;
    let domain = Domain::new(n)
        .ok_or(Error::Verification("verifying key domain size is unsupported"))?;

    // Replay the transcript in prover order.
    let mut transcript = Transcript::new(PROTOCOL_LABEL);
    transcript.absorb_u64("n", n as u64);
    transcript.absorb_u64("num_public", public_inputs.len() as u64);
    for (i, pi) in public_inputs.iter().enumerate() {
        transcript.absorb_fr(&format!("pi_{i}"), pi);
    }

    transcript.absorb_g1("a_comm", &proof.a_comm);
    transcript.absorb_g1("b_comm", &proof.b_comm);
    transcript.absorb_g1("c_comm", &proof.c_comm);
    let beta = transcript.squeeze_challenge("beta");
    let gamma = transcript.squeeze_challenge("gamma");

    transcript.absorb_g1("z_comm", &proof.z_comm);
    let alpha = transcript.squeeze_challenge("alpha");

    transcript.absorb_g1("t_lo_comm", &proof.t_lo_comm);
    transcript.absorb_g1("t_mid_comm", &proof.t_mid_comm);
    transcript.absorb_g1("t_hi_comm", &proof.t_hi_comm);
    let zeta = transcript.squeeze_challenge_outside_domain("zeta", n);

    transcript.absorb_fr("a_zeta", &proof.a_eval);
    transcript.absorb_fr("b_zeta", &proof.b_eval);
    transcript.absorb_fr("c_zeta", &proof.c_eval);
    transcript.absorb_fr("s_sigma1_zeta", &proof.s_sigma1_eval);
    transcript.absorb_fr("s_sigma2_zeta", &proof.s_sigma2_eval);
    transcript.absorb_fr("z_zeta_omega", &proof.z_omega_eval);
    let v = transcript.squeeze_challenge("v");

    transcript.absorb_g1("w_zeta_comm", &proof.w_zeta_comm);
    transcript.absorb_g1("w_zeta_omega_comm", &proof.w_zeta_omega_comm);
    let u = transcript.squeeze_challenge("u");

    // Scalar side: Z_H(ζ), L_1(ζ), PI(ζ).
    let z_h_zeta = domain.vanishing_eval(&zeta);
    let l1_zeta = domain.lagrange_eval(0, &zeta);

    let mut pi_zeta = Fr::zero();
    for (i, pi) in public_inputs.iter().enumerate() {
        pi_zeta -= *pi * domain.lagrange_eval(i, &zeta);
    }

    let a_bar = proof.a_eval;
    let b_bar = proof.b_eval;
    let c_bar = proof.c_eval;
    let s1_bar = proof.s_sigma1_eval;
    let s2_bar = proof.s_sigma2_eval;
    let z_omega_bar = proof.z_omega_eval;

    // Linearization commitment [r]₁, mirroring the prover's r(X) with
    // commitments in place of polynomials.
    let wire_product = (a_bar + beta * zeta + gamma)
        * (b_bar + beta * vk.k1 * zeta + gamma)
        * (c_bar + beta * vk.k2 * zeta + gamma);
    let sigma_product = (a_bar + beta * s1_bar + gamma) * (b_bar + beta * s2_bar + gamma);

    let zeta_n = zeta.pow(n as u64);
    let zeta_2n = zeta_n * zeta_n;
    let alpha_sq = alpha.square();

    let mut r_comm = G1Projective::from(vk.q_m_comm) * (a_bar * b_bar);
    r_comm = r_comm + G1Projective::from(vk.q_l_comm) * a_bar;
    r_comm = r_comm + G1Projective::from(vk.q_r_comm) * b_bar;
    r_comm = r_comm + G1Projective::from(vk.q_o_comm) * c_bar;
    r_comm = r_comm + G1Projective::from(vk.q_c_comm);
    r_comm = r_comm + G1Projective::from(proof.z_comm) * (alpha * wire_product + alpha_sq * l1_zeta);
    r_comm = r_comm
        - G1Projective::from(vk.s_sigma3_comm) * (alpha * beta * z_omega_bar * sigma_product);
    let t_scale = -z_h_zeta;
    r_comm = r_comm + G1Projective::from(proof.t_lo_comm) * t_scale;
    r_comm = r_comm + G1Projective::from(proof.t_mid_comm) * (t_scale * zeta_n);
    r_comm = r_comm + G1Projective::from(proof.t_hi_comm) * (t_scale * zeta_2n);

    // Constant term of the linearization the verifier can compute from
    // public data alone: r(ζ) = -r₀ for a valid proof.
    let r0 = pi_zeta
        - alpha_sq * l1_zeta
        - alpha * z_omega_bar * sigma_product * (c_bar + gamma);

    let v2 = v * v;
    let v3 = v2 * v;
    let v4 = v3 * v;
    let v5 = v4 * v;

    // Batched commitment [F] and claimed-evaluation term [E].
    let mut f_comm = r_comm;
    f_comm = f_comm + G1Projective::from(proof.a_comm) * v;
    f_comm = f_comm + G1Projective::from(proof.b_comm) * v2;
    f_comm = f_comm + G1Projective::from(proof.c_comm) * v3;
    f_comm = f_comm + G1Projective::from(vk.s_sigma1_comm) * v4;
    f_comm = f_comm + G1Projective::from(vk.s_sigma2_comm) * v5;
    f_comm = f_comm + G1Projective::from(proof.z_comm) * u;

    let e_eval = -r0
        + v * a_bar
        + v2 * b_bar
        + v3 * c_bar
        + v4 * s1_bar
        + v5 * s2_bar
        + u * z_omega_bar;
    let e_comm = G1Projective::from(G1Affine::generator()) * e_eval;

    // Final check:
    // e([W_ζ] + u[W_ζω], [τ]₂) == e(ζ[W_ζ] + uζω[W_ζω] + [F] - [E], [1]₂)
    let w_combined =
        G1Projective::from(proof.w_zeta_comm) + G1Projective::from(proof.w_zeta_omega_comm) * u;
    let zeta_omega = zeta * omega;
    let shifted = f_comm - e_comm
        + G1Projective::from(proof.w_zeta_comm) * zeta
        + G1Projective::from(proof.w_zeta_omega_comm) * (u * zeta_omega);

    let accepted = pairing_check(
        &w_combined.to_affine(),
        &vk.g2_tau,
        &shifted.to_affine(),
        &vk.g2_generator,
    );

    debug!(n, accepted, "verification finished");
    if accepted {
        Ok(())
    } else {
        Err(Error::Verification("pairing check failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::kzg::Srs;
    use crate::plonk::prover::{prove, ProverConfig};
    use crate::plonk::setup::{setup, PROTOCOL_MARGIN};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn prove_product_circuit(
        c_value: u64,
        claimed_public: u64,
    ) -> (VerifyingKey, Vec<Fr>, Result<Proof>) {
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let b = circuit.private_input("b");
        let c = circuit.public_input("c");
        let ab = circuit.mul(a, b);
        let two_ab = circuit.linear_combine(&[(Fr::from_u64(2), ab)], Fr::zero());
        circuit.assert_equal(two_ab, c);

        let cs = circuit.compile().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let srs = Srs::generate(cs.n + PROTOCOL_MARGIN, &mut rng);
        let (pk, vk) = setup(&cs, &srs).unwrap();

        let witness = circuit
            .solve(
                &cs,
                &[
                    (a, Fr::from_u64(5)),
                    (b, Fr::from_u64(12)),
                    (c, Fr::from_u64(c_value)),
                ],
            )
            .unwrap();

        let proof = prove(&pk, &witness, &ProverConfig::default(), &mut rng);
        (vk, vec![Fr::from_u64(claimed_public)], proof)
    }

    #[test]
    fn test_accepts_valid_proof() {
        let (vk, public, proof) = prove_product_circuit(120, 120);
        verify(&vk, &public, &proof.unwrap()).unwrap();
    }

    #[test]
    fn test_rejects_wrong_public_input() {
        let (vk, _, proof) = prove_product_circuit(120, 120);
        let wrong = vec![Fr::from_u64(121)];
        assert!(matches!(
            verify(&vk, &wrong, &proof.unwrap()),
            Err(Error::Verification(_))
        ));
    }

    #[test]
    fn test_rejects_public_input_count_mismatch() {
        let (vk, public, proof) = prove_product_circuit(120, 120);
        let proof = proof.unwrap();

        let too_many = vec![public[0], Fr::one()];
        assert!(matches!(
            verify(&vk, &too_many, &proof),
            Err(Error::Verification(_))
        ));
        assert!(matches!(verify(&vk, &[], &proof), Err(Error::Verification(_))));
    }

    #[test]
    fn test_rejects_tampered_commitment() {
        let (vk, public, proof) = prove_product_circuit(120, 120);
        let mut proof = proof.unwrap();
        proof.z_comm = G1Affine::generator();
        assert!(matches!(
            verify(&vk, &public, &proof),
            Err(Error::Verification(_))
        ));
    }

    #[test]
    fn test_rejects_tampered_evaluation() {
        let (vk, public, proof) = prove_product_circuit(120, 120);
        let mut proof = proof.unwrap();
        proof.a_eval = proof.a_eval + Fr::one();
        assert!(matches!(
            verify(&vk, &public, &proof),
            Err(Error::Verification(_))
        ));
    }
}
