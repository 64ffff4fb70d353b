//! Key derivation: constraint system + SRS -> proving and verifying keys.
//!
//! Deterministic and witness-independent; run once per circuit and
//! reuse the keys across proofs.

use crate::circuit::ConstraintSystem;
use crate::error::{Error, Result};
use crate::fft::Domain;
use crate::kzg::{Commitment, Srs};
use crate::plonk::permutation::Permutation;
use crate::plonk::types::{ProvingKey, VerifyingKey};
use crate::polynomial::Polynomial;
use tracing::debug;

/// Extra G1 powers the protocol needs beyond the domain size: blinded
/// wire polynomials reach degree n+1, the blinded grand product n+2,
/// and the high quotient limb n+5.
pub const PROTOCOL_MARGIN: usize = 6;

/// Derive the proving and verifying keys for a compiled circuit.
///
/// Fails with [`Error::InsufficientSrs`] when the SRS cannot commit to
/// the largest polynomial the prover will produce, and with
/// [`Error::SizeMismatch`] when the field has no subgroup of the
/// domain's size.
pub fn setup(cs: &ConstraintSystem, srs: &Srs) -> Result<(ProvingKey, VerifyingKey)> {
    let needed = cs.n + PROTOCOL_MARGIN;
    if srs.g1_powers.len() < needed {
        return Err(Error::InsufficientSrs {
            needed,
            available: srs.g1_powers.len(),
        });
    }

    let domain = Domain::new(cs.n).ok_or_else(|| {
        Error::SizeMismatch(format!("field has no multiplicative subgroup of order {}", cs.n))
    })?;

    // Selector evaluations are the compiled columns; interpolate.
    let q_m = Polynomial::from_evaluations(&cs.q_m, &domain);
    let q_l = Polynomial::from_evaluations(&cs.q_l, &domain);
    let q_r = Polynomial::from_evaluations(&cs.q_r, &domain);
    let q_o = Polynomial::from_evaluations(&cs.q_o, &domain);
    let q_c = Polynomial::from_evaluations(&cs.q_c, &domain);

    let permutation = Permutation::compute(cs, &domain);
    let s_sigma1 = permutation.s_sigma1_poly(&domain);
    let s_sigma2 = permutation.s_sigma2_poly(&domain);
    let s_sigma3 = permutation.s_sigma3_poly(&domain);

    let q_m_comm = Commitment::commit(&q_m, srs)?.point;
    let q_l_comm = Commitment::commit(&q_l, srs)?.point;
    let q_r_comm = Commitment::commit(&q_r, srs)?.point;
    let q_o_comm = Commitment::commit(&q_o, srs)?.point;
    let q_c_comm = Commitment::commit(&q_c, srs)?.point;
    let s_sigma1_comm = Commitment::commit(&s_sigma1, srs)?.point;
    let s_sigma2_comm = Commitment::commit(&s_sigma2, srs)?.point;
    let s_sigma3_comm = Commitment::commit(&s_sigma3, srs)?.point;

    let l1 = Polynomial::lagrange_basis(0, &domain);

    let verifying_key = VerifyingKey {
        n: cs.n,
        num_public: cs.num_public,
        omega: domain.omega,
        k1: permutation.k1,
        k2: permutation.k2,
        q_m_comm,
        q_l_comm,
        q_r_comm,
        q_o_comm,
        q_c_comm,
        s_sigma1_comm,
        s_sigma2_comm,
        s_sigma3_comm,
        g2_generator: srs.g2_generator,
        g2_tau: srs.g2_tau,
    };

    let proving_key = ProvingKey {
        cs: cs.clone(),
        domain,
        srs: srs.clone(),
        q_m,
        q_l,
        q_r,
        q_o,
        q_c,
        s_sigma1,
        s_sigma2,
        s_sigma3,
        permutation,
        l1,
    };

    debug!(n = cs.n, num_public = cs.num_public, "derived proving and verifying keys");
    Ok((proving_key, verifying_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::field::Fr;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_circuit() -> ConstraintSystem {
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let b = circuit.private_input("b");
        let c = circuit.public_input("c");
        let ab = circuit.mul(a, b);
        circuit.assert_equal(ab, c);
        circuit.compile().unwrap()
    }

    #[test]
    fn test_setup_produces_matching_keys() {
        let cs = test_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let srs = Srs::generate(cs.n + PROTOCOL_MARGIN, &mut rng);

        let (pk, vk) = setup(&cs, &srs).unwrap();

        assert_eq!(pk.n(), cs.n);
        assert_eq!(vk.n, cs.n);
        assert_eq!(vk.num_public, 1);
        assert!(pk.q_m.degree() < cs.n as isize);
        assert!(pk.s_sigma1.degree() < cs.n as isize);

        // The key commitments match direct commitments.
        let direct = Commitment::commit(&pk.q_m, &srs).unwrap().point;
        assert_eq!(vk.q_m_comm, direct);
    }

    #[test]
    fn test_setup_is_deterministic() {
        let cs = test_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let srs = Srs::generate(cs.n + PROTOCOL_MARGIN, &mut rng);

        let (_, vk1) = setup(&cs, &srs).unwrap();
        let (_, vk2) = setup(&cs, &srs).unwrap();
        assert_eq!(vk1, vk2);
    }

    #[test]
    fn test_setup_rejects_small_srs() {
        let cs = test_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let srs = Srs::generate(cs.n, &mut rng);

        assert!(matches!(
            setup(&cs, &srs),
            Err(Error::InsufficientSrs { .. })
        ));
    }

    #[test]
    fn test_selector_interpolation_matches_columns() {
        let cs = test_circuit();
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let srs = Srs::generate(cs.n + PROTOCOL_MARGIN, &mut rng);
        let (pk, _) = setup(&cs, &srs).unwrap();

        for (i, x) in pk.domain.elements().enumerate() {
            assert_eq!(pk.q_m.evaluate(&x), cs.q_m[i]);
            assert_eq!(pk.q_l.evaluate(&x), cs.q_l[i]);
        }
        assert_eq!(pk.l1.evaluate(&Fr::one()), Fr::one());
    }
}
