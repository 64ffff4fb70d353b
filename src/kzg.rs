//! KZG polynomial commitments and the structured reference string.
//!
//! The SRS holds powers of a secret trapdoor τ in group form:
//! `[τ^i]₁` for i up to the supported degree, plus `[τ]₂`. A commitment
//! to a polynomial is the SRS-weighted sum of its coefficients in G1;
//! an opening proof at z commits to the quotient `(f(X) - f(z))/(X - z)`.
//!
//! Reference: Kate, Zaverucha, Goldberg, "Constant-Size Commitments to
//! Polynomials and Their Applications" (2010).

use crate::curve::{pairing_check, G1Affine, G1Projective, G2Affine};
use crate::error::{Error, Result};
use crate::fft::{bit_reverse, Domain};
use crate::field::Fr;
use crate::polynomial::Polynomial;
use rand::{CryptoRng, Rng};
use rayon::prelude::*;
use tracing::debug;

/// Structured reference string: monomial-basis G1 powers of the trapdoor
/// and the matching G2 point. Immutable once created; shared read-only
/// across setups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Srs {
    /// `[τ^i]₁` for i = 0..=max_degree.
    pub g1_powers: Vec<G1Affine>,
    /// `[1]₂`.
    pub g2_generator: G2Affine,
    /// `[τ]₂`.
    pub g2_tau: G2Affine,
}

impl Srs {
    /// Generate an SRS supporting polynomials up to `max_degree`.
    ///
    /// The trapdoor is sampled from the caller's CSPRNG inside this
    /// function and dropped before returning; it is never part of the
    /// result. For production parameters, follow up with [`Srs::update`]
    /// contributions from independent parties.
    pub fn generate<R: Rng + CryptoRng>(max_degree: usize, rng: &mut R) -> Self {
        let tau = Fr::random(rng);
        let srs = Self::from_trapdoor(&tau, max_degree);
        debug!(max_degree, "generated SRS");
        srs
    }

    fn from_trapdoor(tau: &Fr, max_degree: usize) -> Self {
        let g1 = G1Projective::generator();

        let mut tau_powers = Vec::with_capacity(max_degree + 1);
        let mut tau_power = Fr::one();
        for _ in 0..=max_degree {
            tau_powers.push(tau_power);
            tau_power = tau_power * *tau;
        }

        let g1_powers: Vec<G1Affine> = tau_powers
            .par_iter()
            .map(|p| g1.scalar_mul(p).to_affine())
            .collect();

        let g2_tau = G2Affine::generator().to_projective().scalar_mul(tau).to_affine();

        Srs {
            g1_powers,
            g2_generator: G2Affine::generator(),
            g2_tau,
        }
    }

    /// Apply one ceremony contribution: a fresh secret r turns the
    /// trapdoor τ into τ·r. As long as one contributor discards their r,
    /// the final trapdoor is unknown to everyone.
    pub fn update<R: Rng + CryptoRng>(&mut self, rng: &mut R) {
        let r = Fr::random(rng);

        let mut r_powers = Vec::with_capacity(self.g1_powers.len());
        let mut r_power = Fr::one();
        for _ in 0..self.g1_powers.len() {
            r_powers.push(r_power);
            r_power = r_power * r;
        }

        self.g1_powers = self
            .g1_powers
            .par_iter()
            .zip(r_powers.par_iter())
            .map(|(p, rp)| p.to_projective().scalar_mul(rp).to_affine())
            .collect();
        self.g2_tau = self.g2_tau.to_projective().scalar_mul(&r).to_affine();
    }

    /// Run a simulated multi-party ceremony with the given number of
    /// sequential contributions.
    pub fn ceremony<R: Rng + CryptoRng>(
        max_degree: usize,
        participants: usize,
        rng: &mut R,
    ) -> Self {
        let mut srs = Self::generate(max_degree, rng);
        for _ in 1..participants {
            srs.update(rng);
        }
        srs
    }

    /// Highest polynomial degree this SRS can commit to.
    pub fn max_degree(&self) -> usize {
        self.g1_powers.len() - 1
    }

    /// Spot-check well-formedness: `e([τ^i]₁, [1]₂) == e([τ^{i-1}]₁, [τ]₂)`
    /// for a sample of indices.
    pub fn verify(&self) -> bool {
        if self.g1_powers.len() < 2 {
            return true;
        }

        for i in [1, 2, 5, self.max_degree()] {
            if i >= self.g1_powers.len() {
                continue;
            }
            let ok = pairing_check(
                &self.g1_powers[i],
                &self.g2_generator,
                &self.g1_powers[i - 1],
                &self.g2_tau,
            );
            if !ok {
                return false;
            }
        }
        true
    }

    /// Derive the Lagrange-basis SRS for a domain: `[L_i(τ)]₁` for each
    /// domain index, computed as an inverse FFT over the first n monomial
    /// points (bit-reversal permutation plus butterfly passes in G1).
    pub fn lagrange_basis(&self, domain: &Domain) -> Result<LagrangeSrs> {
        if self.g1_powers.len() < domain.n {
            return Err(Error::SizeMismatch(format!(
                "SRS holds {} G1 powers, Lagrange derivation needs {}",
                self.g1_powers.len(),
                domain.n
            )));
        }

        let mut points: Vec<G1Projective> = self.g1_powers[..domain.n]
            .iter()
            .map(|p| p.to_projective())
            .collect();
        g1_ifft_in_place(&mut points, domain);

        debug!(n = domain.n, "derived Lagrange-basis SRS");
        Ok(LagrangeSrs {
            n: domain.n,
            points: points.par_iter().map(|p| p.to_affine()).collect(),
        })
    }
}

/// Inverse FFT over G1: same bit-reversal and butterfly structure as the
/// scalar transform, with twiddle factors applied by scalar
/// multiplication and the final 1/n scaling in the exponent.
fn g1_ifft_in_place(points: &mut [G1Projective], domain: &Domain) {
    let n = points.len();
    debug_assert_eq!(n, domain.n);
    if n <= 1 {
        return;
    }

    let log_n = n.trailing_zeros();
    for i in 0..n {
        let j = bit_reverse(i, log_n);
        if i < j {
            points.swap(i, j);
        }
    }

    let mut m = 1;
    while m < n {
        let omega_m = domain.omega_inv.pow((n / (2 * m)) as u64);
        points.par_chunks_mut(2 * m).for_each(|block| {
            let mut omega_power = Fr::one();
            for j in 0..m {
                let t = block[j + m].scalar_mul(&omega_power);
                let u = block[j];
                block[j] = u + t;
                block[j + m] = u - t;
                omega_power = omega_power * omega_m;
            }
        });
        m *= 2;
    }

    points.par_iter_mut().for_each(|p| {
        *p = p.scalar_mul(&domain.n_inv);
    });
}

/// SRS in Lagrange basis over a fixed domain. Committing to a
/// polynomial given in evaluation form is a single MSM against these
/// points, with no interpolation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LagrangeSrs {
    /// Domain size the basis was derived over.
    pub n: usize,
    /// `[L_i(τ)]₁` for i = 0..n.
    pub points: Vec<G1Affine>,
}

impl LagrangeSrs {
    /// Commit to the polynomial whose evaluations on the domain are
    /// `evals`.
    pub fn commit_evals(&self, evals: &[Fr]) -> Result<Commitment> {
        if evals.len() > self.n {
            return Err(Error::SizeMismatch(format!(
                "{} evaluations exceed Lagrange basis size {}",
                evals.len(),
                self.n
            )));
        }
        Ok(Commitment {
            point: G1Projective::msm(&self.points[..evals.len()], evals).to_affine(),
        })
    }
}

/// A polynomial commitment: one G1 point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Commitment {
    pub point: G1Affine,
}

impl Commitment {
    /// Commit to a coefficient-form polynomial: `[f]₁ = Σ f_i·[τ^i]₁`.
    pub fn commit(poly: &Polynomial, srs: &Srs) -> Result<Self> {
        if poly.coeffs.len() > srs.g1_powers.len() {
            return Err(Error::InsufficientSrs {
                needed: poly.coeffs.len(),
                available: srs.g1_powers.len(),
            });
        }
        Ok(Commitment {
            point: G1Projective::msm(&srs.g1_powers, &poly.coeffs).to_affine(),
        })
    }
}

/// A KZG opening proof: the committed quotient `(f(X) - y)/(X - z)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpeningProof(pub G1Affine);

impl OpeningProof {
    /// Open `poly` at `z`, returning the evaluation and the proof.
    pub fn create(poly: &Polynomial, z: &Fr, srs: &Srs) -> Result<(Fr, Self)> {
        let y = poly.evaluate(z);

        let numerator = poly - &Polynomial::constant(y);
        let quotient = numerator.div_by_linear(z);

        let proof = Commitment::commit(&quotient, srs)?;
        Ok((y, OpeningProof(proof.point)))
    }

    /// Check `e([f]₁ - y·[1]₁, [1]₂) == e([π]₁, [τ]₂ - z·[1]₂)`, which
    /// holds exactly when `f(z) = y`.
    pub fn verify(commitment: &Commitment, z: &Fr, y: &Fr, proof: &OpeningProof, srs: &Srs) -> bool {
        let g1 = G1Projective::generator();
        let lhs = commitment.point.to_projective() - g1.scalar_mul(y);
        let rhs_g2 = srs.g2_tau.to_projective() - srs.g2_generator.to_projective().scalar_mul(z);

        pairing_check(
            &lhs.to_affine(),
            &srs.g2_generator,
            &proof.0,
            &rhs_g2.to_affine(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_srs(max_degree: usize) -> Srs {
        let mut rng = ChaCha20Rng::seed_from_u64(12345);
        Srs::generate(max_degree, &mut rng)
    }

    #[test]
    fn test_srs_generation() {
        let srs = test_srs(16);
        assert_eq!(srs.g1_powers.len(), 17);
        assert_eq!(srs.max_degree(), 16);
        assert!(srs.verify());
    }

    #[test]
    fn test_srs_update_preserves_structure() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut srs = Srs::generate(8, &mut rng);
        srs.update(&mut rng);
        assert!(srs.verify());

        let ceremony = Srs::ceremony(8, 3, &mut ChaCha20Rng::seed_from_u64(9));
        assert!(ceremony.verify());
    }

    #[test]
    fn test_commit_and_open() {
        let srs = test_srs(16);

        // f(X) = 1 + 2X + 3X^2, f(5) = 86
        let poly = Polynomial::from_coeffs(vec![Fr::from_u64(1), Fr::from_u64(2), Fr::from_u64(3)]);
        let commitment = Commitment::commit(&poly, &srs).unwrap();

        let z = Fr::from_u64(5);
        let (y, proof) = OpeningProof::create(&poly, &z, &srs).unwrap();
        assert_eq!(y, Fr::from_u64(86));

        assert!(OpeningProof::verify(&commitment, &z, &y, &proof, &srs));
        assert!(!OpeningProof::verify(
            &commitment,
            &z,
            &Fr::from_u64(87),
            &proof,
            &srs
        ));
    }

    #[test]
    fn test_commit_rejects_oversized_polynomial() {
        let srs = test_srs(2);
        let poly = Polynomial::from_coeffs(vec![Fr::one(); 5]);
        assert!(matches!(
            Commitment::commit(&poly, &srs),
            Err(Error::InsufficientSrs { .. })
        ));
    }

    #[test]
    fn test_lagrange_monomial_consistency() {
        let domain = Domain::new(8).unwrap();
        let srs = test_srs(8);
        let lagrange = srs.lagrange_basis(&domain).unwrap();

        let evals: Vec<Fr> = (0..8u64).map(|i| Fr::from_u64(3 * i + 1)).collect();
        let poly = Polynomial::from_evaluations(&evals, &domain);

        let monomial_commit = Commitment::commit(&poly, &srs).unwrap();
        let lagrange_commit = lagrange.commit_evals(&evals).unwrap();
        assert_eq!(monomial_commit, lagrange_commit);
    }

    #[test]
    fn test_lagrange_basis_size_check() {
        let domain = Domain::new(16).unwrap();
        let srs = test_srs(8);
        assert!(matches!(
            srs.lagrange_basis(&domain),
            Err(Error::SizeMismatch(_))
        ));
    }
}
