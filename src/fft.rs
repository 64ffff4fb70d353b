//! Radix-2 FFT over multiplicative subgroups of the scalar field.
//!
//! Given a polynomial of degree < n and the primitive n-th root of unity
//! ω, the forward transform produces `[f(ω^0), ..., f(ω^{n-1})]`; the
//! inverse transform interpolates coefficients back from evaluations.
//! Butterfly stages operate on disjoint blocks and are fanned out across
//! a rayon pool once the domain is large enough to pay for it.

use crate::field::Fr;
use crate::polynomial::Polynomial;
use rayon::prelude::*;

/// Domains smaller than this run the serial butterfly path; the pool
/// dispatch overhead dominates below it.
const PARALLEL_FFT_MIN: usize = 1024;

/// Evaluate `poly` on the domain `{ω^0, ..., ω^{n-1}}`.
///
/// `n` must be a power of two; coefficients beyond `n` must not exist.
pub fn fft(poly: &Polynomial, omega: &Fr, n: usize) -> Vec<Fr> {
    assert!(n.is_power_of_two(), "FFT size must be a power of 2");
    assert!(poly.coeffs.len() <= n, "polynomial does not fit the domain");

    let mut coeffs = poly.coeffs.clone();
    coeffs.resize(n, Fr::zero());
    fft_in_place(&mut coeffs, omega);
    coeffs
}

/// Interpolate coefficients from evaluations on the domain.
pub fn ifft(evals: &[Fr], omega: &Fr) -> Polynomial {
    let n = evals.len();
    assert!(n.is_power_of_two(), "IFFT size must be a power of 2");

    let mut coeffs = evals.to_vec();
    let omega_inv = omega.inverse().expect("domain generator is nonzero");
    fft_in_place(&mut coeffs, &omega_inv);

    let n_inv = Fr::from_u64(n as u64)
        .inverse()
        .expect("domain size is nonzero in the field");
    for c in &mut coeffs {
        *c = *c * n_inv;
    }

    Polynomial::from_coeffs(coeffs)
}

/// In-place iterative Cooley-Tukey: bit-reversal permutation followed by
/// log2(n) butterfly passes over disjoint blocks.
pub(crate) fn fft_in_place(values: &mut [Fr], omega: &Fr) {
    let n = values.len();
    if n <= 1 {
        return;
    }

    bit_reverse_permutation(values);

    let mut m = 1;
    while m < n {
        let omega_m = omega.pow((n / (2 * m)) as u64);
        if n >= PARALLEL_FFT_MIN {
            values.par_chunks_mut(2 * m).for_each(|block| {
                butterfly_block(block, m, &omega_m);
            });
        } else {
            for block in values.chunks_mut(2 * m) {
                butterfly_block(block, m, &omega_m);
            }
        }
        m *= 2;
    }
}

fn butterfly_block(block: &mut [Fr], m: usize, omega_m: &Fr) {
    let mut omega_power = Fr::one();
    for j in 0..m {
        let t = omega_power * block[j + m];
        let u = block[j];
        block[j] = u + t;
        block[j + m] = u - t;
        omega_power = omega_power * *omega_m;
    }
}

fn bit_reverse_permutation(values: &mut [Fr]) {
    let n = values.len();
    let log_n = n.trailing_zeros();
    for i in 0..n {
        let j = bit_reverse(i, log_n);
        if i < j {
            values.swap(i, j);
        }
    }
}

pub(crate) fn bit_reverse(mut x: usize, bits: u32) -> usize {
    let mut result = 0;
    for _ in 0..bits {
        result = (result << 1) | (x & 1);
        x >>= 1;
    }
    result
}

/// Evaluate `poly` on the coset `k·H` by rescaling coefficients and
/// transforming on H.
pub fn coset_fft(poly: &Polynomial, omega: &Fr, k: &Fr, n: usize) -> Vec<Fr> {
    assert!(poly.coeffs.len() <= n, "polynomial does not fit the domain");
    let mut scaled = poly.coeffs.clone();
    scaled.resize(n, Fr::zero());

    let mut k_power = Fr::one();
    for c in &mut scaled {
        *c = *c * k_power;
        k_power = k_power * *k;
    }

    fft_in_place(&mut scaled, omega);
    scaled
}

/// Interpolate from evaluations on the coset `k·H`.
pub fn coset_ifft(evals: &[Fr], omega: &Fr, k: &Fr) -> Polynomial {
    let mut poly = ifft(evals, omega);

    let k_inv = k.inverse().expect("coset shift is nonzero");
    let mut k_inv_power = Fr::one();
    for c in &mut poly.coeffs {
        *c = *c * k_inv_power;
        k_inv_power = k_inv_power * k_inv;
    }
    poly
}

/// A multiplicative subgroup `H = {ω^0, ..., ω^{n-1}}` of power-of-two
/// order, with the precomputed constants every transform needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Domain {
    /// Order of the subgroup (power of two).
    pub n: usize,
    /// Primitive n-th root of unity.
    pub omega: Fr,
    /// `ω^{-1}`.
    pub omega_inv: Fr,
    /// `n^{-1}` in the field.
    pub n_inv: Fr,
}

impl Domain {
    /// Create a domain of the given power-of-two size, if the field
    /// supports it.
    pub fn new(n: usize) -> Option<Self> {
        let omega = Fr::root_of_unity(n)?;
        Some(Domain {
            n,
            omega,
            omega_inv: omega.inverse()?,
            n_inv: Fr::from_u64(n as u64).inverse()?,
        })
    }

    /// The i-th domain element `ω^i`.
    pub fn element(&self, i: usize) -> Fr {
        self.omega.pow(i as u64)
    }

    /// Iterate over all domain elements in order.
    pub fn elements(&self) -> impl Iterator<Item = Fr> + '_ {
        let mut current = Fr::one();
        (0..self.n).map(move |_| {
            let result = current;
            current = current * self.omega;
            result
        })
    }

    pub fn fft(&self, poly: &Polynomial) -> Vec<Fr> {
        fft(poly, &self.omega, self.n)
    }

    pub fn ifft(&self, evals: &[Fr]) -> Polynomial {
        ifft(evals, &self.omega)
    }

    pub fn coset_fft(&self, poly: &Polynomial, k: Fr) -> Vec<Fr> {
        coset_fft(poly, &self.omega, &k, self.n)
    }

    pub fn coset_ifft(&self, evals: &[Fr], k: Fr) -> Polynomial {
        coset_ifft(evals, &self.omega, &k)
    }

    /// `Z_H(x) = x^n - 1`.
    pub fn vanishing_eval(&self, x: &Fr) -> Fr {
        x.pow(self.n as u64) - Fr::one()
    }

    /// Evaluate the i-th Lagrange basis polynomial at `x`:
    /// `L_i(x) = ω^i·(x^n - 1) / (n·(x - ω^i))`, with `L_i(ω^i) = 1`.
    pub fn lagrange_eval(&self, i: usize, x: &Fr) -> Fr {
        let omega_i = self.element(i);
        if *x == omega_i {
            return Fr::one();
        }
        // x != ω^i, so the denominator is invertible.
        let denom = Fr::from_u64(self.n as u64) * (*x - omega_i);
        match denom.inverse() {
            Some(inv) => omega_i * self.vanishing_eval(x) * inv,
            None => Fr::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_ifft_roundtrip() {
        let n = 8;
        let omega = Fr::root_of_unity(n).unwrap();
        let poly = Polynomial::from_coeffs(vec![
            Fr::from_u64(1),
            Fr::from_u64(2),
            Fr::from_u64(3),
            Fr::from_u64(4),
        ]);

        let evals = fft(&poly, &omega, n);
        let recovered = ifft(&evals, &omega);
        assert_eq!(poly, recovered);
    }

    #[test]
    fn test_fft_evaluates_correctly() {
        let n = 4;
        let omega = Fr::root_of_unity(n).unwrap();
        let poly = Polynomial::from_coeffs(vec![Fr::from_u64(1), Fr::from_u64(2), Fr::from_u64(3)]);

        let evals = fft(&poly, &omega, n);
        for (i, eval) in evals.iter().enumerate() {
            assert_eq!(*eval, poly.evaluate(&omega.pow(i as u64)));
        }
    }

    #[test]
    fn test_parallel_path_matches_serial() {
        let n = 2048;
        let domain = Domain::new(n).unwrap();
        let coeffs: Vec<Fr> = (0..n as u64).map(|i| Fr::from_u64(i * i + 1)).collect();
        let poly = Polynomial::from_coeffs(coeffs);

        // The parallel stage split must agree with direct evaluation.
        let evals = domain.fft(&poly);
        for i in [0usize, 1, 513, 2047] {
            assert_eq!(evals[i], poly.evaluate(&domain.element(i)));
        }
        assert_eq!(domain.ifft(&evals), poly);
    }

    #[test]
    fn test_coset_fft_roundtrip() {
        let domain = Domain::new(8).unwrap();
        let k = Fr::from_u64(7);
        let poly = Polynomial::from_coeffs(vec![Fr::from_u64(9), Fr::from_u64(8), Fr::from_u64(7)]);

        let evals = domain.coset_fft(&poly, k);
        for (i, eval) in evals.iter().enumerate() {
            assert_eq!(*eval, poly.evaluate(&(k * domain.element(i))));
        }
        assert_eq!(domain.coset_ifft(&evals, k), poly);
    }

    #[test]
    fn test_lagrange_eval() {
        let domain = Domain::new(8).unwrap();
        let x = Fr::from_u64(12345);
        let direct = Polynomial::lagrange_basis(5, &domain).evaluate(&x);
        assert_eq!(domain.lagrange_eval(5, &x), direct);
        assert_eq!(domain.lagrange_eval(5, &domain.element(5)), Fr::one());
        assert_eq!(domain.lagrange_eval(5, &domain.element(2)), Fr::zero());
    }
}
