//! Dense polynomial arithmetic over the scalar field.
//!
//! Polynomials are held in coefficient form, `coeffs[i]` being the
//! coefficient of `X^i`. Conversion to and from evaluation form goes
//! through [`crate::fft`].

use crate::fft::Domain;
use crate::field::Fr;
use std::ops::{Add, Mul, Neg, Sub};

/// A polynomial over `Fr` in coefficient form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polynomial {
    pub coeffs: Vec<Fr>,
}

impl Polynomial {
    /// The zero polynomial.
    pub fn zero() -> Self {
        Polynomial { coeffs: vec![] }
    }

    /// A constant polynomial.
    pub fn constant(c: Fr) -> Self {
        if c.is_zero() {
            Self::zero()
        } else {
            Polynomial { coeffs: vec![c] }
        }
    }

    /// Build from a coefficient vector, trimming leading zeros.
    pub fn from_coeffs(coeffs: Vec<Fr>) -> Self {
        let mut poly = Polynomial { coeffs };
        poly.normalize();
        poly
    }

    /// Interpolate the unique polynomial of degree < n through the given
    /// evaluations on the domain, via inverse FFT.
    pub fn from_evaluations(evals: &[Fr], domain: &Domain) -> Self {
        if evals.is_empty() {
            return Self::zero();
        }
        crate::fft::ifft(evals, &domain.omega)
    }

    /// Degree of the polynomial, `-1` for zero.
    pub fn degree(&self) -> isize {
        self.coeffs.len() as isize - 1
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty() || self.coeffs.iter().all(|c| c.is_zero())
    }

    fn normalize(&mut self) {
        while let Some(c) = self.coeffs.last() {
            if c.is_zero() {
                self.coeffs.pop();
            } else {
                break;
            }
        }
    }

    /// Horner evaluation at a single point.
    pub fn evaluate(&self, x: &Fr) -> Fr {
        let mut result = Fr::zero();
        for coeff in self.coeffs.iter().rev() {
            result = result * *x + *coeff;
        }
        result
    }

    /// Schoolbook multiplication. Fine for the short blinding factors this
    /// crate multiplies; bulk products go through coset evaluation instead.
    pub fn mul_poly(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }

        let mut result = vec![Fr::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                result[i + j] += *a * *b;
            }
        }
        Polynomial::from_coeffs(result)
    }

    /// Long division: `self = quotient·divisor + remainder`.
    pub fn div_rem(&self, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        assert!(!divisor.is_zero(), "division by zero polynomial");

        if self.degree() < divisor.degree() {
            return (Polynomial::zero(), self.clone());
        }

        let mut remainder = self.coeffs.clone();
        let divisor_leading = *divisor.coeffs.last().unwrap();
        let divisor_degree = divisor.degree() as usize;
        let quotient_degree = (self.degree() - divisor.degree()) as usize;
        let mut quotient = vec![Fr::zero(); quotient_degree + 1];

        let leading_inv = divisor_leading
            .inverse()
            .expect("normalized leading coefficient is nonzero");
        for i in (0..=quotient_degree).rev() {
            let coeff = remainder[i + divisor_degree] * leading_inv;
            quotient[i] = coeff;
            for (j, &d) in divisor.coeffs.iter().enumerate() {
                remainder[i + j] -= coeff * d;
            }
        }

        (
            Polynomial::from_coeffs(quotient),
            Polynomial::from_coeffs(remainder),
        )
    }

    /// Synthetic division by `(X - a)`. The remainder `self(a)` is dropped,
    /// so the result is the exact quotient only when `self(a) == 0`.
    pub fn div_by_linear(&self, a: &Fr) -> Polynomial {
        if self.is_zero() {
            return Polynomial::zero();
        }

        let n = self.coeffs.len();
        let mut quotient = vec![Fr::zero(); n - 1];
        let mut carry = Fr::zero();
        for i in (0..n - 1).rev() {
            quotient[i] = self.coeffs[i + 1] + carry;
            carry = quotient[i] * *a;
        }
        Polynomial::from_coeffs(quotient)
    }

    /// Multiply every coefficient by a scalar.
    pub fn scale(&self, scalar: &Fr) -> Polynomial {
        Polynomial {
            coeffs: self.coeffs.iter().map(|c| *c * *scalar).collect(),
        }
    }

    /// Coefficient of `X^i`, zero beyond the stored length.
    pub fn coeff(&self, i: usize) -> Fr {
        self.coeffs.get(i).copied().unwrap_or_else(Fr::zero)
    }

    /// The vanishing polynomial `Z_H(X) = X^n - 1` of a size-n domain.
    pub fn vanishing(n: usize) -> Self {
        let mut coeffs = vec![Fr::zero(); n + 1];
        coeffs[0] = -Fr::one();
        coeffs[n] = Fr::one();
        Polynomial { coeffs }
    }

    /// The i-th Lagrange basis polynomial of the domain: 1 at `ω^i`, 0 at
    /// every other domain point.
    pub fn lagrange_basis(i: usize, domain: &Domain) -> Self {
        let mut evals = vec![Fr::zero(); domain.n];
        evals[i] = Fr::one();
        Self::from_evaluations(&evals, domain)
    }

    /// Substitute `X -> ωX`, scaling the i-th coefficient by `ω^i`.
    pub fn shift(&self, omega: Fr) -> Self {
        let mut coeffs = self.coeffs.clone();
        let mut omega_power = Fr::one();
        for c in coeffs.iter_mut() {
            *c = *c * omega_power;
            omega_power = omega_power * omega;
        }
        Polynomial { coeffs }
    }

    /// Evaluate on the coset `k·H` of the given domain.
    pub fn evaluate_coset(&self, domain: &Domain, k: Fr) -> Vec<Fr> {
        crate::fft::coset_fft(self, &domain.omega, &k, domain.n)
    }
}

impl Add for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let max_len = self.coeffs.len().max(rhs.coeffs.len());
        let mut result = vec![Fr::zero(); max_len];
        for (i, c) in self.coeffs.iter().enumerate() {
            result[i] += *c;
        }
        for (i, c) in rhs.coeffs.iter().enumerate() {
            result[i] += *c;
        }
        Polynomial::from_coeffs(result)
    }
}

impl Sub for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Polynomial {
        let max_len = self.coeffs.len().max(rhs.coeffs.len());
        let mut result = vec![Fr::zero(); max_len];
        for (i, c) in self.coeffs.iter().enumerate() {
            result[i] += *c;
        }
        for (i, c) in rhs.coeffs.iter().enumerate() {
            result[i] -= *c;
        }
        Polynomial::from_coeffs(result)
    }
}

impl Mul for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        self.mul_poly(rhs)
    }
}

impl Mul<Fr> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Fr) -> Polynomial {
        self.scale(&rhs)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;
    fn add(self, rhs: Polynomial) -> Polynomial {
        &self + &rhs
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;
    fn sub(self, rhs: Polynomial) -> Polynomial {
        &self - &rhs
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;
    fn mul(self, rhs: Polynomial) -> Polynomial {
        self.mul_poly(&rhs)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;
    fn neg(self) -> Polynomial {
        Polynomial {
            coeffs: self.coeffs.into_iter().map(|c| -c).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        // f(X) = 1 + 2X + 3X^2, f(2) = 17
        let f = Polynomial::from_coeffs(vec![Fr::from_u64(1), Fr::from_u64(2), Fr::from_u64(3)]);
        assert_eq!(f.evaluate(&Fr::from_u64(2)), Fr::from_u64(17));
    }

    #[test]
    fn test_add_sub() {
        let f = Polynomial::from_coeffs(vec![Fr::from_u64(1), Fr::from_u64(2)]);
        let g = Polynomial::from_coeffs(vec![Fr::from_u64(3), Fr::from_u64(4)]);

        let sum = &f + &g;
        assert_eq!(sum.coeffs, vec![Fr::from_u64(4), Fr::from_u64(6)]);

        let diff = &sum - &g;
        assert_eq!(diff, f);
    }

    #[test]
    fn test_mul() {
        // (1 + X)^2 = 1 + 2X + X^2
        let f = Polynomial::from_coeffs(vec![Fr::from_u64(1), Fr::from_u64(1)]);
        let g = &f * &f;
        assert_eq!(
            g.coeffs,
            vec![Fr::from_u64(1), Fr::from_u64(2), Fr::from_u64(1)]
        );
    }

    #[test]
    fn test_div_rem() {
        let f = Polynomial::from_coeffs(vec![
            Fr::from_u64(2),
            Fr::from_u64(3),
            Fr::from_u64(1),
        ]);
        let d = Polynomial::from_coeffs(vec![Fr::from_u64(1), Fr::from_u64(1)]);
        let (q, r) = f.div_rem(&d);
        assert_eq!(&(&q * &d) + &r, f);
        assert!(r.degree() < d.degree());
    }

    #[test]
    fn test_div_by_linear() {
        // X^2 - 1 = (X - 1)(X + 1)
        let f = Polynomial::from_coeffs(vec![-Fr::one(), Fr::zero(), Fr::one()]);
        let q = f.div_by_linear(&Fr::one());
        assert_eq!(q.coeffs, vec![Fr::one(), Fr::one()]);
    }

    #[test]
    fn test_vanishing() {
        let n = 4;
        let omega = Fr::root_of_unity(n).unwrap();
        let z_h = Polynomial::vanishing(n);
        for i in 0..n {
            assert!(z_h.evaluate(&omega.pow(i as u64)).is_zero());
        }
        assert!(!z_h.evaluate(&Fr::from_u64(3)).is_zero());
    }

    #[test]
    fn test_lagrange_basis() {
        let domain = Domain::new(8).unwrap();
        let l3 = Polynomial::lagrange_basis(3, &domain);
        for (i, x) in domain.elements().enumerate() {
            let expected = if i == 3 { Fr::one() } else { Fr::zero() };
            assert_eq!(l3.evaluate(&x), expected);
        }
    }

    #[test]
    fn test_shift() {
        let domain = Domain::new(8).unwrap();
        let f = Polynomial::from_coeffs(vec![Fr::from_u64(5), Fr::from_u64(7), Fr::from_u64(11)]);
        let shifted = f.shift(domain.omega);
        let x = Fr::from_u64(3);
        assert_eq!(shifted.evaluate(&x), f.evaluate(&(x * domain.omega)));
    }
}
