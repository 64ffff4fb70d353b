//! Copy-constraint permutation.
//!
//! Wire positions live on a 3×n grid: column a over the domain H,
//! column b over the coset k1·H, column c over k2·H. Positions holding
//! the same wire are linked into one cycle; the permutation polynomials
//! S_σ1, S_σ2, S_σ3 encode the cycle successor of every position as a
//! field element. The grand-product argument then forces equal values
//! around every cycle.

use crate::circuit::ConstraintSystem;
use crate::fft::Domain;
use crate::field::Fr;
use crate::polynomial::Polynomial;
use std::collections::HashMap;

/// Which wire column a position belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Column {
    A,
    B,
    C,
}

/// A position on the wire grid: column plus domain row.
pub(crate) type Position = (Column, usize);

/// The computed permutation for one constraint system.
#[derive(Clone, Debug)]
pub struct Permutation {
    pub(crate) n: usize,
    /// Coset shift for column b.
    pub(crate) k1: Fr,
    /// Coset shift for column c.
    pub(crate) k2: Fr,

    /// σ*(a_i): cycle successor of each a-column position.
    pub(crate) sigma_a: Vec<Position>,
    pub(crate) sigma_b: Vec<Position>,
    pub(crate) sigma_c: Vec<Position>,

    /// S_σ1(ω^i): the successor of a_i, encoded.
    pub(crate) s_sigma1_evals: Vec<Fr>,
    pub(crate) s_sigma2_evals: Vec<Fr>,
    pub(crate) s_sigma3_evals: Vec<Fr>,
}

impl Permutation {
    /// Build the permutation from the wire columns of a compiled
    /// circuit. Positions sharing a wire id form one cycle each.
    pub(crate) fn compute(cs: &ConstraintSystem, domain: &Domain) -> Self {
        let n = domain.n;
        debug_assert_eq!(n, cs.n);

        let k1 = find_coset_shift(n, Fr::from_u64(5), &[]);
        let k2 = find_coset_shift(n, k1 + Fr::one(), &[k1]);

        // Identity permutation to start.
        let mut sigma_a: Vec<Position> = (0..n).map(|i| (Column::A, i)).collect();
        let mut sigma_b: Vec<Position> = (0..n).map(|i| (Column::B, i)).collect();
        let mut sigma_c: Vec<Position> = (0..n).map(|i| (Column::C, i)).collect();

        // Gather the positions of every wire in a fixed scan order.
        let mut positions: HashMap<usize, Vec<Position>> = HashMap::new();
        for i in 0..n {
            positions.entry(cs.wire_a[i]).or_default().push((Column::A, i));
        }
        for i in 0..n {
            positions.entry(cs.wire_b[i]).or_default().push((Column::B, i));
        }
        for i in 0..n {
            positions.entry(cs.wire_c[i]).or_default().push((Column::C, i));
        }

        // Link each wire's positions into a cycle.
        for members in positions.values() {
            if members.len() < 2 {
                continue;
            }
            for (idx, &current) in members.iter().enumerate() {
                let next = members[(idx + 1) % members.len()];
                match current {
                    (Column::A, row) => sigma_a[row] = next,
                    (Column::B, row) => sigma_b[row] = next,
                    (Column::C, row) => sigma_c[row] = next,
                }
            }
        }

        let omega_powers: Vec<Fr> = domain.elements().collect();
        let encode = |position: &Position| -> Fr {
            let (column, row) = position;
            let base = omega_powers[*row];
            match column {
                Column::A => base,
                Column::B => k1 * base,
                Column::C => k2 * base,
            }
        };

        let s_sigma1_evals: Vec<Fr> = sigma_a.iter().map(&encode).collect();
        let s_sigma2_evals: Vec<Fr> = sigma_b.iter().map(&encode).collect();
        let s_sigma3_evals: Vec<Fr> = sigma_c.iter().map(&encode).collect();

        Permutation {
            n,
            k1,
            k2,
            sigma_a,
            sigma_b,
            sigma_c,
            s_sigma1_evals,
            s_sigma2_evals,
            s_sigma3_evals,
        }
    }

    pub(crate) fn s_sigma1_poly(&self, domain: &Domain) -> Polynomial {
        Polynomial::from_evaluations(&self.s_sigma1_evals, domain)
    }

    pub(crate) fn s_sigma2_poly(&self, domain: &Domain) -> Polynomial {
        Polynomial::from_evaluations(&self.s_sigma2_evals, domain)
    }

    pub(crate) fn s_sigma3_poly(&self, domain: &Domain) -> Polynomial {
        Polynomial::from_evaluations(&self.s_sigma3_evals, domain)
    }
}

/// Find a coset shift k with k·H disjoint from H and from every coset
/// already chosen: k^n != 1 and (k/k')^n != 1 for each prior shift k'.
fn find_coset_shift(n: usize, start: Fr, taken: &[Fr]) -> Fr {
    let mut k = start;
    loop {
        let distinct_from_domain = k.pow(n as u64) != Fr::one();
        let distinct_from_taken = taken.iter().all(|other| {
            match other.inverse() {
                Some(inv) => (k * inv).pow(n as u64) != Fr::one(),
                None => true,
            }
        });
        if distinct_from_domain && distinct_from_taken {
            return k;
        }
        k = k + Fr::one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;

    #[test]
    fn test_identity_permutation_without_sharing() {
        // Distinct variables everywhere: every position is its own cycle
        // except those sharing the synthetic zero wire.
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let b = circuit.private_input("b");
        circuit.mul(a, b);
        let cs = circuit.compile().unwrap();
        let domain = Domain::new(cs.n).unwrap();

        let perm = Permutation::compute(&cs, &domain);

        // The mul row's positions are untouched: a, b and the product
        // each appear exactly once.
        assert_eq!(perm.sigma_a[0], (Column::A, 0));
        assert_eq!(perm.sigma_b[0], (Column::B, 0));
        assert_eq!(perm.sigma_c[0], (Column::C, 0));
    }

    #[test]
    fn test_shared_variable_forms_cycle() {
        // a appears in both operand slots of a square gate: positions
        // (A,0) and (B,0) must form a two-cycle.
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        circuit.mul(a, a);
        let cs = circuit.compile().unwrap();
        let domain = Domain::new(cs.n).unwrap();

        let perm = Permutation::compute(&cs, &domain);

        assert_eq!(perm.sigma_a[0], (Column::B, 0));
        assert_eq!(perm.sigma_b[0], (Column::A, 0));
    }

    #[test]
    fn test_sigma_encoding_is_a_permutation() {
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let b = circuit.private_input("b");
        let ab = circuit.mul(a, b);
        let sum = circuit.add(ab, a);
        circuit.assert_equal(sum, b);
        let cs = circuit.compile().unwrap();
        let domain = Domain::new(cs.n).unwrap();

        let perm = Permutation::compute(&cs, &domain);

        // The multiset of encoded successors must equal the multiset of
        // position encodings: σ* is a bijection on the grid.
        let mut identity: Vec<Fr> = Vec::new();
        let mut image: Vec<Fr> = Vec::new();
        for (i, element) in domain.elements().enumerate() {
            identity.push(element);
            identity.push(perm.k1 * element);
            identity.push(perm.k2 * element);
            image.push(perm.s_sigma1_evals[i]);
            image.push(perm.s_sigma2_evals[i]);
            image.push(perm.s_sigma3_evals[i]);
        }
        let key = |fr: &Fr| fr.to_bytes();
        identity.sort_by_key(key);
        image.sort_by_key(key);
        assert_eq!(identity, image);
    }

    #[test]
    fn test_coset_shifts_are_distinct() {
        let n = 8;
        let k1 = find_coset_shift(n, Fr::from_u64(5), &[]);
        let k2 = find_coset_shift(n, k1 + Fr::one(), &[k1]);

        assert_ne!(k1.pow(n as u64), Fr::one());
        assert_ne!(k2.pow(n as u64), Fr::one());
        let ratio = k2 * k1.inverse().unwrap();
        assert_ne!(ratio.pow(n as u64), Fr::one());
    }
}
