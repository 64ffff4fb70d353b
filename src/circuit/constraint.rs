//! Compiled constraint system and witness assignments.

use crate::error::{Error, Result};
use crate::field::Fr;

/// The compiled, domain-indexed form of a circuit. Immutable once
/// produced by [`crate::circuit::Circuit::compile`].
///
/// Row layout: the first `num_public` rows bind the public input
/// variables (selector `q_L = 1`, value supplied through the public
/// input polynomial); gate rows follow; the tail up to `n` is padding
/// with all-zero selectors. Wire columns store class representatives,
/// so equal-value wires share an id and the permutation argument can be
/// read off directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstraintSystem {
    /// Domain size: power of two ≥ the row count.
    pub n: usize,
    /// Rows in use before padding.
    pub num_rows: usize,
    /// Number of public input wires, occupying rows `0..num_public`.
    pub num_public: usize,
    /// Total wire count, including compiler-introduced wires.
    pub(crate) num_wires: usize,

    // Selector columns, length n.
    pub(crate) q_m: Vec<Fr>,
    pub(crate) q_l: Vec<Fr>,
    pub(crate) q_r: Vec<Fr>,
    pub(crate) q_o: Vec<Fr>,
    pub(crate) q_c: Vec<Fr>,

    // Wire columns, length n, holding class-representative wire ids.
    pub(crate) wire_a: Vec<usize>,
    pub(crate) wire_b: Vec<usize>,
    pub(crate) wire_c: Vec<usize>,

    /// Class representative per wire id; wires asserted equal share one.
    pub(crate) classes: Vec<usize>,

    /// Builder variable index -> wire id, used to align witness values.
    pub(crate) var_map: Vec<usize>,
}

impl ConstraintSystem {
    /// The wire values of a row under the given witness.
    fn row_wires(&self, w: &Witness, i: usize) -> (Fr, Fr, Fr) {
        (
            w.values[self.wire_a[i]],
            w.values[self.wire_b[i]],
            w.values[self.wire_c[i]],
        )
    }

    /// Public input contribution at row `i`: `-x_i` on public rows.
    pub(crate) fn public_input_eval(&self, public_inputs: &[Fr], i: usize) -> Fr {
        if i < public_inputs.len() {
            -public_inputs[i]
        } else {
            Fr::zero()
        }
    }

    /// Check that a witness satisfies every gate row and every copy
    /// class. This is the cheap field-only precheck the prover runs
    /// before any curve work.
    pub fn check_witness(&self, witness: &Witness) -> Result<()> {
        if witness.values.len() != self.num_wires {
            return Err(Error::UnsatisfiedWitness(format!(
                "witness carries {} wires, circuit has {}",
                witness.values.len(),
                self.num_wires
            )));
        }
        if witness.num_public != self.num_public {
            return Err(Error::UnsatisfiedWitness(format!(
                "witness has {} public inputs, circuit declares {}",
                witness.num_public, self.num_public
            )));
        }

        for (wire, &class) in self.classes.iter().enumerate() {
            if witness.values[wire] != witness.values[class] {
                return Err(Error::UnsatisfiedWitness(format!(
                    "copy constraint violated at wire {wire}"
                )));
            }
        }

        let public = witness.public_inputs();
        for i in 0..self.n {
            let (a, b, c) = self.row_wires(witness, i);
            let residual = self.q_m[i] * a * b
                + self.q_l[i] * a
                + self.q_r[i] * b
                + self.q_o[i] * c
                + self.q_c[i]
                + self.public_input_eval(public, i);
            if !residual.is_zero() {
                return Err(Error::UnsatisfiedWitness(format!(
                    "gate constraint violated at row {i}"
                )));
            }
        }

        Ok(())
    }

    /// Wire value vectors `(a, b, c)` over the full domain.
    pub(crate) fn wire_values(&self, witness: &Witness) -> (Vec<Fr>, Vec<Fr>, Vec<Fr>) {
        let a = self.wire_a.iter().map(|&w| witness.values[w]).collect();
        let b = self.wire_b.iter().map(|&w| witness.values[w]).collect();
        let c = self.wire_c.iter().map(|&w| witness.values[w]).collect();
        (a, b, c)
    }
}

/// A full assignment of field values to every wire of a compiled
/// circuit, public inputs first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Witness {
    /// One value per wire id, in constraint-system order.
    pub(crate) values: Vec<Fr>,
    pub(crate) num_public: usize,
}

impl Witness {
    pub(crate) fn new(values: Vec<Fr>, num_public: usize) -> Self {
        Witness { values, num_public }
    }

    /// The public sub-vector, in circuit declaration order.
    pub fn public_inputs(&self) -> &[Fr] {
        &self.values[..self.num_public]
    }
}
