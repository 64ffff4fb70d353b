//! Circuit construction and compilation.
//!
//! The only way circuits enter the system: declare input variables,
//! apply gates, then [`Circuit::compile`]. Gate kinds are a closed
//! enumeration with a fixed lowering into selector rows; there is no
//! open-ended gate dispatch.

use crate::circuit::constraint::{ConstraintSystem, Witness};
use crate::error::{Error, Result};
use crate::field::Fr;
use tracing::debug;

/// Default cap on the compiled domain size.
pub const MAX_DOMAIN_SIZE: usize = 1 << 20;

/// Smallest domain the protocol runs over.
const MIN_DOMAIN_SIZE: usize = 4;

/// A handle to a circuit variable. Only valid for the circuit that
/// created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Variable(pub(crate) usize);

/// The closed set of gate operations.
#[derive(Clone, Debug)]
pub enum Gate {
    /// `out = left + right`
    Add {
        left: Variable,
        right: Variable,
        out: Variable,
    },
    /// `out = left · right`
    Mul {
        left: Variable,
        right: Variable,
        out: Variable,
    },
    /// `left = right`, enforced through the copy-constraint permutation.
    AssertEqual { left: Variable, right: Variable },
    /// `out = Σ coeff·var + constant`. The builder keeps at most two
    /// terms per stored gate; longer combinations are chained.
    LinearCombine {
        terms: Vec<(Fr, Variable)>,
        constant: Fr,
        out: Variable,
    },
}

/// A declarative arithmetic circuit: named input variables tagged
/// public or private, and a sequence of gates over them.
#[derive(Clone, Debug, Default)]
pub struct Circuit {
    names: Vec<String>,
    is_public: Vec<bool>,
    is_input: Vec<bool>,
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a public input variable. Public variables are bound to
    /// the statement the verifier sees, in declaration order.
    pub fn public_input(&mut self, name: &str) -> Variable {
        self.new_variable(name, true, true)
    }

    /// Declare a private (witness-only) input variable.
    pub fn private_input(&mut self, name: &str) -> Variable {
        self.new_variable(name, false, true)
    }

    fn new_variable(&mut self, name: &str, public: bool, input: bool) -> Variable {
        let index = self.names.len();
        self.names.push(name.to_string());
        self.is_public.push(public);
        self.is_input.push(input);
        Variable(index)
    }

    fn derived(&mut self) -> Variable {
        let name = format!("w{}", self.names.len());
        self.new_variable(&name, false, false)
    }

    /// `left + right`.
    pub fn add(&mut self, left: Variable, right: Variable) -> Variable {
        let out = self.derived();
        self.gates.push(Gate::Add { left, right, out });
        out
    }

    /// `left · right`.
    pub fn mul(&mut self, left: Variable, right: Variable) -> Variable {
        let out = self.derived();
        self.gates.push(Gate::Mul { left, right, out });
        out
    }

    /// A variable pinned to a constant value.
    pub fn constant(&mut self, value: Fr) -> Variable {
        self.linear_combine(&[], value)
    }

    /// `Σ coeff·var + constant`. Combinations with more than two terms
    /// are chained through intermediate wires two terms at a time.
    pub fn linear_combine(&mut self, terms: &[(Fr, Variable)], constant: Fr) -> Variable {
        if terms.len() <= 2 {
            let out = self.derived();
            self.gates.push(Gate::LinearCombine {
                terms: terms.to_vec(),
                constant,
                out,
            });
            return out;
        }

        let mut acc = self.linear_combine(&terms[..2], Fr::zero());
        for (i, term) in terms[2..].iter().enumerate() {
            let tail_constant = if i == terms.len() - 3 {
                constant
            } else {
                Fr::zero()
            };
            acc = self.linear_combine(&[(Fr::one(), acc), *term], tail_constant);
        }
        acc
    }

    /// Constrain two variables to carry the same value.
    pub fn assert_equal(&mut self, left: Variable, right: Variable) {
        self.gates.push(Gate::AssertEqual { left, right });
    }

    pub fn num_variables(&self) -> usize {
        self.names.len()
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Compile with the default domain cap.
    pub fn compile(&self) -> Result<ConstraintSystem> {
        self.compile_with_limit(MAX_DOMAIN_SIZE)
    }

    /// Lower the circuit into a constraint system.
    ///
    /// Deterministic and pure: wire ids are assigned public-first in
    /// declaration order, each gate becomes one selector row, equal-value
    /// variables are grouped with union-find, and the row count is padded
    /// to the next power of two with zero-effect rows.
    pub fn compile_with_limit(&self, max_domain: usize) -> Result<ConstraintSystem> {
        let nv = self.names.len();

        for (i, gate) in self.gates.iter().enumerate() {
            for var in gate_operands(gate) {
                if var.0 >= nv {
                    return Err(Error::Compile(format!(
                        "gate {i} references undeclared variable {}",
                        var.0
                    )));
                }
            }
        }

        // Wire ids: public variables first, in declaration order.
        let publics: Vec<usize> = (0..nv).filter(|&v| self.is_public[v]).collect();
        let num_public = publics.len();

        let mut var_map = vec![usize::MAX; nv];
        let mut next = 0;
        for &p in &publics {
            var_map[p] = next;
            next += 1;
        }
        for v in 0..nv {
            if !self.is_public[v] {
                var_map[v] = next;
                next += 1;
            }
        }
        if publics.iter().enumerate().any(|(i, &p)| var_map[p] != i) {
            return Err(Error::Compile(
                "public variable without an assigned position".to_string(),
            ));
        }

        // One synthetic always-zero wire fills unused row slots.
        let zero_wire = next;
        let num_wires = next + 1;

        let mut uf = UnionFind::new(num_wires);
        for gate in &self.gates {
            if let Gate::AssertEqual { left, right } = gate {
                uf.union(var_map[left.0], var_map[right.0]);
            }
        }

        let mut q_m = Vec::new();
        let mut q_l = Vec::new();
        let mut q_r = Vec::new();
        let mut q_o = Vec::new();
        let mut q_c = Vec::new();
        let mut wire_a = Vec::new();
        let mut wire_b = Vec::new();
        let mut wire_c = Vec::new();

        let mut push_row =
            |a: usize, b: usize, c: usize, m: Fr, l: Fr, r: Fr, o: Fr, k: Fr| {
                wire_a.push(a);
                wire_b.push(b);
                wire_c.push(c);
                q_m.push(m);
                q_l.push(l);
                q_r.push(r);
                q_o.push(o);
                q_c.push(k);
            };

        // Public binding rows: q_L·x + PI = 0 with PI(ω^i) = -x_i.
        for i in 0..num_public {
            push_row(
                i,
                zero_wire,
                zero_wire,
                Fr::zero(),
                Fr::one(),
                Fr::zero(),
                Fr::zero(),
                Fr::zero(),
            );
        }

        for gate in &self.gates {
            match gate {
                Gate::Add { left, right, out } => push_row(
                    var_map[left.0],
                    var_map[right.0],
                    var_map[out.0],
                    Fr::zero(),
                    Fr::one(),
                    Fr::one(),
                    -Fr::one(),
                    Fr::zero(),
                ),
                Gate::Mul { left, right, out } => push_row(
                    var_map[left.0],
                    var_map[right.0],
                    var_map[out.0],
                    Fr::one(),
                    Fr::zero(),
                    Fr::zero(),
                    -Fr::one(),
                    Fr::zero(),
                ),
                Gate::LinearCombine {
                    terms,
                    constant,
                    out,
                } => {
                    let (l_wire, l_coeff) = terms
                        .first()
                        .map(|(c, v)| (var_map[v.0], *c))
                        .unwrap_or((zero_wire, Fr::zero()));
                    let (r_wire, r_coeff) = terms
                        .get(1)
                        .map(|(c, v)| (var_map[v.0], *c))
                        .unwrap_or((zero_wire, Fr::zero()));
                    push_row(
                        l_wire,
                        r_wire,
                        var_map[out.0],
                        Fr::zero(),
                        l_coeff,
                        r_coeff,
                        -Fr::one(),
                        *constant,
                    );
                }
                // Pure wiring: handled by the permutation groups above.
                Gate::AssertEqual { .. } => {}
            }
        }

        let num_rows = wire_a.len();
        let n = num_rows.next_power_of_two().max(MIN_DOMAIN_SIZE);
        if n > max_domain {
            return Err(Error::Compile(format!(
                "domain size {n} exceeds configured maximum {max_domain}"
            )));
        }

        // Pad with zero-effect rows.
        while wire_a.len() < n {
            wire_a.push(zero_wire);
            wire_b.push(zero_wire);
            wire_c.push(zero_wire);
            q_m.push(Fr::zero());
            q_l.push(Fr::zero());
            q_r.push(Fr::zero());
            q_o.push(Fr::zero());
            q_c.push(Fr::zero());
        }

        // Resolve union-find roots, then rewrite wire columns to class
        // representatives so copy groups are visible as shared ids.
        let classes: Vec<usize> = (0..num_wires).map(|w| uf.find(w)).collect();
        for column in [&mut wire_a, &mut wire_b, &mut wire_c] {
            for wire in column.iter_mut() {
                *wire = classes[*wire];
            }
        }

        debug!(
            num_rows,
            n, num_public, num_wires, "compiled circuit"
        );

        Ok(ConstraintSystem {
            n,
            num_rows,
            num_public,
            num_wires,
            q_m,
            q_l,
            q_r,
            q_o,
            q_c,
            wire_a,
            wire_b,
            wire_c,
            classes,
            var_map,
        })
    }

    /// Evaluate the circuit under the given input assignment, producing
    /// the full witness for `cs`. Derived wires are filled gate by gate;
    /// satisfaction is not checked here; the prover prechecks it.
    pub fn solve(&self, cs: &ConstraintSystem, assignments: &[(Variable, Fr)]) -> Result<Witness> {
        let nv = self.names.len();
        if cs.var_map.len() != nv {
            return Err(Error::UnsatisfiedWitness(
                "constraint system does not belong to this circuit".to_string(),
            ));
        }

        let mut values: Vec<Option<Fr>> = vec![None; nv];
        for (var, value) in assignments {
            if var.0 >= nv {
                return Err(Error::UnsatisfiedWitness(
                    "assignment references an undeclared variable".to_string(),
                ));
            }
            if !self.is_input[var.0] {
                return Err(Error::UnsatisfiedWitness(format!(
                    "assignment targets derived variable '{}'",
                    self.names[var.0]
                )));
            }
            values[var.0] = Some(*value);
        }
        for v in 0..nv {
            if self.is_input[v] && values[v].is_none() {
                return Err(Error::UnsatisfiedWitness(format!(
                    "missing assignment for input '{}'",
                    self.names[v]
                )));
            }
        }

        let get = |values: &[Option<Fr>], var: &Variable| -> Result<Fr> {
            values[var.0].ok_or_else(|| {
                Error::UnsatisfiedWitness(format!(
                    "variable '{}' used before definition",
                    self.names[var.0]
                ))
            })
        };

        for gate in &self.gates {
            match gate {
                Gate::Add { left, right, out } => {
                    values[out.0] = Some(get(&values, left)? + get(&values, right)?);
                }
                Gate::Mul { left, right, out } => {
                    values[out.0] = Some(get(&values, left)? * get(&values, right)?);
                }
                Gate::LinearCombine {
                    terms,
                    constant,
                    out,
                } => {
                    let mut acc = *constant;
                    for (coeff, var) in terms {
                        acc += *coeff * get(&values, var)?;
                    }
                    values[out.0] = Some(acc);
                }
                Gate::AssertEqual { .. } => {}
            }
        }

        let mut wires = vec![Fr::zero(); cs.num_wires];
        for v in 0..nv {
            wires[cs.var_map[v]] = values[v].ok_or_else(|| {
                Error::UnsatisfiedWitness(format!("variable '{}' never defined", self.names[v]))
            })?;
        }

        Ok(Witness::new(wires, cs.num_public))
    }
}

/// Variables read or written by a gate.
fn gate_operands(gate: &Gate) -> Vec<Variable> {
    match gate {
        Gate::Add { left, right, out } | Gate::Mul { left, right, out } => {
            vec![*left, *right, *out]
        }
        Gate::AssertEqual { left, right } => vec![*left, *right],
        Gate::LinearCombine { terms, out, .. } => {
            let mut vars: Vec<Variable> = terms.iter().map(|(_, v)| *v).collect();
            vars.push(*out);
            vars
        }
    }
}

/// Union-find with path compression and union by rank, grouping wires
/// that must carry equal values.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, x: usize, y: usize) {
        let px = self.find(x);
        let py = self.find(y);
        if px == py {
            return;
        }
        if self.rank[px] < self.rank[py] {
            self.parent[px] = py;
        } else if self.rank[px] > self.rank[py] {
            self.parent[py] = px;
        } else {
            self.parent[py] = px;
            self.rank[px] += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_circuit() -> (Circuit, Variable, Variable, Variable) {
        // 2·a·b = c
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let b = circuit.private_input("b");
        let c = circuit.public_input("c");
        let ab = circuit.mul(a, b);
        let two_ab = circuit.linear_combine(&[(Fr::from_u64(2), ab)], Fr::zero());
        circuit.assert_equal(two_ab, c);
        (circuit, a, b, c)
    }

    #[test]
    fn test_compile_layout() {
        let (circuit, _, _, _) = product_circuit();
        let cs = circuit.compile().unwrap();

        // 1 public row + 2 gate rows, padded to 4.
        assert_eq!(cs.num_public, 1);
        assert_eq!(cs.num_rows, 3);
        assert_eq!(cs.n, 4);
        assert!(cs.n.is_power_of_two());
    }

    #[test]
    fn test_compile_rejects_foreign_variable() {
        let mut other = Circuit::new();
        let a = other.private_input("a");
        for _ in 0..10 {
            other.private_input("x");
        }
        let stray = other.mul(a, a);

        let mut circuit = Circuit::new();
        let b = circuit.private_input("b");
        circuit.add(b, stray);
        assert!(matches!(circuit.compile(), Err(Error::Compile(_))));
    }

    #[test]
    fn test_compile_rejects_oversized_domain() {
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let mut acc = a;
        for _ in 0..8 {
            acc = circuit.add(acc, acc);
        }
        assert!(matches!(
            circuit.compile_with_limit(4),
            Err(Error::Compile(_))
        ));
    }

    #[test]
    fn test_solve_and_check_satisfied() {
        let (circuit, a, b, c) = product_circuit();
        let cs = circuit.compile().unwrap();

        let witness = circuit
            .solve(
                &cs,
                &[
                    (a, Fr::from_u64(5)),
                    (b, Fr::from_u64(12)),
                    (c, Fr::from_u64(120)),
                ],
            )
            .unwrap();

        assert_eq!(witness.public_inputs(), &[Fr::from_u64(120)]);
        cs.check_witness(&witness).unwrap();
    }

    #[test]
    fn test_check_rejects_violated_assertion() {
        let (circuit, a, b, c) = product_circuit();
        let cs = circuit.compile().unwrap();

        let witness = circuit
            .solve(
                &cs,
                &[
                    (a, Fr::from_u64(5)),
                    (b, Fr::from_u64(12)),
                    (c, Fr::from_u64(121)),
                ],
            )
            .unwrap();

        assert!(matches!(
            cs.check_witness(&witness),
            Err(Error::UnsatisfiedWitness(_))
        ));
    }

    #[test]
    fn test_solve_rejects_missing_input() {
        let (circuit, a, _, _) = product_circuit();
        let cs = circuit.compile().unwrap();
        let result = circuit.solve(&cs, &[(a, Fr::from_u64(5))]);
        assert!(matches!(result, Err(Error::UnsatisfiedWitness(_))));
    }

    #[test]
    fn test_long_linear_combination_chains() {
        let mut circuit = Circuit::new();
        let vars: Vec<Variable> = (0..5).map(|i| circuit.private_input(&format!("x{i}"))).collect();
        let terms: Vec<(Fr, Variable)> = vars
            .iter()
            .enumerate()
            .map(|(i, v)| (Fr::from_u64(i as u64 + 1), *v))
            .collect();
        let sum = circuit.linear_combine(&terms, Fr::from_u64(7));
        let expected = circuit.constant(Fr::from_u64(1 + 4 + 9 + 16 + 25 + 7));
        circuit.assert_equal(sum, expected);

        let cs = circuit.compile().unwrap();
        let assignments: Vec<(Variable, Fr)> = vars
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, Fr::from_u64(i as u64 + 1)))
            .collect();
        let witness = circuit.solve(&cs, &assignments).unwrap();
        cs.check_witness(&witness).unwrap();
    }

    #[test]
    fn test_constant_gate() {
        let mut circuit = Circuit::new();
        let k = circuit.constant(Fr::from_u64(9));
        let a = circuit.private_input("a");
        circuit.assert_equal(a, k);

        let cs = circuit.compile().unwrap();
        let good = circuit.solve(&cs, &[(a, Fr::from_u64(9))]).unwrap();
        cs.check_witness(&good).unwrap();

        let bad = circuit.solve(&cs, &[(a, Fr::from_u64(8))]).unwrap();
        assert!(cs.check_witness(&bad).is_err());
    }
}
