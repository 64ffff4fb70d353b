//! Arithmetic circuits and their compiled form.
//!
//! Callers describe a computation as variables plus gates from a closed
//! set (add, multiply, assert-equal, linear combinations) through
//! [`Circuit`]. [`Circuit::compile`] lowers the description into a
//! [`ConstraintSystem`]: one selector row per gate under the standard
//! constraint
//!
//!   q_M·a·b + q_L·a + q_R·b + q_O·c + q_C + PI = 0
//!
//! plus a permutation over wire positions enforcing that positions
//! carrying the same value are wired together.

pub mod builder;
pub mod constraint;

pub use builder::{Circuit, Gate, Variable};
pub use constraint::{ConstraintSystem, Witness};
