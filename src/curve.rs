//! BLS12-381 groups and pairing.
//!
//! Adapter over the arkworks curve implementation exposing exactly what
//! the protocol needs: G1/G2 arithmetic, multi-scalar multiplication and
//! the product-of-pairings equality check. Compressed encodings are
//! 48 bytes for G1 and 96 bytes for G2.

use ark_bls12_381::{
    Bls12_381, G1Affine as ArkG1Affine, G1Projective as ArkG1Projective,
    G2Affine as ArkG2Affine, G2Projective as ArkG2Projective,
};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, Group, VariableBaseMSM};
use ark_ff::{One, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, Mul, Neg, Sub};

use crate::field::Fr;

/// G1 point in affine coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G1Affine(pub(crate) ArkG1Affine);

/// G1 point in projective coordinates, for accumulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G1Projective(pub(crate) ArkG1Projective);

/// G2 point in affine coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G2Affine(pub(crate) ArkG2Affine);

/// G2 point in projective coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct G2Projective(pub(crate) ArkG2Projective);

/// Target-group element, the output of a pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gt(<Bls12_381 as Pairing>::TargetField);

impl G1Affine {
    /// Compressed encoding length in bytes.
    pub const COMPRESSED_SIZE: usize = 48;

    pub fn generator() -> Self {
        G1Affine(ArkG1Affine::generator())
    }

    /// The point at infinity.
    pub fn identity() -> Self {
        G1Affine(ArkG1Affine::identity())
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_projective(&self) -> G1Projective {
        G1Projective(self.0.into())
    }

    /// Canonical compressed encoding (48 bytes).
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::COMPRESSED_SIZE);
        self.0
            .serialize_compressed(&mut bytes)
            .expect("compressed G1 serialization is infallible");
        bytes
    }

    /// Decode a compressed encoding; `None` for off-curve or malformed input.
    pub fn from_compressed_bytes(bytes: &[u8]) -> Option<Self> {
        ArkG1Affine::deserialize_compressed(bytes).ok().map(G1Affine)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_compressed_bytes()))
    }

    pub fn neg(&self) -> Self {
        G1Affine(-self.0)
    }
}

impl G1Projective {
    pub fn generator() -> Self {
        G1Projective(ArkG1Projective::generator())
    }

    pub fn identity() -> Self {
        G1Projective(ArkG1Projective::zero())
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_affine(&self) -> G1Affine {
        G1Affine(self.0.into_affine())
    }

    pub fn scalar_mul(&self, scalar: &Fr) -> Self {
        G1Projective(self.0 * scalar.0)
    }

    /// Multi-scalar multiplication `Σ scalars[i]·points[i]`.
    ///
    /// Truncates to the shorter of the two slices.
    pub fn msm(points: &[G1Affine], scalars: &[Fr]) -> Self {
        let len = points.len().min(scalars.len());
        let ark_points: Vec<_> = points[..len].iter().map(|p| p.0).collect();
        let ark_scalars: Vec<_> = scalars[..len].iter().map(|s| s.0.into_bigint()).collect();
        G1Projective(ArkG1Projective::msm_bigint(&ark_points, &ark_scalars))
    }
}

impl Add for G1Projective {
    type Output = G1Projective;
    fn add(self, rhs: G1Projective) -> G1Projective {
        G1Projective(self.0 + rhs.0)
    }
}

impl Sub for G1Projective {
    type Output = G1Projective;
    fn sub(self, rhs: G1Projective) -> G1Projective {
        G1Projective(self.0 - rhs.0)
    }
}

impl Neg for G1Projective {
    type Output = G1Projective;
    fn neg(self) -> G1Projective {
        G1Projective(-self.0)
    }
}

impl Mul<Fr> for G1Projective {
    type Output = G1Projective;
    fn mul(self, rhs: Fr) -> G1Projective {
        self.scalar_mul(&rhs)
    }
}

impl From<G1Affine> for G1Projective {
    fn from(p: G1Affine) -> Self {
        p.to_projective()
    }
}

impl From<G1Projective> for G1Affine {
    fn from(p: G1Projective) -> Self {
        p.to_affine()
    }
}

impl Default for G1Affine {
    fn default() -> Self {
        G1Affine::identity()
    }
}

impl G2Affine {
    /// Compressed encoding length in bytes.
    pub const COMPRESSED_SIZE: usize = 96;

    pub fn generator() -> Self {
        G2Affine(ArkG2Affine::generator())
    }

    pub fn identity() -> Self {
        G2Affine(ArkG2Affine::identity())
    }

    pub fn is_identity(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_projective(&self) -> G2Projective {
        G2Projective(self.0.into())
    }

    /// Canonical compressed encoding (96 bytes).
    pub fn to_compressed_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::COMPRESSED_SIZE);
        self.0
            .serialize_compressed(&mut bytes)
            .expect("compressed G2 serialization is infallible");
        bytes
    }

    pub fn from_compressed_bytes(bytes: &[u8]) -> Option<Self> {
        ArkG2Affine::deserialize_compressed(bytes).ok().map(G2Affine)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_compressed_bytes()))
    }
}

impl G2Projective {
    pub fn generator() -> Self {
        G2Projective(ArkG2Projective::generator())
    }

    pub fn to_affine(&self) -> G2Affine {
        G2Affine(self.0.into_affine())
    }

    pub fn scalar_mul(&self, scalar: &Fr) -> Self {
        G2Projective(self.0 * scalar.0)
    }
}

impl Add for G2Projective {
    type Output = G2Projective;
    fn add(self, rhs: G2Projective) -> G2Projective {
        G2Projective(self.0 + rhs.0)
    }
}

impl Sub for G2Projective {
    type Output = G2Projective;
    fn sub(self, rhs: G2Projective) -> G2Projective {
        G2Projective(self.0 - rhs.0)
    }
}

impl Gt {
    pub fn identity() -> Self {
        Gt(<Bls12_381 as Pairing>::TargetField::one())
    }

    pub fn is_identity(&self) -> bool {
        self.0 == <Bls12_381 as Pairing>::TargetField::one()
    }
}

/// The bilinear pairing `e(P, Q)`.
pub fn pairing(p: &G1Affine, q: &G2Affine) -> Gt {
    Gt(Bls12_381::pairing(p.0, q.0).0)
}

/// Product of pairings `Π e(P_i, Q_i)` in one Miller loop.
pub fn multi_pairing(pairs: &[(G1Affine, G2Affine)]) -> Gt {
    Gt(Bls12_381::multi_pairing(
        pairs.iter().map(|(p, _)| p.0),
        pairs.iter().map(|(_, q)| q.0),
    )
    .0)
}

/// Check `e(P1, Q1) == e(P2, Q2)` as `e(P1, Q1)·e(-P2, Q2) == 1`.
pub fn pairing_check(p1: &G1Affine, q1: &G2Affine, p2: &G1Affine, q2: &G2Affine) -> bool {
    multi_pairing(&[(*p1, *q1), (p2.neg(), *q2)]).is_identity()
}

impl Serialize for G1Affine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for G1Affine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {e}")))?;
        G1Affine::from_compressed_bytes(&bytes)
            .ok_or_else(|| serde::de::Error::custom("invalid G1 point"))
    }
}

impl Serialize for G2Affine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for G2Affine {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(&s))
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {e}")))?;
        G2Affine::from_compressed_bytes(&bytes)
            .ok_or_else(|| serde::de::Error::custom("invalid G2 point"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_g1_scalar_mul() {
        let g = G1Projective::generator();
        let two_g = g + g;
        assert_eq!(two_g, g.scalar_mul(&Fr::from_u64(2)));
    }

    #[test]
    fn test_pairing_bilinearity() {
        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();

        let a = Fr::from_u64(3);
        let b = Fr::from_u64(5);

        let a_g1 = g1.to_projective().scalar_mul(&a).to_affine();
        let b_g2 = g2.to_projective().scalar_mul(&b).to_affine();
        let ab_g1 = g1.to_projective().scalar_mul(&(a * b)).to_affine();

        assert_eq!(pairing(&a_g1, &b_g2), pairing(&ab_g1, &g2));
    }

    #[test]
    fn test_pairing_check() {
        let g1 = G1Affine::generator();
        let g2 = G2Affine::generator();

        let a = Fr::from_u64(7);
        let a_g1 = g1.to_projective().scalar_mul(&a).to_affine();
        let a_g2 = g2.to_projective().scalar_mul(&a).to_affine();

        assert!(pairing_check(&a_g1, &g2, &g1, &a_g2));
        assert!(!pairing_check(&a_g1, &g2, &g1, &g2));
    }

    #[test]
    fn test_msm_matches_naive() {
        let g = G1Affine::generator();
        let points = vec![g, g, g];
        let scalars = vec![Fr::from_u64(1), Fr::from_u64(2), Fr::from_u64(3)];

        let result = G1Projective::msm(&points, &scalars);
        let expected = g.to_projective().scalar_mul(&Fr::from_u64(6));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_compressed_roundtrip() {
        let p = G1Projective::generator()
            .scalar_mul(&Fr::from_u64(99))
            .to_affine();
        let bytes = p.to_compressed_bytes();
        assert_eq!(bytes.len(), G1Affine::COMPRESSED_SIZE);
        assert_eq!(G1Affine::from_compressed_bytes(&bytes), Some(p));
        assert!(G1Affine::from_compressed_bytes(&bytes[..40]).is_none());
    }
}
