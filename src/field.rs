//! BLS12-381 scalar field.
//!
//! Thin adapter over the arkworks scalar field `Fr`. All polynomial
//! coefficients, wire values and protocol challenges live in this field.
//! The modulus has two-adicity 32, so multiplicative subgroups of any
//! power-of-two order up to 2^32 exist for FFT-based interpolation.

use ark_bls12_381::Fr as ArkFr;
use ark_ff::{BigInt, FftField, Field, One, PrimeField, Zero};
use ark_std::UniformRand;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A scalar field element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fr(pub(crate) ArkFr);

/// Canonical byte length of an encoded scalar.
pub const SCALAR_BYTES: usize = 32;

impl Fr {
    /// The additive identity.
    pub fn zero() -> Self {
        Fr(ArkFr::zero())
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Fr(ArkFr::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// Build a field element from an unsigned integer.
    pub fn from_u64(val: u64) -> Self {
        Fr(ArkFr::from(val))
    }

    /// The multiplicative inverse, or `None` for zero.
    pub fn inverse(&self) -> Option<Self> {
        self.0.inverse().map(Fr)
    }

    /// `x^exp` by square-and-multiply.
    pub fn pow(&self, exp: u64) -> Self {
        Fr(self.0.pow([exp]))
    }

    pub fn square(&self) -> Self {
        Fr(self.0.square())
    }

    pub fn double(&self) -> Self {
        Fr(self.0.double())
    }

    /// Sample a uniformly random element.
    pub fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Fr(ArkFr::rand(rng))
    }

    /// Canonical little-endian encoding.
    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        let mut bytes = [0u8; SCALAR_BYTES];
        let bigint = self.0.into_bigint();
        for (i, limb) in bigint.0.iter().enumerate() {
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Decode a canonical little-endian encoding. `None` if the value is
    /// not reduced modulo the field order.
    pub fn from_bytes(bytes: &[u8; SCALAR_BYTES]) -> Option<Self> {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut le = [0u8; 8];
            le.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *limb = u64::from_le_bytes(le);
        }
        ArkFr::from_bigint(BigInt::new(limbs)).map(Fr)
    }

    /// Big-endian encoding, the convention used by the on-chain codec.
    pub fn to_be_bytes(&self) -> [u8; SCALAR_BYTES] {
        let mut bytes = self.to_bytes();
        bytes.reverse();
        bytes
    }

    /// Decode a big-endian encoding.
    pub fn from_be_bytes(bytes: &[u8; SCALAR_BYTES]) -> Option<Self> {
        let mut le = *bytes;
        le.reverse();
        Self::from_bytes(&le)
    }

    /// Interpret arbitrary bytes as a field element by reduction. Used for
    /// transcript challenges where a uniform-enough element is needed.
    pub fn from_bytes_mod_order(bytes: &[u8]) -> Self {
        Fr(ArkFr::from_le_bytes_mod_order(bytes))
    }

    /// Hex string of the big-endian encoding, `0x`-prefixed.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_be_bytes()))
    }

    /// Parse a `0x`-prefixed or bare big-endian hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).ok()?;
        if bytes.len() != SCALAR_BYTES {
            return None;
        }
        let mut arr = [0u8; SCALAR_BYTES];
        arr.copy_from_slice(&bytes);
        Self::from_be_bytes(&arr)
    }

    /// Primitive n-th root of unity for power-of-two `n` up to 2^32.
    pub fn root_of_unity(n: usize) -> Option<Self> {
        if !n.is_power_of_two() {
            return None;
        }
        ArkFr::get_root_of_unity(n as u64).map(Fr)
    }

    /// Invert a slice in place with a single field inversion
    /// (Montgomery's trick). Zero entries are left untouched.
    pub fn batch_inverse(values: &mut [Fr]) {
        let mut inner: Vec<ArkFr> = values.iter().map(|v| v.0).collect();
        ark_ff::batch_inversion(&mut inner);
        for (v, i) in values.iter_mut().zip(inner) {
            v.0 = i;
        }
    }
}

impl Add for Fr {
    type Output = Fr;
    fn add(self, rhs: Fr) -> Fr {
        Fr(self.0 + rhs.0)
    }
}

impl Sub for Fr {
    type Output = Fr;
    fn sub(self, rhs: Fr) -> Fr {
        Fr(self.0 - rhs.0)
    }
}

impl Mul for Fr {
    type Output = Fr;
    fn mul(self, rhs: Fr) -> Fr {
        Fr(self.0 * rhs.0)
    }
}

impl Div for Fr {
    type Output = Fr;
    fn div(self, rhs: Fr) -> Fr {
        Fr(self.0 / rhs.0)
    }
}

impl Neg for Fr {
    type Output = Fr;
    fn neg(self) -> Fr {
        Fr(-self.0)
    }
}

impl AddAssign for Fr {
    fn add_assign(&mut self, rhs: Fr) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Fr {
    fn sub_assign(&mut self, rhs: Fr) {
        self.0 -= rhs.0;
    }
}

impl MulAssign for Fr {
    fn mul_assign(&mut self, rhs: Fr) {
        self.0 *= rhs.0;
    }
}

impl From<u64> for Fr {
    fn from(val: u64) -> Self {
        Fr::from_u64(val)
    }
}

impl From<i64> for Fr {
    fn from(val: i64) -> Self {
        if val >= 0 {
            Fr::from_u64(val as u64)
        } else {
            -Fr::from_u64(val.unsigned_abs())
        }
    }
}

impl Default for Fr {
    fn default() -> Self {
        Fr::zero()
    }
}

impl Serialize for Fr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fr::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid field element hex"))
    }
}
