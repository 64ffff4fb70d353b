//! Byte-exact encodings for the SRS, proofs and verifying keys.
//!
//! Proof layout (version 1, consumed verbatim by the exported verifier
//! contract): nine compressed G1 points followed by six big-endian
//! scalars, 624 bytes total, in the order
//!
//!   a_comm | b_comm | c_comm | z_comm | t_lo | t_mid | t_hi
//!   | w_zeta | w_zeta_omega
//!   | a_eval | b_eval | c_eval | s_sigma1_eval | s_sigma2_eval
//!   | z_omega_eval
//!
//! The SRS file is a length-prefixed sequence of compressed G1 points,
//! one compressed G2 point, and a trailing degree field; decoding
//! rejects any length or consistency mismatch.

use crate::curve::{G1Affine, G2Affine};
use crate::error::{Error, Result};
use crate::field::{Fr, SCALAR_BYTES};
use crate::kzg::Srs;
use crate::plonk::types::{Proof, VerifyingKey};

/// Version of the proof byte layout. Bump on any reordering or width
/// change; the layout itself carries no tag because the on-chain
/// verifier is generated against a fixed version.
pub const PROOF_LAYOUT_VERSION: u16 = 1;

/// Encoded proof size: 9 G1 points and 6 scalars.
pub const PROOF_BYTES: usize = 9 * G1Affine::COMPRESSED_SIZE + 6 * SCALAR_BYTES;

const VK_MAGIC: &[u8; 4] = b"PLVK";
const VK_VERSION: u16 = 1;

/// Cursor over an input buffer that fails with [`Error::Decode`]
/// instead of panicking on truncated input.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, offset: 0 }
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self.offset.checked_add(len).ok_or_else(|| {
            Error::Decode(format!("length overflow while reading {what}"))
        })?;
        if end > self.bytes.len() {
            return Err(Error::Decode(format!("truncated input while reading {what}")));
        }
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u64_le(&mut self, what: &str) -> Result<u64> {
        let bytes = self.take(8, what)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(arr))
    }

    fn u16_le(&mut self, what: &str) -> Result<u16> {
        let bytes = self.take(2, what)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn g1(&mut self, what: &str) -> Result<G1Affine> {
        let bytes = self.take(G1Affine::COMPRESSED_SIZE, what)?;
        G1Affine::from_compressed_bytes(bytes)
            .ok_or_else(|| Error::Decode(format!("invalid G1 point in {what}")))
    }

    fn g2(&mut self, what: &str) -> Result<G2Affine> {
        let bytes = self.take(G2Affine::COMPRESSED_SIZE, what)?;
        G2Affine::from_compressed_bytes(bytes)
            .ok_or_else(|| Error::Decode(format!("invalid G2 point in {what}")))
    }

    fn fr_be(&mut self, what: &str) -> Result<Fr> {
        let bytes = self.take(SCALAR_BYTES, what)?;
        let mut arr = [0u8; SCALAR_BYTES];
        arr.copy_from_slice(bytes);
        Fr::from_be_bytes(&arr)
            .ok_or_else(|| Error::Decode(format!("non-canonical scalar in {what}")))
    }

    fn finish(&self, what: &str) -> Result<()> {
        if self.offset != self.bytes.len() {
            return Err(Error::Decode(format!(
                "{} trailing bytes after {what}",
                self.bytes.len() - self.offset
            )));
        }
        Ok(())
    }
}

/// Serialize a proof into the fixed on-chain layout.
pub fn encode_proof(proof: &Proof) -> Vec<u8> {
    let mut out = Vec::with_capacity(PROOF_BYTES);
    for point in [
        &proof.a_comm,
        &proof.b_comm,
        &proof.c_comm,
        &proof.z_comm,
        &proof.t_lo_comm,
        &proof.t_mid_comm,
        &proof.t_hi_comm,
        &proof.w_zeta_comm,
        &proof.w_zeta_omega_comm,
    ] {
        out.extend_from_slice(&point.to_compressed_bytes());
    }
    for scalar in [
        &proof.a_eval,
        &proof.b_eval,
        &proof.c_eval,
        &proof.s_sigma1_eval,
        &proof.s_sigma2_eval,
        &proof.z_omega_eval,
    ] {
        out.extend_from_slice(&scalar.to_be_bytes());
    }
    debug_assert_eq!(out.len(), PROOF_BYTES);
    out
}

/// Decode a proof, rejecting anything but an exact, canonical layout.
pub fn decode_proof(bytes: &[u8]) -> Result<Proof> {
    if bytes.len() != PROOF_BYTES {
        return Err(Error::Decode(format!(
            "proof must be {PROOF_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    let mut reader = Reader::new(bytes);
    let proof = Proof {
        a_comm: reader.g1("proof.a_comm")?,
        b_comm: reader.g1("proof.b_comm")?,
        c_comm: reader.g1("proof.c_comm")?,
        z_comm: reader.g1("proof.z_comm")?,
        t_lo_comm: reader.g1("proof.t_lo_comm")?,
        t_mid_comm: reader.g1("proof.t_mid_comm")?,
        t_hi_comm: reader.g1("proof.t_hi_comm")?,
        w_zeta_comm: reader.g1("proof.w_zeta_comm")?,
        w_zeta_omega_comm: reader.g1("proof.w_zeta_omega_comm")?,
        a_eval: reader.fr_be("proof.a_eval")?,
        b_eval: reader.fr_be("proof.b_eval")?,
        c_eval: reader.fr_be("proof.c_eval")?,
        s_sigma1_eval: reader.fr_be("proof.s_sigma1_eval")?,
        s_sigma2_eval: reader.fr_be("proof.s_sigma2_eval")?,
        z_omega_eval: reader.fr_be("proof.z_omega_eval")?,
    };
    reader.finish("proof")?;
    Ok(proof)
}

/// Render a proof as `0x`-prefixed calldata hex.
pub fn proof_calldata_hex(proof: &Proof) -> String {
    format!("0x{}", hex::encode(encode_proof(proof)))
}

/// Serialize an SRS: point count, G1 points, `[τ]₂`, supported degree.
pub fn encode_srs(srs: &Srs) -> Vec<u8> {
    let mut out = Vec::with_capacity(
        8 + srs.g1_powers.len() * G1Affine::COMPRESSED_SIZE + G2Affine::COMPRESSED_SIZE + 8,
    );
    out.extend_from_slice(&(srs.g1_powers.len() as u64).to_le_bytes());
    for point in &srs.g1_powers {
        out.extend_from_slice(&point.to_compressed_bytes());
    }
    out.extend_from_slice(&srs.g2_tau.to_compressed_bytes());
    out.extend_from_slice(&(srs.max_degree() as u64).to_le_bytes());
    out
}

/// Decode an SRS, verifying the declared lengths against the actual
/// byte count and the degree field against the point count.
pub fn decode_srs(bytes: &[u8]) -> Result<Srs> {
    let mut reader = Reader::new(bytes);
    let count = reader.u64_le("srs.count")? as usize;
    if count == 0 {
        return Err(Error::Decode("SRS holds no G1 points".to_string()));
    }

    let expected = 8 + count * G1Affine::COMPRESSED_SIZE + G2Affine::COMPRESSED_SIZE + 8;
    if bytes.len() != expected {
        return Err(Error::Decode(format!(
            "SRS with {count} points must be {expected} bytes, got {}",
            bytes.len()
        )));
    }

    let mut g1_powers = Vec::with_capacity(count);
    for i in 0..count {
        g1_powers.push(reader.g1(&format!("srs.g1[{i}]"))?);
    }
    let g2_tau = reader.g2("srs.g2_tau")?;
    let degree = reader.u64_le("srs.degree")? as usize;
    reader.finish("srs")?;

    if degree != count - 1 {
        return Err(Error::Decode(format!(
            "SRS degree field {degree} inconsistent with {count} points"
        )));
    }

    Ok(Srs {
        g1_powers,
        g2_generator: G2Affine::generator(),
        g2_tau,
    })
}

/// Serialize a verifying key with a magic/version header.
pub fn encode_verifying_key(vk: &VerifyingKey) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(VK_MAGIC);
    out.extend_from_slice(&VK_VERSION.to_le_bytes());
    out.extend_from_slice(&(vk.n as u64).to_le_bytes());
    out.extend_from_slice(&(vk.num_public as u64).to_le_bytes());
    for scalar in [&vk.omega, &vk.k1, &vk.k2] {
        out.extend_from_slice(&scalar.to_be_bytes());
    }
    for point in [
        &vk.q_m_comm,
        &vk.q_l_comm,
        &vk.q_r_comm,
        &vk.q_o_comm,
        &vk.q_c_comm,
        &vk.s_sigma1_comm,
        &vk.s_sigma2_comm,
        &vk.s_sigma3_comm,
    ] {
        out.extend_from_slice(&point.to_compressed_bytes());
    }
    out.extend_from_slice(&vk.g2_generator.to_compressed_bytes());
    out.extend_from_slice(&vk.g2_tau.to_compressed_bytes());
    out
}

/// Decode a verifying key.
pub fn decode_verifying_key(bytes: &[u8]) -> Result<VerifyingKey> {
    let mut reader = Reader::new(bytes);

    let magic = reader.take(4, "vk.magic")?;
    if magic != VK_MAGIC {
        return Err(Error::Decode("bad verifying key magic".to_string()));
    }
    let version = reader.u16_le("vk.version")?;
    if version != VK_VERSION {
        return Err(Error::Decode(format!(
            "unsupported verifying key version {version}"
        )));
    }

    let n = reader.u64_le("vk.n")? as usize;
    if !n.is_power_of_two() {
        return Err(Error::Decode(format!("domain size {n} is not a power of two")));
    }
    let num_public = reader.u64_le("vk.num_public")? as usize;
    if num_public > n {
        return Err(Error::Decode(format!(
            "{num_public} public inputs cannot fit a domain of size {n}"
        )));
    }

    let vk = VerifyingKey {
        n,
        num_public,
        omega: reader.fr_be("vk.omega")?,
        k1: reader.fr_be("vk.k1")?,
        k2: reader.fr_be("vk.k2")?,
        q_m_comm: reader.g1("vk.q_m_comm")?,
        q_l_comm: reader.g1("vk.q_l_comm")?,
        q_r_comm: reader.g1("vk.q_r_comm")?,
        q_o_comm: reader.g1("vk.q_o_comm")?,
        q_c_comm: reader.g1("vk.q_c_comm")?,
        s_sigma1_comm: reader.g1("vk.s_sigma1_comm")?,
        s_sigma2_comm: reader.g1("vk.s_sigma2_comm")?,
        s_sigma3_comm: reader.g1("vk.s_sigma3_comm")?,
        g2_generator: reader.g2("vk.g2_generator")?,
        g2_tau: reader.g2("vk.g2_tau")?,
    };
    reader.finish("vk")?;
    Ok(vk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_srs() -> Srs {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        Srs::generate(10, &mut rng)
    }

    #[test]
    fn test_srs_roundtrip() {
        let srs = test_srs();
        let bytes = encode_srs(&srs);
        let decoded = decode_srs(&bytes).unwrap();
        assert_eq!(srs, decoded);
        assert_eq!(bytes, encode_srs(&decoded));
    }

    #[test]
    fn test_srs_rejects_truncation() {
        let bytes = encode_srs(&test_srs());
        for cut in [0, 7, 8, bytes.len() - 1] {
            assert!(matches!(
                decode_srs(&bytes[..cut]),
                Err(Error::Decode(_))
            ));
        }
    }

    #[test]
    fn test_srs_rejects_trailing_bytes() {
        let mut bytes = encode_srs(&test_srs());
        bytes.push(0);
        assert!(matches!(decode_srs(&bytes), Err(Error::Decode(_))));
    }

    #[test]
    fn test_srs_rejects_inconsistent_degree() {
        let mut bytes = encode_srs(&test_srs());
        let len = bytes.len();
        bytes[len - 8] ^= 1;
        assert!(matches!(decode_srs(&bytes), Err(Error::Decode(_))));
    }

    #[test]
    fn test_proof_decode_length_check() {
        assert!(matches!(
            decode_proof(&[0u8; PROOF_BYTES - 1]),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_proof(&[0u8; PROOF_BYTES + 1]),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_proof_decode_rejects_garbage_points() {
        // All-0xff bytes are not a valid compressed G1 encoding.
        assert!(matches!(
            decode_proof(&[0xffu8; PROOF_BYTES]),
            Err(Error::Decode(_))
        ));
    }
}
