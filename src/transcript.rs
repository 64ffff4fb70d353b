//! Fiat-Shamir transcript.
//!
//! Converts the interactive protocol into a non-interactive one: the
//! prover and verifier absorb the same public data in the same order and
//! squeeze identical challenges out of a chained SHA-256 state. Every
//! absorbed item is label- and length-delimited so distinct message
//! sequences can never collide on the same byte stream.

use crate::curve::{G1Affine, G2Affine};
use crate::field::Fr;
use sha2::{Digest, Sha256};

/// Domain separator for this protocol version. Changing the protocol
/// layout requires a new separator.
pub const PROTOCOL_LABEL: &[u8] = b"plonkite-v1";

/// An append-only Fiat-Shamir transcript. Ephemeral: one per prove or
/// verify call, never persisted.
#[derive(Clone)]
pub struct Transcript {
    hasher: Sha256,
}

impl Transcript {
    /// Create a transcript seeded with a domain separator.
    pub fn new(domain_separator: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain_separator);
        Transcript { hasher }
    }

    /// Absorb raw bytes under a label.
    pub fn absorb_bytes(&mut self, label: &str, data: &[u8]) {
        self.hasher.update(label.as_bytes());
        self.hasher.update((data.len() as u64).to_le_bytes());
        self.hasher.update(data);
    }

    /// Absorb a field element.
    pub fn absorb_fr(&mut self, label: &str, value: &Fr) {
        self.absorb_bytes(label, &value.to_bytes());
    }

    /// Absorb a G1 point in compressed form.
    pub fn absorb_g1(&mut self, label: &str, point: &G1Affine) {
        self.absorb_bytes(label, &point.to_compressed_bytes());
    }

    /// Absorb a G2 point in compressed form.
    pub fn absorb_g2(&mut self, label: &str, point: &G2Affine) {
        self.absorb_bytes(label, &point.to_compressed_bytes());
    }

    /// Absorb an integer.
    pub fn absorb_u64(&mut self, label: &str, value: u64) {
        self.absorb_bytes(label, &value.to_le_bytes());
    }

    /// Squeeze one field challenge. The digest is fed back into the state
    /// so successive squeezes chain.
    pub fn squeeze_challenge(&mut self, label: &str) -> Fr {
        self.hasher.update(label.as_bytes());
        let hash = self.hasher.finalize_reset();
        self.hasher.update(hash);
        Fr::from_bytes_mod_order(&hash)
    }

    /// Squeeze a challenge that does not lie in the size-n evaluation
    /// domain, i.e. one with `x^n != 1`. A domain hit has negligible
    /// probability but would make the quotient ill-defined, so both
    /// sides resample identically until clear.
    pub fn squeeze_challenge_outside_domain(&mut self, label: &str, n: usize) -> Fr {
        loop {
            let challenge = self.squeeze_challenge(label);
            if challenge.pow(n as u64) != Fr::one() {
                return challenge;
            }
        }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(PROTOCOL_LABEL)
    }
}
