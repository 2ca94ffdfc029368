//! Deterministic key-material generation (C4, RNG half).
//!
//! `P` (the hash parameter) and `K` (the PRF key) are derived from a
//! caller-supplied 32-byte seed through a ChaCha12 keystream: the stream is
//! seeded once and drawn from sequentially, so the same seed always
//! produces the same `P` and `K`, in that order, regardless of platform.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::field::{self, PrimeCharacteristicRing, F};
use crate::tweak::{Parameter, PARAMETER_LEN};

/// Length of the PRF key, in bytes.
pub const PRF_KEY_LEN: usize = 32;

/// Key material drawn once at key generation: the hash parameter `P` and
/// the PRF key `K`.
pub struct KeyMaterial {
    pub parameter: Parameter,
    pub prf_key: [u8; PRF_KEY_LEN],
}

/// Draw `P` and `K` from a ChaCha12 keystream seeded by `seed`.
///
/// Byte-stream order is fixed: five little-endian `u32` words (each reduced
/// mod `p` via [`field::from_u32`], no rejection sampling) form `P`, then 32
/// raw bytes form `K`. Implementations that want interoperable signatures
/// MUST draw in this exact order.
pub fn derive_key_material(seed: [u8; 32]) -> KeyMaterial {
    let mut rng = ChaCha12Rng::from_seed(seed);

    let mut parameter = [F::ZERO; PARAMETER_LEN];
    for slot in parameter.iter_mut() {
        let mut word_bytes = [0u8; 4];
        rng.fill_bytes(&mut word_bytes);
        *slot = field::from_u32(u32::from_le_bytes(word_bytes));
    }

    let mut prf_key = [0u8; PRF_KEY_LEN];
    rng.fill_bytes(&mut prf_key);

    KeyMaterial {
        parameter: Parameter::new(parameter),
        prf_key,
    }
}
