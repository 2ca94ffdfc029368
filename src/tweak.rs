//! Tweakable hash (C3): domain-separated compression and sponge modes
//! built on the Poseidon2 permutations in [`crate::poseidon`].
//!
//! Mode selection is fixed per call site rather than derived from input
//! length: [`chain_hash`] and [`tree_hash`] always compress, [`leaf_hash`]
//! always sponges. A single length-dispatching `apply` would let a caller
//! silently pick the wrong mode for its own input size.

use crate::field::{FieldArray, PrimeCharacteristicRing, F};
use crate::poseidon::{compress, poseidon2_16, poseidon2_24, sponge, WIDTH_24};

/// Length of a hash output, in field elements.
pub const HASH_LEN_FE: usize = 7;
/// Length of the hash parameter `P`, in field elements.
pub const PARAMETER_LEN: usize = 5;
/// Length of an encoded tweak, in field elements.
pub const TWEAK_LEN: usize = 2;

/// State width used for chain-step compression.
const CHAIN_WIDTH: usize = 16;
/// State width used for two-child Merkle-node compression.
///
/// The compression-mode bound `input_len <= W - |P| - |T|` cannot be met at
/// `W = 16` for two `HASH_LEN_FE`-element children (`14 > 16 - 5 - 2`); the
/// width-24 instance satisfies it (`14 <= 24 - 5 - 2`), so two-child Merkle
/// nodes compress over the wider permutation instead.
const MERGE_WIDTH: usize = 24;
/// Sponge capacity (in lanes) used for leaf hashing.
const SPONGE_CAPACITY: usize = 8;

pub type Parameter = FieldArray<PARAMETER_LEN>;
pub type Hash = FieldArray<HASH_LEN_FE>;

/// Domain-separating tweak attached to every tweakable-hash call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tweak {
    /// Merkle-tree node at `level` (0 = leaves), horizontal `pos`.
    TreeTweak { level: u8, pos: u32 },
    /// One step of one Winternitz chain within one epoch.
    ChainTweak {
        epoch: u32,
        chain_index: u8,
        pos_in_chain: u8,
    },
}

impl Tweak {
    pub fn tree(level: u8, pos: u32) -> Self {
        Self::TreeTweak { level, pos }
    }

    pub fn chain(epoch: u32, chain_index: u8, pos_in_chain: u8) -> Self {
        Self::ChainTweak {
            epoch,
            chain_index,
            pos_in_chain,
        }
    }

    /// Encode into the two field elements `(t0, t1)` fixed by the canonical
    /// wire layout: tree tweaks split `(level, pos)` directly; chain tweaks
    /// pack `chain_index` and `pos_in_chain` into `t1` alongside `epoch` in
    /// `t0`.
    pub fn to_field_elements(&self) -> [F; TWEAK_LEN] {
        match *self {
            Self::TreeTweak { level, pos } => [crate::field::from_u32(level as u32), crate::field::from_u32(pos)],
            Self::ChainTweak {
                epoch,
                chain_index,
                pos_in_chain,
            } => {
                let t1 = (chain_index as u32) * 256 + pos_in_chain as u32;
                [crate::field::from_u32(epoch), crate::field::from_u32(t1)]
            }
        }
    }
}

/// Compression-mode hash over P2-16: one chain step.
pub fn chain_hash(parameter: &Parameter, tweak: &Tweak, input: &Hash) -> Hash {
    let perm = poseidon2_16();
    let combined: [F; CHAIN_WIDTH] = assemble::<CHAIN_WIDTH>(parameter, tweak, input.inner());
    let out: [F; HASH_LEN_FE] = compress::<_, CHAIN_WIDTH, HASH_LEN_FE>(&perm, &combined);
    Hash::new(out)
}

/// Compression-mode hash over P2-24: combine two Merkle-tree children.
pub fn tree_hash(parameter: &Parameter, tweak: &Tweak, left: &Hash, right: &Hash) -> Hash {
    let perm = poseidon2_24();
    let mut input = [F::ZERO; 2 * HASH_LEN_FE];
    input[..HASH_LEN_FE].copy_from_slice(left.inner());
    input[HASH_LEN_FE..].copy_from_slice(right.inner());
    let combined: [F; MERGE_WIDTH] = assemble::<MERGE_WIDTH>(parameter, tweak, &input);
    let out: [F; HASH_LEN_FE] = compress::<_, MERGE_WIDTH, HASH_LEN_FE>(&perm, &combined);
    Hash::new(out)
}

/// Sponge-mode hash over P2-24: fold the whole WOTS public value (or any
/// other long field-element sequence) into a single leaf.
pub fn leaf_hash(parameter: &Parameter, tweak: &Tweak, input: &[F]) -> Hash {
    let perm = poseidon2_24();
    let mut initial_state = [F::ZERO; WIDTH_24];
    initial_state[..PARAMETER_LEN].copy_from_slice(parameter.inner());
    let tweak_fe = tweak.to_field_elements();
    initial_state[PARAMETER_LEN..PARAMETER_LEN + TWEAK_LEN].copy_from_slice(&tweak_fe);

    let out: [F; HASH_LEN_FE] = sponge::<SPONGE_CAPACITY, HASH_LEN_FE>(&perm, initial_state, input);
    Hash::new(out)
}

/// Assemble `[P ‖ T ‖ input ‖ 0-pad]` into a fixed-width compression state.
fn assemble<const WIDTH: usize>(parameter: &Parameter, tweak: &Tweak, input: &[F]) -> [F; WIDTH] {
    assert!(
        PARAMETER_LEN + TWEAK_LEN + input.len() <= WIDTH,
        "compression input exceeds state width"
    );
    let mut state = [F::ZERO; WIDTH];
    state[..PARAMETER_LEN].copy_from_slice(parameter.inner());
    let tweak_fe = tweak.to_field_elements();
    state[PARAMETER_LEN..PARAMETER_LEN + TWEAK_LEN].copy_from_slice(&tweak_fe);
    let input_start = PARAMETER_LEN + TWEAK_LEN;
    state[input_start..input_start + input.len()].copy_from_slice(input);
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_and_chain_tweaks_differ() {
        let tree = Tweak::tree(0, 0);
        let chain = Tweak::chain(0, 0, 0);
        assert_ne!(tree.to_field_elements(), chain.to_field_elements());
    }

    #[test]
    fn chain_hash_is_deterministic() {
        let parameter = Parameter::default();
        let tweak = Tweak::chain(1, 0, 3);
        let input = Hash::default();
        let a = chain_hash(&parameter, &tweak, &input);
        let b = chain_hash(&parameter, &tweak, &input);
        assert_eq!(a, b);
    }

    #[test]
    fn tree_hash_is_order_sensitive() {
        let parameter = Parameter::default();
        let tweak = Tweak::tree(1, 0);
        let left = Hash::new([crate::field::from_u32(1); HASH_LEN_FE]);
        let right = Hash::new([crate::field::from_u32(2); HASH_LEN_FE]);
        let forward = tree_hash(&parameter, &tweak, &left, &right);
        let swapped = tree_hash(&parameter, &tweak, &right, &left);
        assert_ne!(forward, swapped);
    }

    #[test]
    fn leaf_hash_absorbs_long_input() {
        let parameter = Parameter::default();
        let tweak = Tweak::tree(0, 7);
        let long_input = [crate::field::from_u32(3); 64 * HASH_LEN_FE];
        let a = leaf_hash(&parameter, &tweak, &long_input);
        let b = leaf_hash(&parameter, &tweak, &long_input);
        assert_eq!(a, b);
    }
}
