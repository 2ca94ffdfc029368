//! Winternitz one-time signatures (C6): per-epoch chain secrets, chain
//! walking, signing, and public-value recovery.

use crate::encoding::{BadStepVector, NUM_CHAINS, V};
use crate::prf::prf_to_field;
use crate::tweak::{chain_hash, Hash, Parameter, Tweak, HASH_LEN_FE};

/// Derive the epoch-`e`, chain-`i` secret `s_{e,i}` from the PRF key.
pub fn chain_secret(prf_key: &[u8], epoch: u32, chain_index: u8) -> Hash {
    let elements = prf_to_field(prf_key, epoch, chain_index as u64, HASH_LEN_FE);
    let arr: [_; HASH_LEN_FE] = elements.try_into().expect("PRF returns exactly HASH_LEN_FE elements");
    Hash::new(arr)
}

/// Walk chain `(epoch, chain_index)` forward `steps` times from position
/// `start`, each step computing `next = chain_hash(P, ChainTweak{epoch,
/// chain_index, pos}, current)`.
pub fn walk_chain(
    parameter: &Parameter,
    epoch: u32,
    chain_index: u8,
    start_pos: u8,
    steps: u8,
    start: &Hash,
) -> Hash {
    let mut current = *start;
    for j in 0..steps {
        let pos = start_pos + j + 1;
        let tweak = Tweak::chain(epoch, chain_index, pos);
        current = chain_hash(parameter, &tweak, &current);
    }
    current
}

/// Compute the chain endpoint (`v - 1` steps from position 0) for chain
/// `i`, the value folded into the WOTS public value / leaf hash.
pub fn chain_endpoint(parameter: &Parameter, prf_key: &[u8], epoch: u32, chain_index: u8) -> Hash {
    let secret = chain_secret(prf_key, epoch, chain_index);
    walk_chain(parameter, epoch, chain_index, 0, (V - 1) as u8, &secret)
}

/// The concatenation of all `L` chain endpoints for one epoch — the
/// pre-leaf WOTS public value.
pub fn wots_public(parameter: &Parameter, prf_key: &[u8], epoch: u32) -> Vec<Hash> {
    (0..NUM_CHAINS)
        .map(|i| chain_endpoint(parameter, prf_key, epoch, i as u8))
        .collect()
}

/// Sign: walk each chain `x_i` steps from position 0, yielding the
/// signature body `hashes[i]`.
pub fn sign(
    parameter: &Parameter,
    prf_key: &[u8],
    epoch: u32,
    steps: &[u32; NUM_CHAINS],
) -> Result<Vec<Hash>, BadStepVector> {
    if steps.iter().any(|&x| x >= V) {
        return Err(BadStepVector);
    }
    Ok((0..NUM_CHAINS)
        .map(|i| {
            let secret = chain_secret(prf_key, epoch, i as u8);
            walk_chain(parameter, epoch, i as u8, 0, steps[i] as u8, &secret)
        })
        .collect())
}

/// Recover: from each signature hash, walk the remaining `v - 1 - x_i`
/// steps to reconstruct the chain endpoint, reassembling the WOTS public.
pub fn recover(
    parameter: &Parameter,
    epoch: u32,
    steps: &[u32; NUM_CHAINS],
    hashes: &[Hash],
) -> Result<Vec<Hash>, BadStepVector> {
    if hashes.len() != NUM_CHAINS || steps.iter().any(|&x| x >= V) {
        return Err(BadStepVector);
    }
    Ok((0..NUM_CHAINS)
        .map(|i| {
            let remaining = (V - 1 - steps[i]) as u8;
            walk_chain(parameter, epoch, i as u8, steps[i] as u8, remaining, &hashes[i])
        })
        .collect())
}

/// Hash the WOTS public value into the epoch's Merkle leaf.
pub fn leaf_for_epoch(parameter: &Parameter, prf_key: &[u8], epoch: u32) -> Hash {
    let public = wots_public(parameter, prf_key, epoch);
    let flat: Vec<_> = public.iter().flat_map(|h| h.iter().copied()).collect();
    let tweak = Tweak::tree(0, epoch);
    crate::tweak::leaf_hash(parameter, &tweak, &flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_recover_matches_public_endpoint() {
        let parameter = Parameter::default();
        let prf_key = [9u8; 32];
        let epoch = 3;
        let mut steps = [0u32; NUM_CHAINS];
        steps[0] = 5;
        steps[1] = 7;

        let signed = sign(&parameter, &prf_key, epoch, &steps).unwrap();
        let recovered = recover(&parameter, epoch, &steps, &signed).unwrap();
        let expected_public = wots_public(&parameter, &prf_key, epoch);

        assert_eq!(recovered, expected_public);
    }

    #[test]
    fn bad_step_vector_is_rejected() {
        let parameter = Parameter::default();
        let prf_key = [9u8; 32];
        let mut steps = [0u32; NUM_CHAINS];
        steps[0] = V; // out of range

        assert!(sign(&parameter, &prf_key, 0, &steps).is_err());
    }

    #[test]
    fn leaf_hash_is_deterministic() {
        let parameter = Parameter::default();
        let prf_key = [9u8; 32];
        let a = leaf_for_epoch(&parameter, &prf_key, 12);
        let b = leaf_for_epoch(&parameter, &prf_key, 12);
        assert_eq!(a, b);
    }
}
