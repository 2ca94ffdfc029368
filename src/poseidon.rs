//! Poseidon2 permutation wrappers (C2) and the compression/sponge
//! primitives built on top of them (used by [`crate::tweak`]).
//!
//! The permutations themselves are Plonky3's `Poseidon2KoalaBear<W>` with
//! its default round constants — this crate does not hand-roll Poseidon2,
//! it wraps the upstream implementation so outputs match bit-exactly.

use p3_koala_bear::{default_koalabear_poseidon2_16, default_koalabear_poseidon2_24, Poseidon2KoalaBear};
use p3_symmetric::Permutation;

use crate::field::{PrimeCharacteristicRing, PrimeField64, F};

/// State width for chain/tree compression (single or paired hash inputs).
pub const WIDTH_16: usize = 16;
/// State width for leaf sponge hashing.
pub const WIDTH_24: usize = 24;

/// Build the width-16 Poseidon2 permutation instance.
pub fn poseidon2_16() -> Poseidon2KoalaBear<16> {
    default_koalabear_poseidon2_16()
}

/// Build the width-24 Poseidon2 permutation instance.
pub fn poseidon2_24() -> Poseidon2KoalaBear<24> {
    default_koalabear_poseidon2_24()
}

/// Compression with feed-forward: `permute(input) + input`, truncated to
/// `OUT_LEN` elements. `input` is zero-padded up to `WIDTH` first.
pub fn compress<P, const WIDTH: usize, const OUT_LEN: usize>(perm: &P, input: &[F]) -> [F; OUT_LEN]
where
    P: Permutation<[F; WIDTH]>,
{
    assert!(input.len() <= WIDTH, "compression input exceeds state width");
    assert!(OUT_LEN <= WIDTH, "compression output exceeds state width");

    let mut padded = [F::ZERO; WIDTH];
    padded[..input.len()].copy_from_slice(input);

    let permuted = perm.permute(padded);

    let mut out = [F::ZERO; OUT_LEN];
    for i in 0..OUT_LEN {
        out[i] = permuted[i] + padded[i];
    }
    out
}

/// Sponge hashing over width-24 state with `capacity` lanes reserved (the
/// remaining `WIDTH_24 - capacity` lanes are rate). Absorbs `input` by
/// addition (not overwrite) into the rate lanes, permuting between chunks,
/// then squeezes `OUT_LEN` elements from the rate lanes.
pub fn sponge<const CAPACITY: usize, const OUT_LEN: usize>(
    perm: &Poseidon2KoalaBear<WIDTH_24>,
    initial_state: [F; WIDTH_24],
    input: &[F],
) -> [F; OUT_LEN] {
    let rate = WIDTH_24 - CAPACITY;
    let mut state = initial_state;

    let mut idx = 0;
    while idx < input.len() {
        let chunk_len = rate.min(input.len() - idx);
        for i in 0..chunk_len {
            state[i] += input[idx + i];
        }
        state = perm.permute(state);
        idx += chunk_len;
    }
    // Absorb an empty chunk (one permutation) when there is no input at all,
    // so squeezing never returns the raw initial state unpermuted.
    if input.is_empty() {
        state = perm.permute(state);
    }

    let mut out = [F::ZERO; OUT_LEN];
    let mut produced = 0;
    while produced < OUT_LEN {
        let take = rate.min(OUT_LEN - produced);
        out[produced..produced + take].copy_from_slice(&state[..take]);
        produced += take;
        if produced < OUT_LEN {
            state = perm.permute(state);
        }
    }
    out
}
