//! Message encoder (C5): maps a message digest to a target-sum step vector
//! via rejection sampling over a per-signature randomizer `ρ`.

use rand::RngCore;

use crate::field::{self, PrimeCharacteristicRing, F};
use crate::poseidon::{poseidon2_24, sponge, WIDTH_24};
use crate::tweak::{Parameter, PARAMETER_LEN};

/// Winternitz parameter `w`: each digit lies in `[0, v)`.
pub const W: u32 = 3;
/// Digit radix `v = 2^w`.
pub const V: u32 = 1 << W;
/// Number of chains `L` (hypercube instantiation, no separate checksum chains).
pub const NUM_CHAINS: usize = 64;
/// Required digit sum for an accepted encoding.
pub const TARGET_SUM: u32 = 375;
/// Length of the per-signature randomizer `ρ`, in bytes.
pub const RHO_LEN: usize = 32;
/// Length of a message digest, in bytes.
pub const MESSAGE_DIGEST_LEN: usize = 20;
/// Sub-separator distinguishing message-randomness absorption from PRF use.
pub const DS_MSG_RANDOMNESS: u8 = 0x01;

const SPONGE_CAPACITY: usize = 8;

/// Sum of `x_i >= v` or digit count mismatch at verify time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadStepVector;

/// Target-sum loop exceeded its iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingExhausted;

/// A fixed iteration cap well above the expected `O(sqrt(L))` retry count,
/// short of the nominal `2^32` ceiling so a misconfigured target sum fails
/// fast instead of spinning for an impractical number of iterations.
const MAX_ENCODING_ATTEMPTS: u64 = 1 << 24;

/// Encode `message_digest` at `epoch` into a step vector with the target-sum
/// invariant, sampling fresh `ρ` from `rng` until one satisfies it.
pub fn encode<R: RngCore>(
    parameter: &Parameter,
    epoch: u64,
    message_digest: &[u8; MESSAGE_DIGEST_LEN],
    rng: &mut R,
) -> Result<([u32; NUM_CHAINS], [u8; RHO_LEN]), EncodingExhausted> {
    for _ in 0..MAX_ENCODING_ATTEMPTS {
        let mut rho = [0u8; RHO_LEN];
        rng.fill_bytes(&mut rho);

        let digits = digest_to_digits(parameter, epoch, message_digest, &rho);
        if digits.iter().sum::<u32>() == TARGET_SUM {
            return Ok((digits, rho));
        }
    }
    Err(EncodingExhausted)
}

/// Deterministically recompute the digit vector for a given `ρ`; used by
/// both the sign-side retry loop and verification.
pub fn digest_to_digits(
    parameter: &Parameter,
    epoch: u64,
    message_digest: &[u8; MESSAGE_DIGEST_LEN],
    rho: &[u8; RHO_LEN],
) -> [u32; NUM_CHAINS] {
    let mut bytes = Vec::with_capacity(1 + RHO_LEN + 8 + MESSAGE_DIGEST_LEN);
    bytes.push(DS_MSG_RANDOMNESS);
    bytes.extend_from_slice(rho);
    bytes.extend_from_slice(&epoch.to_be_bytes());
    bytes.extend_from_slice(message_digest);

    let input_elements = bytes_to_field_elements(&bytes);

    let perm = poseidon2_24();
    let mut initial_state = [F::ZERO; WIDTH_24];
    initial_state[..PARAMETER_LEN].copy_from_slice(parameter.inner());

    let squeezed: [F; NUM_CHAINS] =
        sponge::<SPONGE_CAPACITY, NUM_CHAINS>(&perm, initial_state, &input_elements);

    let mut digits = [0u32; NUM_CHAINS];
    for (digit, fe) in digits.iter_mut().zip(squeezed.iter()) {
        *digit = field::as_canonical_u32(*fe) % V;
    }
    digits
}

/// Pack a byte string into field elements, 4 bytes per element
/// little-endian, zero-padding the final partial chunk. Used only for the
/// encoder's digest/randomizer absorption, never for hash-native data.
fn bytes_to_field_elements(bytes: &[u8]) -> Vec<F> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            field::from_u32(u32::from_le_bytes(word))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn encoding_satisfies_target_sum() {
        let parameter = Parameter::default();
        let digest = [7u8; MESSAGE_DIGEST_LEN];
        let mut rng = ChaCha12Rng::from_seed([1; 32]);

        let (digits, rho) = encode(&parameter, 5, &digest, &mut rng).unwrap();
        assert_eq!(digits.iter().sum::<u32>(), TARGET_SUM);
        for d in digits {
            assert!(d < V);
        }

        let recomputed = digest_to_digits(&parameter, 5, &digest, &rho);
        assert_eq!(digits, recomputed);
    }

    #[test]
    fn different_messages_diverge() {
        let parameter = Parameter::default();
        let rho = [3u8; RHO_LEN];
        let a = digest_to_digits(&parameter, 5, &[1u8; MESSAGE_DIGEST_LEN], &rho);
        let b = digest_to_digits(&parameter, 5, &[2u8; MESSAGE_DIGEST_LEN], &rho);
        assert_ne!(a, b);
    }
}
