//! Signer orchestrator (C8): key generation, signing, and verification
//! under the epoch-interval lifecycle, plus the canonical wire encodings
//! for `PublicKey` and `Signature`.

use serde::{Deserialize, Serialize};

use crate::encoding::{self, MESSAGE_DIGEST_LEN, NUM_CHAINS, RHO_LEN};
use crate::error::{KeyGenError, SignError};
use crate::merkle::MerkleTree;
use crate::rng::derive_key_material;
use crate::tweak::{Hash, Parameter, Tweak, HASH_LEN_FE, PARAMETER_LEN};
use crate::wots;

/// Public key: Merkle root, hash parameter, and tree height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    root: Hash,
    parameter: Parameter,
    height: u32,
}

impl PublicKey {
    pub fn root(&self) -> &Hash {
        &self.root
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canonical encoding: `root (28 bytes) ‖ P (20 bytes) ‖ h (1 byte)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HASH_LEN_FE * 4 + PARAMETER_LEN * 4 + 1);
        out.extend_from_slice(&self.root.to_bytes());
        out.extend_from_slice(&self.parameter.to_bytes());
        out.push(self.height as u8);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let root_len = HASH_LEN_FE * 4;
        let param_len = PARAMETER_LEN * 4;
        if bytes.len() != root_len + param_len + 1 {
            return None;
        }
        let root = Hash::from_bytes(&bytes[..root_len])?;
        let parameter = Parameter::from_bytes(&bytes[root_len..root_len + param_len])?;
        let height = bytes[root_len + param_len] as u32;
        Some(Self { root, parameter, height })
    }
}

/// Secret key: PRF key, hash parameter, full Merkle tree, and the active
/// epoch interval. Immutable after key generation other than zeroization
/// of `prf_key` on drop.
pub struct SecretKey {
    prf_key: [u8; 32],
    parameter: Parameter,
    tree: MerkleTree,
    activation_epoch: u64,
    num_active_epochs: u64,
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.prf_key = [0u8; 32];
    }
}

impl SecretKey {
    pub fn activation_range(&self) -> (u64, u64) {
        (self.activation_epoch, self.activation_epoch + self.num_active_epochs)
    }

    pub fn height(&self) -> u32 {
        self.tree.height()
    }

    fn epoch_in_range(&self, epoch: u64) -> bool {
        epoch >= self.activation_epoch && epoch < self.activation_epoch + self.num_active_epochs
    }
}

/// A generated key pair: the public key to distribute and the secret key
/// to retain for signing.
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

/// Signature: epoch, randomizer, per-chain hashes, and Merkle
/// authentication path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    epoch: u64,
    rho: [u8; RHO_LEN],
    hashes: Vec<Hash>,
    auth_path: Vec<Hash>,
}

impl Signature {
    /// Canonical encoding: `epoch (8 BE) ‖ ρ (32) ‖ hashes (L·7·4) ‖
    /// auth_path (h·7·4)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + RHO_LEN + self.hashes.len() * HASH_LEN_FE * 4 + self.auth_path.len() * HASH_LEN_FE * 4);
        out.extend_from_slice(&self.epoch.to_be_bytes());
        out.extend_from_slice(&self.rho);
        for hash in &self.hashes {
            out.extend_from_slice(&hash.to_bytes());
        }
        for sibling in &self.auth_path {
            out.extend_from_slice(&sibling.to_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8], num_chains: usize, height: u32) -> Option<Self> {
        let hash_bytes = HASH_LEN_FE * 4;
        let expected = 8 + RHO_LEN + num_chains * hash_bytes + height as usize * hash_bytes;
        if bytes.len() != expected {
            return None;
        }

        let epoch = u64::from_be_bytes(bytes[0..8].try_into().ok()?);
        let mut rho = [0u8; RHO_LEN];
        rho.copy_from_slice(&bytes[8..8 + RHO_LEN]);

        let mut offset = 8 + RHO_LEN;
        let mut hashes = Vec::with_capacity(num_chains);
        for _ in 0..num_chains {
            hashes.push(Hash::from_bytes(&bytes[offset..offset + hash_bytes])?);
            offset += hash_bytes;
        }

        let mut auth_path = Vec::with_capacity(height as usize);
        for _ in 0..height {
            auth_path.push(Hash::from_bytes(&bytes[offset..offset + hash_bytes])?);
            offset += hash_bytes;
        }

        Some(Self { epoch, rho, hashes, auth_path })
    }
}

/// Build a key pair for the epoch interval `[activation_epoch,
/// activation_epoch + num_active_epochs)` over a tree of height `height`.
///
/// The full `2^height` leaves are built regardless of how many epochs are
/// active, so any epoch in range has a correct authentication path.
pub fn keygen(
    seed: [u8; 32],
    height: u32,
    activation_epoch: u64,
    num_active_epochs: u64,
) -> Result<KeyPair, KeyGenError> {
    if activation_epoch + num_active_epochs > (1u64 << height) {
        return Err(KeyGenError::InvalidEpochRange {
            activation_epoch,
            num_active_epochs,
            height,
        });
    }

    let material = derive_key_material(seed);
    let num_leaves = 1u64 << height;

    let leaves: Vec<Hash> = build_leaves(&material.parameter, &material.prf_key, num_leaves);
    let tree = MerkleTree::build(&material.parameter, height, leaves);
    let root = tree.root();

    let public = PublicKey {
        root,
        parameter: material.parameter,
        height,
    };
    let secret = SecretKey {
        prf_key: material.prf_key,
        parameter: material.parameter,
        tree,
        activation_epoch,
        num_active_epochs,
    };

    Ok(KeyPair { public, secret })
}

#[cfg(not(feature = "parallel"))]
fn build_leaves(parameter: &Parameter, prf_key: &[u8; 32], num_leaves: u64) -> Vec<Hash> {
    (0..num_leaves)
        .map(|e| wots::leaf_for_epoch(parameter, prf_key, e as u32))
        .collect()
}

#[cfg(feature = "parallel")]
fn build_leaves(parameter: &Parameter, prf_key: &[u8; 32], num_leaves: u64) -> Vec<Hash> {
    use rayon::prelude::*;
    (0..num_leaves)
        .into_par_iter()
        .map(|e| wots::leaf_for_epoch(parameter, prf_key, e as u32))
        .collect()
}

/// Sign `message_digest` at `epoch`, sampling encoder randomness from `rng`.
pub fn sign<R: rand::RngCore>(
    sk: &SecretKey,
    epoch: u64,
    message_digest: &[u8; MESSAGE_DIGEST_LEN],
    rng: &mut R,
) -> Result<Signature, SignError> {
    if !sk.epoch_in_range(epoch) {
        let (start, end) = sk.activation_range();
        return Err(SignError::EpochOutOfRange {
            epoch,
            activation_epoch: start,
            num_active_epochs: end - start,
        });
    }

    let (digits, rho) = encoding::encode(&sk.parameter, epoch, message_digest, rng)?;
    let steps: [u32; NUM_CHAINS] = digits;
    // The encoder only ever emits digits in `[0, v)`, so `steps` is always
    // a valid step vector here.
    let hashes = wots::sign(&sk.parameter, &sk.prf_key, epoch as u32, &steps)
        .expect("encoder output is always a valid step vector");
    let auth_path = sk
        .tree
        .auth_path(epoch)
        .map_err(|_| SignError::EpochOutOfRange {
            epoch,
            activation_epoch: sk.activation_epoch,
            num_active_epochs: sk.num_active_epochs,
        })?;

    Ok(Signature {
        epoch,
        rho,
        hashes,
        auth_path,
    })
}

/// Verify `signature` against `pk` for `message_digest`. Never panics;
/// every structural mismatch is a `false`, not an error.
pub fn verify(pk: &PublicKey, message_digest: &[u8; MESSAGE_DIGEST_LEN], signature: &Signature) -> bool {
    if signature.hashes.len() != NUM_CHAINS {
        return false;
    }
    if signature.auth_path.len() != pk.height as usize {
        return false;
    }

    let digits = encoding::digest_to_digits(&pk.parameter, signature.epoch, message_digest, &signature.rho);
    if digits.iter().sum::<u32>() != encoding::TARGET_SUM {
        return false;
    }

    let recovered = match wots::recover(&pk.parameter, signature.epoch as u32, &digits, &signature.hashes) {
        Ok(r) => r,
        Err(_) => return false,
    };

    let flat: Vec<_> = recovered.iter().flat_map(|h| h.iter().copied()).collect();
    let leaf_tweak = Tweak::tree(0, signature.epoch as u32);
    let leaf = crate::tweak::leaf_hash(&pk.parameter, &leaf_tweak, &flat);

    match crate::merkle::verify_auth_path(
        &pk.parameter,
        &pk.root,
        pk.height,
        signature.epoch,
        &leaf,
        &signature.auth_path,
    ) {
        Ok(ok) => ok,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::PrimeCharacteristicRing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn digest(seed: u8) -> [u8; MESSAGE_DIGEST_LEN] {
        std::array::from_fn(|i| ((seed as usize * 13 + i * 7) % 256) as u8)
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let keypair = keygen([0x42; 32], 4, 0, 16).unwrap();
        let mut rng = ChaCha12Rng::from_seed([5; 32]);
        let message = digest(1);

        let sig = sign(&keypair.secret, 3, &message, &mut rng).unwrap();
        assert!(verify(&keypair.public, &message, &sig));
    }

    #[test]
    fn verify_rejects_wrong_message() {
        let keypair = keygen([0x42; 32], 4, 0, 16).unwrap();
        let mut rng = ChaCha12Rng::from_seed([5; 32]);

        let sig = sign(&keypair.secret, 3, &digest(1), &mut rng).unwrap();
        assert!(!verify(&keypair.public, &digest(2), &sig));
    }

    #[test]
    fn verify_rejects_tampered_hash() {
        let keypair = keygen([0x42; 32], 4, 0, 16).unwrap();
        let mut rng = ChaCha12Rng::from_seed([5; 32]);
        let message = digest(1);

        let mut sig = sign(&keypair.secret, 3, &message, &mut rng).unwrap();
        let bumped = sig.hashes[0].inner()[0] + crate::field::F::ONE;
        let mut inner = *sig.hashes[0].inner();
        inner[0] = bumped;
        sig.hashes[0] = Hash::new(inner);

        assert!(!verify(&keypair.public, &message, &sig));
    }

    #[test]
    fn epoch_out_of_range_is_rejected() {
        let keypair = keygen([0x42; 32], 4, 4, 4).unwrap();
        let mut rng = ChaCha12Rng::from_seed([5; 32]);
        let message = digest(1);

        assert!(sign(&keypair.secret, 3, &message, &mut rng).is_err());
        assert!(sign(&keypair.secret, 8, &message, &mut rng).is_err());
        assert!(sign(&keypair.secret, 7, &message, &mut rng).is_ok());
    }

    #[test]
    fn invalid_epoch_range_is_rejected_at_keygen() {
        assert!(keygen([0x42; 32], 3, 0, 9).is_err());
        assert!(keygen([0x42; 32], 3, 0, 8).is_ok());
    }

    #[test]
    fn public_key_round_trips_bytes() {
        let keypair = keygen([0x42; 32], 3, 0, 8).unwrap();
        let bytes = keypair.public.to_bytes();
        assert_eq!(bytes.len(), 49);
        let back = PublicKey::from_bytes(&bytes).unwrap();
        assert_eq!(keypair.public, back);
    }

    /// Exercises a larger, realistic tree shape: `h = 10` with the full
    /// 1024-epoch window active.
    #[test]
    fn keygen_sign_verify_h10() {
        let keypair = keygen([0x42; 32], 10, 0, 1024).unwrap();
        let mut rng = ChaCha12Rng::from_seed([0x11; 32]);

        let m: [u8; MESSAGE_DIGEST_LEN] = std::array::from_fn(|i| ((13 * i + 7) % 256) as u8);
        let m_prime: [u8; MESSAGE_DIGEST_LEN] = std::array::from_fn(|i| ((17 * i + 3) % 256) as u8);

        let sig = sign(&keypair.secret, 5, &m, &mut rng).unwrap();
        assert!(verify(&keypair.public, &m, &sig));
        assert!(!verify(&keypair.public, &m_prime, &sig));

        assert!(sign(&keypair.secret, 1023, &m, &mut rng).is_ok());
        assert!(sign(&keypair.secret, 1024, &m, &mut rng).is_err());

        let sig_a = sign(&keypair.secret, 5, &m, &mut rng).unwrap();
        let sig_b = sign(&keypair.secret, 5, &m, &mut rng).unwrap();
        assert_ne!(sig_a.rho, sig_b.rho);
        assert_ne!(sig_a.hashes, sig_b.hashes);
        assert!(verify(&keypair.public, &m, &sig_a));
        assert!(verify(&keypair.public, &m, &sig_b));
    }

    #[test]
    fn signature_round_trips_bytes() {
        let keypair = keygen([0x42; 32], 3, 0, 8).unwrap();
        let mut rng = ChaCha12Rng::from_seed([5; 32]);
        let sig = sign(&keypair.secret, 2, &digest(1), &mut rng).unwrap();

        let bytes = sig.to_bytes();
        assert_eq!(bytes.len(), 8 + RHO_LEN + NUM_CHAINS * HASH_LEN_FE * 4 + 3 * HASH_LEN_FE * 4);
        let back = Signature::from_bytes(&bytes, NUM_CHAINS, 3).unwrap();
        assert_eq!(sig, back);
    }
}
