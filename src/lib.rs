//! Generalized XMSS hash-based signatures over the KoalaBear field,
//! using the Poseidon2 permutation as the sole cryptographic primitive.
//!
//! A key authorizes signing over a contiguous range of epochs; signing at
//! epoch `e` reveals one Winternitz one-time signature and an
//! authentication path to the Merkle root published as the public key.

pub mod encoding;
pub mod error;
pub mod field;
pub mod merkle;
pub mod poseidon;
pub mod prf;
pub mod rng;
pub mod signer;
pub mod tweak;
pub mod wots;

pub use encoding::MESSAGE_DIGEST_LEN;
pub use error::{KeyGenError, SignError};
pub use signer::{keygen, sign, verify, KeyPair, PublicKey, SecretKey, Signature};
