//! KoalaBear field element type and canonical (de)serialization.
//!
//! Arithmetic itself lives in `p3_koala_bear::KoalaBear` (Montgomery form,
//! `p = 2^31 - 2^24 + 1`); this module just fixes the array newtype and the
//! canonical little-endian wire encoding used throughout the crate's
//! serialized formats.

use p3_field::PrimeField32;
pub use p3_field::{Field, PrimeCharacteristicRing, PrimeField64};
use p3_koala_bear::KoalaBear;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The prime field element type used throughout this crate.
pub type F = KoalaBear;

/// KoalaBear prime, `p = 2^31 - 2^24 + 1`.
pub const MODULUS: u32 = 0x7F00_0001;

/// A fixed-size array of field elements, serialized canonically (LE u32 per
/// element, not Montgomery form).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldArray<const N: usize>(pub [F; N]);

impl<const N: usize> FieldArray<N> {
    pub const fn new(arr: [F; N]) -> Self {
        Self(arr)
    }

    pub fn inner(&self) -> &[F; N] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &F> {
        self.0.iter()
    }

    /// Canonical little-endian byte encoding: 4 bytes per element.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(N * 4);
        for fe in &self.0 {
            out.extend_from_slice(&fe.as_canonical_u32().to_le_bytes());
        }
        out
    }

    /// Parse exactly `4 * N` bytes back into field elements.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != N * 4 {
            return None;
        }
        let mut arr = [F::ZERO; N];
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes(chunk.try_into().unwrap());
            arr[i] = F::new(word);
        }
        Some(Self(arr))
    }
}

impl<const N: usize> Default for FieldArray<N> {
    fn default() -> Self {
        Self([F::ZERO; N])
    }
}

impl<const N: usize> AsRef<[F]> for FieldArray<N> {
    fn as_ref(&self) -> &[F] {
        &self.0
    }
}

impl<const N: usize> From<[F; N]> for FieldArray<N> {
    fn from(arr: [F; N]) -> Self {
        Self(arr)
    }
}

impl<const N: usize> Serialize for FieldArray<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(N))?;
        for elem in &self.0 {
            seq.serialize_element(&elem.as_canonical_u32())?;
        }
        seq.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for FieldArray<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;
        let values: Vec<u32> = Vec::deserialize(deserializer)?;
        if values.len() != N {
            return Err(D::Error::custom(format!(
                "expected {} field elements, got {}",
                N,
                values.len()
            )));
        }
        let mut arr = [F::ZERO; N];
        for (i, &val) in values.iter().enumerate() {
            arr[i] = F::new(val);
        }
        Ok(FieldArray(arr))
    }
}

/// Reduce a raw 32-bit word into a field element without rejection
/// sampling: the word is simply taken `mod p`.
pub fn from_u32(word: u32) -> F {
    F::new(word % MODULUS)
}

/// Reduce a 64-bit value into a field element (`v mod p`), used by the PRF.
pub fn from_u64(v: u64) -> F {
    F::from_u64(v % MODULUS as u64)
}

/// Canonical `u32` representation of a field element.
pub fn as_canonical_u32(fe: F) -> u32 {
    fe.as_canonical_u32()
}
