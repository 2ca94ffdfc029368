//! Error taxonomy: a hand-written `Display` + `std::error::Error` enum per
//! boundary, in the style of `openvm/lib`'s `XmssHostError` rather than a
//! `thiserror`-derived one.

use std::error::Error;
use std::fmt;

/// Failure returned by [`crate::signer::keygen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGenError {
    /// `activation_epoch + num_active_epochs` exceeds `2^h`.
    InvalidEpochRange {
        activation_epoch: u64,
        num_active_epochs: u64,
        height: u32,
    },
    /// Caller-supplied seed is not 32 bytes.
    InvalidSeedLength { got: usize },
}

impl fmt::Display for KeyGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEpochRange {
                activation_epoch,
                num_active_epochs,
                height,
            } => write!(
                f,
                "epoch range [{}, {}) exceeds lifetime 2^{}",
                activation_epoch,
                activation_epoch + num_active_epochs,
                height
            ),
            Self::InvalidSeedLength { got } => {
                write!(f, "key-gen seed must be 32 bytes, got {got}")
            }
        }
    }
}

impl Error for KeyGenError {}

/// Failure returned by [`crate::signer::sign`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignError {
    /// Requested epoch outside `[activation, activation + num_active)`.
    EpochOutOfRange {
        epoch: u64,
        activation_epoch: u64,
        num_active_epochs: u64,
    },
    /// The target-sum encoder exceeded its retry cap.
    EncodingExhausted,
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpochOutOfRange {
                epoch,
                activation_epoch,
                num_active_epochs,
            } => write!(
                f,
                "epoch {} is outside [{}, {})",
                epoch,
                activation_epoch,
                activation_epoch + num_active_epochs
            ),
            Self::EncodingExhausted => {
                write!(f, "target-sum encoder exhausted its retry budget")
            }
        }
    }
}

impl Error for SignError {}

impl From<crate::encoding::EncodingExhausted> for SignError {
    fn from(_: crate::encoding::EncodingExhausted) -> Self {
        Self::EncodingExhausted
    }
}
