//! Error type for CMAC construction and verification.

use thiserror::Error;

/// Errors produced by the CMAC engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum CmacError {
    /// No reduction polynomial is tabulated for the cipher's block length.
    #[error("unsupported block size: no CMAC polynomial for {bits}-bit blocks")]
    UnsupportedBlockSize {
        /// Block length of the rejected cipher in bits.
        bits: usize,
    },
    /// A tag failed constant-time verification.
    #[error("CMAC tag mismatch")]
    TagMismatch,
}
