//! Errors returned by EAX construction and opening.

use block_core::KeyError;
use omac_core::CmacError;
use thiserror::Error;

/// Errors produced by [`crate::Eax`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EaxError {
    /// Requested tag length was zero.
    #[error("tag length must be at least 1 byte")]
    TagTooSmall,
    /// Requested tag length exceeds the cipher block.
    #[error("tag length {tag_len} exceeds the {block_size}-byte cipher block")]
    TagTooLarge {
        /// Requested tag length in bytes.
        tag_len: usize,
        /// Block length of the cipher in bytes.
        block_size: usize,
    },
    /// The cipher cannot back a CMAC.
    #[error(transparent)]
    UnsupportedCipher(#[from] CmacError),
    /// The AES key could not be used.
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    /// The tag did not match; nothing was decrypted.
    #[error("message authentication failed")]
    AuthenticationFailed,
}
