//! Key validation errors.

use thiserror::Error;

/// Errors raised while keying a block cipher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The key is not 16, 24 or 32 bytes long.
    #[error("invalid AES key length {actual}: expected 16, 24 or 32 bytes")]
    InvalidLength {
        /// Length of the rejected key in bytes.
        actual: usize,
    },
}
