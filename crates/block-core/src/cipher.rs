//! The block cipher capability and its AES implementation.

use core::fmt;

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};

use crate::key::KeyError;

/// AES block length in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

/// A keyed block cipher able to encrypt one block at a time.
///
/// Only the forward direction is required: CMAC and counter mode never
/// invert the cipher.
pub trait BlockCipher {
    /// Block length in bytes.
    fn block_size(&self) -> usize;

    /// Encrypts exactly one block in place.
    ///
    /// # Panics
    ///
    /// Implementations panic when `block.len() != self.block_size()`.
    fn encrypt_block(&self, block: &mut [u8]);
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    #[inline]
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    #[inline]
    fn encrypt_block(&self, block: &mut [u8]) {
        (**self).encrypt_block(block)
    }
}

/// AES keyed with a 128, 192 or 256-bit key.
#[derive(Clone)]
pub enum Aes {
    /// AES-128.
    Aes128(aes::Aes128),
    /// AES-192.
    Aes192(aes::Aes192),
    /// AES-256.
    Aes256(aes::Aes256),
}

impl Aes {
    /// Keys AES, selecting the variant from the key length.
    pub fn new(key: &[u8]) -> Result<Self, KeyError> {
        let invalid = |_| KeyError::InvalidLength { actual: key.len() };
        match key.len() {
            16 => aes::Aes128::new_from_slice(key)
                .map(Self::Aes128)
                .map_err(invalid),
            24 => aes::Aes192::new_from_slice(key)
                .map(Self::Aes192)
                .map_err(invalid),
            32 => aes::Aes256::new_from_slice(key)
                .map(Self::Aes256)
                .map_err(invalid),
            actual => Err(KeyError::InvalidLength { actual }),
        }
    }

    /// Key length in bits.
    pub fn key_bits(&self) -> usize {
        match self {
            Self::Aes128(_) => 128,
            Self::Aes192(_) => 192,
            Self::Aes256(_) => 256,
        }
    }
}

impl fmt::Debug for Aes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes")
            .field("key_bits", &self.key_bits())
            .finish_non_exhaustive()
    }
}

impl BlockCipher for Aes {
    fn block_size(&self) -> usize {
        AES_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        assert_eq!(
            block.len(),
            AES_BLOCK_SIZE,
            "AES encrypts 16-byte blocks"
        );
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => BlockEncrypt::encrypt_block(c, block),
            Self::Aes192(c) => BlockEncrypt::encrypt_block(c, block),
            Self::Aes256(c) => BlockEncrypt::encrypt_block(c, block),
        }
    }
}
