//! EAX mode: CTR encryption authenticated by domain-separated CMAC.

use core::fmt;

use block_core::{xor_in_place, Aes, BlockCipher, Ctr};
use omac_core::Cmac;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::EaxError;

const NONCE_DOMAIN: u8 = 0;
const HEADER_DOMAIN: u8 = 1;
const CIPHERTEXT_DOMAIN: u8 = 2;

/// EAX authenticated encryption over a block cipher.
///
/// One CMAC engine is kept and reset for each of the three authenticated
/// values, so sealing and opening take `&mut self`. Use one instance per
/// thread.
///
/// Nonce uniqueness per key is the caller's responsibility. Nonces of any
/// length are accepted; [`Eax::nonce_size`] is the customary length.
#[derive(Clone)]
pub struct Eax<C> {
    mac: Cmac<C>,
    tag_len: usize,
}

impl<C: BlockCipher> Eax<C> {
    /// Creates an EAX instance producing `tag_len`-byte tags.
    ///
    /// `tag_len` must lie in `1..=cipher.block_size()`, and the block length
    /// must be one CMAC supports.
    pub fn new(cipher: C, tag_len: usize) -> Result<Self, EaxError> {
        if tag_len < 1 {
            return Err(EaxError::TagTooSmall);
        }
        let block_size = cipher.block_size();
        if tag_len > block_size {
            return Err(EaxError::TagTooLarge {
                tag_len,
                block_size,
            });
        }
        let mac = Cmac::new(cipher)?;
        Ok(Self { mac, tag_len })
    }

    /// Creates an EAX instance with tags as long as the cipher block.
    pub fn with_full_tag(cipher: C) -> Result<Self, EaxError> {
        let block_size = cipher.block_size();
        Self::new(cipher, block_size)
    }

    /// Recommended nonce length: the cipher block size.
    pub fn nonce_size(&self) -> usize {
        self.mac.block_size()
    }

    /// Bytes added to every sealed message (the tag length).
    pub fn overhead(&self) -> usize {
        self.tag_len
    }

    /// Tag length in bytes.
    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// Borrows the underlying cipher.
    pub fn cipher(&self) -> &C {
        self.mac.cipher()
    }

    /// Encrypts `plaintext` and appends `ciphertext || tag` to `dst`.
    pub fn seal(&mut self, dst: &mut Vec<u8>, nonce: &[u8], plaintext: &[u8], aad: &[u8]) {
        let start = dst.len();
        dst.reserve(plaintext.len() + self.tag_len);
        dst.extend_from_slice(plaintext);
        let tag = self.seal_in_place_detached(nonce, aad, &mut dst[start..]);
        dst.extend_from_slice(&tag);
    }

    /// Verifies `ciphertext_and_tag` and appends the plaintext to `dst`.
    ///
    /// The tag is checked in constant time before any byte is decrypted. On
    /// failure `dst` is left exactly as it was. Input shorter than the tag
    /// fails authentication.
    pub fn open(
        &mut self,
        dst: &mut Vec<u8>,
        nonce: &[u8],
        ciphertext_and_tag: &[u8],
        aad: &[u8],
    ) -> Result<(), EaxError> {
        let body_len = ciphertext_and_tag
            .len()
            .checked_sub(self.tag_len)
            .ok_or(EaxError::AuthenticationFailed)?;
        let (ciphertext, tag) = ciphertext_and_tag.split_at(body_len);
        let counter = self.authenticate(nonce, aad, ciphertext, tag)?;

        let start = dst.len();
        dst.extend_from_slice(ciphertext);
        Ctr::new(self.mac.cipher(), &counter).apply_keystream(&mut dst[start..]);
        Ok(())
    }

    /// Seals into a fresh vector.
    pub fn encrypt(&mut self, nonce: &[u8], plaintext: &[u8], aad: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(plaintext.len() + self.tag_len);
        self.seal(&mut out, nonce, plaintext, aad);
        out
    }

    /// Opens into a fresh vector.
    pub fn decrypt(
        &mut self,
        nonce: &[u8],
        ciphertext_and_tag: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>, EaxError> {
        let mut out = Vec::with_capacity(ciphertext_and_tag.len().saturating_sub(self.tag_len));
        self.open(&mut out, nonce, ciphertext_and_tag, aad)?;
        Ok(out)
    }

    /// Encrypts `buffer` in place and returns the tag separately.
    pub fn seal_in_place_detached(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
    ) -> Vec<u8> {
        let counter = self.omac(NONCE_DOMAIN, nonce);
        let header = self.omac(HEADER_DOMAIN, aad);
        Ctr::new(self.mac.cipher(), &counter).apply_keystream(buffer);

        let mut tag = self.omac(CIPHERTEXT_DOMAIN, buffer);
        xor_in_place(&mut tag, &counter);
        xor_in_place(&mut tag, &header);
        tag[..self.tag_len].to_vec()
    }

    /// Verifies `tag` over the ciphertext in `buffer`, then decrypts it in
    /// place.
    ///
    /// On failure `buffer` still holds the ciphertext.
    pub fn open_in_place_detached(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        buffer: &mut [u8],
        tag: &[u8],
    ) -> Result<(), EaxError> {
        let counter = self.authenticate(nonce, aad, buffer, tag)?;
        Ctr::new(self.mac.cipher(), &counter).apply_keystream(buffer);
        Ok(())
    }

    /// Recomputes the tag and compares it with `tag` in constant time.
    ///
    /// Returns the untruncated nonce MAC, which seeds the counter.
    fn authenticate(
        &mut self,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, EaxError> {
        let counter = self.omac(NONCE_DOMAIN, nonce);
        let header = self.omac(HEADER_DOMAIN, aad);
        let mut expected = self.omac(CIPHERTEXT_DOMAIN, ciphertext);
        xor_in_place(&mut expected, &counter);
        xor_in_place(&mut expected, &header);

        let matches =
            tag.len() == self.tag_len && bool::from(expected[..self.tag_len].ct_eq(tag));
        if matches {
            Ok(counter)
        } else {
            Err(EaxError::AuthenticationFailed)
        }
    }

    /// CMAC of `[0; n-1] || domain || data`.
    fn omac(&mut self, domain: u8, data: &[u8]) -> Zeroizing<Vec<u8>> {
        let mut prefix = vec![0u8; self.mac.block_size()];
        if let Some(last) = prefix.last_mut() {
            *last = domain;
        }
        self.mac.reset();
        self.mac.update(&prefix);
        self.mac.update(data);
        Zeroizing::new(self.mac.finalize_reset())
    }
}

impl Eax<Aes> {
    /// Keys AES from a 16, 24 or 32-byte key and wraps it in EAX.
    pub fn aes(key: &[u8], tag_len: usize) -> Result<Self, EaxError> {
        Self::new(Aes::new(key)?, tag_len)
    }
}

impl<C> fmt::Debug for Eax<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eax")
            .field("mac", &self.mac)
            .field("tag_len", &self.tag_len)
            .finish()
    }
}
