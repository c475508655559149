//! Counter-mode keystream over an arbitrary [`BlockCipher`].
//!
//! The counter is the whole block read as a big-endian integer and is
//! incremented once per keystream block, wrapping modulo `2^(8 * block_size)`.
//! Keystream position is kept between calls, so a message may be processed
//! in any number of chunks.

use zeroize::Zeroize;

use crate::block::xor_in_place;
use crate::cipher::BlockCipher;

/// Counter-mode stream transform. Encryption and decryption are the same
/// operation.
pub struct Ctr<'c, C: ?Sized> {
    cipher: &'c C,
    counter: Vec<u8>,
    keystream: Vec<u8>,
    used: usize,
}

impl<'c, C: BlockCipher + ?Sized> Ctr<'c, C> {
    /// Starts a keystream at the initial counter block `iv`.
    ///
    /// # Panics
    ///
    /// Panics if `iv` is not exactly one cipher block long.
    pub fn new(cipher: &'c C, iv: &[u8]) -> Self {
        let block_size = cipher.block_size();
        assert_eq!(
            iv.len(),
            block_size,
            "counter block must be exactly one cipher block"
        );
        Self {
            cipher,
            counter: iv.to_vec(),
            keystream: vec![0u8; block_size],
            used: block_size,
        }
    }

    /// XORs the next `buf.len()` keystream bytes into `buf`.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        let block_size = self.keystream.len();
        let mut offset = 0;
        while offset < buf.len() {
            if self.used == block_size {
                self.refill();
            }
            let take = (block_size - self.used).min(buf.len() - offset);
            xor_in_place(
                &mut buf[offset..offset + take],
                &self.keystream[self.used..self.used + take],
            );
            self.used += take;
            offset += take;
        }
    }

    /// Writes `src` XOR keystream into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` and `src` differ in length.
    pub fn xor_keystream(&mut self, dst: &mut [u8], src: &[u8]) {
        assert_eq!(
            dst.len(),
            src.len(),
            "xor_keystream expects equal-length buffers"
        );
        dst.copy_from_slice(src);
        self.apply_keystream(dst);
    }

    fn refill(&mut self) {
        self.keystream.copy_from_slice(&self.counter);
        self.cipher.encrypt_block(&mut self.keystream);
        increment_be(&mut self.counter);
        self.used = 0;
    }
}

impl<C: ?Sized> Drop for Ctr<'_, C> {
    fn drop(&mut self) {
        self.keystream.zeroize();
        self.counter.zeroize();
    }
}

/// Adds one to a big-endian counter, touching every byte regardless of carries.
fn increment_be(counter: &mut [u8]) {
    let mut carry = 1u16;
    for byte in counter.iter_mut().rev() {
        let sum = u16::from(*byte) + carry;
        *byte = sum as u8;
        carry = sum >> 8;
    }
}
