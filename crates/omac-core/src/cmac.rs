//! Streaming CMAC engine.

use core::fmt;
use std::io;

use block_core::{xor_in_place, BlockCipher};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::CmacError;
use crate::gf::Reduction;

/// CMAC (OMAC1) over a block cipher.
///
/// Input is XORed into a one-block accumulator. A full accumulator is only
/// encrypted once more input proves it is not the last block; the last block
/// is held back for [`Cmac::finalize`], which whitens it with one of the two
/// subkeys depending on whether it is full or padded.
///
/// The engine is reusable: [`Cmac::reset`] starts a new message under the
/// same key without re-deriving the subkeys.
#[derive(Clone)]
pub struct Cmac<C> {
    cipher: C,
    buffer: Zeroizing<Vec<u8>>,
    // Bytes of the current block already absorbed. `block_size` means a full
    // block is waiting to learn whether it is the last one.
    pending: usize,
    subkey_full: Zeroizing<Vec<u8>>,
    subkey_partial: Zeroizing<Vec<u8>>,
}

impl<C: BlockCipher> Cmac<C> {
    /// Creates an engine over `cipher`, deriving both subkeys.
    ///
    /// Fails with [`CmacError::UnsupportedBlockSize`] when the cipher's block
    /// length has no tabulated field polynomial.
    pub fn new(cipher: C) -> Result<Self, CmacError> {
        let block_size = cipher.block_size();
        let field =
            Reduction::for_block_size(block_size).ok_or(CmacError::UnsupportedBlockSize {
                bits: block_size.saturating_mul(8),
            })?;

        let mut subkey_full = Zeroizing::new(vec![0u8; block_size]);
        cipher.encrypt_block(&mut subkey_full);
        field.double(&mut subkey_full);
        let mut subkey_partial = subkey_full.clone();
        field.double(&mut subkey_partial);

        Ok(Self {
            cipher,
            buffer: Zeroizing::new(vec![0u8; block_size]),
            pending: 0,
            subkey_full,
            subkey_partial,
        })
    }

    /// Computes the tag of `message` in one call.
    pub fn mac(cipher: C, message: &[u8]) -> Result<Vec<u8>, CmacError> {
        let mut engine = Self::new(cipher)?;
        engine.update(message);
        Ok(engine.finalize())
    }

    /// Block length in bytes; also the length of an untruncated tag.
    pub fn block_size(&self) -> usize {
        self.buffer.len()
    }

    /// Borrows the underlying cipher.
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Returns the underlying cipher, discarding the MAC state.
    pub fn into_inner(self) -> C {
        self.cipher
    }

    /// Absorbs more message bytes.
    ///
    /// Any split of a message into `update` calls yields the same tag.
    pub fn update(&mut self, mut data: &[u8]) {
        let block_size = self.buffer.len();
        while !data.is_empty() {
            if self.pending == block_size {
                self.cipher.encrypt_block(&mut self.buffer);
                self.pending = 0;
            }
            let take = (block_size - self.pending).min(data.len());
            xor_in_place(
                &mut self.buffer[self.pending..self.pending + take],
                &data[..take],
            );
            self.pending += take;
            data = &data[take..];
        }
    }

    /// Returns the full-length tag of everything absorbed so far.
    ///
    /// The stream is left untouched, so more input may follow.
    pub fn finalize(&self) -> Vec<u8> {
        let mut tag = self.buffer.to_vec();
        if self.pending == tag.len() {
            xor_in_place(&mut tag, &self.subkey_full);
        } else {
            tag[self.pending] ^= 0x80;
            xor_in_place(&mut tag, &self.subkey_partial);
        }
        self.cipher.encrypt_block(&mut tag);
        tag
    }

    /// Appends the tag to `out`.
    pub fn finalize_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.finalize());
    }

    /// Returns the tag and resets the engine for the next message.
    pub fn finalize_reset(&mut self) -> Vec<u8> {
        let tag = self.finalize();
        self.reset();
        tag
    }

    /// Clears the accumulator. Subkeys are kept.
    pub fn reset(&mut self) {
        self.buffer.fill(0);
        self.pending = 0;
    }

    /// Checks `expected` against the tag of the current stream in constant
    /// time.
    ///
    /// `expected` may be truncated to any length from one byte up to the
    /// block size; other lengths never verify.
    pub fn verify(&self, expected: &[u8]) -> Result<(), CmacError> {
        let tag = Zeroizing::new(self.finalize());
        let in_range = !expected.is_empty() && expected.len() <= tag.len();
        if in_range && bool::from(tag[..expected.len()].ct_eq(expected)) {
            Ok(())
        } else {
            Err(CmacError::TagMismatch)
        }
    }
}

impl<C: BlockCipher> io::Write for Cmac<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C> fmt::Debug for Cmac<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cmac")
            .field("block_size", &self.buffer.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_core::Aes;
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;
    use std::io::Write;

    // RFC 4493 / NIST SP 800-38B, AES-128 examples.
    const KEY: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const MESSAGE: &str = "6bc1bee22e409f96e93d7e117393172a\
                           ae2d8a571e03ac9c9eb76fac45af8e51\
                           30c81c46a35ce411e5fbc1191a0a52ef\
                           f69f2445df4f9b17ad2b417be66c3710";
    const VECTORS: [(usize, &str); 4] = [
        (0, "bb1d6929e95937287fa37d129b756746"),
        (16, "070a16b46b4d4144f79bdd9dd04a287c"),
        (40, "dfa66747de9ae63030ca32611497c827"),
        (64, "51f0bebf7e3b9d92fc49741779363cfe"),
    ];

    fn engine() -> Cmac<Aes> {
        let cipher = Aes::new(&hex::decode(KEY).expect("hex")).expect("valid key");
        Cmac::new(cipher).expect("AES block size is supported")
    }

    fn message() -> Vec<u8> {
        hex::decode(MESSAGE).expect("hex")
    }

    #[test]
    fn subkeys_match_rfc4493() {
        let mac = engine();
        assert_eq!(
            hex::encode(mac.subkey_full.as_slice()),
            "fbeed618357133667c85e08f7236a8de"
        );
        assert_eq!(
            hex::encode(mac.subkey_partial.as_slice()),
            "f7ddac306ae266ccf90bc11ee46d513b"
        );
    }

    #[test]
    fn matches_rfc4493_vectors() {
        let msg = message();
        for (len, expected) in VECTORS {
            let mut mac = engine();
            mac.update(&msg[..len]);
            assert_eq!(hex::encode(mac.finalize()), expected, "length {len}");
        }
    }

    #[test]
    fn empty_message_is_padded_block_under_partial_subkey() {
        let mac = engine();
        let mut block = vec![0u8; 16];
        block[0] = 0x80;
        xor_in_place(&mut block, &mac.subkey_partial);
        mac.cipher().encrypt_block(&mut block);
        assert_eq!(mac.finalize(), block);
    }

    #[test]
    fn full_block_uses_full_subkey() {
        let msg = message();
        let mac = {
            let mut m = engine();
            m.update(&msg[..16]);
            m
        };
        let mut block = msg[..16].to_vec();
        xor_in_place(&mut block, &mac.subkey_full);
        mac.cipher().encrypt_block(&mut block);
        assert_eq!(mac.finalize(), block);
    }

    #[test]
    fn chunking_does_not_change_tag() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let mut mac = engine();
        for _ in 0..64 {
            let len = rng.gen_range(0..100);
            let mut msg = vec![0u8; len];
            rng.fill_bytes(&mut msg);

            mac.reset();
            mac.update(&msg);
            let whole = mac.finalize();

            mac.reset();
            let mut offset = 0;
            while offset < msg.len() {
                let take = rng.gen_range(1..=msg.len() - offset);
                mac.update(&msg[offset..offset + take]);
                offset += take;
            }
            assert_eq!(mac.finalize(), whole, "length {len}");
        }
    }

    #[test]
    fn byte_at_a_time_matches_vectors() {
        let msg = message();
        let mut mac = engine();
        for byte in &msg {
            mac.update(core::slice::from_ref(byte));
        }
        assert_eq!(hex::encode(mac.finalize()), VECTORS[3].1);
    }

    #[test]
    fn empty_updates_are_ignored() {
        let msg = message();
        let mut mac = engine();
        mac.update(&[]);
        mac.update(&msg[..16]);
        mac.update(&[]);
        assert_eq!(hex::encode(mac.finalize()), VECTORS[1].1);
    }

    #[test]
    fn finalize_leaves_stream_open() {
        let msg = message();
        let mut mac = engine();
        mac.update(&msg[..16]);
        assert_eq!(hex::encode(mac.finalize()), VECTORS[1].1);
        mac.update(&msg[16..40]);
        assert_eq!(hex::encode(mac.finalize()), VECTORS[2].1);
    }

    #[test]
    fn reset_starts_a_new_message() {
        let msg = message();
        let mut mac = engine();
        mac.update(&msg[..40]);
        let first = mac.finalize_reset();
        assert_eq!(hex::encode(first), VECTORS[2].1);
        assert_eq!(hex::encode(mac.finalize()), VECTORS[0].1);
        mac.update(&msg);
        assert_eq!(hex::encode(mac.finalize()), VECTORS[3].1);
    }

    #[test]
    fn finalize_into_appends() {
        let mut out = b"prefix".to_vec();
        engine().finalize_into(&mut out);
        assert_eq!(&out[..6], b"prefix");
        assert_eq!(hex::encode(&out[6..]), VECTORS[0].1);
    }

    #[test]
    fn verify_accepts_full_and_truncated_tags() {
        let msg = message();
        let mut mac = engine();
        mac.update(&msg[..40]);
        let tag = hex::decode(VECTORS[2].1).expect("hex");
        assert_eq!(mac.verify(&tag), Ok(()));
        assert_eq!(mac.verify(&tag[..8]), Ok(()));
        assert_eq!(mac.verify(&tag[..1]), Ok(()));
    }

    #[test]
    fn verify_rejects_bad_tags() {
        let mac = engine();
        let mut tag = hex::decode(VECTORS[0].1).expect("hex");
        assert_eq!(mac.verify(&[]), Err(CmacError::TagMismatch));
        let mut long = tag.clone();
        long.push(0);
        assert_eq!(mac.verify(&long), Err(CmacError::TagMismatch));
        tag[15] ^= 1;
        assert_eq!(mac.verify(&tag), Err(CmacError::TagMismatch));
    }

    #[test]
    fn one_shot_matches_streaming() {
        let cipher = Aes::new(&hex::decode(KEY).expect("hex")).expect("valid key");
        let tag = Cmac::mac(&cipher, &message()).expect("supported");
        assert_eq!(hex::encode(tag), VECTORS[3].1);
    }

    #[test]
    fn io_copy_feeds_the_engine() {
        let msg = message();
        let mut mac = engine();
        let copied = io::copy(&mut &msg[..40], &mut mac).expect("in-memory copy");
        mac.flush().expect("flush");
        assert_eq!(copied, 40);
        assert_eq!(hex::encode(mac.finalize()), VECTORS[2].1);
    }

    #[test]
    fn debug_hides_state_bytes() {
        let rendered = format!("{:?}", engine());
        assert!(rendered.contains("block_size: 16"));
        assert!(rendered.contains("pending: 0"));
    }
}
