//! Doubling in GF(2^n), used to derive the CMAC subkeys.
//!
//! A block is read as a big-endian polynomial over GF(2). Doubling shifts it
//! left by one bit and, when the top bit falls off, folds it back in by XORing
//! the low-order terms of the field polynomial into the tail of the block.

use subtle::{Choice, ConditionallySelectable};

/// Block lengths, in bits, for which a reduction polynomial is known.
pub const SUPPORTED_BLOCK_BITS: [usize; 13] = [
    64, 128, 160, 192, 224, 256, 320, 384, 448, 512, 768, 1024, 2048,
];

fn polynomial_for_bits(bits: usize) -> Option<u32> {
    let poly = match bits {
        64 => 0x1b,
        128 => 0x87,
        160 => 0x2d,
        192 => 0x87,
        224 => 0x309,
        256 => 0x425,
        320 => 0x1b,
        384 => 0x100d,
        448 => 0x851,
        512 => 0x125,
        768 => 0xa0011,
        1024 => 0x80043,
        2048 => 0x86001,
        _ => return None,
    };
    Some(poly)
}

/// Multiplication by `x` in the field matching one block length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reduction {
    block_bytes: usize,
    poly: u32,
}

impl Reduction {
    /// Looks up the field for a block length in bytes.
    ///
    /// Returns `None` when the length has no tabulated polynomial.
    pub fn for_block_size(block_bytes: usize) -> Option<Self> {
        let bits = block_bytes.checked_mul(8)?;
        polynomial_for_bits(bits).map(|poly| Self { block_bytes, poly })
    }

    /// Block length in bytes this field operates on.
    pub fn block_size(&self) -> usize {
        self.block_bytes
    }

    /// Low-order terms of the reduction polynomial.
    pub fn polynomial(&self) -> u32 {
        self.poly
    }

    /// Doubles `block` in place.
    ///
    /// The reduction is applied through a constant-time select on the carried
    /// bit; no branch depends on the block contents.
    ///
    /// # Panics
    ///
    /// Panics if `block` is not [`Self::block_size`] bytes long.
    pub fn double(&self, block: &mut [u8]) {
        assert_eq!(
            block.len(),
            self.block_bytes,
            "block length does not match the field"
        );
        let carry = shift_left(block);
        let mask = u32::conditional_select(&0, &self.poly, Choice::from(carry));
        for (byte, term) in block.iter_mut().rev().zip(mask.to_be_bytes().iter().rev()) {
            *byte ^= *term;
        }
    }
}

/// Shifts the whole block left by one bit and returns the bit shifted out.
fn shift_left(block: &mut [u8]) -> u8 {
    let mut carry = 0u8;
    for byte in block.iter_mut().rev() {
        let top = *byte >> 7;
        *byte = (*byte << 1) | carry;
        carry = top;
    }
    carry
}
