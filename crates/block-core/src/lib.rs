//! Block cipher capability shared by the CMAC and EAX crates.
//!
//! This crate provides:
//! - The [`BlockCipher`] trait, the only view of a cipher the upper layers need.
//! - An AES adapter over the RustCrypto `aes` crate (128/192/256-bit keys).
//! - A counter-mode keystream ([`Ctr`]) built on any [`BlockCipher`].
//! - Byte-block XOR helpers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
mod ctr;
mod key;

pub use crate::block::xor_in_place;
pub use crate::cipher::{Aes, BlockCipher, AES_BLOCK_SIZE};
pub use crate::ctr::Ctr;
pub use crate::key::KeyError;
