//! CMAC (OMAC1) over an arbitrary block cipher.
//!
//! The crate provides the two pieces CMAC needs on top of a
//! [`block_core::BlockCipher`]:
//! - [`gf`]: constant-time doubling in GF(2^n) for every block length with a
//!   tabulated reduction polynomial (64 to 2048 bits).
//! - [`Cmac`]: a streaming MAC engine that defers the last block until the
//!   stream is finalized, so chunking never changes the tag.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cmac;
mod error;
pub mod gf;

pub use crate::cmac::Cmac;
pub use crate::error::CmacError;
