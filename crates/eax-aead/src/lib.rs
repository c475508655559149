//! EAX authenticated encryption with associated data.
//!
//! [`Eax`] combines counter-mode encryption with three domain-separated CMAC
//! computations (nonce, associated data, ciphertext). It works over any
//! [`block_core::BlockCipher`] whose block length CMAC supports, with a tag
//! truncated to between one byte and one block.
//!
//! ```
//! use block_core::Aes;
//! use eax_aead::Eax;
//!
//! let mut eax = Eax::new(Aes::new(&[0x11; 16])?, 16)?;
//! let nonce = [0x22; 16];
//! let sealed = eax.encrypt(&nonce, b"attack at dawn", b"header");
//! let opened = eax.decrypt(&nonce, &sealed, b"header")?;
//! assert_eq!(opened, b"attack at dawn");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod eax;
mod error;

pub use crate::eax::Eax;
pub use crate::error::EaxError;
