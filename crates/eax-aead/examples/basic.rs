//! Seals a message with AES-128 EAX, opens it again and shows that a
//! modified ciphertext is rejected.

use block_core::Aes;
use eax_aead::{Eax, EaxError};

fn main() -> Result<(), EaxError> {
    // Fixed key and nonce for reproducibility in the example.
    let cipher = Aes::new(&[0x2b; 16])?;
    let mut eax = Eax::new(cipher, 16)?;
    let nonce = [0x01; 16];

    let sealed = eax.encrypt(&nonce, b"first block here", b"associated data");
    let opened = eax.decrypt(&nonce, &sealed, b"associated data")?;
    assert_eq!(opened, b"first block here");

    let mut tampered = sealed.clone();
    tampered[0] ^= 0x01;
    assert_eq!(
        eax.decrypt(&nonce, &tampered, b"associated data"),
        Err(EaxError::AuthenticationFailed)
    );

    println!("example succeeded; {} bytes sealed and verified", sealed.len());
    Ok(())
}
