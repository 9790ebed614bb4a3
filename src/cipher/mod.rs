//! # Cipher Module
//!
//! AES-128 in ECB mode with PKCS#7 padding over an in-memory buffer, the one
//! fixed configuration of the legacy Aegis format.
//!
//! ECB encrypts every 16-byte block independently with no IV, so equal
//! plaintext blocks give equal ciphertext blocks. It is kept for
//! compatibility with existing files, not recommended for new data.

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use zeroize::Zeroizing;

mod derive;

pub use derive::derive_key;

use crate::config::BLOCK_SIZE;
use crate::error::CipherError;
use crate::padding::Pkcs7Padding;
use crate::secret::DerivedKey;
use crate::types::Direction;

/// Block cipher bound to one derived key.
///
/// The AES key schedule is zeroed when this is dropped.
pub struct Cipher {
    inner: Aes128,
}

impl Cipher {
    /// Builds the cipher, consuming the key so it is dropped (and zeroed)
    /// as soon as the schedule exists.
    pub fn new(key: DerivedKey) -> Result<Self, CipherError> {
        let bytes = key.expose_secret();
        let inner = Aes128::new_from_slice(bytes).map_err(|_| CipherError::InvalidKey(bytes.len()))?;
        Ok(Self { inner })
    }

    pub fn transform(&self, data: &[u8], direction: Direction) -> Result<Vec<u8>, CipherError> {
        match direction {
            Direction::Encrypt => self.encrypt(data),
            Direction::Decrypt => self.decrypt(data),
        }
    }

    /// Pads and encrypts `plaintext`. Output length is the next multiple of
    /// 16 strictly greater than the input length.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut buffer = Pkcs7Padding::pad(plaintext)?;

        for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
            self.inner.encrypt_block(GenericArray::from_mut_slice(block));
        }

        Ok(buffer)
    }

    /// Decrypts and strips padding. A wrong key and corrupted data both end
    /// in [`CipherError::InvalidPaddingOrKey`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        if ciphertext.is_empty() || !ciphertext.len().is_multiple_of(BLOCK_SIZE) {
            return Err(CipherError::InvalidPaddingOrKey);
        }

        let mut buffer = Zeroizing::new(ciphertext.to_vec());

        for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
            self.inner.decrypt_block(GenericArray::from_mut_slice(block));
        }

        Pkcs7Padding::unpad(&buffer)
    }
}
