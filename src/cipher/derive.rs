//! # Legacy Key Derivation
//!
//! The key is the first 16 bytes of SHA-1 over the UTF-8 password. No salt, no
//! iterations. This is weak against brute force and is kept only because
//! every existing Aegis file was encrypted under it.
//!
//! Rust strings are always valid UTF-8, so the "unsupported encoding" failure
//! of other platforms cannot occur here and derivation is infallible.

use sha1::{Digest, Sha1};
use zeroize::Zeroize;

use crate::config::{DIGEST_SIZE, KEY_SIZE};
use crate::secret::{DerivedKey, Password};

/// Derives the AES-128 key for `password`.
///
/// Pure and deterministic: the same password always yields the same key.
pub fn derive_key(password: &Password) -> DerivedKey {
    let mut digest: [u8; DIGEST_SIZE] = Sha1::digest(password.expose_secret().as_bytes()).into();

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest[..KEY_SIZE]);
    digest.zeroize();

    let derived = DerivedKey::from_bytes(key);
    key.zeroize();

    derived
}
