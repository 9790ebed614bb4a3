use secrecy::{ExposeSecret, SecretBox, SecretString};

use crate::config::KEY_SIZE;

/// Password for one batch run.
///
/// The caller builds one per run and drops it when the run ends; the same key
/// is derived from it for every file in that run. It is never written to disk
/// or stored on a [`FileSet`](crate::file::FileSet), and the buffer is wiped
/// on drop.
pub struct Password {
    inner: SecretString,
}

impl Password {
    pub fn new(password: &str) -> Self {
        Self { inner: SecretString::from(password.to_owned()) }
    }

    pub fn from_string(password: String) -> Self {
        Self { inner: SecretString::from(password) }
    }

    pub fn expose_secret(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl From<SecretString> for Password {
    fn from(secret: SecretString) -> Self {
        Self { inner: secret }
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// Key material derived from a [`Password`].
///
/// Zeroed when dropped. Consumed by value when a cipher is built from it, so
/// it cannot outlive the call that uses it.
pub struct DerivedKey {
    inner: SecretBox<[u8; KEY_SIZE]>,
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { inner: SecretBox::new(Box::new(bytes)) }
    }

    pub fn expose_secret(&self) -> &[u8; KEY_SIZE] {
        self.inner.expose_secret()
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DerivedKey([... {KEY_SIZE} bytes ...])")
    }
}
