//! Aegis - batch file encryption with in-place replacement.
//!
//! Files in a deduplicated working set are encrypted or decrypted one after
//! another. Each transform is written beside the original first; only when it
//! succeeds is the original overwritten, deleted and replaced.
//!
//! - AES-128-ECB with PKCS#7 padding (legacy format, see [`config`])
//! - SHA-1 password digest truncated to 16 bytes as the key
//! - Two-pass best-effort overwrite before deletion
//! - Cooperative cancellation between safe points

pub mod batch;
pub mod cancel;
pub mod cipher;
pub mod config;
pub mod eraser;
pub mod error;
pub mod file;
pub mod padding;
pub mod secret;
pub mod transform;
pub mod types;
