//! Memory Allocator Configuration
//!
//! The binary replaces the system allocator with mimalloc. Each file in a
//! batch allocates and frees two buffers of its own size, one after another.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;
