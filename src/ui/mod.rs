//! Terminal front end.
//!
//! - [`display`]: banner, working-set and report tables
//! - [`progress`]: batch progress bar
//! - [`prompt`]: interactive selections, paths and passwords

pub mod display;
pub mod progress;
pub mod prompt;
