//! Interactive prompts.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use inquire::{Confirm, PasswordDisplayMode, Select, Text, required};

use aegis::secret::Password;
use aegis::types::Direction;

pub struct Prompt;

impl Prompt {
    pub fn select_direction() -> Result<Direction> {
        Select::new("Select operation", Direction::ALL.to_vec()).prompt().map_err(|e| anyhow!("mode selection failed: {e}"))
    }

    /// Asks for files and folders, separated by `;`.
    pub fn enter_paths() -> Result<Vec<PathBuf>> {
        let input = Text::new("Files or folders to add")
            .with_help_message("separate entries with ';', folders are searched recursively")
            .with_validator(required!("enter at least one path"))
            .prompt()
            .map_err(|e| anyhow!("path input failed: {e}"))?;

        Ok(parse_paths(&input))
    }

    /// Encryption asks twice; a typo would make the files unrecoverable.
    pub fn password(direction: Direction) -> Result<Password> {
        let message = format!("Enter {} password", direction.label().to_lowercase());
        let input = inquire::Password::new(&message)
            .with_display_mode(PasswordDisplayMode::Masked)
            .with_validator(required!("password cannot be empty"));

        let input = match direction {
            Direction::Encrypt => input.with_custom_confirmation_message("Confirm password").with_custom_confirmation_error_message("passwords do not match"),
            Direction::Decrypt => input.without_confirmation(),
        };

        input.prompt().map(Password::from_string).map_err(|e| anyhow!("password input failed: {e}"))
    }

    pub fn confirm(prompt: &str) -> Result<bool> {
        Confirm::new(prompt).with_default(false).prompt().map_err(|e| anyhow!("confirmation failed: {e}"))
    }
}

fn parse_paths(input: &str) -> Vec<PathBuf> {
    input.split(';').map(|s| s.trim().trim_matches('"')).filter(|s| !s.is_empty()).map(PathBuf::from).collect()
}
