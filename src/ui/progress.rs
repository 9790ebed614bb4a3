use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use aegis::batch::Progress;

/// Per-file progress bar for a batch run.
pub struct Bar {
    bar: ProgressBar,
}

impl Bar {
    pub fn new(total: u64, description: &str) -> Result<Self> {
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template("{msg:40!} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})")?.progress_chars("●○ ");

        bar.set_style(style);
        bar.set_message(description.to_owned());

        Ok(Self { bar })
    }

    pub fn update(&self, progress: &Progress) {
        self.bar.set_position(progress.completed as u64);
        self.bar.set_message(progress.message.clone());
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_owned());
    }

    pub fn finish(&self, msg: &str) {
        self.bar.finish_with_message(msg.to_owned());
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish();
        }
    }
}
