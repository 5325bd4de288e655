//! Terminal progress for the training pass: a bar over the samples of
//! one epoch with the running average loss as its message.

use indicatif::{ProgressBar, ProgressStyle};

pub struct ProgressMonitor {
    bar: ProgressBar,
}

impl ProgressMonitor {
    pub fn new(length: usize, epoch: usize, epochs: usize) -> Self {
        let bar = ProgressBar::new(length as u64);
        let style = ProgressStyle::with_template(
            " [Epoch {prefix}] {bar:30.cyan/blue} {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
        bar.set_style(style);
        bar.set_prefix(format!("{epoch}/{epochs}"));
        Self { bar }
    }

    /// A monitor that draws nothing.
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// `step` is zero-based; `avg_loss` is the running mean so far.
    pub fn update(&self, step: usize, avg_loss: f64) {
        self.bar.set_position(step as u64 + 1);
        self.bar.set_message(format!("loss {avg_loss:.6}"));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
