use std::sync::atomic::{AtomicU64, Ordering};

use indicatif::{ProgressBar, ProgressStyle};

const BYTES_TEMPLATE: &str =
    "{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})";

/// Byte-level progress for one transfer.
///
/// Positions only ever move forward: a late `update_to` with a smaller value
/// than one already seen is ignored.
pub struct TransferProgress {
    bar: ProgressBar,
    high_water: AtomicU64,
}

impl TransferProgress {
    pub fn new(name: Option<&str>, disabled: bool) -> Self {
        let bar = if disabled {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template(BYTES_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        };
        if let Some(name) = name {
            bar.set_message(name.to_string());
        }
        Self {
            bar,
            high_water: AtomicU64::new(0),
        }
    }

    pub fn hidden() -> Self {
        Self::new(None, true)
    }

    /// Report `current` bytes done out of `total` (when known).
    pub fn update_to(&self, current: u64, total: Option<u64>) {
        if let Some(total) = total {
            if self.bar.length() != Some(total) {
                self.bar.set_length(total);
            }
        }
        let previous = self.high_water.fetch_max(current, Ordering::AcqRel);
        if current > previous {
            self.bar.set_position(current);
        }
    }

    pub fn position(&self) -> u64 {
        self.high_water.load(Ordering::Acquire)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
