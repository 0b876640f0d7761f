//! Spinner following the export request state
//!
//! The spinner runs while the client is in the `Requesting` state and is
//! cleared as soon as the request settles.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::ExportState;

/// Tick interval of the spinner
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Progress spinner for export requests
pub struct ExportSpinner {
    bar: Option<ProgressBar>,
}

impl ExportSpinner {
    /// Create a spinner
    ///
    /// # Arguments
    /// * `enabled` - Whether to draw anything at all
    pub fn new(enabled: bool) -> Self {
        let bar = enabled.then(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                bar.set_style(style);
            }
            bar
        });
        Self { bar }
    }

    /// Reflect one state on the terminal
    pub fn update(&self, state: &ExportState) {
        let Some(bar) = &self.bar else {
            return;
        };

        match state {
            ExportState::Requesting { format, .. } => {
                bar.set_message(format!("Exporting {}...", format.label()));
                bar.enable_steady_tick(TICK_INTERVAL);
            }
            _ => bar.finish_and_clear(),
        }
    }

    /// Finish and clear the spinner
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    /// Follow a state channel until its sender is dropped
    pub fn follow(self, mut states: watch::Receiver<ExportState>) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.update(&states.borrow_and_update().clone());
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                self.update(&state);
            }
            self.finish();
        })
    }
}
