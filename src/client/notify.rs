//! User notifications ("toasts") for finished exports

use nu_ansi_term::{Color, Style};

/// Trait for reporting export outcomes to the user
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Prints notifications to stderr
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    /// Create a notifier
    ///
    /// # Arguments
    /// * `color` - Enable ANSI colors
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Render a notification line without printing it
    pub fn render(&self, success: bool, message: &str) -> String {
        let (marker, color) = if success {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };

        if self.color {
            format!(
                "{} {}",
                Style::new().bold().fg(color).paint(marker),
                color.paint(message)
            )
        } else {
            format!("{} {}", marker, message)
        }
    }
}

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        eprintln!("{}", self.render(true, message));
    }

    fn error(&self, message: &str) {
        eprintln!("{}", self.render(false, message));
    }
}
