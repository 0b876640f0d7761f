//! booking-export
//!
//! Exports booking back-office pages as CSV or Excel files.
//!
//! # Usage
//!
//! ```bash
//! # Confirmed bookings checking in during March, as a spreadsheet
//! booking-export export history-booking-log --format excel \
//!     --query "booking_status=confirmed&date_in=2024-03-01"
//!
//! # Look at the rows first
//! booking-export preview hotels -p city=Ubud
//! ```

use booking_export::cli::CliInterface;
use booking_export::error::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments
/// 2. Load configuration
/// 3. Initialize logging
/// 4. Run the selected command
///
/// # Returns
/// * `Result<bool>` - Whether the command succeeded
async fn run() -> Result<bool> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.run().await
}

/// Initialize logging system from the effective configuration
///
/// Logs go to stderr so `--json` output stays clean.
///
/// # Arguments
/// * `cli` - CLI interface with the merged configuration
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
