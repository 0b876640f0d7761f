//! Command-line interface for booking-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Dispatch of the export, preview and listing commands

pub mod completion;

use clap::builder::PossibleValue;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::client::{
    DownloadSink, ExportClient, ExportOutcome, ExportSpinner, FileDownloadSink, TerminalNotifier,
};
use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::export::{ExportFormat, QueryParams};
use crate::formatter::{TableFormatter, format_result_json};
use crate::pages::{ExportPage, PageAction};
use crate::utils::{convert::format_bytes, fs::expand_home};

/// Booking back-office exporter
#[derive(Parser, Debug)]
#[command(
    name = "booking-export",
    version,
    about = "Export booking back-office pages as CSV or Excel",
    long_about = "Filters a back-office page with URL-style query parameters and saves the
matching rows as a CSV file or an Excel document."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for booking-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export a page and save the file
    Export {
        /// Page to export
        #[arg(value_enum)]
        page: ExportPage,

        /// Output format (defaults to export.default_format)
        #[arg(short = 'f', long, value_enum)]
        format: Option<ExportFormat>,

        /// Page query string, e.g. "booking_status=confirmed&date_in=2024-03-01"
        #[arg(long, value_name = "QUERY")]
        query: Option<String>,

        /// Extra query parameter; repeat a key to select several values
        #[arg(
            short = 'p',
            long = "param",
            value_name = "KEY=VALUE",
            value_parser = parse_key_value
        )]
        params: Vec<(String, String)>,

        /// Directory the file is saved into
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Print the export result as JSON instead of saving it
        #[arg(long)]
        json: bool,
    },

    /// Show the rows an export would contain
    Preview {
        /// Page to preview
        #[arg(value_enum)]
        page: ExportPage,

        /// Page query string
        #[arg(long, value_name = "QUERY")]
        query: Option<String>,

        /// Extra query parameter
        #[arg(
            short = 'p',
            long = "param",
            value_name = "KEY=VALUE",
            value_parser = parse_key_value
        )]
        params: Vec<(String, String)>,
    },

    /// List exportable pages
    Pages,

    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl ValueEnum for ExportPage {
    fn value_variants<'a>() -> &'a [Self] {
        &ExportPage::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.name()).help(self.title()))
    }
}

impl ValueEnum for ExportFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &ExportFormat::ALL
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(self.as_str()))
    }
}

/// Parse a `key=value` pair
fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Merge a query string and repeated `-p` pairs into page parameters
///
/// # Arguments
/// * `query` - Optional URL query string
/// * `pairs` - Extra pairs, appended in order
///
/// # Returns
/// * `QueryParams` - Combined parameters
pub fn build_params(query: Option<&str>, pairs: &[(String, String)]) -> QueryParams {
    let mut params = QueryParams::from_query_str(query.unwrap_or_default());
    for (key, value) in pairs {
        params.append(key.clone(), value.clone());
    }
    params
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let config_path = args.config_file.as_deref();
        let mut config = Config::load_from_file(config_path)?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args);

        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_display_args(config, args);
        Self::apply_logging_args(config, args);
    }

    /// Apply display-related CLI arguments to configuration
    fn apply_display_args(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.display.color_output = false;
        }

        if args.quiet {
            config.display.show_spinner = false;
        }
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Run the selected command
    ///
    /// # Returns
    /// * `Result<bool>` - Whether the command succeeded
    pub async fn run(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Export {
                page,
                format,
                query,
                params,
                output_dir,
                json,
            }) => {
                let format = format.unwrap_or(self.config.export.default_format);
                let params = build_params(query.as_deref(), params);
                if *json {
                    self.print_export_json(*page, &params, format)
                } else {
                    let output_dir = output_dir
                        .clone()
                        .unwrap_or_else(|| expand_home(&self.config.export.output_dir));
                    Ok(self.run_export(*page, params, format, output_dir).await)
                }
            }
            Some(Commands::Preview {
                page,
                query,
                params,
            }) => {
                let params = build_params(query.as_deref(), params);
                println!("{}", self.render_preview(*page, &params));
                Ok(true)
            }
            Some(Commands::Pages) => {
                println!("{}", self.table_formatter().format_pages(&ExportPage::ALL));
                Ok(true)
            }
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(shell)?;
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => {
                CliArgs::command().print_help()?;
                Ok(true)
            }
        }
    }

    /// Page action carrying the user's export settings
    pub fn page_action(&self, page: ExportPage) -> PageAction {
        let export = &self.config.export;
        PageAction::new(page)
            .with_author(export.author.clone())
            .with_sheet_name(export.sheet_name.clone())
            .with_filename_prefix(export.filename_prefix.clone())
            .with_timestamp(export.include_timestamp)
    }

    /// Run one export through the client and save the file
    ///
    /// # Arguments
    /// * `page` - Page to export
    /// * `params` - Page query parameters
    /// * `format` - Requested format
    /// * `output_dir` - Directory the file is saved into
    ///
    /// # Returns
    /// * `bool` - Whether a file was saved
    async fn run_export(
        &self,
        page: ExportPage,
        params: QueryParams,
        format: ExportFormat,
        output_dir: PathBuf,
    ) -> bool {
        let sink: Arc<dyn DownloadSink> = Arc::new(FileDownloadSink::new(output_dir));
        let client = ExportClient::new(
            Arc::new(self.page_action(page)),
            sink,
            Arc::new(TerminalNotifier::new(self.config.display.color_output)),
        );

        let spinner =
            ExportSpinner::new(self.config.display.show_spinner).follow(client.subscribe());
        let outcome = client.handle_download(params, format).await;
        drop(client);
        // The spinner task only ends once the state sender is gone
        if let Err(err) = spinner.await {
            debug!("Spinner task ended abnormally: {}", err);
        }

        match outcome {
            ExportOutcome::Downloaded {
                location, bytes, ..
            } => {
                if !self.args.quiet {
                    println!("Saved {} ({})", location.display(), format_bytes(bytes));
                }
                true
            }
            ExportOutcome::Failed { .. } | ExportOutcome::Busy => false,
        }
    }

    /// Print the wire form of an export result
    fn print_export_json(
        &self,
        page: ExportPage,
        params: &QueryParams,
        format: ExportFormat,
    ) -> Result<bool> {
        let action = self.page_action(page);
        let result = page.export_with_config(params, format.as_str(), action.config());
        println!("{}", format_result_json(&result, true)?);
        Ok(result.success)
    }

    /// Render the filtered rows of a page
    pub fn render_preview(&self, page: ExportPage, params: &QueryParams) -> String {
        self.table_formatter().format_preview(&page.preview(params))
    }

    fn table_formatter(&self) -> TableFormatter {
        TableFormatter::with_colors(self.config.display.color_output)
            .with_max_column_width(self.config.display.max_cell_width)
    }

    /// Show version information
    fn show_version(&self) {
        println!("booking-export version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return Ok(());
        }

        match Config::from_file(&path) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_with_comments()?);

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface(argv: &[&str]) -> CliInterface {
        let args = CliArgs::try_parse_from(argv).unwrap();
        let mut config = Config::default();
        CliInterface::apply_args_to_config(&mut config, &args);
        CliInterface { args, config }
    }

    #[test]
    fn test_cli_args_parsing() {
        let args = CliArgs::try_parse_from(["booking-export"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.config_file.is_none());
    }

    #[test]
    fn test_export_args() {
        let args = CliArgs::try_parse_from([
            "booking-export",
            "export",
            "history-booking-log",
            "--format",
            "excel",
            "--query",
            "booking_status=confirmed",
            "-p",
            "payment_status=paid",
            "-p",
            "payment_status=refunded",
            "--json",
        ])
        .unwrap();

        match args.command {
            Some(Commands::Export {
                page,
                format,
                query,
                params,
                output_dir,
                json,
            }) => {
                assert_eq!(page, ExportPage::HistoryBookingLog);
                assert_eq!(format, Some(ExportFormat::Excel));
                assert_eq!(query.as_deref(), Some("booking_status=confirmed"));
                assert_eq!(params.len(), 2);
                assert!(output_dir.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(CliArgs::try_parse_from(["booking-export", "export", "rooms"]).is_err());
        assert!(
            CliArgs::try_parse_from(["booking-export", "export", "hotels", "--format", "pdf"])
                .is_err()
        );
        // Format names are case-sensitive
        assert!(
            CliArgs::try_parse_from(["booking-export", "export", "hotels", "--format", "CSV"])
                .is_err()
        );
        assert!(
            CliArgs::try_parse_from(["booking-export", "preview", "hotels", "-p", "=x"]).is_err()
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["booking-export", "pages", "--no-color", "-q"]).unwrap();
        assert!(args.no_color);
        assert!(args.quiet);
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("date_in=2024-03-01").unwrap(),
            ("date_in".to_string(), "2024-03-01".to_string())
        );
        assert_eq!(
            parse_key_value("search=").unwrap(),
            ("search".to_string(), String::new())
        );
        assert!(parse_key_value("search").is_err());
    }

    #[test]
    fn test_build_params_promotes_repeats() {
        let params = build_params(
            Some("payment_status=paid&search=Bali"),
            &[("payment_status".to_string(), "refunded".to_string())],
        );
        assert_eq!(params.values("payment_status"), vec!["paid", "refunded"]);
        assert_eq!(params.first("search"), Some("Bali"));
        assert!(build_params(None, &[]).is_empty());
    }

    #[test]
    fn test_args_override_config() {
        let cli = interface(&["booking-export", "--no-color", "-q", "pages"]);
        assert!(!cli.config().display.color_output);
        assert!(!cli.config().display.show_spinner);
        assert_eq!(cli.config().logging.level, LogLevel::Error);

        let cli = interface(&["booking-export", "-q", "--vv", "pages"]);
        assert_eq!(cli.config().logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_page_action_uses_config() {
        let mut cli = interface(&["booking-export", "pages"]);
        cli.config.export.author = Some("Front Desk".to_string());
        cli.config.export.include_timestamp = false;

        let config = cli.page_action(ExportPage::Agents).config();
        assert_eq!(config.author.as_deref(), Some("Front Desk"));
        assert!(!config.include_timestamp);
    }

    #[test]
    fn test_render_preview() {
        let cli = interface(&["booking-export", "--no-color", "pages"]);
        let params = build_params(Some("city=Ubud"), &[]);
        let output = cli.render_preview(ExportPage::Hotels, &params);
        assert!(output.contains("Ubud"));
        assert!(output.ends_with("of 5 records"));
    }

    #[tokio::test]
    async fn test_run_export_saves_file() {
        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();
        let cli = interface(&[
            "booking-export",
            "-q",
            "--no-color",
            "export",
            "agents",
            "--output-dir",
            &dir_arg,
        ]);

        assert!(cli.run().await.unwrap());

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].starts_with("agents"));
        assert!(saved[0].ends_with(".csv"));
    }

    #[tokio::test]
    async fn test_run_export_reports_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let dir_arg = dir.path().to_string_lossy().to_string();
        let cli = interface(&[
            "booking-export",
            "-q",
            "--no-color",
            "export",
            "hotels",
            "-p",
            "city=Atlantis",
            "--output-dir",
            &dir_arg,
        ]);

        assert!(!cli.run().await.unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
