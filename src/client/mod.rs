//! Export client
//!
//! Drives one export request end to end: snapshot the page parameters, call
//! the page's export action, validate the result, save the file and tell the
//! user how it went. The request state is an explicit state machine
//!
//! ```text
//! Idle -> Requesting -> Succeeded | Failed -> (reset) Idle
//! ```
//!
//! published through a [`tokio::sync::watch`] channel so a UI (or the
//! terminal spinner) can follow it. A request started while another is in
//! flight is turned away with [`ExportOutcome::Busy`].

pub mod download;
pub mod notify;
pub mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{ClientError, ExportError, Result};
use crate::export::{ExportFormat, ExportResult, QueryParams};
use crate::utils::convert::format_bytes;
use crate::utils::time::format_duration;

pub use download::{Download, DownloadSink, FileDownloadSink, SavedFile};
pub use notify::{Notifier, TerminalNotifier};
pub use progress::ExportSpinner;

/// Message shown when the action itself could not be completed
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to export data. Please try again.";

/// A page-specific export action (the server boundary)
#[async_trait]
pub trait ExportAction: Send + Sync {
    /// Export the page's data for the given parameters
    ///
    /// # Arguments
    /// * `params` - Snapshot of the page query parameters
    /// * `format` - Requested format
    ///
    /// # Returns
    /// * `Result<ExportResult>` - The export outcome, or an error when the
    ///   action could not be invoked at all
    async fn export(&self, params: QueryParams, format: ExportFormat) -> Result<ExportResult>;
}

/// State of the export client
#[derive(Debug, Clone, PartialEq)]
pub enum ExportState {
    Idle,
    Requesting {
        format: ExportFormat,
        request_id: Uuid,
    },
    Succeeded {
        format: ExportFormat,
        request_id: Uuid,
        filename: String,
        total_records: usize,
    },
    Failed {
        format: ExportFormat,
        request_id: Uuid,
        message: String,
    },
}

impl ExportState {
    pub fn is_requesting(&self) -> bool {
        matches!(self, ExportState::Requesting { .. })
    }
}

/// Outcome of one `handle_download` call
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// The file was exported and saved
    Downloaded {
        filename: String,
        location: PathBuf,
        total_records: usize,
        bytes: u64,
    },
    /// The export or the save failed; the user has been notified
    Failed { message: String },
    /// Another request is still in flight
    Busy,
}

/// Client coordinating export requests for one page
pub struct ExportClient {
    action: Arc<dyn ExportAction>,
    sink: Arc<dyn DownloadSink>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<ExportState>,
}

impl ExportClient {
    /// Create a new client
    pub fn new(
        action: Arc<dyn ExportAction>,
        sink: Arc<dyn DownloadSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(ExportState::Idle);
        Self {
            action,
            sink,
            notifier,
            state,
        }
    }

    /// Subscribe to state changes
    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn state(&self) -> ExportState {
        self.state.borrow().clone()
    }

    /// True while a request is in flight
    pub fn is_exporting(&self) -> bool {
        self.state.borrow().is_requesting()
    }

    /// Return a settled client to `Idle`
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_requesting() || *state == ExportState::Idle {
                false
            } else {
                *state = ExportState::Idle;
                true
            }
        });
    }

    /// Export using a raw URL query string as the page parameters
    pub async fn handle_download_query(&self, query: &str, format: ExportFormat) -> ExportOutcome {
        self.handle_download(QueryParams::from_query_str(query), format)
            .await
    }

    /// Run one export request
    ///
    /// # Arguments
    /// * `params` - Page query parameters
    /// * `format` - Requested format
    ///
    /// # Returns
    /// * `ExportOutcome` - Saved file, failure, or `Busy`
    pub async fn handle_download(
        &self,
        params: QueryParams,
        format: ExportFormat,
    ) -> ExportOutcome {
        let request_id = Uuid::new_v4();

        let started = self.state.send_if_modified(|state| {
            if state.is_requesting() {
                false
            } else {
                *state = ExportState::Requesting { format, request_id };
                true
            }
        });
        if !started {
            debug!("Export request ignored: another request is in flight");
            return ExportOutcome::Busy;
        }

        let start_time = Instant::now();
        debug!(
            "[{}] Requesting {} export with {} parameter(s)",
            request_id,
            format,
            params.len()
        );

        let outcome = self.run(request_id, params, format).await;

        let settled = match &outcome {
            ExportOutcome::Downloaded {
                filename,
                total_records,
                ..
            } => ExportState::Succeeded {
                format,
                request_id,
                filename: filename.clone(),
                total_records: *total_records,
            },
            ExportOutcome::Failed { message } => ExportState::Failed {
                format,
                request_id,
                message: message.clone(),
            },
            ExportOutcome::Busy => ExportState::Idle,
        };
        self.state.send_replace(settled);

        debug!(
            "[{}] Request settled in {}",
            request_id,
            format_duration(start_time.elapsed())
        );
        outcome
    }

    async fn run(
        &self,
        request_id: Uuid,
        params: QueryParams,
        format: ExportFormat,
    ) -> ExportOutcome {
        // A panic inside the action comes back as a JoinError
        let action = Arc::clone(&self.action);
        let invoked = tokio::spawn(async move { action.export(params, format).await }).await;

        let result = match invoked {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => return self.action_failed(request_id, &err),
            Err(join_err) => {
                let err = ExportError::from(ClientError::ActionFailed(join_err.to_string()));
                return self.action_failed(request_id, &err);
            }
        };

        if !result.success {
            let message = result
                .error
                .unwrap_or_else(|| "Export failed".to_string());
            debug!("[{}] Export rejected: {}", request_id, message);
            self.notifier.error(&message);
            return ExportOutcome::Failed { message };
        }

        let Some(data) = result.data else {
            let message = ClientError::MissingData.to_string();
            error!("[{}] {}", request_id, message);
            self.notifier.error(&message);
            return ExportOutcome::Failed { message };
        };

        let download = Download {
            filename: result
                .filename
                .unwrap_or_else(|| format.fallback_filename().to_string()),
            mime_type: result
                .mime_type
                .unwrap_or_else(|| format.fallback_mime_type().to_string()),
            data,
        };
        let total_records = result.total_records.unwrap_or(0);

        match self.sink.save(&download).await {
            Ok(saved) => {
                info!(
                    "[{}] Saved {} ({})",
                    request_id,
                    saved.location.display(),
                    format_bytes(saved.bytes)
                );
                self.notifier.success(&format!(
                    "Exported {} records as {}",
                    total_records,
                    format.label()
                ));
                ExportOutcome::Downloaded {
                    filename: download.filename,
                    location: saved.location,
                    total_records,
                    bytes: saved.bytes,
                }
            }
            Err(err) => {
                error!("[{}] Download failed: {}", request_id, err);
                let message = err.to_string();
                self.notifier.error(&message);
                ExportOutcome::Failed { message }
            }
        }
    }

    fn action_failed(&self, request_id: Uuid, err: &ExportError) -> ExportOutcome {
        error!("[{}] Export action failed: {}", request_id, err);
        self.notifier.error(GENERIC_FAILURE_MESSAGE);
        ExportOutcome::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{CSV_MIME_TYPE, ExportData, XLSX_MIME_TYPE};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    // Mock action returning a fixed result
    struct FixedAction {
        result: ExportResult,
        seen: Mutex<Vec<(QueryParams, ExportFormat)>>,
    }

    impl FixedAction {
        fn new(result: ExportResult) -> Arc<Self> {
            Arc::new(Self {
                result,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ExportAction for FixedAction {
        async fn export(&self, params: QueryParams, format: ExportFormat) -> Result<ExportResult> {
            self.seen.lock().unwrap().push((params, format));
            Ok(self.result.clone())
        }
    }

    struct FailingAction;

    #[async_trait]
    impl ExportAction for FailingAction {
        async fn export(&self, _: QueryParams, _: ExportFormat) -> Result<ExportResult> {
            Err(ClientError::ActionFailed("connection reset".to_string()).into())
        }
    }

    struct PanickingAction;

    #[async_trait]
    impl ExportAction for PanickingAction {
        async fn export(&self, _: QueryParams, _: ExportFormat) -> Result<ExportResult> {
            panic!("action blew up");
        }
    }

    // Action that waits until released
    struct GatedAction {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ExportAction for GatedAction {
        async fn export(&self, _: QueryParams, _: ExportFormat) -> Result<ExportResult> {
            self.gate.notified().await;
            Ok(csv_result())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<Download>>,
        fail: bool,
    }

    #[async_trait]
    impl DownloadSink for RecordingSink {
        async fn save(&self, download: &Download) -> Result<SavedFile> {
            if self.fail {
                return Err(ClientError::DownloadFailed("disk full".to_string()).into());
            }
            self.saved.lock().unwrap().push(download.clone());
            Ok(SavedFile {
                location: PathBuf::from("/downloads").join(&download.filename),
                bytes: download.data.len() as u64,
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(bool, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn success(&self, message: &str) {
            self.messages.lock().unwrap().push((true, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.messages.lock().unwrap().push((false, message.to_string()));
        }
    }

    fn csv_result() -> ExportResult {
        ExportResult::success(
            ExportData::Text("ID\nBK-001\nBK-004".to_string()),
            "history-booking-log-2024-03-07-0905.csv",
            2,
            CSV_MIME_TYPE,
        )
    }

    struct Harness {
        client: ExportClient,
        sink: Arc<RecordingSink>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness(action: Arc<dyn ExportAction>, sink: RecordingSink) -> Harness {
        let sink = Arc::new(sink);
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ExportClient::new(action, sink.clone(), notifier.clone());
        Harness {
            client,
            sink,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_successful_download() {
        let action = FixedAction::new(csv_result());
        let h = harness(action.clone(), RecordingSink::default());

        let outcome = h
            .client
            .handle_download_query("?booking_status=confirmed", ExportFormat::Csv)
            .await;

        assert_eq!(
            outcome,
            ExportOutcome::Downloaded {
                filename: "history-booking-log-2024-03-07-0905.csv".to_string(),
                location: PathBuf::from("/downloads/history-booking-log-2024-03-07-0905.csv"),
                total_records: 2,
                bytes: 16,
            }
        );

        let seen = action.seen.lock().unwrap();
        assert_eq!(seen[0].0.first("booking_status"), Some("confirmed"));
        assert_eq!(seen[0].1, ExportFormat::Csv);

        assert_eq!(
            h.notifier.messages.lock().unwrap().as_slice(),
            &[(true, "Exported 2 records as CSV".to_string())]
        );
        assert!(matches!(h.client.state(), ExportState::Succeeded { total_records: 2, .. }));
        assert!(!h.client.is_exporting());

        h.client.reset();
        assert_eq!(h.client.state(), ExportState::Idle);
    }

    #[tokio::test]
    async fn test_fallback_filename_and_mime() {
        let result = ExportResult {
            success: true,
            data: Some(ExportData::Binary(vec![1, 2, 3])),
            ..ExportResult::default()
        };
        let h = harness(FixedAction::new(result), RecordingSink::default());

        h.client
            .handle_download(QueryParams::new(), ExportFormat::Excel)
            .await;

        let saved = h.sink.saved.lock().unwrap();
        assert_eq!(saved[0].filename, "export.xlsx");
        assert_eq!(saved[0].mime_type, XLSX_MIME_TYPE);
        assert_eq!(
            h.notifier.messages.lock().unwrap()[0],
            (true, "Exported 0 records as EXCEL".to_string())
        );
    }

    #[tokio::test]
    async fn test_unsuccessful_result_is_not_downloaded() {
        let action = FixedAction::new(ExportResult::failure(
            "No data found matching the specified filters",
        ));
        let h = harness(action, RecordingSink::default());

        let outcome = h.client.handle_download(QueryParams::new(), ExportFormat::Csv).await;

        assert_eq!(
            outcome,
            ExportOutcome::Failed {
                message: "No data found matching the specified filters".to_string()
            }
        );
        assert!(h.sink.saved.lock().unwrap().is_empty());
        assert!(matches!(h.client.state(), ExportState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_success_without_data_is_rejected() {
        let result = ExportResult {
            success: true,
            ..ExportResult::default()
        };
        let h = harness(FixedAction::new(result), RecordingSink::default());

        let outcome = h.client.handle_download(QueryParams::new(), ExportFormat::Csv).await;

        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
        assert!(h.sink.saved.lock().unwrap().is_empty());
        assert!(!h.notifier.messages.lock().unwrap()[0].0);
    }

    #[tokio::test]
    async fn test_action_error_is_reported_generically() {
        let h = harness(Arc::new(FailingAction), RecordingSink::default());

        let outcome = h.client.handle_download(QueryParams::new(), ExportFormat::Csv).await;

        assert_eq!(
            outcome,
            ExportOutcome::Failed {
                message: GENERIC_FAILURE_MESSAGE.to_string()
            }
        );
        assert!(!h.client.is_exporting());
    }

    #[tokio::test]
    async fn test_action_panic_does_not_leave_client_pending() {
        let h = harness(Arc::new(PanickingAction), RecordingSink::default());

        let outcome = h.client.handle_download(QueryParams::new(), ExportFormat::Csv).await;

        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
        assert!(!h.client.is_exporting());
    }

    #[tokio::test]
    async fn test_sink_failure() {
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        let h = harness(FixedAction::new(csv_result()), sink);

        let outcome = h.client.handle_download(QueryParams::new(), ExportFormat::Csv).await;

        assert_eq!(
            outcome,
            ExportOutcome::Failed {
                message: "Failed to save export: disk full".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_second_request_while_pending_is_busy() {
        let gate = Arc::new(Notify::new());
        let h = harness(
            Arc::new(GatedAction { gate: gate.clone() }),
            RecordingSink::default(),
        );
        let client = Arc::new(h.client);
        let mut states = client.subscribe();

        let first = {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .handle_download(QueryParams::new(), ExportFormat::Csv)
                    .await
            })
        };

        states.wait_for(ExportState::is_requesting).await.unwrap();
        assert!(client.is_exporting());

        let second = client
            .handle_download(QueryParams::new(), ExportFormat::Excel)
            .await;
        assert_eq!(second, ExportOutcome::Busy);

        gate.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, ExportOutcome::Downloaded { .. }));
        assert_eq!(h.sink.saved.lock().unwrap().len(), 1);
    }
}
