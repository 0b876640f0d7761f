//! History booking log page.
//!
//! Exports the booking history with a free-text search across booking id,
//! agent, hotel and room type, status filters and three date ranges. Excel
//! output is the legacy SpreadsheetML `.xls` document.

use chrono::NaiveDate;

use crate::export::filters::GlobalSearchFilter;
use crate::export::{
    CellValue, Column, CombinedFilter, ExcelMode, ExportConfig, ExportResult, ExportService,
    Field, QueryParams, RecordFilter, combine_filters, date_range, multi_select,
};

use super::{PagePreview, preview_rows};

/// Page name used on the command line
pub const NAME: &str = "history-booking-log";

/// Page title
pub const TITLE: &str = "History Booking Log";

/// Filename prefix of every export from this page
pub const FILENAME_PREFIX: &str = "history-booking-log";

/// One row of the booking history
#[derive(Debug, Clone, PartialEq)]
pub struct BookingLogEntry {
    pub booking_id: String,
    pub agent_name: String,
    pub hotel_name: String,
    pub room_type: String,
    pub booking_status: String,
    pub payment_status: String,
    pub confirm_date: NaiveDate,
    pub date_in: NaiveDate,
    pub date_out: NaiveDate,
    pub nights: u32,
    pub total_amount: f64,
}

#[allow(clippy::too_many_arguments)]
fn entry(
    booking_id: &str,
    agent_name: &str,
    hotel_name: &str,
    room_type: &str,
    booking_status: &str,
    payment_status: &str,
    confirm_date: (i32, u32, u32),
    date_in: (i32, u32, u32),
    date_out: (i32, u32, u32),
    total_amount: f64,
) -> Option<BookingLogEntry> {
    let day = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d);
    let date_in = day(date_in)?;
    let date_out = day(date_out)?;
    let nights = u32::try_from((date_out - date_in).num_days()).ok()?;

    Some(BookingLogEntry {
        booking_id: booking_id.to_string(),
        agent_name: agent_name.to_string(),
        hotel_name: hotel_name.to_string(),
        room_type: room_type.to_string(),
        booking_status: booking_status.to_string(),
        payment_status: payment_status.to_string(),
        confirm_date: day(confirm_date)?,
        date_in,
        date_out,
        nights,
        total_amount,
    })
}

/// Fixed sample dataset served by this page
pub fn sample_records() -> Vec<BookingLogEntry> {
    [
        entry(
            "BK-001",
            "Sunrise Travel",
            "Grand Hyatt Bali",
            "Deluxe Ocean View",
            "confirmed",
            "paid",
            (2024, 1, 10),
            (2024, 1, 15),
            (2024, 1, 18),
            4_500_000.0,
        ),
        entry(
            "BK-002",
            "Blue Ocean Tours",
            "The Mulia, Nusa Dua",
            "Junior Suite",
            "in review",
            "unpaid",
            (2024, 1, 20),
            (2024, 2, 1),
            (2024, 2, 4),
            7_200_000.0,
        ),
        entry(
            "BK-003",
            "Archipelago Holidays",
            "Ayana Resort",
            "Villa \"Cliff Edge\"",
            "rejected",
            "refunded",
            (2024, 2, 2),
            (2024, 2, 14),
            (2024, 2, 16),
            9_800_000.0,
        ),
        entry(
            "BK-004",
            "Sunrise Travel",
            "Hermitage Jakarta",
            "Superior King",
            "confirmed",
            "partial",
            (2024, 2, 18),
            (2024, 3, 1),
            (2024, 3, 5),
            6_100_000.0,
        ),
        entry(
            "BK-005",
            "Nusantara Trips",
            "Padma Resort Ubud",
            "Deluxe Chalet",
            "in review",
            "paid",
            (2024, 3, 3),
            (2024, 3, 20),
            (2024, 3, 22),
            3_300_000.0,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Dates in this log are exported as ISO calendar dates
fn iso_date(value: &CellValue) -> String {
    value.as_plain_text()
}

fn amount(value: &CellValue) -> String {
    match value {
        CellValue::Number(n) => format!("{:.2}", n),
        other => other.as_plain_text(),
    }
}

/// Export columns in output order
pub fn columns() -> Vec<Column<BookingLogEntry>> {
    vec![
        Column::new("booking_id", "Booking ID", |b: &BookingLogEntry| {
            CellValue::from(&b.booking_id)
        })
        .with_width(12.0),
        Column::new("agent_name", "Agent Name", |b: &BookingLogEntry| {
            CellValue::from(&b.agent_name)
        })
        .with_width(22.0),
        Column::new("hotel_name", "Hotel Name", |b: &BookingLogEntry| {
            CellValue::from(&b.hotel_name)
        })
        .with_width(26.0),
        Column::new("room_type", "Room Type", |b: &BookingLogEntry| {
            CellValue::from(&b.room_type)
        })
        .with_width(20.0),
        Column::new("booking_status", "Booking Status", |b: &BookingLogEntry| {
            CellValue::from(&b.booking_status)
        }),
        Column::new("payment_status", "Payment Status", |b: &BookingLogEntry| {
            CellValue::from(&b.payment_status)
        }),
        Column::new("confirm_date", "Confirm Date", |b: &BookingLogEntry| {
            CellValue::from(b.confirm_date)
        })
        .with_formatter(iso_date),
        Column::new("date_in", "Check In", |b: &BookingLogEntry| {
            CellValue::from(b.date_in)
        })
        .with_formatter(iso_date),
        Column::new("date_out", "Check Out", |b: &BookingLogEntry| {
            CellValue::from(b.date_out)
        })
        .with_formatter(iso_date),
        Column::new("nights", "Nights", |b: &BookingLogEntry| CellValue::from(b.nights))
            .with_width(8.0),
        Column::new("total_amount", "Total Amount (IDR)", |b: &BookingLogEntry| {
            CellValue::from(b.total_amount)
        })
        .with_formatter(amount),
    ]
}

/// Filter chain matching the page's search parameters
pub fn filter() -> CombinedFilter<BookingLogEntry> {
    let search = GlobalSearchFilter::new(vec![
        Field::new("booking_id", |b: &BookingLogEntry| CellValue::from(&b.booking_id)),
        Field::new("agent_name", |b: &BookingLogEntry| CellValue::from(&b.agent_name)),
        Field::new("hotel_name", |b: &BookingLogEntry| CellValue::from(&b.hotel_name)),
        Field::new("room_type", |b: &BookingLogEntry| CellValue::from(&b.room_type)),
    ])
    .with_param_keys(["booking_id", "search"]);

    let filters: Vec<Box<dyn RecordFilter<BookingLogEntry>>> = vec![
        Box::new(search),
        multi_select(
            Field::new("booking_status", |b: &BookingLogEntry| {
                CellValue::from(&b.booking_status)
            }),
            "booking_status",
        ),
        multi_select(
            Field::new("payment_status", |b: &BookingLogEntry| {
                CellValue::from(&b.payment_status)
            }),
            "payment_status",
        ),
        date_range(
            Field::new("confirm_date", |b: &BookingLogEntry| CellValue::from(b.confirm_date)),
            "confirm_date",
        ),
        date_range(
            Field::new("date_in", |b: &BookingLogEntry| CellValue::from(b.date_in)),
            "date_in",
        ),
        date_range(
            Field::new("date_out", |b: &BookingLogEntry| CellValue::from(b.date_out)),
            "date_out",
        ),
    ];
    combine_filters(filters)
}

/// Document settings: always timestamped, legacy `.xls` for Excel
pub fn export_config() -> ExportConfig {
    ExportConfig::new()
        .with_title(TITLE)
        .with_subject("Booking history export")
        .with_sheet_name("History Booking Log")
        .with_filename_prefix(FILENAME_PREFIX)
        .with_timestamp(true)
        .with_excel_mode(ExcelMode::SpreadsheetMl)
}

/// Export the booking history for the given page parameters
///
/// # Arguments
/// * `params` - Current page query parameters
/// * `format` - `"csv"` or `"excel"`
pub fn export_history_booking_log(params: &QueryParams, format: &str) -> ExportResult {
    export_with_config(params, format, export_config())
}

pub(super) fn export_with_config(
    params: &QueryParams,
    format: &str,
    config: ExportConfig,
) -> ExportResult {
    let records = sample_records();
    let filter = filter();
    ExportService::new().export_data(
        &records,
        &columns(),
        &config,
        format,
        Some(&filter),
        Some(params),
    )
}

/// Filtered rows as displayed in the terminal
pub fn preview(params: &QueryParams) -> PagePreview {
    preview_rows(&sample_records(), &columns(), &filter(), params)
}
