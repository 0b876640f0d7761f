//! Hotel list page

use chrono::NaiveDate;

use crate::export::{
    CellValue, Column, CombinedFilter, ExportConfig, ExportResult, ExportService, Field,
    QueryParams, combine_filters, date_range, global_search, multi_select,
};

use super::{PagePreview, preview_rows};

pub const NAME: &str = "hotels";
pub const TITLE: &str = "Hotels";

#[derive(Debug, Clone, PartialEq)]
pub struct Hotel {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub star_rating: u8,
    pub room_count: u32,
    pub active: bool,
    pub listed_on: Option<NaiveDate>,
}

#[allow(clippy::too_many_arguments)]
fn hotel(
    code: &str,
    name: &str,
    city: &str,
    country: &str,
    star_rating: u8,
    room_count: u32,
    active: bool,
    listed_on: Option<(i32, u32, u32)>,
) -> Hotel {
    Hotel {
        code: code.to_string(),
        name: name.to_string(),
        city: city.to_string(),
        country: country.to_string(),
        star_rating,
        room_count,
        active,
        listed_on: listed_on.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
    }
}

pub fn sample_records() -> Vec<Hotel> {
    vec![
        hotel(
            "HT-BAL-01",
            "Grand Hyatt Bali",
            "Nusa Dua",
            "Indonesia",
            5,
            636,
            true,
            Some((2021, 4, 12)),
        ),
        hotel(
            "HT-BAL-02",
            "The Mulia, Nusa Dua",
            "Nusa Dua",
            "Indonesia",
            5,
            111,
            true,
            Some((2022, 9, 1)),
        ),
        hotel(
            "HT-JKT-01",
            "Hermitage Jakarta",
            "Jakarta",
            "Indonesia",
            5,
            90,
            false,
            Some((2020, 1, 20)),
        ),
        hotel("HT-UBD-01", "Padma Resort Ubud", "Ubud", "Indonesia", 5, 149, true, None),
        hotel(
            "HT-SIN-01",
            "Hotel 81 Bugis",
            "Singapore",
            "Singapore",
            2,
            74,
            true,
            Some((2023, 6, 5)),
        ),
    ]
}

/// Export columns in output order
pub fn columns() -> Vec<Column<Hotel>> {
    vec![
        Column::new("code", "Code", |h: &Hotel| CellValue::from(&h.code)).with_width(12.0),
        Column::new("name", "Hotel Name", |h: &Hotel| CellValue::from(&h.name)).with_width(28.0),
        Column::new("city", "City", |h: &Hotel| CellValue::from(&h.city)),
        Column::new("country", "Country", |h: &Hotel| CellValue::from(&h.country)),
        Column::new("star_rating", "Stars", |h: &Hotel| CellValue::from(h.star_rating))
            .with_formatter(|v| match v {
                CellValue::Integer(n) => "★".repeat(usize::try_from(*n).unwrap_or(0)),
                other => other.as_plain_text(),
            })
            .with_width(8.0),
        Column::new("room_count", "Rooms", |h: &Hotel| CellValue::from(h.room_count)),
        Column::new("active", "Active", |h: &Hotel| CellValue::from(h.active)),
        Column::new("listed_on", "Listed On", |h: &Hotel| CellValue::from(h.listed_on)),
    ]
}

fn status(hotel: &Hotel) -> CellValue {
    CellValue::from(if hotel.active { "active" } else { "inactive" })
}

/// `search`, `city`, `status` (active/inactive) and `listed_on`
pub fn filter() -> CombinedFilter<Hotel> {
    combine_filters(vec![
        global_search(vec![
            Field::new("code", |h: &Hotel| CellValue::from(&h.code)),
            Field::new("name", |h: &Hotel| CellValue::from(&h.name)),
            Field::new("city", |h: &Hotel| CellValue::from(&h.city)),
            Field::new("country", |h: &Hotel| CellValue::from(&h.country)),
        ]),
        multi_select(Field::new("city", |h: &Hotel| CellValue::from(&h.city)), "city"),
        multi_select(Field::new("status", status), "status"),
        date_range(
            Field::new("listed_on", |h: &Hotel| CellValue::from(h.listed_on)),
            "listed_on",
        ),
    ])
}

pub fn export_config() -> ExportConfig {
    ExportConfig::new()
        .with_title(TITLE)
        .with_subject("Hotel inventory")
        .with_sheet_name(TITLE)
        .with_filename_prefix("hotels")
}

pub fn export_hotels(params: &QueryParams, format: &str) -> ExportResult {
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

pub fn preview(params: &QueryParams) -> PagePreview {
    preview_rows(&sample_records(), &columns(), &filter(), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportData, XLSX_MIME_TYPE};

    #[test]
    fn test_workbook_export() {
        let result = export_hotels(&QueryParams::new(), "excel");
        assert!(result.success);
        assert_eq!(result.total_records, Some(5));
        assert_eq!(result.mime_type.as_deref(), Some(XLSX_MIME_TYPE));
        assert!(result.filename.unwrap().ends_with(".xlsx"));
        assert!(matches!(result.data, Some(ExportData::Binary(_))));
    }

    #[test]
    fn test_status_and_city_filters() {
        let params = QueryParams::new()
            .with("city", vec!["Nusa Dua", "Jakarta"])
            .with("status", "active");
        let preview = preview(&params);
        let names: Vec<&str> = preview.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, vec!["Grand Hyatt Bali", "The Mulia, Nusa Dua"]);
    }

    #[test]
    fn test_missing_listing_date_is_kept() {
        let params = QueryParams::new().with("listed_on", "2022-01-01 to");
        let preview = preview(&params);
        let codes: Vec<&str> = preview.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(codes, vec!["HT-BAL-02", "HT-UBD-01", "HT-SIN-01"]);
    }

    #[test]
    fn test_csv_cells() {
        let params = QueryParams::new().with("search", "bugis");
        let result = export_hotels(&params, "csv");
        let text = result.data.as_ref().and_then(ExportData::as_text).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some("HT-SIN-01,Hotel 81 Bugis,Singapore,Singapore,★★,74,Yes,\"Jun 5, 2023\"")
        );
    }
}
