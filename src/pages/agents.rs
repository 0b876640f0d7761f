//! Travel agent directory page

use chrono::{DateTime, TimeZone, Utc};

use crate::export::{
    CellValue, Column, CombinedFilter, ExportConfig, ExportResult, ExportService, Field,
    QueryParams, combine_filters, date_range, global_search, multi_select,
};

use super::{PagePreview, preview_rows};

pub const NAME: &str = "agents";
pub const TITLE: &str = "Agents";

#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub agent_id: String,
    pub company: String,
    pub contact_email: String,
    pub tier: String,
    pub status: String,
    pub commission_rate: f64,
    pub registered_at: Option<DateTime<Utc>>,
}

fn agent(
    agent_id: &str,
    company: &str,
    contact_email: &str,
    tier: &str,
    status: &str,
    commission_rate: f64,
    registered_at: Option<(i32, u32, u32, u32, u32)>,
) -> Agent {
    Agent {
        agent_id: agent_id.to_string(),
        company: company.to_string(),
        contact_email: contact_email.to_string(),
        tier: tier.to_string(),
        status: status.to_string(),
        commission_rate,
        registered_at: registered_at
            .and_then(|(y, mo, d, h, mi)| Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single()),
    }
}

pub fn sample_records() -> Vec<Agent> {
    vec![
        agent(
            "AG-1001",
            "Sunrise Travel",
            "ops@sunrise.example",
            "gold",
            "active",
            0.12,
            Some((2022, 3, 14, 9, 30)),
        ),
        agent(
            "AG-1002",
            "Blue Ocean Tours",
            "hello@blueocean.example",
            "silver",
            "active",
            0.10,
            Some((2023, 7, 2, 14, 0)),
        ),
        agent(
            "AG-1003",
            "Archipelago Holidays",
            "desk@archipelago.example",
            "bronze",
            "suspended",
            0.08,
            Some((2021, 11, 30, 23, 45)),
        ),
        agent(
            "AG-1004",
            "Nusantara Trips",
            "team@nusantara.example",
            "gold",
            "pending",
            0.12,
            None,
        ),
    ]
}

pub fn columns() -> Vec<Column<Agent>> {
    vec![
        Column::new("agent_id", "Agent ID", |a: &Agent| CellValue::from(&a.agent_id)),
        Column::new("company", "Company", |a: &Agent| CellValue::from(&a.company)).with_width(26.0),
        Column::new("contact_email", "Email", |a: &Agent| CellValue::from(&a.contact_email))
            .with_width(28.0),
        Column::new("tier", "Tier", |a: &Agent| CellValue::from(&a.tier)).with_formatter(|v| {
            let tier = v.as_plain_text();
            let mut chars = tier.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }),
        Column::new("status", "Status", |a: &Agent| CellValue::from(&a.status)),
        Column::new("commission_rate", "Commission", |a: &Agent| {
            CellValue::from(a.commission_rate)
        })
        .with_formatter(|v| match v {
            CellValue::Number(rate) => format!("{:.0}%", rate * 100.0),
            other => other.as_plain_text(),
        }),
        Column::new("registered_at", "Registered", |a: &Agent| {
            CellValue::from(a.registered_at)
        }),
    ]
}

pub fn filter() -> CombinedFilter<Agent> {
    combine_filters(vec![
        global_search(vec![
            Field::new("agent_id", |a: &Agent| CellValue::from(&a.agent_id)),
            Field::new("company", |a: &Agent| CellValue::from(&a.company)),
            Field::new("contact_email", |a: &Agent| CellValue::from(&a.contact_email)),
        ]),
        multi_select(Field::new("tier", |a: &Agent| CellValue::from(&a.tier)), "tier"),
        multi_select(Field::new("status", |a: &Agent| CellValue::from(&a.status)), "status"),
        date_range(
            Field::new("registered_at", |a: &Agent| CellValue::from(a.registered_at)),
            "registered_at",
        ),
    ])
}

pub fn export_config() -> ExportConfig {
    ExportConfig::new()
        .with_title("Travel Agents")
        .with_sheet_name(TITLE)
        .with_filename_prefix("agents")
}

pub fn export_agents(params: &QueryParams, format: &str) -> ExportResult {
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
    use crate::export::ExportData;

    #[test]
    fn test_formatted_cells() {
        let params = QueryParams::new().with("tier", "silver");
        let result = export_agents(&params, "csv");
        let text = result.data.as_ref().and_then(ExportData::as_text).unwrap();
        assert_eq!(
            text,
            "Agent ID,Company,Email,Tier,Status,Commission,Registered\n\
             AG-1002,Blue Ocean Tours,hello@blueocean.example,Silver,active,10%,\"Jul 2, 2023\""
        );
    }

    #[test]
    fn test_registration_window_includes_unknown_dates() {
        // A bare date covers the whole day
        let params = QueryParams::new().with("registered_at", "2023-07-02");
        let preview = preview(&params);
        let ids: Vec<&str> = preview.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(ids, vec!["AG-1002", "AG-1004"]);
    }

    #[test]
    fn test_gold_tier_active_only() {
        let params = QueryParams::from_query_str("tier=gold&status=active&status=pending");
        let result = export_agents(&params, "excel");
        assert!(result.success);
        assert_eq!(result.total_records, Some(2));
    }
}
