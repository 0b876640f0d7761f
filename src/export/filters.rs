//! Record filters driven by page query parameters.
//!
//! Filters are pure: they take the records that survived the previous filter
//! and return the ones that survive this one. An absent or empty parameter
//! leaves the input untouched. Three kinds are provided:
//!
//! - [`GlobalSearchFilter`]: case-insensitive substring search across fields
//! - [`MultiSelectFilter`]: membership of one field in a set of values
//! - [`DateRangeFilter`]: inclusive date range on one field
//!
//! [`combine_filters`] folds several filters left to right.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use super::column::CellValue;
use super::types::QueryParams;

/// Query parameter read by the generic search filter
pub const SEARCH_PARAM: &str = "search";

/// A named, typed field of a record used by filters
pub struct Field<T> {
    name: String,
    getter: Arc<dyn Fn(&T) -> CellValue + Send + Sync>,
}

impl<T> Field<T> {
    pub fn new<F>(name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&T) -> CellValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            getter: Arc::new(getter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self, record: &T) -> CellValue {
        (self.getter)(record)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A filter over borrowed records
pub trait RecordFilter<T>: Send + Sync {
    /// Keep the records matching this filter for the given parameters
    fn apply<'a>(&self, records: Vec<&'a T>, params: &QueryParams) -> Vec<&'a T>;

    /// Short description used in logs
    fn describe(&self) -> String;
}

/// Case-insensitive substring search across several fields
pub struct GlobalSearchFilter<T> {
    fields: Vec<Field<T>>,
    param_keys: Vec<String>,
}

impl<T> GlobalSearchFilter<T> {
    /// Search `fields` using the `search` parameter
    pub fn new(fields: Vec<Field<T>>) -> Self {
        Self {
            fields,
            param_keys: vec![SEARCH_PARAM.to_string()],
        }
    }

    /// Read the term from the first of `keys` holding a non-empty value
    pub fn with_param_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Normalized search term, if any
    fn term(&self, params: &QueryParams) -> Option<String> {
        self.param_keys.iter().find_map(|key| {
            let term = params.first(key)?.trim().to_lowercase();
            (!term.is_empty()).then_some(term)
        })
    }
}

impl<T> RecordFilter<T> for GlobalSearchFilter<T> {
    fn apply<'a>(&self, records: Vec<&'a T>, params: &QueryParams) -> Vec<&'a T> {
        let Some(term) = self.term(params) else {
            return records;
        };

        records
            .into_iter()
            .filter(|record| {
                self.fields.iter().any(|field| {
                    field
                        .value(record)
                        .as_plain_text()
                        .to_lowercase()
                        .contains(&term)
                })
            })
            .collect()
    }

    fn describe(&self) -> String {
        let fields: Vec<&str> = self.fields.iter().map(Field::name).collect();
        format!("search({}) on [{}]", self.param_keys.join("|"), fields.join(", "))
    }
}

/// Keeps records whose field value is one of the selected values
pub struct MultiSelectFilter<T> {
    field: Field<T>,
    param_key: String,
}

impl<T> MultiSelectFilter<T> {
    pub fn new(field: Field<T>, param_key: impl Into<String>) -> Self {
        Self {
            field,
            param_key: param_key.into(),
        }
    }
}

impl<T> RecordFilter<T> for MultiSelectFilter<T> {
    fn apply<'a>(&self, records: Vec<&'a T>, params: &QueryParams) -> Vec<&'a T> {
        let selected = match params.get(&self.param_key) {
            Some(value) if !value.is_empty() => value.values(),
            _ => return records,
        };

        records
            .into_iter()
            .filter(|record| {
                let value = self.field.value(record).as_plain_text();
                selected.contains(&value.as_str())
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!("{} in {}", self.field.name(), self.param_key)
    }
}

/// Keeps records whose date field falls inside the requested range
pub struct DateRangeFilter<T> {
    field: Field<T>,
    param_key: String,
}

impl<T> DateRangeFilter<T> {
    pub fn new(field: Field<T>, param_key: impl Into<String>) -> Self {
        Self {
            field,
            param_key: param_key.into(),
        }
    }
}

impl<T> RecordFilter<T> for DateRangeFilter<T> {
    fn apply<'a>(&self, records: Vec<&'a T>, params: &QueryParams) -> Vec<&'a T> {
        let raw = match params.first(&self.param_key) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return records,
        };

        let range = DateRange::parse(raw);
        if range.is_unbounded() {
            return records;
        }

        records
            .into_iter()
            .filter(|record| match record_instant(&self.field.value(record)) {
                Some(instant) => range.contains(instant),
                // Unparseable record dates stay in the result
                None => true,
            })
            .collect()
    }

    fn describe(&self) -> String {
        format!("{} within {}", self.field.name(), self.param_key)
    }
}

/// Filters applied in declaration order, each seeing the previous output
pub struct CombinedFilter<T> {
    filters: Vec<Box<dyn RecordFilter<T>>>,
}

impl<T> RecordFilter<T> for CombinedFilter<T> {
    fn apply<'a>(&self, records: Vec<&'a T>, params: &QueryParams) -> Vec<&'a T> {
        self.filters.iter().fold(records, |remaining, filter| {
            let before = remaining.len();
            let kept = filter.apply(remaining, params);
            debug!(
                "Filter {} kept {} of {} records",
                filter.describe(),
                kept.len(),
                before
            );
            kept
        })
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.filters.iter().map(|f| f.describe()).collect();
        parts.join(" -> ")
    }
}

/// Fold `filters` left to right into one filter
pub fn combine_filters<T>(filters: Vec<Box<dyn RecordFilter<T>>>) -> CombinedFilter<T> {
    CombinedFilter { filters }
}

/// Boxed [`GlobalSearchFilter`] over the `search` parameter
pub fn global_search<T: 'static>(fields: Vec<Field<T>>) -> Box<dyn RecordFilter<T>> {
    Box::new(GlobalSearchFilter::new(fields))
}

/// Boxed [`MultiSelectFilter`]
pub fn multi_select<T: 'static>(
    field: Field<T>,
    param_key: impl Into<String>,
) -> Box<dyn RecordFilter<T>> {
    Box::new(MultiSelectFilter::new(field, param_key))
}

/// Boxed [`DateRangeFilter`]
pub fn date_range<T: 'static>(
    field: Field<T>,
    param_key: impl Into<String>,
) -> Box<dyn RecordFilter<T>> {
    Box::new(DateRangeFilter::new(field, param_key))
}

/// Inclusive range of instants; a missing bound is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Which end of a range a parsed value bounds
#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl DateRange {
    /// Parse a range parameter.
    ///
    /// A value containing `to` is split once around it and each half is parsed
    /// on its own (an empty half leaves that side open). Any other value is a
    /// single day. If any half fails to parse the whole range is unbounded.
    pub fn parse(raw: &str) -> Self {
        let parsed = match raw.split_once("to") {
            Some((from, to)) => parse_bound(from.trim(), Bound::Start)
                .and_then(|start| parse_bound(to.trim(), Bound::End).map(|end| (start, end))),
            None => {
                let day = raw.trim();
                parse_bound(day, Bound::Start)
                    .and_then(|start| parse_bound(day, Bound::End).map(|end| (start, end)))
            }
        };

        match parsed {
            Some((start, end)) => Self { start, end },
            None => Self::default(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start) && self.end.is_none_or(|end| instant <= end)
    }
}

/// `None` on parse failure, `Some(None)` for an empty (open) bound
fn parse_bound(text: &str, bound: Bound) -> Option<Option<DateTime<Utc>>> {
    if text.is_empty() {
        return Some(None);
    }

    let parsed = parse_date(text)?;
    let instant = match (parsed, bound) {
        (ParsedDate::Day(day), Bound::Start) => start_of_day(day),
        (ParsedDate::Day(day), Bound::End) => end_of_day(day),
        (ParsedDate::Instant(instant), _) => instant,
    };
    Some(Some(instant))
}

/// A parsed date string: a calendar day or a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date string (RFC 3339, bare date, or naive date-time taken as UTC)
pub fn parse_date(text: &str) -> Option<ParsedDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(ParsedDate::Instant(dt.with_timezone(&Utc)));
    }

    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(ParsedDate::Day(day));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| ParsedDate::Instant(naive.and_utc()))
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_milli_opt(23, 59, 59, 999)
        .map(|end| end.and_utc())
        .unwrap_or_else(|| start_of_day(day))
}

/// Point in time a record's date value stands for
fn record_instant(value: &CellValue) -> Option<DateTime<Utc>> {
    match value {
        CellValue::Date(day) => Some(start_of_day(*day)),
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(text) => match parse_date(text)? {
            ParsedDate::Day(day) => Some(start_of_day(day)),
            ParsedDate::Instant(instant) => Some(instant),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::types::ParamValue;

    #[derive(Debug, PartialEq)]
    struct Booking {
        id: &'static str,
        agent: &'static str,
        status: &'static str,
        date_in: &'static str,
    }

    fn bookings() -> Vec<Booking> {
        vec![
            Booking {
                id: "BK-001",
                agent: "Sunrise Travel",
                status: "confirmed",
                date_in: "2024-01-15T00:00:00Z",
            },
            Booking {
                id: "BK-002",
                agent: "Blue Ocean Tours",
                status: "in review",
                date_in: "2024-02-01T00:00:00Z",
            },
            Booking {
                id: "BK-003",
                agent: "Sunrise Travel",
                status: "rejected",
                date_in: "not a date",
            },
        ]
    }

    fn ids(records: &[&Booking]) -> Vec<&'static str> {
        records.iter().map(|b| b.id).collect()
    }

    fn id_field() -> Field<Booking> {
        Field::new("booking_id", |b: &Booking| b.id.into())
    }

    fn agent_field() -> Field<Booking> {
        Field::new("agent_name", |b: &Booking| b.agent.into())
    }

    fn status_field() -> Field<Booking> {
        Field::new("booking_status", |b: &Booking| b.status.into())
    }

    fn date_in_field() -> Field<Booking> {
        Field::new("date_in", |b: &Booking| b.date_in.into())
    }

    #[test]
    fn test_global_search_matches_any_field() {
        let data = bookings();
        let filter = GlobalSearchFilter::new(vec![id_field(), agent_field()]);
        let params = QueryParams::new().with("search", "  SUNRISE ");

        let kept = filter.apply(data.iter().collect(), &params);
        assert_eq!(ids(&kept), vec!["BK-001", "BK-003"]);
    }

    #[test]
    fn test_global_search_uses_first_array_element() {
        let data = bookings();
        let filter = GlobalSearchFilter::new(vec![id_field()]);
        let params = QueryParams::new().with("search", vec!["bk-002", "bk-001"]);

        let kept = filter.apply(data.iter().collect(), &params);
        assert_eq!(ids(&kept), vec!["BK-002"]);
    }

    #[test]
    fn test_global_search_empty_term_is_identity() {
        let data = bookings();
        let filter = GlobalSearchFilter::new(vec![id_field()]);

        let kept = filter.apply(data.iter().collect(), &QueryParams::new().with("search", "   "));
        assert_eq!(kept.len(), 3);

        let kept = filter.apply(data.iter().collect(), &QueryParams::new());
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_global_search_param_key_priority() {
        let data = bookings();
        let filter =
            GlobalSearchFilter::new(vec![id_field()]).with_param_keys(["booking_id", "search"]);

        let params = QueryParams::new()
            .with("booking_id", "BK-003")
            .with("search", "BK-001");
        assert_eq!(ids(&filter.apply(data.iter().collect(), &params)), vec!["BK-003"]);

        let params = QueryParams::new()
            .with("booking_id", "")
            .with("search", "BK-001");
        assert_eq!(ids(&filter.apply(data.iter().collect(), &params)), vec!["BK-001"]);
    }

    #[test]
    fn test_multi_select_filter() {
        let data = bookings();
        let filter = MultiSelectFilter::new(status_field(), "booking_status");
        let params = QueryParams::new().with("booking_status", vec!["confirmed", "rejected"]);

        let kept = filter.apply(data.iter().collect(), &params);
        assert_eq!(ids(&kept), vec!["BK-001", "BK-003"]);
    }

    #[test]
    fn test_multi_select_wraps_single_value() {
        let data = bookings();
        let filter = MultiSelectFilter::new(status_field(), "booking_status");
        let params = QueryParams::new().with("booking_status", "in review");

        let kept = filter.apply(data.iter().collect(), &params);
        assert_eq!(ids(&kept), vec!["BK-002"]);
    }

    #[test]
    fn test_multi_select_absent_or_empty_is_identity() {
        let data = bookings();
        let filter = MultiSelectFilter::new(status_field(), "booking_status");

        assert_eq!(filter.apply(data.iter().collect(), &QueryParams::new()).len(), 3);

        let params = QueryParams::new().with("booking_status", ParamValue::Multiple(vec![]));
        assert_eq!(filter.apply(data.iter().collect(), &params).len(), 3);
    }

    #[test]
    fn test_date_range_filter() {
        let data = bookings();
        let filter = DateRangeFilter::new(date_in_field(), "date_in");
        let params = QueryParams::new().with("date_in", "2024-01-01 to 2024-01-31");

        let kept = filter.apply(data.iter().collect(), &params);
        // BK-003 has an unparseable date and is kept
        assert_eq!(ids(&kept), vec!["BK-001", "BK-003"]);
    }

    #[test]
    fn test_date_range_single_day() {
        let data = bookings();
        let filter = DateRangeFilter::new(date_in_field(), "date_in");
        let params = QueryParams::new().with("date_in", "2024-02-01");

        let kept = filter.apply(data.iter().collect(), &params);
        assert_eq!(ids(&kept), vec!["BK-002", "BK-003"]);
    }

    #[test]
    fn test_date_range_open_bounds() {
        let range = DateRange::parse("2024-01-20 to ");
        assert!(range.start.is_some());
        assert!(range.end.is_none());

        let range = DateRange::parse(" to 2024-01-20");
        assert!(range.start.is_none());
        assert!(range.end.is_some());
    }

    #[test]
    fn test_date_range_invalid_bound_is_unbounded() {
        assert!(DateRange::parse("yesterday to 2024-01-20").is_unbounded());
        assert!(DateRange::parse("garbage").is_unbounded());

        let data = bookings();
        let filter = DateRangeFilter::new(date_in_field(), "date_in");
        let params = QueryParams::new().with("date_in", "garbage");
        assert_eq!(filter.apply(data.iter().collect(), &params).len(), 3);
    }

    #[test]
    fn test_date_range_end_covers_whole_day() {
        let range = DateRange::parse("2024-01-01 to 2024-01-31");
        let late = DateTime::parse_from_rfc3339("2024-01-31T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(range.contains(late));

        let next_day = DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(!range.contains(next_day));

        // An explicit instant stays exact
        let range = DateRange::parse("2024-01-01 to 2024-01-31T12:00:00Z");
        assert!(!range.contains(late));
    }

    #[test]
    fn test_parse_date_variants() {
        assert!(matches!(parse_date("2024-01-15"), Some(ParsedDate::Day(_))));
        assert!(matches!(
            parse_date("2024-01-15T08:00:00+07:00"),
            Some(ParsedDate::Instant(_))
        ));
        assert!(matches!(
            parse_date("2024-01-15 08:00"),
            Some(ParsedDate::Instant(_))
        ));
        assert_eq!(parse_date("15/01/2024"), None);
    }

    #[test]
    fn test_combine_filters_in_order() {
        let data = bookings();
        let combined = combine_filters(vec![
            global_search(vec![agent_field()]),
            multi_select(status_field(), "booking_status"),
        ]);
        let params = QueryParams::new()
            .with("search", "sunrise")
            .with("booking_status", "rejected");

        let kept = combined.apply(data.iter().collect(), &params);
        assert_eq!(ids(&kept), vec!["BK-003"]);
        assert!(combined.describe().contains("->"));
    }
}
