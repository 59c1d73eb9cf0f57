use chrono::{FixedOffset, NaiveDate};
use serde::Serialize;

use crate::row::{self, Row};

/// Header set used when the sheet returned no rows at all.
pub const FALLBACK_HEADERS: [&str; 5] = [
    row::TIMESTAMP,
    row::FULL_NAME,
    row::PHONE_NUMBER,
    row::CONSTITUENCY,
    row::PARTY_ROLE,
];

/// The two pieces of dashboard state. Every view is derived from these.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableFilter {
    pub search: String,
    pub date: Option<NaiveDate>,
}

impl TableFilter {
    /// Build a filter from raw query parameters. A date that is not
    /// `YYYY-MM-DD` is dropped rather than rejected.
    pub fn from_params(search: Option<&str>, date: Option<&str>) -> Self {
        let date = date
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    log::debug!("Ignoring date filter {raw:?}: {e}");
                    None
                }
            });

        TableFilter {
            search: search.unwrap_or_default().to_string(),
            date,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.date.is_some()
    }
}

/// One rendered table cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellView {
    Text { text: String },
    Timestamp { date: String, time: String },
    InvalidTimestamp { text: &'static str },
}

pub struct AdminTable {
    rows: Vec<Row>,
    offset: FixedOffset,
}

impl AdminTable {
    pub fn new(rows: Vec<Row>, offset: FixedOffset) -> Self {
        AdminTable { rows, offset }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Columns of the first row, or the fallback list when the sheet is
    /// empty or its first row has no columns.
    pub fn headers(&self) -> Vec<String> {
        match self.rows.first() {
            Some(first) if !first.is_empty() => first.columns().map(str::to_string).collect(),
            _ => FALLBACK_HEADERS.iter().map(|h| h.to_string()).collect(),
        }
    }

    /// Search first, then the day filter.
    pub fn filter(&self, filter: &TableFilter) -> Vec<&Row> {
        let query = filter.search.to_lowercase();

        self.rows
            .iter()
            .filter(|row| query.is_empty() || matches_search(row, &query))
            .filter(|row| match filter.date {
                Some(date) => matches_date(row, date, &self.offset),
                None => true,
            })
            .collect()
    }

    pub fn cells(&self, row: &Row, headers: &[String]) -> Vec<CellView> {
        headers
            .iter()
            .map(|header| cell_view(row, header, &self.offset))
            .collect()
    }
}

/// `lowered_query` must already be lower-cased.
pub fn matches_search(row: &Row, lowered_query: &str) -> bool {
    row.values()
        .any(|value| value.to_lowercase().contains(lowered_query))
}

/// Rows without a parseable timestamp never match a date.
pub fn matches_date(row: &Row, date: NaiveDate, offset: &FixedOffset) -> bool {
    row.timestamp(offset)
        .is_some_and(|timestamp| timestamp.date_naive() == date)
}

fn cell_view(row: &Row, header: &str, offset: &FixedOffset) -> CellView {
    let value = row.get(header).unwrap_or_default();

    if header != row::TIMESTAMP {
        return CellView::Text {
            text: value.to_string(),
        };
    }

    match row::parse_timestamp(value, offset) {
        Some(timestamp) => CellView::Timestamp {
            date: row::display_date(&timestamp),
            time: row::display_time(&timestamp),
        },
        None => CellView::InvalidTimestamp {
            text: row::INVALID_DATE,
        },
    }
}
