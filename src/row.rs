use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const TIMESTAMP: &str = "Timestamp";
pub const FULL_NAME: &str = "FullName";
pub const PHONE_NUMBER: &str = "PhoneNumber";
pub const UNION: &str = "Union";
pub const CONSTITUENCY: &str = "Constituency";
pub const PARTY_ROLE: &str = "PartyRole";

/// Shown in place of a timestamp that could not be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// One registration record as returned by the sheet.
///
/// Fields keep the order in which the sheet sent them, so the first row can
/// double as the header set for the whole table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Row { fields: Vec::new() }
    }

    /// Set a column, replacing the previous value if the column already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn timestamp(&self, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
        self.get(TIMESTAMP)
            .and_then(|raw| parse_timestamp(raw, offset))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;

        Ok(object
            .into_iter()
            .map(|(column, value)| (column, value_to_string(value)))
            .collect())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Textual form of a sheet value.
///
/// Apps Script hands back numbers for numeric-looking cells (phone numbers,
/// booth numbers), so every value is flattened to the text a user would see.
pub fn value_to_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Parse a sheet timestamp into the viewer's offset.
///
/// Zoned inputs (RFC 3339, RFC 2822) keep their instant. A bare ISO date is
/// midnight UTC. Naive date-times are read as wall-clock time in `offset`.
pub fn parse_timestamp(raw: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return Some(zoned.with_timezone(offset));
    }
    if let Ok(zoned) = DateTime::parse_from_rfc2822(raw) {
        return Some(zoned.with_timezone(offset));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
        return Some(midnight.with_timezone(offset));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return offset.from_local_datetime(&naive).single();
        }
    }

    NaiveDate::parse_from_str(raw, "%m/%d/%Y")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

/// Date line of a timestamp cell, e.g. `01 Jan 2024`.
pub fn display_date(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%d %b %Y").to_string()
}

/// Time line of a timestamp cell, e.g. `3:30 PM`.
pub fn display_time(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%-I:%M %p").to_string()
}
