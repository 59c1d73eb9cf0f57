use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use crate::row::Row;

/// Byte-order mark so spreadsheet tools detect UTF-8 (Tamil names survive the trip)
pub const UTF8_BOM: char = '\u{FEFF}';

#[derive(Error, Debug, PartialEq)]
pub enum ExportError {
    #[error("No rows to export")]
    NothingToExport,
}

/// A rendered CSV file ready to be handed to the browser
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Convert the filtered registrations to CSV format
///
/// This function exports a header row followed by one line per row, where:
/// - The header row is the table's header set
/// - Values are comma-separated, in header order
/// - A column missing from a row is written as an empty field
/// - Special characters (commas, quotes, newlines) are properly escaped
///
/// The content starts with a UTF-8 byte-order mark.
///
/// # Arguments
/// * `headers` - Column names, in display order
/// * `rows` - The rows currently shown in the table
///
/// # Returns
/// * `Result<String, ExportError>` - CSV content, or an error when there is nothing to export
///
/// # Examples
/// ```
/// use varugai::downloader::to_csv;
/// use varugai::row::Row;
///
/// let row: Row = [("FullName", "Ravi, K")].into_iter().collect();
/// let csv = to_csv(&["FullName".to_string()], &[&row]).unwrap();
/// assert_eq!(csv, "\u{FEFF}FullName\n\"Ravi, K\"\n");
/// ```
pub fn to_csv(headers: &[String], rows: &[&Row]) -> Result<String, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut csv_content = String::new();
    csv_content.push(UTF8_BOM);

    push_line(&mut csv_content, headers.iter().map(String::as_str));

    for row in rows {
        push_line(
            &mut csv_content,
            headers
                .iter()
                .map(|header| row.get(header).unwrap_or_default()),
        );
    }

    Ok(csv_content)
}

/// Build the download filename, e.g. `registrations_2024-01-01_1530.csv`
///
/// # Arguments
/// * `prefix` - Fixed filename prefix from the configuration
/// * `now` - Export time in the viewer's offset (minute precision is kept)
pub fn export_filename(prefix: &str, now: &DateTime<FixedOffset>) -> String {
    format!("{}_{}.csv", prefix, now.format("%Y-%m-%d_%H%M"))
}

/// Render the CSV and its filename in one go
pub fn export(
    prefix: &str,
    now: &DateTime<FixedOffset>,
    headers: &[String],
    rows: &[&Row],
) -> Result<CsvExport, ExportError> {
    Ok(CsvExport {
        content: to_csv(headers, rows)?,
        filename: export_filename(prefix, now),
    })
}

fn push_line<'a>(csv_content: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, value) in fields.enumerate() {
        if i > 0 {
            csv_content.push(',');
        }

        if value.contains([',', '"', '\n', '\r']) {
            let escaped = value.replace('"', "\"\"");
            csv_content.push_str(&format!("\"{}\"", escaped));
        } else {
            csv_content.push_str(value);
        }
    }
    csv_content.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn headers() -> Vec<String> {
        ["Timestamp", "FullName", "PartyRole"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn rows() -> Vec<Row> {
        vec![
            [
                ("Timestamp", "2024-01-01T10:00:00Z"),
                ("FullName", "ரவி"),
                ("PartyRole", "Member"),
            ]
            .into_iter()
            .collect(),
            [
                ("Timestamp", "2024-01-02T09:30:00Z"),
                ("FullName", "Kumar, S"),
                ("PartyRole", "Booth \"A\" agent"),
            ]
            .into_iter()
            .collect(),
        ]
    }

    #[test]
    fn writes_bom_header_and_escaped_rows() {
        let rows = rows();
        let refs: Vec<&Row> = rows.iter().collect();

        let csv = to_csv(&headers(), &refs).unwrap();

        assert!(csv.starts_with('\u{FEFF}'));
        assert_eq!(
            csv,
            "\u{FEFF}Timestamp,FullName,PartyRole\n\
             2024-01-01T10:00:00Z,ரவி,Member\n\
             2024-01-02T09:30:00Z,\"Kumar, S\",\"Booth \"\"A\"\" agent\"\n"
        );
    }

    #[test]
    fn missing_columns_are_blank() {
        let sparse: Row = [("FullName", "Solo")].into_iter().collect();

        let csv = to_csv(&headers(), &[&sparse]).unwrap();
        assert_eq!(csv, "\u{FEFF}Timestamp,FullName,PartyRole\n,Solo,\n");
    }

    #[test]
    fn carriage_return_is_quoted() {
        let row: Row = [("FullName", "a\rb")].into_iter().collect();

        let csv = to_csv(&["FullName".to_string()], &[&row]).unwrap();
        assert_eq!(csv, "\u{FEFF}FullName\n\"a\rb\"\n");
    }

    #[test]
    fn empty_set_is_refused() {
        assert_eq!(to_csv(&headers(), &[]), Err(ExportError::NothingToExport));
    }

    #[test]
    fn content_is_stable_across_exports() {
        let rows = rows();
        let refs: Vec<&Row> = rows.iter().collect();
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();

        let first_time = offset.with_ymd_and_hms(2024, 1, 1, 15, 30, 12).unwrap();
        let second_time = offset.with_ymd_and_hms(2024, 1, 1, 15, 31, 0).unwrap();

        let first = export("registrations", &first_time, &headers(), &refs).unwrap();
        let second = export("registrations", &second_time, &headers(), &refs).unwrap();

        assert_eq!(first.content, second.content);
        assert_eq!(first.filename, "registrations_2024-01-01_1530.csv");
        assert_eq!(second.filename, "registrations_2024-01-01_1531.csv");
    }
}
