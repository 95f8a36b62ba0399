//! CSV writer for quote exports.
//!
//! # Invariants
//! - Column order matches `CSV_HEADERS`.
//! - Fields containing a comma, quote or line break are quoted with inner
//!   quotes doubled; other fields are written verbatim.
//! - Every row, the header included, ends with `\n`.

use crate::model::quote::Quote;
use chrono::{DateTime, NaiveDate, SecondsFormat};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

pub const CSV_HEADERS: [&str; 9] = [
    "ID",
    "Author",
    "Quote Text",
    "Subjects",
    "Author Link",
    "Video Link",
    "Contributed By",
    "Created At",
    "Updated At",
];

const SUBJECT_SEPARATOR: &str = "; ";

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to write csv record: {err}"),
            Self::Io(err) => write!(f, "failed to write export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Writes `quotes` as CSV with a header row.
pub fn write_quotes_csv<W: Write>(writer: &mut W, quotes: &[Quote]) -> Result<(), ExportError> {
    let mut csv_writer = WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADERS)?;
    for quote in quotes {
        csv_writer.write_record(quote_fields(quote))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Default export file name for `date`, e.g. `quotes_export_2024-05-01.csv`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("quotes_export_{}.csv", date.format("%Y-%m-%d"))
}

fn quote_fields(quote: &Quote) -> [String; 9] {
    [
        quote.id.to_string(),
        quote.author.clone(),
        quote.quote_text.clone(),
        quote.subjects.join(SUBJECT_SEPARATOR),
        quote.author_link.clone().unwrap_or_default(),
        quote.video_link.clone().unwrap_or_default(),
        quote.contributed_by.clone().unwrap_or_default(),
        format_timestamp(quote.created_at),
        format_timestamp(quote.updated_at),
    ]
}

fn format_timestamp(epoch_ms: i64) -> String {
    if epoch_ms <= 0 {
        return String::new();
    }
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|moment| moment.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, format_timestamp, write_quotes_csv};
    use crate::model::quote::Quote;
    use chrono::NaiveDate;

    #[test]
    fn quotes_fields_only_when_needed() {
        let mut quote = Quote::new("Anon", "say \"hi\"");
        quote.id = uuid::Uuid::nil();
        quote.subjects = vec!["plain".to_string()];
        quote.contributed_by = Some("two\nlines".to_string());
        quote.video_link = Some("a, b".to_string());

        let mut out = Vec::new();
        write_quotes_csv(&mut out, &[quote]).expect("export should succeed");
        let text = String::from_utf8(out).expect("utf8");
        let row = text.split_once('\n').map(|(_, rest)| rest).expect("data row");

        assert_eq!(
            row,
            "00000000-0000-0000-0000-000000000000,Anon,\"say \"\"hi\"\"\",plain,,\"a, b\",\"two\nlines\",,\n"
        );
    }

    #[test]
    fn timestamps_render_as_utc_rfc3339() {
        assert_eq!(format_timestamp(0), "");
        assert_eq!(format_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        assert_eq!(export_file_name(date), "quotes_export_2024-05-01.csv");
    }

    #[test]
    fn writes_header_and_rows() {
        let mut quote = Quote::new("Seneca", "Luck is what happens, when preparation meets opportunity.");
        quote.subjects = vec!["luck".to_string(), "preparation".to_string()];
        quote.created_at = 1_700_000_000_123;

        let mut out = Vec::new();
        write_quotes_csv(&mut out, &[quote.clone()]).expect("export should succeed");
        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("ID,Author,Quote Text,Subjects,Author Link,Video Link,Contributed By,Created At,Updated At")
        );
        assert_eq!(
            lines.next(),
            Some(
                format!(
                    "{},Seneca,\"Luck is what happens, when preparation meets opportunity.\",luck; preparation,,,,2023-11-14T22:13:20.123Z,",
                    quote.id
                )
                .as_str()
            )
        );
        assert_eq!(lines.next(), None);
    }
}
