//! Brazilian date formatting for emails and activity details.

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// `dd/MM/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/MM/yyyy HH:mm` in the server's local time zone.
pub fn format_datetime<Tz: TimeZone>(ts: DateTime<Tz>) -> String {
    ts.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}
