use chrono::{Datelike, NaiveDate};
use tracing::debug;

/// Source date format: day/month/year, e.g. `"28/02/2021"`.
pub const SOURCE_DATE_FORMAT: &str = "%d/%m/%Y";

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a source `Date` cell (`dd/mm/yyyy`).
///
/// Surrounding whitespace is ignored. Returns `None` for empty strings or any
/// other layout; the caller turns that into a row-level parse error.
///
/// ```
/// use kika_core::time_utils::parse_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(parse_date("03/11/2022"), NaiveDate::from_ymd_opt(2022, 11, 3));
/// assert_eq!(parse_date("2022-11-03"), None);
/// ```
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(trimmed, SOURCE_DATE_FORMAT) {
        Ok(d) => Some(d),
        Err(e) => {
            debug!("could not parse date \"{}\": {}", trimmed, e);
            None
        }
    }
}

// ── Bucketing ─────────────────────────────────────────────────────────────────

/// First day of the month containing `date`.
///
/// Time-series views bucket incidents on this date.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// `"%Y-%m"` label for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Earliest and latest year among `dates`, or `None` when empty.
pub fn year_span<I>(dates: I) -> Option<(i32, i32)>
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates.into_iter().fold(None, |acc, d| {
        let y = d.year();
        match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        }
    })
}
