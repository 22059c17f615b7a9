//! The load-once, read-only incident dataset.
//!
//! A [`Dataset`] is built a single time at startup and handed explicitly to
//! every view computation. Records sit behind an `Arc`, so clones are cheap
//! and any number of readers can share one load without locking.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use kika_core::error::Result;
use kika_core::models::{IncidentRecord, ParsePolicy};
use kika_core::time_utils::year_span;
use tracing::debug;

use crate::reader::{load_incidents, read_incidents_from_str, LoadOutcome, LoadReport};

/// Country pre-selected by the country dropdown when present in the data.
pub const DEFAULT_COUNTRY: &str = "Afghanistan";

/// Immutable handle over the normalized incident records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[IncidentRecord]>,
    report: LoadReport,
}

impl Dataset {
    /// Wrap already-normalized records (source order is kept).
    pub fn from_records(records: Vec<IncidentRecord>) -> Self {
        Self {
            records: records.into(),
            report: LoadReport::default(),
        }
    }

    /// Load and normalize the CSV at `path`.
    pub fn load(path: &Path, policy: ParsePolicy) -> Result<Self> {
        Ok(Self::from(load_incidents(path, policy)?))
    }

    /// Normalize CSV text held in memory.
    pub fn from_csv_str(data: &str, policy: ParsePolicy) -> Result<Self> {
        Ok(Self::from(read_incidents_from_str(data, policy)?))
    }

    pub fn records(&self) -> &[IncidentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Bookkeeping from the load that produced this dataset.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Distinct non-blank country names, sorted ascending.
    pub fn countries(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.country.as_str())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.records.iter().any(|r| r.country == country)
    }

    /// [`DEFAULT_COUNTRY`] when present, otherwise the first country in
    /// sorted order; `None` for an empty dataset.
    pub fn default_country(&self) -> Option<String> {
        if self.contains_country(DEFAULT_COUNTRY) {
            return Some(DEFAULT_COUNTRY.to_string());
        }
        self.countries().into_iter().next()
    }

    /// Records of `country`, in source order. Unknown countries yield an
    /// empty list.
    pub fn for_country(&self, country: &str) -> Vec<&IncidentRecord> {
        let selected: Vec<&IncidentRecord> =
            self.records.iter().filter(|r| r.country == country).collect();
        if selected.is_empty() {
            debug!("no incidents recorded for country \"{}\"", country);
        }
        selected
    }

    /// Earliest and latest incident year.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        year_span(self.records.iter().map(|r| r.date))
    }
}

impl From<LoadOutcome> for Dataset {
    fn from(outcome: LoadOutcome) -> Self {
        Self {
            records: outcome.records.into(),
            report: outcome.report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kika_core::models::CasualtyCounts;

    fn record(country: &str, year: i32) -> IncidentRecord {
        IncidentRecord::new(
            format!("{}-{}", country, year),
            NaiveDate::from_ymd_opt(year, 6, 1).unwrap(),
            CasualtyCounts::new(1, 0, 0, 0),
        )
        .with_location(country, "", "")
    }

    #[test]
    fn test_countries_distinct_and_sorted() {
        let ds = Dataset::from_records(vec![
            record("Syria", 2021),
            record("Afghanistan", 2020),
            record("Syria", 2022),
            record("Mali", 2023),
        ]);
        assert_eq!(ds.countries(), vec!["Afghanistan", "Mali", "Syria"]);
        assert_eq!(ds.len(), 4);
    }

    #[test]
    fn test_blank_country_is_not_an_option() {
        let ds = Dataset::from_records(vec![record("", 2021), record("Yemen", 2021)]);
        assert_eq!(ds.countries(), vec!["Yemen"]);
        assert_eq!(ds.default_country().as_deref(), Some("Yemen"));
    }

    #[test]
    fn test_default_country_prefers_afghanistan() {
        let ds = Dataset::from_records(vec![record("Syria", 2021), record("Afghanistan", 2021)]);
        assert_eq!(ds.default_country().as_deref(), Some("Afghanistan"));
    }

    #[test]
    fn test_default_country_falls_back_to_first() {
        let ds = Dataset::from_records(vec![record("Yemen", 2021), record("Mali", 2021)]);
        assert_eq!(ds.default_country().as_deref(), Some("Mali"));
        assert_eq!(Dataset::from_records(vec![]).default_country(), None);
    }

    #[test]
    fn test_for_country() {
        let ds = Dataset::from_records(vec![
            record("Syria", 2021),
            record("Mali", 2021),
            record("Syria", 2022),
        ]);
        let ids: Vec<&str> = ds.for_country("Syria").iter().map(|r| r.event_id.as_str()).collect();
        assert_eq!(ids, vec!["Syria-2021", "Syria-2022"]);
        assert!(ds.for_country("Atlantis").is_empty());
        assert!(!ds.contains_country("Atlantis"));
    }

    #[test]
    fn test_year_span() {
        let ds = Dataset::from_records(vec![record("Syria", 2022), record("Mali", 2020)]);
        assert_eq!(ds.year_span(), Some((2020, 2022)));
        assert!(Dataset::from_records(vec![]).year_span().is_none());
    }

    #[test]
    fn test_clone_shares_records() {
        let ds = Dataset::from_records(vec![record("Syria", 2022)]);
        let copy = ds.clone();
        assert!(std::ptr::eq(ds.records().as_ptr(), copy.records().as_ptr()));
    }

    #[test]
    fn test_from_csv_str_keeps_report() {
        let text = "Date,Aid Workers Killed,Aid Workers Injured,Aid Workers Kidnapped,\
Aid Workers Arrested,Country,Country ISO,Admin 1,Latitude,Longitude,Actor Name,SiND Event ID\n\
#date\n\
01/01/2021,0,1,0,0,Chad,TCD,Lac,13.0,14.0,Boko Haram,SiND-1\n";
        let ds = Dataset::from_csv_str(text, ParsePolicy::Abort).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.report().artifact_rows_dropped, 1);
        assert_eq!(ds.records()[0].country, "Chad");
    }

    #[test]
    fn test_dataset_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Dataset>();
    }
}
