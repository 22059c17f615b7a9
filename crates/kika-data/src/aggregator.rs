//! Multi-key aggregation of incident records.
//!
//! Records are grouped by an ordered list of [`GroupBy`] attributes and the
//! requested [`Measure`]s are summed per group. Only keys observed in the
//! input produce buckets, and buckets come back sorted by key so the result
//! does not depend on input order. A record whose text key (country, ISO
//! code, province or actor) is blank belongs to no group and is left out.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use kika_core::error::{KikaError, Result};
use kika_core::models::{IncidentRecord, IncidentType};
use kika_core::time_utils::month_start;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ── Keys and measures ─────────────────────────────────────────────────────────

/// Record attribute usable as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Country,
    CountryCode,
    Admin1,
    Actor,
    IncidentType,
    /// Incident date truncated to the first day of its month.
    Month,
    Date,
}

impl GroupBy {
    /// `None` when the attribute is a blank text field.
    fn key_of(self, record: &IncidentRecord) -> Option<KeyPart> {
        let text = match self {
            GroupBy::Country => &record.country,
            GroupBy::CountryCode => &record.country_code,
            GroupBy::Admin1 => &record.admin1,
            GroupBy::Actor => &record.actor_name,
            GroupBy::IncidentType => return Some(KeyPart::IncidentType(record.incident_type())),
            GroupBy::Month => return Some(KeyPart::Date(month_start(record.date))),
            GroupBy::Date => return Some(KeyPart::Date(record.date)),
        };
        if text.is_empty() {
            None
        } else {
            Some(KeyPart::Text(text.clone()))
        }
    }
}

/// One component of a bucket key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyPart {
    Text(String),
    Date(NaiveDate),
    IncidentType(IncidentType),
}

impl KeyPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyPart::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            KeyPart::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_incident_type(&self) -> Option<IncidentType> {
        match self {
            KeyPart::IncidentType(t) => Some(*t),
            _ => None,
        }
    }
}

/// Integer column summed per bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    TotalAffected,
    Killed,
    Injured,
    Kidnapped,
    Arrested,
}

impl Measure {
    fn value_of(self, record: &IncidentRecord) -> u64 {
        let counts = record.counts();
        u64::from(match self {
            Measure::TotalAffected => record.total_affected(),
            Measure::Killed => counts.killed,
            Measure::Injured => counts.injured,
            Measure::Kidnapped => counts.kidnapped,
            Measure::Arrested => counts.arrested,
        })
    }
}

// ── Grouping ──────────────────────────────────────────────────────────────────

/// A validated aggregation request: at least one key, any number of measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    keys: Vec<GroupBy>,
    measures: Vec<Measure>,
}

impl Grouping {
    /// Returns [`KikaError::InvalidGrouping`] when `keys` is empty.
    pub fn new(keys: Vec<GroupBy>, measures: Vec<Measure>) -> Result<Self> {
        if keys.is_empty() {
            return Err(KikaError::InvalidGrouping(
                "at least one grouping attribute is required".to_string(),
            ));
        }
        Ok(Self { keys, measures })
    }

    fn fixed(keys: &[GroupBy], measures: &[Measure]) -> Self {
        debug_assert!(!keys.is_empty());
        Self {
            keys: keys.to_vec(),
            measures: measures.to_vec(),
        }
    }

    pub fn keys(&self) -> &[GroupBy] {
        &self.keys
    }

    pub fn measures(&self) -> &[Measure] {
        &self.measures
    }
}

// ── Bucket ────────────────────────────────────────────────────────────────────

/// Aggregated values for one distinct key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// One part per [`GroupBy`] of the grouping, in the same order.
    pub key: Vec<KeyPart>,
    /// One sum per [`Measure`] of the grouping, in the same order.
    pub sums: Vec<u64>,
    /// Number of member records.
    pub count: u64,
}

impl Bucket {
    fn new(key: Vec<KeyPart>, measures: usize) -> Self {
        Self {
            key,
            sums: vec![0; measures],
            count: 0,
        }
    }

    fn add_record(&mut self, record: &IncidentRecord, measures: &[Measure]) {
        for (sum, measure) in self.sums.iter_mut().zip(measures) {
            *sum += measure.value_of(record);
        }
        self.count += 1;
    }

    /// First measure's sum, or 0 for count-only groupings.
    pub fn total(&self) -> u64 {
        self.sums.first().copied().unwrap_or(0)
    }
}

/// Column totals across a set of buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedTotals {
    pub sums: Vec<u64>,
    pub count: u64,
}

// ── IncidentAggregator ────────────────────────────────────────────────────────

/// Stateless helper that groups incident records.
pub struct IncidentAggregator;

impl IncidentAggregator {
    /// Group `records` according to `grouping`.
    ///
    /// Returns buckets sorted by key (ascending); empty input yields no
    /// buckets. Records with a blank text key are not counted anywhere.
    pub fn aggregate<'a, I>(records: I, grouping: &Grouping) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a IncidentRecord>,
    {
        let mut map: BTreeMap<Vec<KeyPart>, Bucket> = BTreeMap::new();
        let mut expected = vec![0u64; grouping.measures.len()];
        let mut ungrouped = 0usize;

        for record in records {
            let Some(key) = grouping
                .keys
                .iter()
                .map(|k| k.key_of(record))
                .collect::<Option<Vec<KeyPart>>>()
            else {
                ungrouped += 1;
                continue;
            };
            map.entry(key.clone())
                .or_insert_with(|| Bucket::new(key, grouping.measures.len()))
                .add_record(record, &grouping.measures);
            for (sum, measure) in expected.iter_mut().zip(&grouping.measures) {
                *sum += measure.value_of(record);
            }
        }

        let buckets: Vec<Bucket> = map.into_values().collect();

        if ungrouped > 0 {
            debug!(
                "{} records left out of {:?} grouping: blank key",
                ungrouped, grouping.keys
            );
        }
        debug_assert!(
            buckets.is_empty() || Self::calculate_totals(&buckets).sums == expected,
            "bucket sums diverged from record sums"
        );

        buckets
    }

    /// `(country, incident_type)` summing total affected.
    pub fn by_country_and_type<'a, I>(records: I) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a IncidentRecord>,
    {
        Self::aggregate(
            records,
            &Grouping::fixed(
                &[GroupBy::Country, GroupBy::IncidentType],
                &[Measure::TotalAffected],
            ),
        )
    }

    /// `(country_code, country)` summing total affected.
    pub fn by_country_code<'a, I>(records: I) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a IncidentRecord>,
    {
        Self::aggregate(
            records,
            &Grouping::fixed(
                &[GroupBy::CountryCode, GroupBy::Country],
                &[Measure::TotalAffected],
            ),
        )
    }

    /// `(month, incident_type)` summing total affected.
    pub fn by_month_and_type<'a, I>(records: I) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a IncidentRecord>,
    {
        Self::aggregate(
            records,
            &Grouping::fixed(
                &[GroupBy::Month, GroupBy::IncidentType],
                &[Measure::TotalAffected],
            ),
        )
    }

    /// `(admin1, incident_type)` summing total affected.
    pub fn by_province_and_type<'a, I>(records: I) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a IncidentRecord>,
    {
        Self::aggregate(
            records,
            &Grouping::fixed(
                &[GroupBy::Admin1, GroupBy::IncidentType],
                &[Measure::TotalAffected],
            ),
        )
    }

    /// Number of incidents per actor.
    pub fn count_by_actor<'a, I>(records: I) -> Vec<Bucket>
    where
        I: IntoIterator<Item = &'a IncidentRecord>,
    {
        Self::aggregate(records, &Grouping::fixed(&[GroupBy::Actor], &[]))
    }

    /// Sum every measure column and the member counts across `buckets`.
    pub fn calculate_totals(buckets: &[Bucket]) -> AggregatedTotals {
        let mut totals = AggregatedTotals {
            sums: vec![0; buckets.first().map(|b| b.sums.len()).unwrap_or(0)],
            count: 0,
        };
        for bucket in buckets {
            for (total, sum) in totals.sums.iter_mut().zip(&bucket.sums) {
                *total += sum;
            }
            totals.count += bucket.count;
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use kika_core::models::CasualtyCounts;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_record(
        country: &str,
        code: &str,
        on: NaiveDate,
        counts: (u32, u32, u32, u32),
    ) -> IncidentRecord {
        IncidentRecord::new(
            format!("{}-{}", code, on),
            on,
            CasualtyCounts::new(counts.0, counts.1, counts.2, counts.3),
        )
        .with_location(country, code, format!("{} province", country))
    }

    fn text(s: &str) -> KeyPart {
        KeyPart::Text(s.to_string())
    }

    // ── by_country_and_type ───────────────────────────────────────────────────

    #[test]
    fn test_country_and_type_scenario() {
        let records = vec![
            make_record("Afghanistan", "AFG", date(2021, 1, 1), (1, 0, 0, 0)),
            make_record("Afghanistan", "AFG", date(2021, 2, 1), (0, 0, 0, 1)),
            make_record("Syria", "SYR", date(2021, 3, 1), (0, 2, 0, 0)),
        ];
        let buckets = IncidentAggregator::by_country_and_type(&records);

        let flat: Vec<(Vec<KeyPart>, u64)> =
            buckets.iter().map(|b| (b.key.clone(), b.total())).collect();
        assert_eq!(
            flat,
            vec![
                (
                    vec![text("Afghanistan"), KeyPart::IncidentType(IncidentType::Arrests)],
                    1
                ),
                (
                    vec![text("Afghanistan"), KeyPart::IncidentType(IncidentType::Killings)],
                    1
                ),
                (
                    vec![text("Syria"), KeyPart::IncidentType(IncidentType::Injuries)],
                    2
                ),
            ]
        );
    }

    #[test]
    fn test_same_key_sums() {
        let records = vec![
            make_record("Mali", "MLI", date(2022, 1, 1), (2, 1, 0, 0)),
            make_record("Mali", "MLI", date(2022, 5, 1), (4, 0, 0, 0)),
        ];
        let buckets = IncidentAggregator::by_country_and_type(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total(), 7);
        assert_eq!(buckets[0].count, 2);
    }

    // ── by_month_and_type ─────────────────────────────────────────────────────

    #[test]
    fn test_month_bucketing() {
        let records = vec![
            make_record("Sudan", "SDN", date(2023, 4, 15), (1, 0, 0, 0)),
            make_record("Sudan", "SDN", date(2023, 4, 30), (3, 0, 0, 0)),
            make_record("Sudan", "SDN", date(2023, 5, 2), (1, 0, 0, 0)),
        ];
        let buckets = IncidentAggregator::by_month_and_type(&records);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key[0], KeyPart::Date(date(2023, 4, 1)));
        assert_eq!(buckets[0].total(), 4);
        assert_eq!(buckets[1].key[0], KeyPart::Date(date(2023, 5, 1)));
        assert_eq!(buckets[1].total(), 1);
    }

    // ── by_country_code ───────────────────────────────────────────────────────

    #[test]
    fn test_country_code_grouping() {
        let records = vec![
            make_record("South Sudan", "SSD", date(2021, 1, 1), (0, 0, 5, 0)),
            make_record("Somalia", "SOM", date(2021, 1, 1), (1, 1, 0, 0)),
            make_record("South Sudan", "SSD", date(2021, 2, 1), (1, 0, 0, 0)),
        ];
        let buckets = IncidentAggregator::by_country_code(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, vec![text("SOM"), text("Somalia")]);
        assert_eq!(buckets[0].total(), 2);
        assert_eq!(buckets[1].key, vec![text("SSD"), text("South Sudan")]);
        assert_eq!(buckets[1].total(), 6);
    }

    // ── count_by_actor ────────────────────────────────────────────────────────

    #[test]
    fn test_count_by_actor() {
        let records = vec![
            make_record("Mali", "MLI", date(2022, 1, 1), (0, 0, 0, 0)).with_actor("JNIM"),
            make_record("Mali", "MLI", date(2022, 1, 2), (2, 0, 0, 0)).with_actor("Unknown"),
            make_record("Mali", "MLI", date(2022, 1, 3), (0, 1, 0, 0)).with_actor("JNIM"),
        ];
        let buckets = IncidentAggregator::count_by_actor(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].key, vec![text("JNIM")]);
        assert_eq!(buckets[0].count, 2);
        assert!(buckets[0].sums.is_empty());
        assert_eq!(buckets[0].total(), 0);
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn test_blank_actor_forms_no_group() {
        let records = vec![
            make_record("Mali", "MLI", date(2022, 1, 1), (1, 0, 0, 0)).with_actor("JNIM"),
            make_record("Mali", "MLI", date(2022, 1, 2), (1, 0, 0, 0)),
        ];
        let buckets = IncidentAggregator::count_by_actor(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key, vec![text("JNIM")]);
        assert_eq!(IncidentAggregator::calculate_totals(&buckets).count, 1);
    }

    #[test]
    fn test_blank_province_forms_no_group() {
        let records = vec![
            make_record("Mali", "MLI", date(2022, 1, 1), (2, 0, 0, 0)),
            make_record("Mali", "MLI", date(2022, 1, 2), (0, 3, 0, 0))
                .with_location("Mali", "MLI", ""),
        ];
        let buckets = IncidentAggregator::by_province_and_type(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key[0], text("Mali province"));
        assert_eq!(buckets[0].total(), 2);

        // The same record still counts where its key is present.
        let by_country = IncidentAggregator::by_country_and_type(&records);
        assert_eq!(IncidentAggregator::calculate_totals(&by_country).sums, vec![5]);
    }

    #[test]
    fn test_blank_country_code_forms_no_group() {
        let records = vec![
            make_record("Kosovo", "", date(2022, 1, 1), (1, 0, 0, 0)),
            make_record("Syria", "SYR", date(2022, 1, 1), (1, 0, 0, 0)),
        ];
        let buckets = IncidentAggregator::by_country_code(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].key, vec![text("SYR"), text("Syria")]);
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_input_gives_no_buckets() {
        let buckets = IncidentAggregator::by_country_and_type(std::iter::empty());
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_empty_grouping_rejected() {
        let err = Grouping::new(vec![], vec![Measure::TotalAffected]).unwrap_err();
        assert!(matches!(err, KikaError::InvalidGrouping(_)));
    }

    #[test]
    fn test_multiple_measures() {
        let records = vec![
            make_record("Yemen", "YEM", date(2020, 1, 1), (1, 2, 0, 3)),
            make_record("Yemen", "YEM", date(2020, 2, 1), (0, 1, 0, 1)),
        ];
        let grouping = Grouping::new(
            vec![GroupBy::CountryCode],
            vec![Measure::Killed, Measure::Injured, Measure::Arrested, Measure::TotalAffected],
        )
        .unwrap();
        let buckets = IncidentAggregator::aggregate(&records, &grouping);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].sums, vec![1, 3, 4, 4]);
        assert_eq!(grouping.measures().len(), 4);
    }

    #[test]
    fn test_aggregate_over_borrowed_subset() {
        let records = vec![
            make_record("Niger", "NER", date(2020, 1, 1), (1, 0, 0, 0)),
            make_record("Chad", "TCD", date(2020, 1, 1), (0, 0, 1, 0)),
        ];
        let subset: Vec<&IncidentRecord> = records.iter().filter(|r| r.country == "Chad").collect();
        let buckets = IncidentAggregator::by_country_and_type(subset);
        assert_eq!(buckets.len(), 1);
        assert_eq!(
            buckets[0].key[1].as_incident_type(),
            Some(IncidentType::Kidnappings)
        );
    }

    #[test]
    fn test_key_part_accessors() {
        assert_eq!(text("x").as_text(), Some("x"));
        assert_eq!(text("x").as_date(), None);
        assert_eq!(KeyPart::Date(date(2020, 1, 1)).as_date(), Some(date(2020, 1, 1)));
        assert_eq!(KeyPart::IncidentType(IncidentType::Other).as_text(), None);
    }

    // ── calculate_totals ──────────────────────────────────────────────────────

    #[test]
    fn test_calculate_totals_empty() {
        let totals = IncidentAggregator::calculate_totals(&[]);
        assert!(totals.sums.is_empty());
        assert_eq!(totals.count, 0);
    }

    // ── Properties ────────────────────────────────────────────────────────────

    fn arb_records() -> impl Strategy<Value = Vec<IncidentRecord>> {
        let countries = prop::sample::select(vec![
            ("Afghanistan", "AFG"),
            ("Syria", "SYR"),
            ("Mali", "MLI"),
            ("Yemen", "YEM"),
        ]);
        prop::collection::vec(
            (
                countries,
                1u32..=12,
                (0u32..4, 0u32..4, 0u32..4, 0u32..4),
            ),
            0..60,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|((country, code), month, counts)| {
                    make_record(country, code, date(2022, month, 10), counts)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn test_bucket_sums_equal_input_sum(records in arb_records()) {
            let expected: u64 = records.iter().map(|r| u64::from(r.total_affected())).sum();
            for buckets in [
                IncidentAggregator::by_country_and_type(&records),
                IncidentAggregator::by_country_code(&records),
                IncidentAggregator::by_month_and_type(&records),
                IncidentAggregator::by_province_and_type(&records),
            ] {
                let totals = IncidentAggregator::calculate_totals(&buckets);
                prop_assert_eq!(totals.sums.first().copied().unwrap_or(0), expected);
                prop_assert_eq!(totals.count, records.len() as u64);
            }
        }

        #[test]
        fn test_aggregation_ignores_input_order(records in arb_records()) {
            let forward = IncidentAggregator::by_month_and_type(&records);
            let reversed: Vec<&IncidentRecord> = records.iter().rev().collect();
            let backward = IncidentAggregator::by_month_and_type(reversed);
            prop_assert_eq!(&forward, &backward);
            prop_assert_eq!(forward, IncidentAggregator::by_month_and_type(&records));
        }
    }
}
