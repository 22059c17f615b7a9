//! The named dashboard views.
//!
//! Every view is a pure function of an explicitly passed [`Dataset`] and the
//! control inputs (checklist predicate or selected country). Results are
//! plain row sets; building charts from them is the renderer's job.

use chrono::NaiveDate;
use kika_core::models::{Category, IncidentRecord, IncidentType};
use kika_data::aggregator::{Bucket, IncidentAggregator, KeyPart};
use kika_data::dataset::Dataset;
use kika_data::filter::FilterPredicate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::labels::{incident_map_label, ViewKind, ViewLabels};

// ── Row types ─────────────────────────────────────────────────────────────────

/// One incident plotted on the global map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub event_id: String,
    pub date: NaiveDate,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub incident_type: IncidentType,
    pub total_affected: u32,
}

impl MapPoint {
    /// `None` for records without both coordinates.
    pub fn from_record(record: &IncidentRecord) -> Option<Self> {
        let (latitude, longitude) = record.coordinates()?;
        Some(Self {
            event_id: record.event_id.clone(),
            date: record.date,
            country: record.country.clone(),
            latitude,
            longitude,
            incident_type: record.incident_type(),
            total_affected: record.total_affected(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentMapView {
    /// e.g. `"Health Workers Killed, Injured - 2020-2023"`.
    pub label: String,
    pub enabled: Vec<Category>,
    pub points: Vec<MapPoint>,
}

/// Total affected for one month and incident type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeriesRow {
    /// First day of the month.
    pub month: NaiveDate,
    pub incident_type: IncidentType,
    pub total_affected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryOverviewRow {
    pub country: String,
    pub incident_type: IncidentType,
    pub total_affected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatMapRow {
    pub country_code: String,
    pub country: String,
    pub total_affected: u64,
}

/// Number of incidents attributed to one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActorRow {
    pub actor_name: String,
    pub incidents: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceRow {
    pub admin1: String,
    pub incident_type: IncidentType,
    pub total_affected: u64,
}

/// The three country-level tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryDetailView {
    pub country: String,
    pub time_series: Vec<TimeSeriesRow>,
    pub actors: Vec<ActorRow>,
    pub provinces: Vec<ProvinceRow>,
}

impl CountryDetailView {
    pub fn is_empty(&self) -> bool {
        self.time_series.is_empty() && self.actors.is_empty() && self.provinces.is_empty()
    }
}

/// Choices for the country selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryOptions {
    pub countries: Vec<String>,
    pub default: Option<String>,
}

// ── Bucket → row conversion ───────────────────────────────────────────────────

fn time_series_rows(buckets: Vec<Bucket>) -> Vec<TimeSeriesRow> {
    buckets
        .into_iter()
        .map(|b| {
            let total_affected = b.total();
            match <[KeyPart; 2]>::try_from(b.key) {
                Ok([KeyPart::Date(month), KeyPart::IncidentType(incident_type)]) => TimeSeriesRow {
                    month,
                    incident_type,
                    total_affected,
                },
                other => unreachable!("unexpected (month, incident_type) key: {:?}", other),
            }
        })
        .collect()
}

fn text_and_type_rows<R>(buckets: Vec<Bucket>, make: impl Fn(String, IncidentType, u64) -> R) -> Vec<R> {
    buckets
        .into_iter()
        .map(|b| {
            let total = b.total();
            match <[KeyPart; 2]>::try_from(b.key) {
                Ok([KeyPart::Text(text), KeyPart::IncidentType(incident_type)]) => {
                    make(text, incident_type, total)
                }
                other => unreachable!("unexpected (text, incident_type) key: {:?}", other),
            }
        })
        .collect()
}

// ── Views ─────────────────────────────────────────────────────────────────────

/// Figure 1: filtered incidents with coordinates.
///
/// Incidents without a location cannot be plotted and are left out; they
/// still count in every aggregate view.
pub fn incident_map(dataset: &Dataset, predicate: &FilterPredicate) -> IncidentMapView {
    let enabled = predicate.enabled_categories();
    let points: Vec<MapPoint> = predicate
        .apply(dataset.records())
        .into_iter()
        .filter_map(MapPoint::from_record)
        .collect();

    IncidentMapView {
        label: incident_map_label(&enabled, dataset.year_span()),
        enabled,
        points,
    }
}

/// Figure 2: filtered incidents by (month, incident type).
pub fn global_time_series(dataset: &Dataset, predicate: &FilterPredicate) -> Vec<TimeSeriesRow> {
    let filtered = predicate.apply(dataset.records());
    time_series_rows(IncidentAggregator::by_month_and_type(filtered))
}

/// Figure 3: all incidents by (country, incident type).
pub fn country_overview(dataset: &Dataset) -> Vec<CountryOverviewRow> {
    text_and_type_rows(
        IncidentAggregator::by_country_and_type(dataset.records()),
        |country, incident_type, total_affected| CountryOverviewRow {
            country,
            incident_type,
            total_affected,
        },
    )
}

/// Figure 4: all incidents by (country code, country).
pub fn country_heat_map(dataset: &Dataset) -> Vec<HeatMapRow> {
    IncidentAggregator::by_country_code(dataset.records())
        .into_iter()
        .map(|b| {
            let total_affected = b.total();
            match <[KeyPart; 2]>::try_from(b.key) {
                Ok([KeyPart::Text(country_code), KeyPart::Text(country)]) => HeatMapRow {
                    country_code,
                    country,
                    total_affected,
                },
                other => unreachable!("unexpected (country_code, country) key: {:?}", other),
            }
        })
        .collect()
}

/// Figures 5 to 7 for one country.
///
/// A country absent from the dataset gives three empty tables.
pub fn country_detail(dataset: &Dataset, country: &str) -> CountryDetailView {
    let records = dataset.for_country(country);
    if records.is_empty() {
        debug!("country \"{}\" has no incidents; returning empty views", country);
    }

    let time_series = time_series_rows(IncidentAggregator::by_month_and_type(
        records.iter().copied(),
    ));

    let mut actors: Vec<ActorRow> = IncidentAggregator::count_by_actor(records.iter().copied())
        .into_iter()
        .map(|b| match <[KeyPart; 1]>::try_from(b.key) {
            Ok([KeyPart::Text(actor_name)]) => ActorRow {
                actor_name,
                incidents: b.count,
            },
            other => unreachable!("unexpected actor key: {:?}", other),
        })
        .collect();
    actors.sort_by(|a, b| {
        b.incidents
            .cmp(&a.incidents)
            .then_with(|| a.actor_name.cmp(&b.actor_name))
    });

    let provinces = text_and_type_rows(
        IncidentAggregator::by_province_and_type(records.iter().copied()),
        |admin1, incident_type, total_affected| ProvinceRow {
            admin1,
            incident_type,
            total_affected,
        },
    );

    CountryDetailView {
        country: country.to_string(),
        time_series,
        actors,
        provinces,
    }
}

/// Distinct countries for the selector plus its initial value.
pub fn country_options(dataset: &Dataset) -> CountryOptions {
    CountryOptions {
        countries: dataset.countries(),
        default: dataset.default_country(),
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// A single view recomputation triggered by the UI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewRequest {
    IncidentMap { predicate: FilterPredicate },
    GlobalTimeSeries { predicate: FilterPredicate },
    CountryOverview,
    CountryHeatMap,
    CountryDetail { country: String },
    CountryOptions,
}

/// Output of [`compute`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ViewResult {
    IncidentMap(IncidentMapView),
    GlobalTimeSeries(Vec<TimeSeriesRow>),
    CountryOverview(Vec<CountryOverviewRow>),
    CountryHeatMap(Vec<HeatMapRow>),
    CountryDetail(CountryDetailView),
    CountryOptions(CountryOptions),
}

/// A [`ViewResult`] together with the labels of the charts it feeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewResponse {
    pub labels: Vec<ViewLabels>,
    pub result: ViewResult,
}

/// Evaluate `request` against `dataset`.
pub fn compute(dataset: &Dataset, request: &ViewRequest) -> ViewResult {
    match request {
        ViewRequest::IncidentMap { predicate } => {
            ViewResult::IncidentMap(incident_map(dataset, predicate))
        }
        ViewRequest::GlobalTimeSeries { predicate } => {
            ViewResult::GlobalTimeSeries(global_time_series(dataset, predicate))
        }
        ViewRequest::CountryOverview => ViewResult::CountryOverview(country_overview(dataset)),
        ViewRequest::CountryHeatMap => ViewResult::CountryHeatMap(country_heat_map(dataset)),
        ViewRequest::CountryDetail { country } => {
            ViewResult::CountryDetail(country_detail(dataset, country))
        }
        ViewRequest::CountryOptions => ViewResult::CountryOptions(country_options(dataset)),
    }
}

/// Chart kinds fed by `request`.
pub fn kinds_for(request: &ViewRequest) -> Vec<ViewKind> {
    match request {
        ViewRequest::IncidentMap { .. } => vec![ViewKind::IncidentMap],
        ViewRequest::GlobalTimeSeries { .. } => vec![ViewKind::GlobalTimeSeries],
        ViewRequest::CountryOverview => vec![ViewKind::CountryOverview],
        ViewRequest::CountryHeatMap => vec![ViewKind::CountryHeatMap],
        ViewRequest::CountryDetail { .. } => vec![
            ViewKind::CountryTimeSeries,
            ViewKind::ActorBreakdown,
            ViewKind::ProvinceBreakdown,
        ],
        ViewRequest::CountryOptions => Vec::new(),
    }
}

/// [`compute`] plus chart labels.
pub fn respond(dataset: &Dataset, request: &ViewRequest) -> ViewResponse {
    let enabled = match request {
        ViewRequest::IncidentMap { predicate } | ViewRequest::GlobalTimeSeries { predicate } => {
            predicate.enabled_categories()
        }
        _ => Vec::new(),
    };
    let years = dataset.year_span();

    ViewResponse {
        labels: kinds_for(request)
            .into_iter()
            .map(|kind| kind.labels(years, &enabled))
            .collect(),
        result: compute(dataset, request),
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Every view of the dashboard for one set of control inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub labels: Vec<ViewLabels>,
    pub options: CountryOptions,
    pub incident_map: IncidentMapView,
    pub global_time_series: Vec<TimeSeriesRow>,
    pub country_overview: Vec<CountryOverviewRow>,
    pub country_heat_map: Vec<HeatMapRow>,
    /// `None` only when the dataset has no countries and none was given.
    pub country_detail: Option<CountryDetailView>,
}

const ALL_KINDS: [ViewKind; 7] = [
    ViewKind::IncidentMap,
    ViewKind::GlobalTimeSeries,
    ViewKind::CountryOverview,
    ViewKind::CountryHeatMap,
    ViewKind::CountryTimeSeries,
    ViewKind::ActorBreakdown,
    ViewKind::ProvinceBreakdown,
];

/// Compute all views. `country` falls back to the dataset default.
pub fn snapshot(
    dataset: &Dataset,
    predicate: &FilterPredicate,
    country: Option<&str>,
) -> DashboardSnapshot {
    let enabled = predicate.enabled_categories();
    let years = dataset.year_span();
    let options = country_options(dataset);
    let selected = country.map(str::to_string).or_else(|| options.default.clone());

    DashboardSnapshot {
        labels: ALL_KINDS
            .iter()
            .map(|kind| kind.labels(years, &enabled))
            .collect(),
        incident_map: incident_map(dataset, predicate),
        global_time_series: global_time_series(dataset, predicate),
        country_overview: country_overview(dataset),
        country_heat_map: country_heat_map(dataset),
        country_detail: selected.map(|c| country_detail(dataset, &c)),
        options,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
