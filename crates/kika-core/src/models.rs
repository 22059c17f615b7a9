use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classifier;

/// One of the four harm categories recorded per incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Killed,
    Injured,
    Kidnapped,
    Arrested,
}

impl Category {
    /// All categories in checklist order.
    pub const ALL: [Category; 4] = [
        Category::Killed,
        Category::Injured,
        Category::Kidnapped,
        Category::Arrested,
    ];

    /// Checklist label, e.g. `"Kidnapped"`.
    pub fn label(self) -> &'static str {
        match self {
            Category::Killed => "Killed",
            Category::Injured => "Injured",
            Category::Kidnapped => "Kidnapped",
            Category::Arrested => "Arrested",
        }
    }

    /// Name of the source column carrying this category's count.
    pub fn column(self) -> &'static str {
        match self {
            Category::Killed => "Aid Workers Killed",
            Category::Injured => "Aid Workers Injured",
            Category::Kidnapped => "Aid Workers Kidnapped",
            Category::Arrested => "Aid Workers Arrested",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive match against the checklist labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// What the normalizer does with a row whose fields fail to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParsePolicy {
    /// Stop the load at the first malformed row.
    #[default]
    Abort,
    /// Drop malformed rows and keep going.
    Skip,
    /// Treat unparseable counts as 0; rows with other malformed fields are dropped.
    ZeroFill,
}

impl FromStr for ParsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(ParsePolicy::Abort),
            "skip" => Ok(ParsePolicy::Skip),
            "zero-fill" | "zerofill" | "zero_fill" => Ok(ParsePolicy::ZeroFill),
            other => Err(format!("unknown parse policy: {}", other)),
        }
    }
}

/// Raw per-incident counts of affected aid workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CasualtyCounts {
    pub killed: u32,
    pub injured: u32,
    pub kidnapped: u32,
    pub arrested: u32,
}

impl CasualtyCounts {
    pub fn new(killed: u32, injured: u32, kidnapped: u32, arrested: u32) -> Self {
        Self {
            killed,
            injured,
            kidnapped,
            arrested,
        }
    }

    /// Count recorded for `category`.
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Killed => self.killed,
            Category::Injured => self.injured,
            Category::Kidnapped => self.kidnapped,
            Category::Arrested => self.arrested,
        }
    }
}

/// Dominant harm pattern of one incident.
///
/// Variants are declared in classification priority order, so the derived
/// `Ord` sorts by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncidentType {
    #[serde(rename = "Arrests and Killings")]
    ArrestsAndKillings,
    #[serde(rename = "Arrests and Injuries")]
    ArrestsAndInjuries,
    #[serde(rename = "Arrests")]
    Arrests,
    #[serde(rename = "Kidnappings and Killings")]
    KidnappingsAndKillings,
    #[serde(rename = "Kidnappings and Injuries")]
    KidnappingsAndInjuries,
    #[serde(rename = "Kidnappings")]
    Kidnappings,
    #[serde(rename = "Killings")]
    Killings,
    #[serde(rename = "Injuries")]
    Injuries,
    #[serde(rename = "Other")]
    Other,
}

impl IncidentType {
    /// Human-readable label used as the chart legend value.
    pub fn label(self) -> &'static str {
        match self {
            IncidentType::ArrestsAndKillings => "Arrests and Killings",
            IncidentType::ArrestsAndInjuries => "Arrests and Injuries",
            IncidentType::Arrests => "Arrests",
            IncidentType::KidnappingsAndKillings => "Kidnappings and Killings",
            IncidentType::KidnappingsAndInjuries => "Kidnappings and Injuries",
            IncidentType::Kidnappings => "Kidnappings",
            IncidentType::Killings => "Killings",
            IncidentType::Injuries => "Injuries",
            IncidentType::Other => "Other",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single normalized incident from the source dataset.
///
/// The casualty counts and the two fields derived from them are private:
/// [`IncidentRecord::set_counts`] is the only way to change the counts and it
/// recomputes `total_affected` and `incident_type` in the same step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidentRecord {
    /// SiND event identifier.
    pub event_id: String,
    /// Calendar date of the incident.
    pub date: NaiveDate,
    /// Country name as written in the source.
    pub country: String,
    /// ISO 3166-1 alpha-3 country code.
    pub country_code: String,
    /// First-level administrative division (province / state / district).
    pub admin1: String,
    /// `None` when the source cell is blank or not a number.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Name of the perpetrating actor, if attributed.
    pub actor_name: String,
    counts: CasualtyCounts,
    total_affected: u32,
    incident_type: IncidentType,
}

impl IncidentRecord {
    /// Create a record with empty location / actor fields and derived
    /// values computed from `counts`.
    pub fn new(event_id: impl Into<String>, date: NaiveDate, counts: CasualtyCounts) -> Self {
        Self {
            event_id: event_id.into(),
            date,
            country: String::new(),
            country_code: String::new(),
            admin1: String::new(),
            latitude: None,
            longitude: None,
            actor_name: String::new(),
            counts,
            total_affected: classifier::total_affected(&counts),
            incident_type: classifier::classify(&counts),
        }
    }

    pub fn with_location(
        mut self,
        country: impl Into<String>,
        country_code: impl Into<String>,
        admin1: impl Into<String>,
    ) -> Self {
        self.country = country.into();
        self.country_code = country_code.into();
        self.admin1 = admin1.into();
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// `(latitude, longitude)` when both are known.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    pub fn with_actor(mut self, actor_name: impl Into<String>) -> Self {
        self.actor_name = actor_name.into();
        self
    }

    pub fn counts(&self) -> &CasualtyCounts {
        &self.counts
    }

    /// Deduplicated number of aid workers affected.
    pub fn total_affected(&self) -> u32 {
        self.total_affected
    }

    pub fn incident_type(&self) -> IncidentType {
        self.incident_type
    }

    /// Replace the casualty counts, recomputing the derived fields.
    pub fn set_counts(&mut self, counts: CasualtyCounts) {
        self.counts = counts;
        self.total_affected = classifier::total_affected(&counts);
        self.incident_type = classifier::classify(&counts);
    }
}
