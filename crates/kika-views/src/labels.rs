//! Declarative chart labels for each view.
//!
//! Plain data handed to the renderer next to the row sets: figure title, axis
//! titles and how the categorical axis should be ordered.

use kika_core::models::Category;
use serde::{Deserialize, Serialize};

/// Identifies one chart on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    IncidentMap,
    GlobalTimeSeries,
    CountryOverview,
    CountryHeatMap,
    CountryTimeSeries,
    ActorBreakdown,
    ProvinceBreakdown,
}

/// Ordering of the categorical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrder {
    /// Alphabetical / chronological.
    CategoryAscending,
    /// Largest bar first.
    TotalDescending,
    /// No categorical axis (maps).
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLabels {
    pub kind: ViewKind,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub order: AxisOrder,
}

const Y_AFFECTED: &str = "Total Health Workers Affected";

/// `"2020-2023"`, or `"2021"` when the span is a single year.
fn year_range(years: Option<(i32, i32)>) -> Option<String> {
    match years? {
        (lo, hi) if lo == hi => Some(lo.to_string()),
        (lo, hi) => Some(format!("{}-{}", lo, hi)),
    }
}

/// Map label naming the enabled checklist categories, e.g.
/// `"Health Workers Killed, Injured - 2020-2023"`.
pub fn incident_map_label(enabled: &[Category], years: Option<(i32, i32)>) -> String {
    let names: Vec<&str> = enabled.iter().map(|c| c.label()).collect();
    let mut label = String::from("Health Workers");
    if !names.is_empty() {
        label.push(' ');
        label.push_str(&names.join(", "));
    }
    if let Some(range) = year_range(years) {
        label.push_str(" - ");
        label.push_str(&range);
    }
    label
}

impl ViewKind {
    /// Labels for this chart.
    ///
    /// `years` is the dataset's year span; `enabled` only matters for the
    /// incident map, whose title lists the active categories.
    pub fn labels(self, years: Option<(i32, i32)>, enabled: &[Category]) -> ViewLabels {
        let (title, x_axis, y_axis, order) = match self {
            ViewKind::IncidentMap => (
                format!("Figure 1: {}", incident_map_label(enabled, years)),
                String::new(),
                String::new(),
                AxisOrder::None,
            ),
            ViewKind::GlobalTimeSeries => (
                "Figure 2: Time Distribution of Global Incidents".to_string(),
                "Month/Year".to_string(),
                Y_AFFECTED.to_string(),
                AxisOrder::CategoryAscending,
            ),
            ViewKind::CountryOverview => (
                "Figure 3: Incident Type Frequency by Country".to_string(),
                "Country".to_string(),
                Y_AFFECTED.to_string(),
                AxisOrder::CategoryAscending,
            ),
            ViewKind::CountryHeatMap => (
                match year_range(years) {
                    Some(range) => {
                        format!("Figure 4: Total Health Workers Attacked Globally, {}", range)
                    }
                    None => "Figure 4: Total Health Workers Attacked Globally".to_string(),
                },
                String::new(),
                String::new(),
                AxisOrder::None,
            ),
            ViewKind::CountryTimeSeries => (
                "Figure 5: Country-Level Time Distribution of Attacks on Health Workers"
                    .to_string(),
                "Month and Year".to_string(),
                Y_AFFECTED.to_string(),
                AxisOrder::CategoryAscending,
            ),
            ViewKind::ActorBreakdown => (
                "Figure 6: Perpetrators of Local Attacks on Health Workers".to_string(),
                "Identified Actors".to_string(),
                "Number of Attributed Incidents".to_string(),
                AxisOrder::TotalDescending,
            ),
            ViewKind::ProvinceBreakdown => (
                "Figure 7: Incident Type Frequency by State/Province/District".to_string(),
                "State/Province/District".to_string(),
                Y_AFFECTED.to_string(),
                AxisOrder::CategoryAscending,
            ),
        };

        ViewLabels {
            kind: self,
            title,
            x_axis,
            y_axis,
            order,
        }
    }
}
