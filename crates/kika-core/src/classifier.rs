//! Per-record derivations: incident type and total workers affected.

use crate::models::{CasualtyCounts, IncidentType};

/// One entry of the classification table.
#[derive(Clone, Copy)]
pub struct Rule {
    pub incident_type: IncidentType,
    pub applies: fn(&CasualtyCounts) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("incident_type", &self.incident_type)
            .finish_non_exhaustive()
    }
}

fn arrests_and_killings(c: &CasualtyCounts) -> bool {
    c.arrested > 0 && c.killed > 0
}

fn arrests_and_injuries(c: &CasualtyCounts) -> bool {
    c.arrested > 0 && c.injured > 0
}

fn arrests(c: &CasualtyCounts) -> bool {
    c.arrested > 0
}

fn kidnappings_and_killings(c: &CasualtyCounts) -> bool {
    c.kidnapped > 0 && c.killed > 0
}

fn kidnappings_and_injuries(c: &CasualtyCounts) -> bool {
    c.kidnapped > 0 && c.injured > 0
}

fn kidnappings(c: &CasualtyCounts) -> bool {
    c.kidnapped > 0
}

fn killings(c: &CasualtyCounts) -> bool {
    c.killed > 0
}

fn injuries(c: &CasualtyCounts) -> bool {
    c.injured > 0
}

/// Classification rules in priority order. The first rule whose predicate
/// holds decides the type; a record matching none is [`IncidentType::Other`].
pub const RULES: [Rule; 8] = [
    Rule { incident_type: IncidentType::ArrestsAndKillings, applies: arrests_and_killings },
    Rule { incident_type: IncidentType::ArrestsAndInjuries, applies: arrests_and_injuries },
    Rule { incident_type: IncidentType::Arrests, applies: arrests },
    Rule { incident_type: IncidentType::KidnappingsAndKillings, applies: kidnappings_and_killings },
    Rule { incident_type: IncidentType::KidnappingsAndInjuries, applies: kidnappings_and_injuries },
    Rule { incident_type: IncidentType::Kidnappings, applies: kidnappings },
    Rule { incident_type: IncidentType::Killings, applies: killings },
    Rule { incident_type: IncidentType::Injuries, applies: injuries },
];

/// Classify an incident by its counts; first matching rule wins.
pub fn classify(counts: &CasualtyCounts) -> IncidentType {
    RULES
        .iter()
        .find(|rule| (rule.applies)(counts))
        .map(|rule| rule.incident_type)
        .unwrap_or(IncidentType::Other)
}

/// Deduplicated number of workers affected by one incident.
///
/// The four counts can describe the same people (an arrested worker may also
/// be injured), so this is the largest of `killed + injured`, `kidnapped` and
/// `arrested` rather than their sum.
///
/// ```
/// use kika_core::classifier::total_affected;
/// use kika_core::models::CasualtyCounts;
///
/// assert_eq!(total_affected(&CasualtyCounts::new(2, 3, 1, 0)), 5);
/// assert_eq!(total_affected(&CasualtyCounts::new(0, 1, 0, 4)), 4);
/// ```
pub fn total_affected(counts: &CasualtyCounts) -> u32 {
    counts
        .killed
        .saturating_add(counts.injured)
        .max(counts.kidnapped)
        .max(counts.arrested)
}
