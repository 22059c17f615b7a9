//! Category checklist filtering.
//!
//! A [`FilterPredicate`] excludes records: every category that is switched
//! off must have a zero count on the record. It does not look at the derived
//! incident type, so an injured-and-arrested incident disappears as soon as
//! "Arrested" is switched off.

use kika_core::models::{Category, IncidentRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Enabled / disabled state of the four checklist categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub killed: bool,
    pub injured: bool,
    pub kidnapped: bool,
    pub arrested: bool,
}

impl Default for FilterPredicate {
    fn default() -> Self {
        Self::all_enabled()
    }
}

impl FilterPredicate {
    /// Every category enabled; [`FilterPredicate::apply`] is the identity.
    pub fn all_enabled() -> Self {
        Self {
            killed: true,
            injured: true,
            kidnapped: true,
            arrested: true,
        }
    }

    /// Enable exactly the given categories.
    pub fn from_categories<I>(categories: I) -> Self
    where
        I: IntoIterator<Item = Category>,
    {
        let mut predicate = Self {
            killed: false,
            injured: false,
            kidnapped: false,
            arrested: false,
        };
        for category in categories {
            predicate.set(category, true);
        }
        predicate
    }

    /// Build from checklist labels such as `["Killed", "Arrested"]`.
    ///
    /// Unrecognised labels are ignored.
    pub fn from_checklist<S: AsRef<str>>(labels: &[S]) -> Self {
        Self::from_categories(labels.iter().filter_map(|label| {
            match label.as_ref().parse::<Category>() {
                Ok(c) => Some(c),
                Err(e) => {
                    debug!("ignoring checklist entry: {}", e);
                    None
                }
            }
        }))
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Killed => self.killed,
            Category::Injured => self.injured,
            Category::Kidnapped => self.kidnapped,
            Category::Arrested => self.arrested,
        }
    }

    pub fn set(&mut self, category: Category, enabled: bool) {
        match category {
            Category::Killed => self.killed = enabled,
            Category::Injured => self.injured = enabled,
            Category::Kidnapped => self.kidnapped = enabled,
            Category::Arrested => self.arrested = enabled,
        }
    }

    /// Enabled categories in checklist order.
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }

    pub fn is_identity(&self) -> bool {
        Category::ALL.iter().all(|c| self.is_enabled(*c))
    }

    /// `true` when every disabled category has a zero count on `record`.
    pub fn matches(&self, record: &IncidentRecord) -> bool {
        let counts = record.counts();
        Category::ALL
            .iter()
            .all(|c| self.is_enabled(*c) || counts.get(*c) == 0)
    }

    /// Records passing the predicate, in input order.
    pub fn apply<'a>(&self, records: &'a [IncidentRecord]) -> Vec<&'a IncidentRecord> {
        if self.is_identity() {
            return records.iter().collect();
        }
        let kept: Vec<&IncidentRecord> = records.iter().filter(|r| self.matches(r)).collect();
        debug!(
            "filter {:?} kept {} of {} records",
            self.enabled_categories(),
            kept.len(),
            records.len()
        );
        kept
    }
}
