use clap::Parser;
use std::path::PathBuf;

use crate::error::{KikaError, Result};
use crate::models::{Category, ParsePolicy};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Aggregate views over the aid-worker KIKA incident dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "kika-dashboard",
    about = "Aggregate views over the aid-worker KIKA incident dataset",
    version
)]
pub struct Settings {
    /// Path to the incident CSV (discovered automatically if not specified)
    #[arg(long, env = "KIKA_DATA")]
    pub data: Option<PathBuf>,

    /// View to compute
    #[arg(
        long,
        default_value = "all",
        value_parser = ["map", "timeseries", "overview", "heatmap", "country", "countries", "all"]
    )]
    pub view: String,

    /// Country for the country-level views (dataset default if not specified)
    #[arg(long)]
    pub country: Option<String>,

    /// Comma-separated checklist of enabled categories for the map and time series
    #[arg(long, default_value = "Killed,Injured,Kidnapped,Arrested")]
    pub categories: String,

    /// What to do with rows that fail to parse
    #[arg(long, default_value = "abort", value_parser = ["abort", "skip", "zero-fill"])]
    pub on_parse_error: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os().collect())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args(args: Vec<std::ffi::OsString>) -> Self {
        let mut settings = Settings::parse_from(args);
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Categories enabled by `--categories`.
    ///
    /// Empty items are ignored, so `""` enables nothing. Unknown labels are a
    /// configuration error.
    pub fn selected_categories(&self) -> Result<Vec<Category>> {
        let mut selected = Vec::new();
        for item in self.categories.split(',').map(str::trim) {
            if item.is_empty() {
                continue;
            }
            let category = item.parse::<Category>().map_err(KikaError::Config)?;
            if !selected.contains(&category) {
                selected.push(category);
            }
        }
        Ok(selected)
    }

    /// Row-error policy selected by `--on-parse-error`.
    pub fn parse_policy(&self) -> Result<ParsePolicy> {
        self.on_parse_error
            .parse::<ParsePolicy>()
            .map_err(KikaError::Config)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["kika-dashboard"]);

        assert!(settings.data.is_none() || std::env::var_os("KIKA_DATA").is_some());
        assert_eq!(settings.view, "all");
        assert!(settings.country.is_none());
        assert_eq!(settings.categories, "Killed,Injured,Kidnapped,Arrested");
        assert_eq!(settings.on_parse_error, "abort");
        assert!(!settings.pretty);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_cli_explicit_view_and_country() {
        let settings =
            Settings::parse_from(["kika-dashboard", "--view", "country", "--country", "Syria"]);
        assert_eq!(settings.view, "country");
        assert_eq!(settings.country.as_deref(), Some("Syria"));
    }

    #[test]
    fn test_settings_cli_rejects_unknown_view() {
        let result = Settings::try_parse_from(["kika-dashboard", "--view", "pie"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_cli_data_path() {
        let settings = Settings::parse_from(["kika-dashboard", "--data", "/tmp/kika.csv"]);
        assert_eq!(settings.data, Some(PathBuf::from("/tmp/kika.csv")));
    }

    #[test]
    fn test_load_debug_overrides_log_level() {
        let settings = Settings::load_from_args(vec!["kika-dashboard".into(), "--debug".into()]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_selected_categories_default_is_all() {
        let settings = Settings::parse_from(["kika-dashboard"]);
        assert_eq!(settings.selected_categories().unwrap(), Category::ALL.to_vec());
    }

    #[test]
    fn test_selected_categories_subset_and_duplicates() {
        let settings =
            Settings::parse_from(["kika-dashboard", "--categories", "injured, Arrested,Injured"]);
        assert_eq!(
            settings.selected_categories().unwrap(),
            vec![Category::Injured, Category::Arrested]
        );
    }

    #[test]
    fn test_selected_categories_empty() {
        let settings = Settings::parse_from(["kika-dashboard", "--categories", ""]);
        assert!(settings.selected_categories().unwrap().is_empty());
    }

    #[test]
    fn test_selected_categories_unknown_label() {
        let settings = Settings::parse_from(["kika-dashboard", "--categories", "Killed,Wounded"]);
        let err = settings.selected_categories().unwrap_err();
        assert!(matches!(err, KikaError::Config(_)));
    }

    #[test]
    fn test_parse_policy() {
        let settings = Settings::parse_from(["kika-dashboard", "--on-parse-error", "zero-fill"]);
        assert_eq!(settings.parse_policy().unwrap(), ParsePolicy::ZeroFill);
    }
}
