mod bootstrap;

use anyhow::{Context, Result};
use kika_core::settings::Settings;
use kika_data::dataset::Dataset;
use kika_data::filter::FilterPredicate;
use kika_views::views::{self, ViewRequest};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("KIKA dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let policy = settings.parse_policy()?;
    let predicate = FilterPredicate::from_categories(settings.selected_categories()?);
    tracing::info!(
        "View: {}, categories: {:?}, on parse error: {:?}",
        settings.view,
        predicate.enabled_categories(),
        policy
    );

    let data_path = match settings.data.clone() {
        Some(path) => path,
        None => bootstrap::discover_data_path().context(
            "no incident CSV found; pass --data or set KIKA_DATA \
             (looked for ./data/kika-incidents.csv and ~/.kika-dashboard/kika-incidents.csv)",
        )?,
    };

    let dataset = Dataset::load(&data_path, policy)
        .with_context(|| format!("failed to load {}", data_path.display()))?;
    let report = dataset.report();
    tracing::info!(
        "Loaded {} incidents ({} skipped, {} zero-filled) in {:.3}s",
        dataset.len(),
        report.rows_skipped,
        report.counts_zero_filled,
        report.load_time_seconds
    );

    let country = settings.country.clone().or_else(|| dataset.default_country());

    let output = match settings.view.as_str() {
        "all" => serde_json::to_value(views::snapshot(
            &dataset,
            &predicate,
            settings.country.as_deref(),
        ))?,
        view => {
            let request = match view {
                "map" => ViewRequest::IncidentMap { predicate },
                "timeseries" => ViewRequest::GlobalTimeSeries { predicate },
                "overview" => ViewRequest::CountryOverview,
                "heatmap" => ViewRequest::CountryHeatMap,
                "countries" => ViewRequest::CountryOptions,
                "country" => ViewRequest::CountryDetail {
                    country: country.context("dataset has no countries; pass --country")?,
                },
                unknown => anyhow::bail!("Unknown view: {}", unknown),
            };
            serde_json::to_value(views::respond(&dataset, &request))?
        }
    };

    let rendered = if settings.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
