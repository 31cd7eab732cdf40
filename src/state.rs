use std::collections::BTreeSet;
use std::path::Path;

use spotfit::data::model::{ObservedDataset, Temperature};
use spotfit::{RunConfig, ScenarioOutcome};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Scenario filter: which temperatures / variability levels are drawn
// ---------------------------------------------------------------------------

/// Selected spot temperatures and variability labels.
/// An empty set hides every scenario of that kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioFilter {
    pub temperatures: BTreeSet<Temperature>,
    pub levels: BTreeSet<String>,
}

impl ScenarioFilter {
    /// Everything present in `outcomes` selected.
    pub fn all(outcomes: &[ScenarioOutcome]) -> Self {
        ScenarioFilter {
            temperatures: outcomes.iter().map(|o| o.scenario.spot_temperature).collect(),
            levels: outcomes
                .iter()
                .map(|o| o.scenario.variability.label.clone())
                .collect(),
        }
    }
}

/// Indices of successful outcomes passing the filter.
pub fn visible_indices(outcomes: &[ScenarioOutcome], filter: &ScenarioFilter) -> Vec<usize> {
    outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| {
            o.result.is_ok()
                && filter.temperatures.contains(&o.scenario.spot_temperature)
                && filter.levels.contains(&o.scenario.variability.label)
        })
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Configuration of the current run (None until one is opened).
    pub config: Option<RunConfig>,

    pub observed: Option<ObservedDataset>,

    pub outcomes: Vec<ScenarioOutcome>,

    pub filter: ScenarioFilter,

    /// Indices into `outcomes` passing the current filter (cached).
    pub visible_indices: Vec<usize>,

    /// Spot temperature → curve colour.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest the results of a run, reset filters and colours.
    pub fn set_run(
        &mut self,
        config: RunConfig,
        observed: ObservedDataset,
        outcomes: Vec<ScenarioOutcome>,
    ) {
        self.filter = ScenarioFilter::all(&outcomes);
        self.visible_indices = visible_indices(&outcomes, &self.filter);
        self.color_map = Some(ColorMap::new(&self.filter.temperatures));

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        self.status_message = (failed > 0).then(|| format!("{failed} scenario(s) failed"));

        self.config = Some(config);
        self.observed = Some(observed);
        self.outcomes = outcomes;
    }

    /// Load a configuration file and run the pipeline on it.
    pub fn open_config(&mut self, path: &Path) {
        let result = RunConfig::load(path).and_then(|config| {
            let (observed, outcomes) = spotfit::pipeline::run(&config)?;
            Ok((config, observed, outcomes))
        });
        match result {
            Ok((config, observed, outcomes)) => {
                log::info!(
                    "Evaluated {} scenarios from {}",
                    outcomes.len(),
                    path.display()
                );
                self.set_run(config, observed, outcomes);
            }
            Err(e) => {
                log::error!("Failed to run {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        self.visible_indices = visible_indices(&self.outcomes, &self.filter);
    }

    pub fn toggle_temperature(&mut self, temperature: Temperature) {
        if !self.filter.temperatures.remove(&temperature) {
            self.filter.temperatures.insert(temperature);
        }
        self.refilter();
    }

    pub fn toggle_level(&mut self, label: &str) {
        if !self.filter.levels.remove(label) {
            self.filter.levels.insert(label.to_string());
        }
        self.refilter();
    }

    /// Number of successful scenarios with a good-fit verdict.
    pub fn good_fits(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.as_ref().is_ok_and(|r| r.fit.good_fit))
            .count()
    }
}
