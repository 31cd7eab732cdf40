use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::RunConfig;
use crate::correction::locate::ReferenceWindow;
use crate::correction::{coarsen, contamination, fit, offset, resample};
use crate::data::loader;
use crate::data::model::{
    ObservedDataset, ReferenceSpectra, Spectrum, Temperature, VariabilityLevel, WavelengthGrid,
};

// ---------------------------------------------------------------------------
// Scenario results
// ---------------------------------------------------------------------------

/// One (spot temperature, variability level) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotScenario {
    pub spot_temperature: Temperature,
    pub variability: VariabilityLevel,
}

/// Goodness of fit for one scenario, ready for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub spot_temperature: Temperature,
    pub variability: String,
    pub delta_f: f64,
    pub chi2v: f64,
    pub dof: usize,
    pub lower: f64,
    pub upper: f64,
    pub good_fit: bool,
}

/// Everything computed for a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub fit: FitResult,
    /// Aligned model on the coarse grid, wavelengths in data units.
    pub aligned: Spectrum,
    /// Aligned model resampled onto the observed wavelengths.
    pub on_data_grid: Vec<f64>,
    /// Shift applied at λ0.
    pub offset: f64,
}

#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario: SpotScenario,
    pub result: Result<ScenarioResult>,
}

// ---------------------------------------------------------------------------
// Pipeline parameters
// ---------------------------------------------------------------------------

/// The numeric knobs of a run, separated from file locations.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineParams {
    pub reference: ReferenceWindow,
    pub coarse_reference: ReferenceWindow,
    pub mean_depth: f64,
    pub alignment_depth: f64,
    pub free_parameters: usize,
    pub coarsen_levels: usize,
    pub model_to_data_wavelength: f64,
}

impl From<&RunConfig> for PipelineParams {
    fn from(config: &RunConfig) -> Self {
        PipelineParams {
            reference: config.reference,
            coarse_reference: config.coarse_window(),
            mean_depth: config.mean_depth,
            alignment_depth: config.alignment_target(),
            free_parameters: config.free_parameters,
            coarsen_levels: config.coarsen_levels,
            model_to_data_wavelength: config.model_to_data_wavelength,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

/// Load every input named by `config`.
pub fn load_inputs(config: &RunConfig) -> Result<(ReferenceSpectra, ObservedDataset)> {
    let wcol = &config.wavelength_column;
    let fcol = &config.flux_column;

    let photosphere = loader::load_reference_spectrum(&config.photosphere.path, wcol, fcol)
        .with_context(|| format!("photosphere {} K", config.photosphere.temperature))?;

    let mut spots = BTreeMap::new();
    for source in &config.spots {
        let spot = loader::load_reference_spectrum(&source.path, wcol, fcol)
            .with_context(|| format!("spot {} K", source.temperature))?;
        spots.insert(source.temperature, spot);
    }

    let observed = loader::load_observed(&config.observed, config.depth_scale)?;

    Ok((
        ReferenceSpectra {
            photosphere_temperature: config.photosphere.temperature,
            photosphere,
            spots,
        },
        observed,
    ))
}

/// Load inputs and evaluate every scenario of `config`.
pub fn run(config: &RunConfig) -> Result<(ObservedDataset, Vec<ScenarioOutcome>)> {
    config.validate()?;
    let (references, observed) = load_inputs(config)?;
    let params = PipelineParams::from(config);
    let outcomes = evaluate_all(&references, &observed, &params, &config.variability)?;
    Ok((observed, outcomes))
}

/// Evaluate every spot temperature × variability level.
///
/// Errors in shared set-up (λ0 not found on the reference grid, grid too
/// small to coarsen) abort the run; errors inside a scenario are recorded in
/// its outcome and the remaining scenarios still run.
pub fn evaluate_all(
    references: &ReferenceSpectra,
    observed: &ObservedDataset,
    params: &PipelineParams,
    levels: &[VariabilityLevel],
) -> Result<Vec<ScenarioOutcome>> {
    let grid = references.photosphere.grid();
    let ref_index = params
        .reference
        .locate(grid)
        .context("locating λ0 on the reference grid")?;
    let coarse = coarsen::coarsen(grid, params.coarsen_levels).context("coarsening model grid")?;
    let coarse_ref_index = params
        .coarse_reference
        .locate(&coarse)
        .context("locating λ0 on the coarsened grid")?;
    let coarse_in_data_units = coarse.scaled(params.model_to_data_wavelength)?;

    log::info!(
        "λ0 = {} at index {ref_index}; coarse grid {} points, λ0 index {coarse_ref_index}",
        grid.values()[ref_index],
        coarse.len()
    );

    let grids = ScenarioGrids {
        ref_index,
        coarse: &coarse,
        coarse_ref_index,
        coarse_in_data_units: &coarse_in_data_units,
    };

    let mut outcomes = Vec::new();
    for (&spot_temperature, spot) in &references.spots {
        for level in levels {
            let scenario = SpotScenario {
                spot_temperature,
                variability: level.clone(),
            };
            let result = evaluate(&references.photosphere, spot, observed, params, &grids, &scenario)
                .with_context(|| format!("spot {spot_temperature} K, variability {level}"));
            match &result {
                Ok(r) => log::info!(
                    "spot {spot_temperature} K, {level}: chi2v = {:.3} ({})",
                    r.fit.chi2v,
                    if r.fit.good_fit { "good fit" } else { "rejected" }
                ),
                Err(e) => log::error!("{e:#}"),
            }
            outcomes.push(ScenarioOutcome { scenario, result });
        }
    }
    Ok(outcomes)
}

/// Grids shared by every scenario of a run.
struct ScenarioGrids<'a> {
    ref_index: usize,
    coarse: &'a WavelengthGrid,
    coarse_ref_index: usize,
    coarse_in_data_units: &'a WavelengthGrid,
}

fn evaluate(
    photosphere: &Spectrum,
    spot: &Spectrum,
    observed: &ObservedDataset,
    params: &PipelineParams,
    grids: &ScenarioGrids<'_>,
    scenario: &SpotScenario,
) -> Result<ScenarioResult> {
    let level = &scenario.variability;
    let fraction = contamination::compute(photosphere, spot, level.delta_f, grids.ref_index)
        .context("computing correction")?;
    let depth = contamination::to_absolute_depth(&fraction, params.mean_depth);

    let binned = resample::resample(grids.coarse, depth.grid(), depth.flux())
        .context("resampling to the coarse grid")?;
    let binned = Spectrum::new(grids.coarse_in_data_units.clone(), binned)?;

    let shift = offset::offset(&binned, grids.coarse_ref_index, params.alignment_depth)?;
    let aligned = offset::apply_offset(&binned, shift);

    let on_data_grid = resample::resample(observed.grid(), aligned.grid(), aligned.flux())
        .context("resampling to the observed grid")?;

    let stat = fit::chi2v(observed.depth(), &on_data_grid, observed.err(), params.free_parameters)?;

    Ok(ScenarioResult {
        fit: FitResult {
            spot_temperature: scenario.spot_temperature,
            variability: level.label.clone(),
            delta_f: level.delta_f,
            chi2v: stat.chi2v,
            dof: stat.dof,
            lower: stat.lower,
            upper: stat.upper,
            good_fit: stat.good_fit,
        },
        aligned,
        on_data_grid,
        offset: shift,
    })
}
