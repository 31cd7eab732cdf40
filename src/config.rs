use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::correction::locate::ReferenceWindow;
use crate::data::model::{Temperature, VariabilityLevel};
use crate::error::ContaminationError;

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// A reference intensity file for one effective temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSource {
    pub temperature: Temperature,
    pub path: PathBuf,
}

/// Everything one run needs: inputs, scenarios and tuning knobs.
///
/// Relative paths are resolved against the directory of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub photosphere: ReferenceSource,
    pub spots: Vec<ReferenceSource>,
    pub variability: Vec<VariabilityLevel>,

    /// Observed transmission spectrum.
    pub observed: PathBuf,

    /// Search window for λ0 on the reference-spectrum grid.
    pub reference: ReferenceWindow,
    /// Search window for λ0 on the coarsened grid. Defaults to `reference`
    /// widened by one unit on each side.
    #[serde(default)]
    pub coarse_reference: Option<ReferenceWindow>,

    /// Mean transit depth `d` (ppm).
    pub mean_depth: f64,
    /// Depth the models are pinned to at λ0. Defaults to `mean_depth`.
    #[serde(default)]
    pub alignment_depth: Option<f64>,

    /// Free model parameters `k` (Teff, log g, [M/H]).
    #[serde(default = "default_free_parameters")]
    pub free_parameters: usize,
    /// Decimation passes before resampling to the coarse grid.
    #[serde(default = "default_coarsen_levels")]
    pub coarsen_levels: usize,
    /// Factor from model wavelength units to data wavelength units (Å → µm).
    #[serde(default = "default_wavelength_factor")]
    pub model_to_data_wavelength: f64,
    /// Multiplier applied to observed depth and err at load (fraction → ppm).
    #[serde(default = "default_depth_scale")]
    pub depth_scale: f64,

    #[serde(default = "default_wavelength_column")]
    pub wavelength_column: String,
    #[serde(default = "default_flux_column")]
    pub flux_column: String,

    /// Horizontal guide line drawn in the comparison plot.
    #[serde(default)]
    pub flat_depth: Option<f64>,
    /// CSV file receiving the aligned model curves.
    #[serde(default)]
    pub export: Option<PathBuf>,
}

fn default_free_parameters() -> usize {
    3
}

fn default_coarsen_levels() -> usize {
    4
}

fn default_wavelength_factor() -> f64 {
    1e-4
}

fn default_depth_scale() -> f64 {
    1e6
}

fn default_wavelength_column() -> String {
    "WAVELENGTH".to_string()
}

fn default_flux_column() -> String {
    "g50".to_string()
}

impl RunConfig {
    /// Read a JSON config and resolve relative paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.photosphere.path);
        for spot in &mut self.spots {
            resolve(&mut spot.path);
        }
        resolve(&mut self.observed);
        if let Some(export) = &mut self.export {
            resolve(export);
        }
    }

    pub fn coarse_window(&self) -> ReferenceWindow {
        self.coarse_reference
            .unwrap_or_else(|| self.reference.widened(1.0))
    }

    pub fn alignment_target(&self) -> f64 {
        self.alignment_depth.unwrap_or(self.mean_depth)
    }

    pub fn validate(&self) -> Result<(), ContaminationError> {
        let invalid = |msg: String| Err(ContaminationError::InvalidConfig(msg));

        self.reference.validate()?;
        self.coarse_window().validate()?;
        if self.spots.is_empty() {
            return invalid("at least one spot temperature is required".into());
        }
        if self.variability.is_empty() {
            return invalid("at least one variability level is required".into());
        }
        for level in &self.variability {
            if !level.delta_f.is_finite() {
                return invalid(format!("variability '{}' has non-finite delta_f", level.label));
            }
        }
        if let Some(spot) = self
            .spots
            .iter()
            .find(|s| s.temperature == self.photosphere.temperature)
        {
            return invalid(format!(
                "spot temperature {} K equals the photosphere temperature",
                spot.temperature
            ));
        }
        let mut temps: Vec<Temperature> = self.spots.iter().map(|s| s.temperature).collect();
        temps.sort_unstable();
        if temps.windows(2).any(|w| w[0] == w[1]) {
            return invalid("spot temperatures must be unique".into());
        }
        if !self.mean_depth.is_finite() {
            return invalid(format!("mean_depth must be finite, got {}", self.mean_depth));
        }
        if !(self.model_to_data_wavelength.is_finite() && self.model_to_data_wavelength > 0.0) {
            return invalid(format!(
                "model_to_data_wavelength must be positive, got {}",
                self.model_to_data_wavelength
            ));
        }
        if !(self.depth_scale.is_finite() && self.depth_scale > 0.0) {
            return invalid(format!("depth_scale must be positive, got {}", self.depth_scale));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "photosphere": { "temperature": 3300, "path": "phoenix/3300.parquet" },
        "spots": [
            { "temperature": 3000, "path": "phoenix/3000.parquet" },
            { "temperature": 2800, "path": "/abs/2800.parquet" }
        ],
        "variability": [
            { "label": "low", "delta_f": 0.03 },
            { "label": "high", "delta_f": 0.1 }
        ],
        "observed": "data/spectrum.txt",
        "reference": { "lo": 7999.9, "hi": 8000.1 },
        "mean_depth": 1914.0
    }"#;

    #[test]
    fn test_defaults_applied() {
        let config: RunConfig = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(config.free_parameters, 3);
        assert_eq!(config.coarsen_levels, 4);
        assert_eq!(config.flux_column, "g50");
        assert_eq!(config.wavelength_column, "WAVELENGTH");
        assert_eq!(config.alignment_target(), 1914.0);
        let coarse = config.coarse_window();
        assert!((coarse.lo - 7998.9).abs() < 1e-9);
        assert!((coarse.hi - 8001.1).abs() < 1e-9);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, MINIMAL).unwrap();

        let config = RunConfig::load(&path).unwrap();
        assert_eq!(config.photosphere.path, dir.path().join("phoenix/3300.parquet"));
        assert_eq!(config.observed, dir.path().join("data/spectrum.txt"));
        assert_eq!(config.spots[1].path, PathBuf::from("/abs/2800.parquet"));
    }

    #[test]
    fn test_validation_failures() {
        let base: RunConfig = serde_json::from_str(MINIMAL).unwrap();

        let mut c = base.clone();
        c.spots.clear();
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.reference = ReferenceWindow { lo: 8001.0, hi: 7999.0 };
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.spots[0].temperature = 3300;
        assert!(c.validate().is_err());

        let mut c = base.clone();
        c.spots[1].temperature = 3000;
        assert!(c.validate().is_err());

        let mut c = base;
        c.model_to_data_wavelength = 0.0;
        assert!(c.validate().is_err());
    }
}
