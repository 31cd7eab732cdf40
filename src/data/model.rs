use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ContaminationError, Result};

// ---------------------------------------------------------------------------
// WavelengthGrid – strictly increasing sample positions
// ---------------------------------------------------------------------------

/// An ordered, strictly increasing set of wavelengths.
///
/// Units are whatever the source file uses (Ångström for the reference
/// spectra, micron for the observed data); the pipeline converts explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthGrid(Vec<f64>);

impl WavelengthGrid {
    /// Validate and wrap a sequence of wavelengths.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ContaminationError::InvalidGrid("grid is empty".into()));
        }
        if let Some(i) = values.iter().position(|w| !w.is_finite()) {
            return Err(ContaminationError::InvalidGrid(format!(
                "non-finite wavelength at index {i}"
            )));
        }
        if let Some(i) = values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ContaminationError::InvalidGrid(format!(
                "wavelengths not strictly increasing at index {} ({} then {})",
                i + 1,
                values[i],
                values[i + 1]
            )));
        }
        Ok(WavelengthGrid(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed grid; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.0[0]
    }

    pub fn last(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    /// Multiply every wavelength by `factor` (unit conversion, e.g. Å → µm).
    pub fn scaled(&self, factor: f64) -> Result<Self> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ContaminationError::InvalidGrid(format!(
                "scale factor must be positive and finite, got {factor}"
            )));
        }
        WavelengthGrid::new(self.0.iter().map(|w| w * factor).collect())
    }
}

// ---------------------------------------------------------------------------
// Spectrum – a grid plus one flux value per wavelength
// ---------------------------------------------------------------------------

/// Flux (or any per-wavelength quantity) sampled on a [`WavelengthGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    grid: WavelengthGrid,
    flux: Vec<f64>,
}

impl Spectrum {
    pub fn new(grid: WavelengthGrid, flux: Vec<f64>) -> Result<Self> {
        if flux.len() != grid.len() {
            return Err(ContaminationError::GridMismatch {
                what: "flux",
                expected: grid.len(),
                got: flux.len(),
            });
        }
        Ok(Spectrum { grid, flux })
    }

    /// Convenience constructor from raw columns.
    pub fn from_columns(wavelength: Vec<f64>, flux: Vec<f64>) -> Result<Self> {
        Spectrum::new(WavelengthGrid::new(wavelength)?, flux)
    }

    pub fn grid(&self) -> &WavelengthGrid {
        &self.grid
    }

    pub fn wavelengths(&self) -> &[f64] {
        self.grid.values()
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// New spectrum on the same grid with `f` applied to every flux value.
    pub fn map_flux(&self, f: impl Fn(f64) -> f64) -> Spectrum {
        Spectrum {
            grid: self.grid.clone(),
            flux: self.flux.iter().map(|&v| f(v)).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Reference spectra – photosphere plus candidate spot temperatures
// ---------------------------------------------------------------------------

/// Temperature in Kelvin, used as the key for reference spectra.
pub type Temperature = u32;

/// The loaded reference intensity curves for one run.
#[derive(Debug, Clone)]
pub struct ReferenceSpectra {
    pub photosphere_temperature: Temperature,
    pub photosphere: Spectrum,
    /// Spot temperature → intensity on the photosphere grid.
    pub spots: BTreeMap<Temperature, Spectrum>,
}

// ---------------------------------------------------------------------------
// ObservedDataset – the measured transmission spectrum
// ---------------------------------------------------------------------------

/// Parallel columns of a measured transmission spectrum.
///
/// `depth` and `err` are in ppm once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedDataset {
    wvl: WavelengthGrid,
    wvl_width: Vec<f64>,
    depth: Vec<f64>,
    err: Vec<f64>,
}

impl ObservedDataset {
    pub fn new(wvl: Vec<f64>, wvl_width: Vec<f64>, depth: Vec<f64>, err: Vec<f64>) -> Result<Self> {
        let wvl = WavelengthGrid::new(wvl)?;
        for (what, col) in [("wvl_width", &wvl_width), ("depth", &depth), ("err", &err)] {
            if col.len() != wvl.len() {
                return Err(ContaminationError::GridMismatch {
                    what,
                    expected: wvl.len(),
                    got: col.len(),
                });
            }
        }
        Ok(ObservedDataset {
            wvl,
            wvl_width,
            depth,
            err,
        })
    }

    pub fn grid(&self) -> &WavelengthGrid {
        &self.wvl
    }

    pub fn wvl(&self) -> &[f64] {
        self.wvl.values()
    }

    pub fn wvl_width(&self) -> &[f64] {
        &self.wvl_width
    }

    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    pub fn err(&self) -> &[f64] {
        &self.err
    }

    pub fn len(&self) -> usize {
        self.wvl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wvl.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Variability level – a named photometric amplitude
// ---------------------------------------------------------------------------

/// A photometric variability amplitude at the reference wavelength.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariabilityLevel {
    /// Short label such as "low" or "high".
    pub label: String,
    /// Fractional amplitude, e.g. 0.03 for 3 %.
    pub delta_f: f64,
}

impl fmt::Display for VariabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.delta_f * 100.0)
    }
}
