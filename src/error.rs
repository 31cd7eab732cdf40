use thiserror::Error;

// ---------------------------------------------------------------------------
// Domain errors for the correction pipeline
// ---------------------------------------------------------------------------

/// Failures raised by the correction-model components.
///
/// None of these are retried: each one means the inputs or configuration of a
/// scenario must be changed (wider window, other reference wavelength, denser
/// reference grid, ...).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContaminationError {
    /// The reference window matched zero or several grid points.
    #[error(
        "reference window ({lo}, {hi}) matched {matches} grid points; exactly one is required \
         (widen the window if 0, narrow it if more)"
    )]
    AmbiguousReference { matches: usize, lo: f64, hi: f64 },

    /// Spot and photosphere flux are equal (or the photosphere is zero).
    #[error("correction is undefined at wavelength {wavelength}: {reason}")]
    DivisionSingularity { wavelength: f64, reason: &'static str },

    /// Not enough points for the number of free parameters.
    #[error("reduced chi-squared needs more points than free parameters (n = {n}, k = {k})")]
    DegenerateSample { n: usize, k: usize },

    /// A target wavelength lies outside the sampled source range.
    #[error("target wavelength {wavelength} is outside the source range [{source_lo}, {source_hi}]")]
    OutOfRangeResample {
        wavelength: f64,
        source_lo: f64,
        source_hi: f64,
    },

    #[error("length mismatch: {what} has {got} values, expected {expected}")]
    GridMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid wavelength grid: {0}")]
    InvalidGrid(String),

    /// Decimation left too few points to resample onto.
    #[error("grid of {len} points cannot be coarsened {levels} times (fewer than 2 points left)")]
    GridTooCoarse { len: usize, levels: usize },

    #[error("uncertainty at index {index} must be positive and finite, got {value}")]
    InvalidUncertainty { index: usize, value: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = ContaminationError> = std::result::Result<T, E>;
