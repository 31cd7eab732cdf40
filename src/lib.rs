//! Correction models for transmission spectra contaminated by unocculted
//! stellar spots.
//!
//! For each candidate spot temperature and photometric variability level the
//! pipeline builds the wavelength-dependent transit-depth correction from
//! reference intensity spectra, bins it down to the resolution of the observed
//! data, aligns it at the reference wavelength and scores it with a reduced
//! chi-squared test.

pub mod config;
pub mod correction;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::RunConfig;
pub use error::ContaminationError;
pub use pipeline::{FitResult, ScenarioOutcome, ScenarioResult, SpotScenario};
