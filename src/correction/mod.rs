/// Correction-model components: pure functions over borrowed spectra.
///
/// Per scenario:
/// ```text
///  photosphere + spot spectra
///        │
///        ▼
///   ┌───────────────┐
///   │ contamination  │  Δd/d(λ), normalized at λ0 (locate), × d
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐   ┌──────────┐
///   │ coarsen   │──▶│ resample  │  model grid → coarse grid
///   └──────────┘   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  offset   │  align at λ0 on the coarse grid (locate)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌──────────┐
///   │ resample  │──▶│   fit     │  coarse grid → data grid, chi2v
///   └──────────┘   └──────────┘
/// ```

pub mod coarsen;
pub mod contamination;
pub mod fit;
pub mod locate;
pub mod offset;
pub mod resample;
