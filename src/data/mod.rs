/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json        .csv / .txt
///   (reference spectra)         (observed depths)
///        │                             │
///        ▼                             ▼
///   ┌──────────┐                 ┌──────────┐
///   │  loader   │  column → Spectrum / ObservedDataset
///   └──────────┘                 └──────────┘
///        │                             │
///        ▼                             ▼
///   ┌──────────────────┐       ┌────────────────┐
///   │ ReferenceSpectra  │       │ ObservedDataset │
///   └──────────────────┘       └────────────────┘
/// ```

pub mod loader;
pub mod model;
