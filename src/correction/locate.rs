use serde::{Deserialize, Serialize};

use crate::data::model::WavelengthGrid;
use crate::error::{ContaminationError, Result};

// ---------------------------------------------------------------------------
// Reference window – exclusive bounds around lambda_0
// ---------------------------------------------------------------------------

/// Exclusive search bounds `(lo, hi)` around the reference wavelength.
///
/// The right width depends on the grid density: a fine reference grid needs a
/// narrow window, a decimated grid a wider one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceWindow {
    pub lo: f64,
    pub hi: f64,
}

impl ReferenceWindow {
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        let window = ReferenceWindow { lo, hi };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.lo.is_finite() && self.hi.is_finite()) || self.lo >= self.hi {
            return Err(ContaminationError::InvalidConfig(format!(
                "reference window ({}, {}) must be finite with lo < hi",
                self.lo, self.hi
            )));
        }
        Ok(())
    }

    /// Same window grown by `pad` on each side.
    pub fn widened(&self, pad: f64) -> Self {
        ReferenceWindow {
            lo: self.lo - pad,
            hi: self.hi + pad,
        }
    }

    pub fn locate(&self, grid: &WavelengthGrid) -> Result<usize> {
        locate(grid, self.lo, self.hi)
    }
}

/// Index of the single grid point strictly inside `(lo, hi)`.
pub fn locate(grid: &WavelengthGrid, lo: f64, hi: f64) -> Result<usize> {
    let mut found = None;
    let mut matches = 0usize;
    for (i, &w) in grid.values().iter().enumerate() {
        if w > lo && w < hi {
            matches += 1;
            found.get_or_insert(i);
        }
    }
    match (matches, found) {
        (1, Some(index)) => {
            log::debug!("reference ({lo}, {hi}) resolved to index {index} (λ = {})", grid.values()[index]);
            Ok(index)
        }
        _ => Err(ContaminationError::AmbiguousReference { matches, lo, hi }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(values: &[f64]) -> WavelengthGrid {
        WavelengthGrid::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_single_match() {
        let g = grid(&[7998.0, 7999.5, 8000.0, 8000.7, 8002.0]);
        assert_eq!(locate(&g, 7999.9, 8000.1).unwrap(), 2);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let g = grid(&[7999.0, 8000.0, 8001.0]);
        assert_eq!(locate(&g, 7999.0, 8001.0).unwrap(), 1);
    }

    #[test]
    fn test_two_matches_is_ambiguous() {
        let g = grid(&[7999.5, 8000.5, 8003.0]);
        assert_eq!(
            locate(&g, 7999.0, 8001.0).unwrap_err(),
            ContaminationError::AmbiguousReference {
                matches: 2,
                lo: 7999.0,
                hi: 8001.0
            }
        );
    }

    #[test]
    fn test_no_match_is_ambiguous() {
        let g = grid(&[7990.0, 8010.0]);
        let err = locate(&g, 7999.0, 8001.0).unwrap_err();
        assert!(matches!(
            err,
            ContaminationError::AmbiguousReference { matches: 0, .. }
        ));
    }

    #[test]
    fn test_window_validation() {
        assert!(ReferenceWindow::new(8001.0, 7999.0).is_err());
        assert!(ReferenceWindow::new(f64::NAN, 8000.0).is_err());
        let w = ReferenceWindow::new(7999.9, 8000.1).unwrap();
        let wide = w.widened(1.0);
        assert!((wide.lo - 7998.9).abs() < 1e-9);
        assert!((wide.hi - 8001.1).abs() < 1e-9);
    }
}
