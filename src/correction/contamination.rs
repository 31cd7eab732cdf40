//! Transit-depth correction from unocculted spots.
//!
//! The fractional correction at wavelength λ is
//!
//! ```text
//! Δd/d (λ) = Δf(λ0) · (1 − F_spot(λ)/F_phot(λ)) / (1 − F_spot(λ0)/F_phot(λ0))
//! ```
//!
//! where Δf(λ0) is the photometric variability measured at the reference
//! wavelength λ0 (Sing et al. 2011). The denominator normalizes the curve so it
//! equals Δf exactly at λ0. Multiplying by the mean transit depth `d` gives
//! the correction in depth units.

use crate::data::model::Spectrum;
use crate::error::{ContaminationError, Result};

/// Fractional transit-depth correction on the shared photosphere/spot grid.
pub fn compute(
    photosphere: &Spectrum,
    spot: &Spectrum,
    delta_f: f64,
    ref_index: usize,
) -> Result<Spectrum> {
    if photosphere.grid() != spot.grid() {
        return Err(ContaminationError::GridMismatch {
            what: "spot spectrum grid",
            expected: photosphere.len(),
            got: spot.len(),
        });
    }
    if ref_index >= photosphere.len() {
        return Err(ContaminationError::InvalidGrid(format!(
            "reference index {ref_index} outside grid of {} points",
            photosphere.len()
        )));
    }

    let wvl = photosphere.wavelengths();
    let phot = photosphere.flux();
    let spot = spot.flux();

    // Denominator first: if it is zero every value is undefined.
    check_contrast(wvl[ref_index], phot[ref_index], spot[ref_index])?;
    let norm = 1.0 - spot[ref_index] / phot[ref_index];

    let mut correction = Vec::with_capacity(phot.len());
    for i in 0..phot.len() {
        check_contrast(wvl[i], phot[i], spot[i])?;
        correction.push(delta_f * (1.0 - spot[i] / phot[i]) / norm);
    }

    Spectrum::new(photosphere.grid().clone(), correction)
}

/// Scale a fractional correction by the mean transit depth `d`.
pub fn to_absolute_depth(correction: &Spectrum, mean_depth: f64) -> Spectrum {
    correction.map_flux(|c| c * mean_depth)
}

fn check_contrast(wavelength: f64, phot: f64, spot: f64) -> Result<()> {
    if phot == 0.0 {
        return Err(ContaminationError::DivisionSingularity {
            wavelength,
            reason: "photosphere flux is zero",
        });
    }
    if phot == spot {
        return Err(ContaminationError::DivisionSingularity {
            wavelength,
            reason: "spot and photosphere flux are equal",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spectrum(wvl: &[f64], flux: &[f64]) -> Spectrum {
        Spectrum::from_columns(wvl.to_vec(), flux.to_vec()).unwrap()
    }

    #[test]
    fn test_normalization_identity_at_reference() {
        let wvl = [6000.0, 7000.0, 8000.0, 9000.0, 10000.0];
        let phot = spectrum(&wvl, &[5.0, 4.5, 4.0, 3.2, 2.9]);
        let spot = spectrum(&wvl, &[2.0, 2.4, 2.6, 2.5, 2.4]);

        for ref_index in 0..wvl.len() {
            let corr = compute(&phot, &spot, 0.03, ref_index).unwrap();
            assert_relative_eq!(corr.flux()[ref_index], 0.03, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cooler_spot_correction_grows_to_blue() {
        let wvl = [5000.0, 8000.0, 12000.0];
        let phot = spectrum(&wvl, &[10.0, 6.0, 3.0]);
        let spot = spectrum(&wvl, &[4.0, 3.0, 2.0]);

        let corr = compute(&phot, &spot, 0.1, 1).unwrap();
        // contrast 0.6 / 0.5 / 0.333 relative to 0.5 at the reference
        assert_relative_eq!(corr.flux()[0], 0.12, epsilon = 1e-12);
        assert_relative_eq!(corr.flux()[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(corr.flux()[2], 0.1 * (1.0 / 3.0) / 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_ratio_gives_constant_correction() {
        let wvl: Vec<f64> = (0..100).map(|i| 7000.0 + 20.0 * i as f64).collect();
        let phot = Spectrum::from_columns(wvl.clone(), vec![2.0; 100]).unwrap();
        let spot = Spectrum::from_columns(wvl, vec![1.0; 100]).unwrap();

        let corr = compute(&phot, &spot, 0.05, 50).unwrap();
        for &c in corr.flux() {
            assert_relative_eq!(c, 0.05, epsilon = 1e-15);
        }
        let depth = to_absolute_depth(&corr, 1000.0);
        for &v in depth.flux() {
            assert_relative_eq!(v, 50.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_equal_flux_at_reference_fails_fast() {
        let wvl = [1.0, 2.0, 3.0];
        let phot = spectrum(&wvl, &[2.0, 2.0, 2.0]);
        let spot = spectrum(&wvl, &[1.0, 2.0, 1.0]);

        let err = compute(&phot, &spot, 0.05, 1).unwrap_err();
        assert!(matches!(
            err,
            ContaminationError::DivisionSingularity { wavelength, .. } if wavelength == 2.0
        ));
    }

    #[test]
    fn test_equal_flux_elsewhere_fails() {
        let wvl = [1.0, 2.0, 3.0];
        let phot = spectrum(&wvl, &[2.0, 2.0, 2.0]);
        let spot = spectrum(&wvl, &[1.0, 1.0, 2.0]);

        let err = compute(&phot, &spot, 0.05, 0).unwrap_err();
        assert!(matches!(
            err,
            ContaminationError::DivisionSingularity { wavelength, .. } if wavelength == 3.0
        ));
    }

    #[test]
    fn test_mismatched_grids_rejected() {
        let phot = spectrum(&[1.0, 2.0], &[2.0, 2.0]);
        let spot = spectrum(&[1.0, 2.5], &[1.0, 1.0]);
        assert!(matches!(
            compute(&phot, &spot, 0.05, 0),
            Err(ContaminationError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_reference_index_out_of_bounds() {
        let phot = spectrum(&[1.0, 2.0], &[2.0, 2.0]);
        let spot = spectrum(&[1.0, 2.0], &[1.0, 1.0]);
        assert!(matches!(
            compute(&phot, &spot, 0.05, 2),
            Err(ContaminationError::InvalidGrid(_))
        ));
    }
}
