//! Flux-conserving resampling between wavelength grids.
//!
//! Every sample is treated as the centre of a bin whose edges sit halfway to
//! its neighbours; the outermost edges are placed half a spacing beyond the
//! first and last samples. A target bin takes the overlap-weighted mean of the
//! source bins it covers, so `Σ flux · width` is preserved bin by bin.

use crate::data::model::WavelengthGrid;
use crate::error::{ContaminationError, Result};

/// Bin edges (`len + 1` values) implied by the sample spacing.
pub fn bin_edges(centers: &[f64]) -> Result<Vec<f64>> {
    let n = centers.len();
    if n < 2 {
        return Err(ContaminationError::InvalidGrid(format!(
            "resampling needs at least 2 points, got {n}"
        )));
    }
    let mut edges = Vec::with_capacity(n + 1);
    edges.push(centers[0] - 0.5 * (centers[1] - centers[0]));
    edges.extend(centers.windows(2).map(|w| 0.5 * (w[0] + w[1])));
    edges.push(centers[n - 1] + 0.5 * (centers[n - 1] - centers[n - 2]));
    Ok(edges)
}

/// Resample `source_flux` (sampled on `source`) onto `target`.
///
/// Every target wavelength must lie within `[source.first(), source.last()]`;
/// values are never extrapolated. A target bin whose centre is covered but
/// whose edge reaches past the source edges is averaged over the covered part.
pub fn resample(
    target: &WavelengthGrid,
    source: &WavelengthGrid,
    source_flux: &[f64],
) -> Result<Vec<f64>> {
    if source_flux.len() != source.len() {
        return Err(ContaminationError::GridMismatch {
            what: "source flux",
            expected: source.len(),
            got: source_flux.len(),
        });
    }
    let src_edges = bin_edges(source.values())?;
    let dst_edges = bin_edges(target.values())?;
    let source_lo = src_edges[0];
    let source_hi = src_edges[src_edges.len() - 1];

    if let Some(&wavelength) = target
        .values()
        .iter()
        .find(|&&w| w < source.first() || w > source.last())
    {
        return Err(ContaminationError::OutOfRangeResample {
            wavelength,
            source_lo: source.first(),
            source_hi: source.last(),
        });
    }

    let mut out = Vec::with_capacity(target.len());
    // Index of the first source bin that can still overlap the current target bin.
    let mut start = 0usize;

    // Centres are covered, so every clipped bin below is non-empty.
    for bin in dst_edges.windows(2) {
        let lo = bin[0].max(source_lo);
        let hi = bin[1].min(source_hi);

        while start + 1 < source_flux.len() && src_edges[start + 1] <= lo {
            start += 1;
        }

        let mut weighted = 0.0;
        let mut covered = 0.0;
        let mut j = start;
        while j < source_flux.len() && src_edges[j] < hi {
            let overlap = hi.min(src_edges[j + 1]) - lo.max(src_edges[j]);
            if overlap > 0.0 {
                weighted += overlap * source_flux[j];
                covered += overlap;
            }
            j += 1;
        }
        out.push(weighted / covered);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(values: Vec<f64>) -> WavelengthGrid {
        WavelengthGrid::new(values).unwrap()
    }

    fn linspace(start: f64, step: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[test]
    fn test_bin_edges() {
        let edges = bin_edges(&[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(edges, vec![0.5, 1.5, 3.0, 5.0]);
        assert!(bin_edges(&[1.0]).is_err());
    }

    #[test]
    fn test_constant_flux_preserved_on_any_target() {
        let source = grid(linspace(7000.0, 1.0, 2001));
        let flux = vec![3.25; source.len()];

        let coarse = grid(linspace(7010.0, 37.0, 50));
        let fine = grid(linspace(7100.0, 0.3, 400));
        let irregular = grid(vec![7002.0, 7010.0, 7400.0, 7410.5, 8200.0, 8990.0]);

        for target in [coarse, fine, irregular] {
            for v in resample(&target, &source, &flux).unwrap() {
                assert_relative_eq!(v, 3.25, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_integrated_flux_conserved() {
        // Pairs of source bins merge exactly into one target bin.
        let source = grid(linspace(0.5, 1.0, 8));
        let flux = vec![1.0, 3.0, 2.0, 6.0, 0.0, 4.0, 5.0, 5.0];
        let target = grid(linspace(1.0, 2.0, 4));

        let out = resample(&target, &source, &flux).unwrap();
        assert_eq!(out.len(), 4);
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], 4.0);
        assert_relative_eq!(out[2], 2.0);
        assert_relative_eq!(out[3], 5.0);

        let total_in: f64 = flux.iter().sum::<f64>() * 1.0;
        let total_out: f64 = out.iter().sum::<f64>() * 2.0;
        assert_relative_eq!(total_in, total_out, epsilon = 1e-12);
    }

    #[test]
    fn test_identity_resample() {
        let source = grid(vec![1.0, 2.0, 3.5, 4.0, 6.0]);
        let flux = vec![5.0, -1.0, 2.0, 8.0, 0.5];
        let out = resample(&source, &source, &flux).unwrap();
        for (a, b) in out.iter().zip(&flux) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_partial_edge_bin_uses_covered_part() {
        // Source edges end at 4; the last target bin is [2.75, 4.25].
        let source = grid(vec![0.5, 1.5, 2.5, 3.5]);
        let flux = vec![1.0, 1.0, 1.0, 7.0];
        let target = grid(vec![2.0, 3.5]);
        let out = resample(&target, &source, &flux).unwrap();
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], (0.25 * 1.0 + 1.0 * 7.0) / 1.25, epsilon = 1e-12);
    }

    #[test]
    fn test_target_past_red_end_fails() {
        let source = grid(linspace(1.0, 1.0, 10));
        let flux = source.values().to_vec();
        let err = resample(&grid(vec![5.0, 12.0]), &source, &flux).unwrap_err();
        assert_eq!(
            err,
            ContaminationError::OutOfRangeResample {
                wavelength: 12.0,
                source_lo: 1.0,
                source_hi: 10.0
            }
        );
    }

    #[test]
    fn test_target_past_blue_end_fails() {
        let source = grid(linspace(1.0, 1.0, 10));
        let flux = source.values().to_vec();
        let err = resample(&grid(vec![-1.0, 5.0]), &source, &flux).unwrap_err();
        assert!(matches!(
            err,
            ContaminationError::OutOfRangeResample { wavelength, .. } if wavelength == -1.0
        ));
    }

    #[test]
    fn test_target_on_source_endpoints_allowed() {
        let source = grid(linspace(1.0, 1.0, 10));
        let out = resample(&grid(vec![1.0, 10.0]), &source, &[2.0; 10]).unwrap();
        assert_relative_eq!(out[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(out[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bin_outside_coverage_fails() {
        let source = grid(linspace(1.0, 1.0, 10)); // coverage [0.5, 10.5]
        let target = grid(vec![5.0, 20.0, 30.0]);
        let err = resample(&target, &source, &[1.0; 10]).unwrap_err();
        assert!(matches!(err, ContaminationError::OutOfRangeResample { .. }));
    }

    #[test]
    fn test_flux_length_mismatch() {
        let source = grid(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            resample(&source, &source, &[1.0, 2.0]),
            Err(ContaminationError::GridMismatch { .. })
        ));
    }
}
