use serde::Serialize;

use crate::error::{ContaminationError, Result};

/// Reduced chi-squared together with its acceptance interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitStatistic {
    pub chi2v: f64,
    /// Degrees of freedom, `n - k`.
    pub dof: usize,
    pub lower: f64,
    pub upper: f64,
    pub good_fit: bool,
}

impl FitStatistic {
    /// Symmetric interval `1 ± sqrt(2 / dof)` for a given number of degrees of freedom.
    pub fn acceptance_interval(dof: usize) -> (f64, f64) {
        let half_width = (2.0 / dof as f64).sqrt();
        (1.0 - half_width, 1.0 + half_width)
    }
}

/// `Σ((observed − model)² / err²) / (n − k)` with the good-fit verdict.
pub fn chi2v(observed: &[f64], model: &[f64], err: &[f64], k: usize) -> Result<FitStatistic> {
    let n = observed.len();
    for (what, col) in [("model", model), ("err", err)] {
        if col.len() != n {
            return Err(ContaminationError::GridMismatch {
                what,
                expected: n,
                got: col.len(),
            });
        }
    }
    if n <= k {
        return Err(ContaminationError::DegenerateSample { n, k });
    }
    if let Some((index, &value)) = err
        .iter()
        .enumerate()
        .find(|(_, e)| !(e.is_finite() && **e > 0.0))
    {
        return Err(ContaminationError::InvalidUncertainty { index, value });
    }

    let chi2: f64 = observed
        .iter()
        .zip(model)
        .zip(err)
        .map(|((o, m), e)| (o - m).powi(2) / e.powi(2))
        .sum();

    let dof = n - k;
    let chi2v = chi2 / dof as f64;
    let (lower, upper) = FitStatistic::acceptance_interval(dof);

    Ok(FitStatistic {
        chi2v,
        dof,
        lower,
        upper,
        good_fit: chi2v >= lower && chi2v <= upper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_residual_small_sample_is_good() {
        let obs = [1900.0, 1910.0, 1920.0, 1905.0, 1915.0];
        let stat = chi2v(&obs, &obs, &[10.0; 5], 3).unwrap();
        assert_eq!(stat.chi2v, 0.0);
        assert_eq!(stat.dof, 2);
        assert_relative_eq!(stat.lower, 0.0, epsilon = 1e-12);
        assert!(stat.good_fit);
    }

    #[test]
    fn test_zero_residual_large_sample_is_overfit() {
        let obs = vec![1900.0; 20];
        let stat = chi2v(&obs, &obs, &vec![10.0; 20], 3).unwrap();
        assert_eq!(stat.chi2v, 0.0);
        assert!(stat.lower > 0.0);
        assert!(!stat.good_fit);
    }

    #[test]
    fn test_one_sigma_residuals_give_unity() {
        let n = 53;
        let obs: Vec<f64> = (0..n).map(|i| if i % 2 == 0 { 10.0 } else { -10.0 }).collect();
        let model = vec![0.0; n];
        let err = vec![10.0; n];
        let stat = chi2v(&obs, &model, &err, 3).unwrap();
        // chi2 = n, reduced by n - k
        assert_relative_eq!(stat.chi2v, 53.0 / 50.0, epsilon = 1e-12);
        assert_relative_eq!(stat.lower, 0.8, epsilon = 1e-12);
        assert_relative_eq!(stat.upper, 1.2, epsilon = 1e-12);
        assert!(stat.good_fit);
    }

    #[test]
    fn test_poor_fit_rejected() {
        let obs = vec![100.0; 12];
        let model = vec![0.0; 12];
        let stat = chi2v(&obs, &model, &vec![10.0; 12], 2).unwrap();
        assert_relative_eq!(stat.chi2v, 120.0, epsilon = 1e-12);
        assert!(!stat.good_fit);
    }

    #[test]
    fn test_degenerate_sample() {
        let obs = [1.0, 2.0, 3.0];
        assert_eq!(
            chi2v(&obs, &obs, &[1.0; 3], 3).unwrap_err(),
            ContaminationError::DegenerateSample { n: 3, k: 3 }
        );
        assert!(chi2v(&obs, &obs, &[1.0; 3], 5).is_err());
    }

    #[test]
    fn test_invalid_uncertainty() {
        let obs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            chi2v(&obs, &obs, &[1.0, 0.0, 1.0, 1.0], 1).unwrap_err(),
            ContaminationError::InvalidUncertainty {
                index: 1,
                value: 0.0
            }
        );
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            chi2v(&[1.0, 2.0], &[1.0], &[1.0, 1.0], 0),
            Err(ContaminationError::GridMismatch { what: "model", .. })
        ));
    }
}
