use crate::data::model::Spectrum;
use crate::error::{ContaminationError, Result};

/// Additive shift that makes `model_binned` hit `observed_depth_at_ref` at
/// `ref_index`.
///
/// `ref_index` must come from the grid `model_binned` lives on (the coarsened
/// grid), not from the original reference grid.
pub fn offset(model_binned: &Spectrum, ref_index: usize, observed_depth_at_ref: f64) -> Result<f64> {
    let value = model_binned.flux().get(ref_index).copied().ok_or_else(|| {
        ContaminationError::InvalidGrid(format!(
            "reference index {ref_index} outside binned grid of {} points",
            model_binned.len()
        ))
    })?;
    Ok(observed_depth_at_ref - value)
}

/// Shift every flux value by `shift`.
pub fn apply_offset(model_binned: &Spectrum, shift: f64) -> Spectrum {
    model_binned.map_flux(|v| v + shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_offset_aligns_reference_point() {
        let model = Spectrum::from_columns(vec![0.5, 0.6, 0.7], vec![60.0, 50.0, 40.0]).unwrap();
        let shift = offset(&model, 1, 1914.0).unwrap();
        assert_relative_eq!(shift, 1864.0);

        let aligned = apply_offset(&model, shift);
        assert_relative_eq!(aligned.flux()[1], 1914.0);
        assert_relative_eq!(aligned.flux()[0], 1924.0);
        assert_relative_eq!(aligned.flux()[2], 1904.0);
    }

    #[test]
    fn test_offset_index_out_of_range() {
        let model = Spectrum::from_columns(vec![0.5, 0.6], vec![1.0, 2.0]).unwrap();
        assert!(offset(&model, 2, 10.0).is_err());
    }
}
