use crate::data::model::WavelengthGrid;
use crate::error::{ContaminationError, Result};

/// One decimation pass: keep the odd (zero-based) indices.
///
/// Inputs shorter than 2 elements give an empty vector.
pub fn decimate(values: &[f64]) -> Vec<f64> {
    values.iter().skip(1).step_by(2).copied().collect()
}

/// Apply [`decimate`] `levels` times.
///
/// Each pass halves the point density, so a grid of `L` points ends with
/// `floor(L / 2^levels)` points. Fails when fewer than two remain, since the
/// result is used as a resampling target.
pub fn coarsen(grid: &WavelengthGrid, levels: usize) -> Result<WavelengthGrid> {
    let mut values = grid.values().to_vec();
    for _ in 0..levels {
        values = decimate(&values);
    }
    if values.len() < 2 {
        return Err(ContaminationError::GridTooCoarse {
            len: grid.len(),
            levels,
        });
    }
    log::debug!(
        "coarsened grid {} → {} points over {levels} levels",
        grid.len(),
        values.len()
    );
    WavelengthGrid::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> WavelengthGrid {
        WavelengthGrid::new((0..n).map(|i| 1000.0 + i as f64).collect()).unwrap()
    }

    #[test]
    fn test_decimate_keeps_odd_indices() {
        assert_eq!(decimate(&[0.0, 1.0, 2.0, 3.0, 4.0]), vec![1.0, 3.0]);
        assert_eq!(decimate(&[0.0, 1.0]), vec![1.0]);
        assert!(decimate(&[5.0]).is_empty());
        assert!(decimate(&[]).is_empty());
    }

    #[test]
    fn test_length_after_levels() {
        for len in [2usize, 7, 100, 1023, 4096, 5000] {
            for levels in 0..5 {
                let expected = len >> levels;
                match coarsen(&grid(len), levels) {
                    Ok(g) => assert_eq!(g.len(), expected, "len={len} levels={levels}"),
                    Err(_) => assert!(expected < 2, "len={len} levels={levels}"),
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let g = grid(513);
        assert_eq!(coarsen(&g, 3).unwrap(), coarsen(&g, 3).unwrap());
    }

    #[test]
    fn test_zero_levels_is_identity() {
        let g = grid(10);
        assert_eq!(coarsen(&g, 0).unwrap(), g);
    }

    #[test]
    fn test_too_coarse() {
        assert_eq!(
            coarsen(&grid(7), 2).unwrap_err(),
            ContaminationError::GridTooCoarse { len: 7, levels: 2 }
        );
    }

    #[test]
    fn test_order_preserved() {
        let g = coarsen(&grid(64), 2).unwrap();
        let expected: Vec<f64> = (0..16).map(|k| 1003.0 + 4.0 * k as f64).collect();
        assert_eq!(g.values(), expected.as_slice());
    }
}
