use crate::core::resample::mask_equal_min;
use crate::types::{GateArray, GateMask, ScanVolume, VolError, VolResult};
use ndarray::Array2;

/// Window width of the speckle-removal median filter
pub const MEDIAN_WINDOW: usize = 3;

/// Moving-window median over a ray-by-gate matrix
///
/// The window is truncated at the array borders and masked gates never enter
/// it; a gate whose window is entirely masked keeps its original value.
fn masked_median_filter(data: &GateArray, mask: &GateMask, window: usize) -> GateArray {
    let (rows, cols) = data.dim();
    let half = window / 2;
    let mut out = Array2::zeros((rows, cols));
    let mut values = Vec::with_capacity(window * window);

    for i in 0..rows {
        for j in 0..cols {
            values.clear();

            let i_start = i.saturating_sub(half);
            let i_end = (i + half + 1).min(rows);
            let j_start = j.saturating_sub(half);
            let j_end = (j + half + 1).min(cols);

            for wi in i_start..i_end {
                for wj in j_start..j_end {
                    if !mask[[wi, wj]] {
                        values.push(data[[wi, wj]]);
                    }
                }
            }

            if values.is_empty() {
                out[[i, j]] = data[[i, j]];
            } else {
                values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                out[[i, j]] = values[values.len() / 2];
            }
        }
    }
    out
}

/// Median-smooth a velocity field and register the result as a new field
///
/// Removes residual speckle from an otherwise well-corrected velocity field
/// at the expense of flattening some extremes. The smoothed data keeps the
/// source field's mask plus the minimum-value sentinel, and is stored under
/// `<field_name>_smooth` with the source field's storage precision.
pub fn smooth_field(volume: &mut ScanVolume, field_name: &str) -> VolResult<String> {
    let field = volume
        .fields
        .get(field_name)
        .ok_or_else(|| VolError::MissingField(field_name.to_string()))?;

    log::info!(
        "Smoothing field '{}' with a {}x{} median window",
        field_name,
        MEDIAN_WINDOW,
        MEDIAN_WINDOW
    );

    let smoothed = masked_median_filter(&field.data, &field.mask, MEDIAN_WINDOW);
    let mut mask = field.mask.clone();
    mask_equal_min(&smoothed, &mut mask);

    let smooth_name = format!("{}_smooth", field_name);
    volume.add_field_like(field_name, &smooth_name, smoothed, mask)?;
    Ok(smooth_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_interior_median_of_smooth_ramp() {
        // f(i, j) = i + j: the 3x3 median equals the center value
        let data = Array2::from_shape_fn((5, 5), |(i, j)| (i + j) as f64);
        let mask = Array2::from_elem((5, 5), false);
        let out = masked_median_filter(&data, &mask, MEDIAN_WINDOW);
        for i in 1..4 {
            for j in 1..4 {
                assert_eq!(out[[i, j]], (i + j) as f64);
            }
        }
    }

    #[test]
    fn test_masked_gates_excluded_from_window() {
        let mut data = Array2::from_elem((3, 3), 1.0);
        data[[1, 1]] = 1000.0;
        let mut mask = Array2::from_elem((3, 3), false);
        mask[[1, 1]] = true;

        let out = masked_median_filter(&data, &mask, MEDIAN_WINDOW);
        // the spike never leaks into its neighbors
        assert_eq!(out[[0, 0]], 1.0);
        assert_eq!(out[[1, 1]], 1.0);
    }

    #[test]
    fn test_fully_masked_window_keeps_value() {
        let data = Array2::from_elem((2, 2), 7.0);
        let mask = Array2::from_elem((2, 2), true);
        let out = masked_median_filter(&data, &mask, MEDIAN_WINDOW);
        assert_eq!(out[[0, 0]], 7.0);
    }
}
