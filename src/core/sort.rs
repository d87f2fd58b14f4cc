use crate::types::{VolError, VolResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Permutation that sorts a sweep's azimuth array ascending
///
/// The sort is stable, so rays with exactly equal azimuths keep their
/// delivery order. The permutation is computed once per sweep and threaded
/// through every array that shares the sweep's ray axis.
pub fn azimuth_permutation(azimuth: &Array1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..azimuth.len()).collect();
    order.sort_by(|&a, &b| {
        azimuth[a]
            .partial_cmp(&azimuth[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

/// Reorder a per-ray array by a sweep's sort permutation
pub fn apply_permutation<T: Clone>(
    values: &ArrayView1<T>,
    order: &[usize],
) -> VolResult<Array1<T>> {
    if values.len() != order.len() {
        return Err(VolError::Shape(format!(
            "permutation covers {} rays, array has {}",
            order.len(),
            values.len()
        )));
    }
    Ok(order.iter().map(|&i| values[i].clone()).collect())
}

/// Reorder the rows of a ray-by-gate matrix by a sweep's sort permutation
pub fn apply_permutation_rows<T: Clone>(
    rows: &ArrayView2<T>,
    order: &[usize],
) -> VolResult<Array2<T>> {
    if rows.nrows() != order.len() {
        return Err(VolError::Shape(format!(
            "permutation covers {} rays, matrix has {}",
            order.len(),
            rows.nrows()
        )));
    }
    let mut out = Vec::with_capacity(rows.len());
    for &i in order {
        out.extend(rows.row(i).iter().cloned());
    }
    Array2::from_shape_vec((order.len(), rows.ncols()), out)
        .map_err(|e| VolError::Shape(format!("permutation produced a ragged matrix: {}", e)))
}
