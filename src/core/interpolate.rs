use crate::types::{VolError, VolResult};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num_traits::Float;

/// Linear blend between two samples
fn lerp<T: Float>(a: T, b: T, t: T) -> T {
    a + (b - a) * t
}

/// Piecewise-linear interpolant along one non-decreasing sample axis
///
/// Queries outside the observed span clamp to the nearest endpoint, so the
/// interpolant never extrapolates.
#[derive(Debug, Clone)]
pub struct AxisInterpolator {
    knots: Array1<f64>,
}

impl AxisInterpolator {
    /// Create an interpolant over a non-decreasing axis
    pub fn new(knots: Array1<f64>) -> VolResult<Self> {
        if knots.len() < 2 {
            return Err(VolError::Interpolation(format!(
                "axis needs at least two samples, got {}",
                knots.len()
            )));
        }
        for i in 1..knots.len() {
            if knots[i] < knots[i - 1] {
                return Err(VolError::Interpolation(format!(
                    "axis is not sorted at sample {} ({} after {})",
                    i,
                    knots[i],
                    knots[i - 1]
                )));
            }
        }
        Ok(Self { knots })
    }

    /// Number of samples along the axis
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Segment index and blend weight for a query, clamped to the span
    fn bracket(&self, query: f64) -> (usize, f64) {
        let x = &self.knots;
        let n = x.len();
        if query <= x[0] {
            return (0, 0.0);
        }
        if query >= x[n - 1] {
            return (n - 2, 1.0);
        }

        // rightmost segment whose left knot does not exceed the query
        let mut lo = 0;
        let mut hi = n - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if x[mid] <= query {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let width = x[lo + 1] - x[lo];
        let t = if width > 0.0 {
            (query - x[lo]) / width
        } else {
            0.0
        };
        (lo, t)
    }

    /// Interpolate a sample vector at one query point
    pub fn eval(&self, samples: &ArrayView1<f64>, query: f64) -> VolResult<f64> {
        if samples.len() != self.knots.len() {
            return Err(VolError::Interpolation(format!(
                "axis has {} knots but {} samples were supplied",
                self.knots.len(),
                samples.len()
            )));
        }
        let (i, t) = self.bracket(query);
        Ok(lerp(samples[i], samples[i + 1], t))
    }

    /// Interpolate every column of a matrix whose rows follow this axis
    ///
    /// Returns a matrix shaped (queries, columns).
    pub fn eval_rows(
        &self,
        samples: &ArrayView2<f64>,
        queries: &ArrayView1<f64>,
    ) -> VolResult<Array2<f64>> {
        if samples.nrows() != self.knots.len() {
            return Err(VolError::Interpolation(format!(
                "axis has {} knots but the matrix has {} rows",
                self.knots.len(),
                samples.nrows()
            )));
        }
        let mut out = Array2::zeros((queries.len(), samples.ncols()));
        for (qi, &q) in queries.iter().enumerate() {
            let (i, t) = self.bracket(q);
            for c in 0..samples.ncols() {
                out[[qi, c]] = lerp(samples[[i, c]], samples[[i + 1, c]], t);
            }
        }
        Ok(out)
    }
}

/// Bilinear interpolant over a rectilinear (azimuth, range) grid
#[derive(Debug, Clone)]
pub struct GridInterpolator {
    azimuth: AxisInterpolator,
    range: AxisInterpolator,
}

impl GridInterpolator {
    pub fn new(azimuths: Array1<f64>, ranges: Array1<f64>) -> VolResult<Self> {
        Ok(Self {
            azimuth: AxisInterpolator::new(azimuths)?,
            range: AxisInterpolator::new(ranges)?,
        })
    }

    /// Evaluate over the full product grid of the query axes
    ///
    /// `values` is shaped (azimuth, range); the result is shaped
    /// (azimuth queries, range queries).
    pub fn eval_grid(
        &self,
        values: &ArrayView2<f64>,
        azimuth_queries: &ArrayView1<f64>,
        range_queries: &ArrayView1<f64>,
    ) -> VolResult<Array2<f64>> {
        if values.dim() != (self.azimuth.len(), self.range.len()) {
            return Err(VolError::Interpolation(format!(
                "value grid is shaped {:?}, axes are ({}, {})",
                values.dim(),
                self.azimuth.len(),
                self.range.len()
            )));
        }

        let mut out = Array2::zeros((azimuth_queries.len(), range_queries.len()));
        for (ai, &aq) in azimuth_queries.iter().enumerate() {
            let (ia, ta) = self.azimuth.bracket(aq);
            for (ri, &rq) in range_queries.iter().enumerate() {
                let (ir, tr) = self.range.bracket(rq);
                let low = lerp(values[[ia, ir]], values[[ia, ir + 1]], tr);
                let high = lerp(values[[ia + 1, ir]], values[[ia + 1, ir + 1]], tr);
                out[[ai, ri]] = lerp(low, high, ta);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_midpoint_interpolation() {
        let axis = AxisInterpolator::new(array![0.0, 2.0, 4.0]).unwrap();
        let samples = array![10.0, 20.0, 40.0];
        assert_abs_diff_eq!(axis.eval(&samples.view(), 1.0).unwrap(), 15.0);
        assert_abs_diff_eq!(axis.eval(&samples.view(), 3.0).unwrap(), 30.0);
        assert_abs_diff_eq!(axis.eval(&samples.view(), 2.0).unwrap(), 20.0);
    }

    #[test]
    fn test_queries_clamp_to_span() {
        let axis = AxisInterpolator::new(array![10.0, 20.0]).unwrap();
        let samples = array![1.0, 2.0];
        assert_abs_diff_eq!(axis.eval(&samples.view(), 5.0).unwrap(), 1.0);
        assert_abs_diff_eq!(axis.eval(&samples.view(), 25.0).unwrap(), 2.0);
    }

    #[test]
    fn test_unsorted_axis_rejected() {
        assert!(AxisInterpolator::new(array![0.0, 2.0, 1.0]).is_err());
        assert!(AxisInterpolator::new(array![0.0]).is_err());
    }

    #[test]
    fn test_duplicate_knots_do_not_divide_by_zero() {
        let axis = AxisInterpolator::new(array![0.0, 1.0, 1.0, 2.0]).unwrap();
        let samples = array![0.0, 10.0, 20.0, 30.0];
        let v = axis.eval(&samples.view(), 1.0).unwrap();
        assert!(v.is_finite());
    }

    #[test]
    fn test_eval_rows_per_column() {
        let axis = AxisInterpolator::new(array![0.0, 10.0]).unwrap();
        let samples = array![[0.0, 100.0], [10.0, 200.0]];
        let out = axis
            .eval_rows(&samples.view(), &array![5.0].view())
            .unwrap();
        assert_eq!(out.dim(), (1, 2));
        assert_abs_diff_eq!(out[[0, 0]], 5.0);
        assert_abs_diff_eq!(out[[0, 1]], 150.0);
    }

    #[test]
    fn test_bilinear_plane_is_exact() {
        // v(a, r) = 2a + 3r is reproduced exactly by bilinear interpolation
        let azimuths = array![0.0, 10.0];
        let ranges = array![0.0, 5.0];
        let mut values = Array2::zeros((2, 2));
        for (i, &a) in azimuths.iter().enumerate() {
            for (j, &r) in ranges.iter().enumerate() {
                values[[i, j]] = 2.0 * a + 3.0 * r;
            }
        }
        let grid = GridInterpolator::new(azimuths, ranges).unwrap();
        let out = grid
            .eval_grid(&values.view(), &array![5.0].view(), &array![2.5].view())
            .unwrap();
        assert_abs_diff_eq!(out[[0, 0]], 17.5);
    }
}
