use crate::core::dedup::trim_wrap_rows;
use crate::core::grid::SweepGrids;
use crate::core::interpolate::{AxisInterpolator, GridInterpolator};
use crate::core::sort::apply_permutation_rows;
use crate::types::{Field, ScanVolume, VolError, VolResult};
use ndarray::{s, Array2, Array3, ArrayView1};

/// Mean earth radius, meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Effective-radius factor of the standard refraction model
const EFFECTIVE_RADIUS_FACTOR: f64 = 4.0 / 3.0;

/// Resampled data and validity mask for one field, shaped
/// (sweep, reference ray, gate)
pub type ResampledField = (Array3<f64>, Array3<bool>);

/// Ground-projected distance of a gate under the 4/3 effective-earth model
fn ground_range(slant_range: f64, elevation_deg: f64) -> f64 {
    let re = EARTH_RADIUS_M * EFFECTIVE_RADIUS_FACTOR;
    let el = elevation_deg.to_radians();
    let height =
        (slant_range * slant_range + re * re + 2.0 * slant_range * re * el.sin()).sqrt() - re;
    re * (slant_range * el.cos() / (re + height)).asin()
}

/// Per-gate ground range matrix for one sweep, native ray order
fn gate_range_matrix(ranges: &ArrayView1<f64>, elevation: &ArrayView1<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((elevation.len(), ranges.len()));
    for (i, &el) in elevation.iter().enumerate() {
        for (j, &r) in ranges.iter().enumerate() {
            out[[i, j]] = ground_range(r, el);
        }
    }
    out
}

/// Round to three decimals to stabilize equality-based masking
fn round_milli(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Mark gates whose ground range reaches the unambiguous range
///
/// The boundary is inclusive: a gate exactly at the unambiguous range is
/// already range-ambiguous.
fn apply_range_mask(mask: &mut Array2<bool>, gate_range: &Array2<f64>, unambiguous_range: f64) {
    for (m, &r) in mask.iter_mut().zip(gate_range.iter()) {
        if r >= unambiguous_range {
            *m = true;
        }
    }
}

/// Smallest value in a sample matrix, NaN entries ignored
pub(crate) fn min_value(data: &Array2<f64>) -> Option<f64> {
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |min, v| match min {
            None => Some(v),
            Some(m) => Some(m.min(v)),
        })
}

/// Mark every gate holding the array's minimum value
///
/// Fill values introduced by interpolation collapse onto the array minimum,
/// which this sentinel rule catches. A genuine minimum measurement is
/// indistinguishable from a fill artifact under this rule. The minimum is
/// taken over the full array rather than the unmasked gates so that
/// reapplying the rule to unchanged data never masks further gates.
pub(crate) fn mask_equal_min(data: &Array2<f64>, mask: &mut Array2<bool>) {
    if let Some(min) = min_value(data) {
        for (v, m) in data.iter().zip(mask.iter_mut()) {
            if *v == min {
                *m = true;
            }
        }
    }
}

/// Resample one field onto the homogenized sweep grids
///
/// Sweeps whose ray count already matches the reference map 1:1 and keep
/// their delivered mask; all other sweeps are rebuilt by linear range
/// interpolation and bilinear field interpolation over (azimuth, range),
/// with azimuth queries clamped to the sweep's observed span.
pub fn resample_field(
    volume: &ScanVolume,
    grids: &SweepGrids,
    name: &str,
    field: &Field,
) -> VolResult<ResampledField> {
    let nsweeps = grids.sweep_count();
    let reference_len = grids.reference_len();
    let ngates = volume.ngates();

    let mut data_out = Array3::zeros((nsweeps, reference_len, ngates));
    let mut mask_out = Array3::from_elem((nsweeps, reference_len, ngates), false);

    for sweep in 0..nsweeps {
        let rays = volume.sweep_slice(sweep)?;
        let (start, end) = (rays.start, rays.end);
        let unambiguous = volume.instrument.unambiguous_range[start];

        let elevation = volume.elevation.slice(s![start..end]);
        let mut gate_range = gate_range_matrix(&volume.ranges.view(), &elevation);
        let mut data = field.data.slice(s![start..end, ..]).to_owned();
        let mut mask = field.mask.slice(s![start..end, ..]).to_owned();

        gate_range = trim_wrap_rows(gate_range);
        data = trim_wrap_rows(data);
        mask = trim_wrap_rows(mask);

        let order = &grids.permutations[sweep];
        if order.len() != data.nrows() {
            return Err(VolError::Shape(format!(
                "field '{}' has {} rays in sweep {} but the azimuth table has {}",
                name,
                data.nrows(),
                sweep,
                order.len()
            )));
        }
        data = apply_permutation_rows(&data.view(), order)?;
        mask = apply_permutation_rows(&mask.view(), order)?;
        gate_range = apply_permutation_rows(&gate_range.view(), order)?;

        if data.nrows() != reference_len {
            let knots = &grids.sorted_azimuth[sweep];
            if knots.len() < 2 {
                return Err(VolError::Shape(format!(
                    "sweep {} has {} rays, too few to resample field '{}'",
                    sweep,
                    knots.len(),
                    name
                )));
            }
            log::debug!(
                "field '{}': resampling sweep {} from {} to {} rays",
                name,
                sweep,
                data.nrows(),
                reference_len
            );
            let targets = grids.azimuth.row(sweep);

            let axis = AxisInterpolator::new(knots.clone())?;
            gate_range = axis.eval_rows(&gate_range.view(), &targets)?;

            let surface = GridInterpolator::new(knots.clone(), volume.ranges.clone())?;
            data = surface.eval_grid(&data.view(), &targets, &volume.ranges.view())?;
            data.mapv_inplace(round_milli);

            // the delivered mask does not survive interpolation; the range
            // and sentinel rules below rebuild it
            mask = Array2::from_elem((reference_len, ngates), false);
        }

        apply_range_mask(&mut mask, &gate_range, unambiguous);
        mask_equal_min(&data, &mut mask);

        data_out.slice_mut(s![sweep, .., ..]).assign(&data);
        mask_out.slice_mut(s![sweep, .., ..]).assign(&mask);
    }

    Ok((data_out, mask_out))
}
