use crate::core::grid::SweepGrids;
use crate::core::resample::{mask_equal_min, ResampledField};
use crate::types::{ScanVolume, VolError, VolResult};
use ndarray::Array1;

/// Rebuild a per-ray parameter array for the homogenized layout
///
/// Each sweep's value is its first delivered ray's entry, repeated across the
/// sweep's new ray count. Empty arrays pass through untouched.
fn broadcast_sweep_scalars(
    values: &Array1<f64>,
    old_starts: &[usize],
    reference_len: usize,
) -> Array1<f64> {
    if values.is_empty() {
        return values.clone();
    }
    let mut out = Vec::with_capacity(old_starts.len() * reference_len);
    for &start in old_starts {
        let v = values[start.min(values.len() - 1)];
        out.extend(std::iter::repeat(v).take(reference_len));
    }
    Array1::from_vec(out)
}

/// Write the homogenized grids and resampled fields back into the volume
///
/// Fields are cast through their declared storage precision and the
/// minimum-value sentinel rule is reapplied volume-wide; azimuth and
/// elevation are flattened sweep-major and the ray index tables rebuilt with
/// a fixed stride of the reference ray count.
pub fn assemble_volume(
    volume: &mut ScanVolume,
    grids: &SweepGrids,
    resampled: Vec<(String, ResampledField)>,
) -> VolResult<()> {
    let nsweeps = grids.sweep_count();
    let reference_len = grids.reference_len();
    let ngates = volume.ngates();
    let total_rays = nsweeps * reference_len;

    // per-sweep scalars must be read before the ray tables are rewritten
    let mut old_starts = Vec::with_capacity(nsweeps);
    for sweep in 0..nsweeps {
        old_starts.push(volume.sweep_slice(sweep)?.start);
    }

    for (name, (stack, stack_mask)) in resampled {
        let field = volume
            .fields
            .get_mut(&name)
            .ok_or_else(|| VolError::MissingField(name.clone()))?;

        let mut data = stack.into_shape((total_rays, ngates)).map_err(|e| {
            VolError::Shape(format!("field '{}' could not be flattened: {}", name, e))
        })?;
        let mut mask = stack_mask.into_shape((total_rays, ngates)).map_err(|e| {
            VolError::Shape(format!("field '{}' mask could not be flattened: {}", name, e))
        })?;

        let precision = field.precision;
        data.mapv_inplace(|v| precision.cast(v));
        mask_equal_min(&data, &mut mask);

        field.data = data;
        field.mask = mask;
    }

    volume.azimuth = grids
        .azimuth
        .to_owned()
        .into_shape(total_rays)
        .map_err(|e| VolError::Shape(format!("azimuth grid could not be flattened: {}", e)))?;
    volume.elevation = grids
        .elevation
        .to_owned()
        .into_shape(total_rays)
        .map_err(|e| VolError::Shape(format!("elevation grid could not be flattened: {}", e)))?;

    let instrument = &mut volume.instrument;
    instrument.unambiguous_range =
        broadcast_sweep_scalars(&instrument.unambiguous_range, &old_starts, reference_len);
    instrument.prt = broadcast_sweep_scalars(&instrument.prt, &old_starts, reference_len);
    instrument.prt_ratio =
        broadcast_sweep_scalars(&instrument.prt_ratio, &old_starts, reference_len);
    instrument.nyquist_velocity =
        broadcast_sweep_scalars(&instrument.nyquist_velocity, &old_starts, reference_len);
    if let Some(flag) = instrument.prf_flag.take() {
        if flag.is_empty() {
            instrument.prf_flag = Some(flag);
        } else {
            instrument.prf_flag = Some((0..total_rays).map(|i| flag[i % flag.len()]).collect());
        }
    }

    volume.sweep_start_ray_index = (0..nsweeps).map(|s| s * reference_len).collect();
    volume.sweep_end_ray_index = (0..nsweeps)
        .map(|s| s * reference_len + reference_len - 1)
        .collect();

    log::debug!(
        "assembled volume: {} sweeps of {} rays, {} gates",
        nsweeps,
        reference_len,
        ngates
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_sweep_scalars() {
        let values = Array1::from_vec(vec![10.0, 10.0, 20.0, 20.0]);
        let out = broadcast_sweep_scalars(&values, &[0, 2], 3);
        assert_eq!(out.to_vec(), vec![10.0, 10.0, 10.0, 20.0, 20.0, 20.0]);
    }

    #[test]
    fn test_broadcast_keeps_empty_arrays_empty() {
        let values = Array1::zeros(0);
        assert!(broadcast_sweep_scalars(&values, &[0, 2], 3).is_empty());
    }
}
