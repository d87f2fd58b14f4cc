use crate::core::dedup::trim_wrap_ray;
use crate::core::sort::{apply_permutation, azimuth_permutation};
use crate::types::{ScanVolume, VolError, VolResult};
use ndarray::{s, Array1, Array2};

/// Homogenized per-sweep angular grids for one transformation pass
///
/// The matrices are shaped (sweep, reference ray); `sorted_azimuth` and
/// `permutations` retain each sweep's native sampling so the field resampler
/// can reuse the same sort order and interpolation knots.
#[derive(Debug, Clone)]
pub struct SweepGrids {
    /// Target azimuth grid per sweep, non-decreasing along each row
    pub azimuth: Array2<f64>,
    /// Elevation grid per sweep, matching `azimuth` in shape
    pub elevation: Array2<f64>,
    /// Native sorted azimuths per sweep after wrap-ray removal
    pub sorted_azimuth: Vec<Array1<f64>>,
    /// Ascending-azimuth sort permutation per sweep
    pub permutations: Vec<Vec<usize>>,
}

impl SweepGrids {
    pub fn sweep_count(&self) -> usize {
        self.azimuth.nrows()
    }

    /// Ray count of the reference (lowest) sweep
    pub fn reference_len(&self) -> usize {
        self.azimuth.ncols()
    }
}

/// Repeat samples cyclically to the requested length
///
/// Elevation varies negligibly within one sweep, so resizing by value
/// repetition is an acceptable coarse approximation.
fn cyclic_resize(values: &Array1<f64>, len: usize) -> Array1<f64> {
    (0..len).map(|i| values[i % values.len()]).collect()
}

/// Build the homogenized azimuth/elevation grids for every sweep
///
/// The first sweep (lowest elevation) defines the reference ray count. Sweeps
/// whose sorted ray count differs get a uniformly spaced azimuth grid between
/// their own first and last sorted azimuths, which assumes the sweep's
/// angular coverage is contiguous.
pub fn build_sweep_grids(volume: &ScanVolume) -> VolResult<SweepGrids> {
    let nsweeps = volume.nsweeps();
    if nsweeps == 0 {
        return Err(VolError::Config("volume contains no sweeps".to_string()));
    }

    let mut azimuth_rows: Vec<Array1<f64>> = Vec::with_capacity(nsweeps);
    let mut elevation_rows: Vec<Array1<f64>> = Vec::with_capacity(nsweeps);
    let mut sorted_azimuth: Vec<Array1<f64>> = Vec::with_capacity(nsweeps);
    let mut permutations: Vec<Vec<usize>> = Vec::with_capacity(nsweeps);
    let mut reference_len = 0;

    for sweep in 0..nsweeps {
        let rays = volume.sweep_slice(sweep)?;
        let (start, end) = (rays.start, rays.end);

        let azimuth = trim_wrap_ray(volume.azimuth.slice(s![start..end]).to_owned());
        let elevation = trim_wrap_ray(volume.elevation.slice(s![start..end]).to_owned());
        if azimuth.len() != elevation.len() {
            return Err(VolError::Shape(format!(
                "sweep {} has {} azimuths but {} elevations",
                sweep,
                azimuth.len(),
                elevation.len()
            )));
        }

        let order = azimuth_permutation(&azimuth);
        let mut az_sorted = apply_permutation(&azimuth.view(), &order)?;
        let mut el_sorted = apply_permutation(&elevation.view(), &order)?;

        if sweep == 0 {
            reference_len = az_sorted.len();
            if reference_len == 0 {
                return Err(VolError::Config(
                    "reference sweep contains no rays".to_string(),
                ));
            }
            log::debug!("reference sweep has {} rays", reference_len);
        }

        sorted_azimuth.push(az_sorted.clone());
        permutations.push(order);

        if az_sorted.len() != reference_len {
            if az_sorted.len() < 2 {
                return Err(VolError::Shape(format!(
                    "sweep {} has {} rays, too few to resample onto {} reference azimuths",
                    sweep,
                    az_sorted.len(),
                    reference_len
                )));
            }
            let first = az_sorted[0];
            let last = az_sorted[az_sorted.len() - 1];
            if last - first < 180.0 {
                log::warn!(
                    "sweep {} spans only {:.1} degrees of azimuth, synthesized grid assumes contiguous coverage",
                    sweep,
                    last - first
                );
            }
            log::debug!(
                "sweep {}: synthesizing {} azimuths over {:.2}-{:.2} degrees (native {})",
                sweep,
                reference_len,
                first,
                last,
                az_sorted.len()
            );
            az_sorted = Array1::linspace(first, last, reference_len);
            el_sorted = cyclic_resize(&el_sorted, reference_len);
        }

        azimuth_rows.push(az_sorted);
        elevation_rows.push(el_sorted);
    }

    let mut azimuth = Array2::zeros((nsweeps, reference_len));
    let mut elevation = Array2::zeros((nsweeps, reference_len));
    for sweep in 0..nsweeps {
        azimuth.row_mut(sweep).assign(&azimuth_rows[sweep]);
        elevation.row_mut(sweep).assign(&elevation_rows[sweep]);
    }

    Ok(SweepGrids {
        azimuth,
        elevation,
        sorted_azimuth,
        permutations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InstrumentParameters, ScanVolume, VolumeMetadata};
    use ndarray::Array1;
    use std::collections::HashMap;

    fn volume_with_sweeps(sweeps: &[Vec<f64>], elevations: &[f64]) -> ScanVolume {
        let mut azimuth = Vec::new();
        let mut elevation = Vec::new();
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        for (az, &el) in sweeps.iter().zip(elevations) {
            starts.push(azimuth.len());
            azimuth.extend_from_slice(az);
            ends.push(azimuth.len() - 1);
            elevation.extend(std::iter::repeat(el).take(az.len()));
        }
        let nrays = azimuth.len();
        ScanVolume {
            metadata: VolumeMetadata::default(),
            ranges: Array1::linspace(0.0, 1000.0, 4),
            azimuth: Array1::from_vec(azimuth),
            elevation: Array1::from_vec(elevation),
            sweep_start_ray_index: starts,
            sweep_end_ray_index: ends,
            fields: HashMap::new(),
            instrument: InstrumentParameters {
                unambiguous_range: Array1::from_elem(nrays, 150_000.0),
                ..InstrumentParameters::default()
            },
        }
    }

    #[test]
    fn test_reference_grid_is_first_sweep_sorted() {
        let volume = volume_with_sweeps(
            &[vec![2.0, 0.0, 1.0], vec![0.0, 1.0, 2.0]],
            &[0.5, 1.5],
        );
        let grids = build_sweep_grids(&volume).unwrap();
        assert_eq!(grids.reference_len(), 3);
        assert_eq!(grids.azimuth.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(grids.permutations[0], vec![1, 2, 0]);
    }

    #[test]
    fn test_coarser_sweep_gets_synthesized_grid() {
        let volume = volume_with_sweeps(
            &[vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 3.0]],
            &[0.5, 1.5],
        );
        let grids = build_sweep_grids(&volume).unwrap();
        assert_eq!(grids.reference_len(), 4);

        let row = grids.azimuth.row(1);
        assert_eq!(row.len(), 4);
        assert_eq!(row[0], 0.0);
        assert_eq!(row[3], 3.0);
        for w in row.to_vec().windows(2) {
            assert!(w[0] <= w[1]);
        }
        // elevation resized by repetition, not interpolation
        assert_eq!(grids.elevation.row(1).to_vec(), vec![1.5; 4]);
    }

    #[test]
    fn test_single_ray_sweep_rejected() {
        let volume = volume_with_sweeps(&[vec![0.0, 1.0, 2.0], vec![5.0]], &[0.5, 1.5]);
        assert!(build_sweep_grids(&volume).is_err());
    }

    #[test]
    fn test_cyclic_resize_repeats_values() {
        let values = Array1::from_vec(vec![1.0, 2.0]);
        assert_eq!(cyclic_resize(&values, 5).to_vec(), vec![1.0, 2.0, 1.0, 2.0, 1.0]);
        assert_eq!(cyclic_resize(&values, 1).to_vec(), vec![1.0]);
    }
}
