use crate::core::assemble::assemble_volume;
use crate::core::grid::{build_sweep_grids, SweepGrids};
use crate::core::resample::{resample_field, ResampledField};
use crate::types::{ScanVolume, VolError, VolResult};

/// Homogenizes a scan volume onto the reference sweep's azimuth grid
///
/// Vertically integrated products need a rectangular sweep-by-azimuth-by-range
/// volume; raw instruments deliver unsorted azimuths, ragged ray counts and
/// the occasional duplicate wrap-around ray. One call resolves all of that in
/// place: every sweep ends up with the reference sweep's ray count, ascending
/// azimuths, resampled fields and rebuilt ray index tables.
pub struct VolumeHomogenizer;

impl VolumeHomogenizer {
    pub fn new() -> Self {
        Self
    }

    /// Run the full transformation on one volume, in place
    ///
    /// The volume is mutated exclusively for the duration of the call. On
    /// error the volume must be discarded; no partially homogenized state is
    /// a supported output.
    pub fn homogenize(&self, volume: &mut ScanVolume) -> VolResult<()> {
        log::info!(
            "Homogenizing volume: {} sweeps, {} rays, {} gates, {} fields",
            volume.nsweeps(),
            volume.nrays(),
            volume.ngates(),
            volume.fields.len()
        );

        volume.validate()?;
        let grids = build_sweep_grids(volume)?;
        log::debug!(
            "reference grid holds {} azimuths per sweep",
            grids.reference_len()
        );

        let mut names: Vec<String> = volume.fields.keys().cloned().collect();
        names.sort();

        let resampled = resample_all(volume, &grids, &names)?;
        assemble_volume(volume, &grids, resampled)?;

        log::info!(
            "Volume homogenized to {} rays ({} per sweep)",
            volume.nrays(),
            grids.reference_len()
        );
        Ok(())
    }
}

impl Default for VolumeHomogenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Resample every field onto the sweep grids, fields in parallel
#[cfg(feature = "parallel")]
fn resample_all(
    volume: &ScanVolume,
    grids: &SweepGrids,
    names: &[String],
) -> VolResult<Vec<(String, ResampledField)>> {
    use rayon::prelude::*;

    names
        .par_iter()
        .map(|name| {
            let field = volume
                .fields
                .get(name)
                .ok_or_else(|| VolError::MissingField(name.clone()))?;
            resample_field(volume, grids, name, field).map(|out| (name.clone(), out))
        })
        .collect()
}

/// Resample every field onto the sweep grids, sequentially
#[cfg(not(feature = "parallel"))]
fn resample_all(
    volume: &ScanVolume,
    grids: &SweepGrids,
    names: &[String],
) -> VolResult<Vec<(String, ResampledField)>> {
    names
        .iter()
        .map(|name| {
            let field = volume
                .fields
                .get(name)
                .ok_or_else(|| VolError::MissingField(name.clone()))?;
            resample_field(volume, grids, name, field).map(|out| (name.clone(), out))
        })
        .collect()
}
