use crate::types::{PrtMode, ScanVolume, VolError, VolResult};
use ndarray::Array1;

/// Propagation speed used for wavelength conversion, m/s
pub const SPEED_OF_LIGHT: f64 = 3.0e8;

/// Recompute the Nyquist velocity for staggered-PRT pulsing
///
/// Uses the extended Nyquist interval of Zrnic and Mahapatra (1985),
/// `v = lambda / (4 * T1 * ((1 / ratio) - 1))`, and broadcasts the result to
/// every ray of the volume.
pub fn dual_nyquist(volume: &mut ScanVolume) -> VolResult<()> {
    let instrument = &volume.instrument;
    if instrument.frequency <= 0.0 {
        return Err(VolError::Config(
            "transmit frequency is not set".to_string(),
        ));
    }
    let prt = *instrument
        .prt
        .first()
        .ok_or_else(|| VolError::Config("PRT table is empty".to_string()))?;
    let ratio = *instrument
        .prt_ratio
        .first()
        .ok_or_else(|| VolError::Config("PRT ratio table is empty".to_string()))?;
    if prt <= 0.0 {
        return Err(VolError::Config(format!("invalid PRT {}", prt)));
    }
    if ratio <= 0.0 || ratio == 1.0 {
        return Err(VolError::Config(format!(
            "PRT ratio {} does not describe staggered pulsing",
            ratio
        )));
    }

    let wavelength = SPEED_OF_LIGHT / instrument.frequency;
    let nyquist = wavelength / (4.0 * prt * (1.0 / ratio - 1.0));
    log::debug!(
        "staggered-PRT Nyquist velocity: {:.2} m/s (wavelength {:.4} m)",
        nyquist,
        wavelength
    );

    let nrays = volume.nrays();
    volume.instrument.nyquist_velocity = Array1::from_elem(nrays, nyquist);
    Ok(())
}

/// Relabel staggered-PRT sweeps so the volume reads as dual-PRF
///
/// Downstream dealiasing tooling understands dual-PRF metadata only: the
/// Nyquist velocity is recomputed, staggered sweeps are marked dual, the PRT
/// ratio is inverted so it reads as a PRF ratio, and an alternating high/low
/// PRF flag is attached per ray.
pub fn staggered_to_dual(volume: &mut ScanVolume) -> VolResult<()> {
    dual_nyquist(volume)?;

    if volume.instrument.prt_ratio.iter().any(|&r| r == 0.0) {
        return Err(VolError::Config(
            "PRT ratio table contains zero entries".to_string(),
        ));
    }

    let nrays = volume.nrays();
    let instrument = &mut volume.instrument;
    for mode in instrument.prt_mode.iter_mut() {
        if *mode == PrtMode::Staggered {
            *mode = PrtMode::Dual;
        }
    }
    instrument.prt_ratio.mapv_inplace(|r| 1.0 / r);
    instrument.prf_flag = Some((0..nrays).map(|i| (i % 2) as u8).collect());

    log::info!("volume relabeled as dual-PRF over {} rays", nrays);
    Ok(())
}
