use approx::assert_abs_diff_eq;
use ndarray::{Array1, Array2};
use polarvol::{
    dual_nyquist, smooth_field, staggered_to_dual, Field, FieldPrecision, GateMask,
    InstrumentParameters, PrtMode, ScanVolume, VolError, VolumeMetadata,
};
use std::collections::HashMap;

fn staggered_volume(nrays: usize, ngates: usize) -> ScanVolume {
    ScanVolume {
        metadata: VolumeMetadata::default(),
        ranges: Array1::linspace(500.0, 500.0 * ngates as f64, ngates),
        azimuth: Array1::linspace(0.0, 359.0, nrays),
        elevation: Array1::from_elem(nrays, 0.5),
        sweep_start_ray_index: vec![0],
        sweep_end_ray_index: vec![nrays - 1],
        fields: HashMap::new(),
        instrument: InstrumentParameters {
            frequency: 3.0e9,
            unambiguous_range: Array1::from_elem(nrays, 150_000.0),
            prt: Array1::from_elem(nrays, 1.0e-3),
            prt_ratio: Array1::from_elem(nrays, 0.8),
            nyquist_velocity: Array1::zeros(nrays),
            prt_mode: vec![PrtMode::Staggered],
            prf_flag: None,
        },
    }
}

#[test]
fn test_dual_nyquist_broadcasts_extended_interval() {
    let mut volume = staggered_volume(6, 2);
    dual_nyquist(&mut volume).unwrap();

    // lambda = 0.1 m, T1 = 1 ms, ratio 0.8 gives 100 m/s
    assert_eq!(volume.instrument.nyquist_velocity.len(), 6);
    for &v in volume.instrument.nyquist_velocity.iter() {
        assert_abs_diff_eq!(v, 100.0, epsilon = 1.0e-6);
    }
}

#[test]
fn test_staggered_to_dual_rewrites_metadata() {
    let mut volume = staggered_volume(4, 2);
    volume.instrument.prt_mode = vec![PrtMode::Staggered, PrtMode::Fixed];

    staggered_to_dual(&mut volume).unwrap();

    assert_eq!(
        volume.instrument.prt_mode,
        vec![PrtMode::Dual, PrtMode::Fixed]
    );
    for &r in volume.instrument.prt_ratio.iter() {
        assert_abs_diff_eq!(r, 1.25, epsilon = 1.0e-9);
    }
    assert_eq!(
        volume.instrument.prf_flag.as_ref().unwrap().to_vec(),
        vec![0, 1, 0, 1]
    );
}

#[test]
fn test_missing_frequency_rejected() {
    let mut volume = staggered_volume(4, 2);
    volume.instrument.frequency = 0.0;
    let err = dual_nyquist(&mut volume).unwrap_err();
    assert!(matches!(err, VolError::Config(_)));
}

#[test]
fn test_smooth_field_registers_new_field() {
    let mut volume = staggered_volume(5, 5);

    let data = Array2::from_shape_fn((5, 5), |(i, j)| (i + j) as f64);
    let mut mask = GateMask::from_elem((5, 5), false);
    mask[[1, 1]] = true;
    volume.fields.insert(
        "vcor_cmean".to_string(),
        Field::with_mask(data, mask, FieldPrecision::F32).unwrap(),
    );

    let name = smooth_field(&mut volume, "vcor_cmean").unwrap();
    assert_eq!(name, "vcor_cmean_smooth");

    let smoothed = &volume.fields["vcor_cmean_smooth"];
    assert_eq!(smoothed.precision, FieldPrecision::F32);

    // interior median of the ramp equals the center value
    assert_eq!(smoothed.data[[2, 2]], 4.0);
    assert!(!smoothed.mask[[2, 2]]);

    // the source mask survives smoothing
    assert!(smoothed.mask[[1, 1]]);
}

#[test]
fn test_smooth_missing_field_rejected() {
    let mut volume = staggered_volume(4, 2);
    let err = smooth_field(&mut volume, "vcor_cmean").unwrap_err();
    assert!(matches!(err, VolError::MissingField(_)));
}
