//! polarvol: A Fast Polar-Volume Homogenizer for Weather Radar Scans
//!
//! This library reshapes raw weather-radar scan volumes onto a single
//! per-sweep azimuth grid so that vertically integrated products (liquid
//! water content, echo tops, hail indices) can consume rectangular
//! sweep-by-azimuth-by-range arrays. Real instruments deliver unsorted
//! azimuths, sweeps with differing ray counts and the occasional duplicate
//! wrap-around ray; [`VolumeHomogenizer`] resolves all of that in one pass
//! over an in-memory [`ScanVolume`].

pub mod core;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    AngleArray, Field, FieldPrecision, GateArray, GateMask, InstrumentParameters, PrtMode,
    ScanVolume, VolError, VolResult, VolumeMetadata,
};

pub use crate::core::{
    build_sweep_grids, dual_nyquist, smooth_field, staggered_to_dual, SweepGrids,
    VolumeHomogenizer,
};

#[cfg(feature = "python")]
use numpy::{PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2};
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyScanVolume>()?;
    Ok(())
}

#[cfg(feature = "python")]
fn to_py_err(e: VolError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e))
}

/// Python wrapper for ScanVolume
#[cfg(feature = "python")]
#[pyclass(name = "ScanVolume")]
struct PyScanVolume {
    inner: ScanVolume,
}

#[cfg(feature = "python")]
#[pymethods]
impl PyScanVolume {
    #[new]
    fn new(
        ranges: PyReadonlyArray1<f64>,
        azimuth: PyReadonlyArray1<f64>,
        elevation: PyReadonlyArray1<f64>,
        sweep_start_ray_index: Vec<usize>,
        sweep_end_ray_index: Vec<usize>,
        unambiguous_range: PyReadonlyArray1<f64>,
        frequency: f64,
    ) -> PyResult<Self> {
        let instrument = InstrumentParameters {
            frequency,
            unambiguous_range: unambiguous_range.as_array().to_owned(),
            ..InstrumentParameters::default()
        };

        Ok(PyScanVolume {
            inner: ScanVolume {
                metadata: VolumeMetadata::default(),
                ranges: ranges.as_array().to_owned(),
                azimuth: azimuth.as_array().to_owned(),
                elevation: elevation.as_array().to_owned(),
                sweep_start_ray_index,
                sweep_end_ray_index,
                fields: std::collections::HashMap::new(),
                instrument,
            },
        })
    }

    fn add_field(
        &mut self,
        name: String,
        data: PyReadonlyArray2<f64>,
        float32: Option<bool>,
    ) -> PyResult<()> {
        let precision = if float32.unwrap_or(true) {
            FieldPrecision::F32
        } else {
            FieldPrecision::F64
        };
        self.inner
            .fields
            .insert(name, Field::new(data.as_array().to_owned(), precision));
        Ok(())
    }

    fn homogenize(&mut self) -> PyResult<()> {
        VolumeHomogenizer::new()
            .homogenize(&mut self.inner)
            .map_err(to_py_err)
    }

    fn staggered_to_dual(&mut self) -> PyResult<()> {
        crate::core::staggered_to_dual(&mut self.inner).map_err(to_py_err)
    }

    fn smooth_field(&mut self, name: &str) -> PyResult<String> {
        crate::core::smooth_field(&mut self.inner, name).map_err(to_py_err)
    }

    fn azimuth<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_array(py, &self.inner.azimuth)
    }

    fn elevation<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        PyArray1::from_array(py, &self.inner.elevation)
    }

    fn field<'py>(&self, py: Python<'py>, name: &str) -> PyResult<&'py PyArray2<f64>> {
        let field = self
            .inner
            .fields
            .get(name)
            .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyKeyError, _>(name.to_string()))?;
        Ok(PyArray2::from_array(py, &field.data))
    }

    fn field_mask<'py>(&self, py: Python<'py>, name: &str) -> PyResult<&'py PyArray2<bool>> {
        let field = self
            .inner
            .fields
            .get(name)
            .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyKeyError, _>(name.to_string()))?;
        Ok(PyArray2::from_array(py, &field.mask))
    }

    fn sweep_start_ray_index(&self) -> Vec<usize> {
        self.inner.sweep_start_ray_index.clone()
    }

    fn sweep_end_ray_index(&self) -> Vec<usize> {
        self.inner.sweep_end_ray_index.clone()
    }

    #[getter]
    fn nrays(&self) -> usize {
        self.inner.nrays()
    }

    #[getter]
    fn nsweeps(&self) -> usize {
        self.inner.nsweeps()
    }

    #[getter]
    fn ngates(&self) -> usize {
        self.inner.ngates()
    }
}
