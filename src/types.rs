use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// Per-ray angle sequence, degrees
pub type AngleArray = Array1<f64>;

/// Ray-by-gate sample matrix
pub type GateArray = Array2<f64>;

/// Ray-by-gate validity mask, true marks an invalid gate
pub type GateMask = Array2<bool>;

/// Storage precision a field is cast through when the volume is reassembled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldPrecision {
    F32,
    F64,
}

impl FieldPrecision {
    /// Pass a value through the declared storage width
    pub fn cast(&self, value: f64) -> f64 {
        match self {
            FieldPrecision::F32 => value as f32 as f64,
            FieldPrecision::F64 => value,
        }
    }
}

impl Default for FieldPrecision {
    fn default() -> Self {
        FieldPrecision::F32
    }
}

/// Pulsing scheme of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrtMode {
    Fixed,
    Staggered,
    Dual,
}

impl std::fmt::Display for PrtMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrtMode::Fixed => write!(f, "fixed"),
            PrtMode::Staggered => write!(f, "staggered"),
            PrtMode::Dual => write!(f, "dual"),
        }
    }
}

/// One named measurement over the volume's rays and gates
#[derive(Debug, Clone)]
pub struct Field {
    /// Samples shaped (rays, gates), rays in the volume's flat layout
    pub data: GateArray,
    /// Invalid-gate mask, same shape as `data`
    pub mask: GateMask,
    /// Storage precision applied when the volume is reassembled
    pub precision: FieldPrecision,
}

impl Field {
    /// Field with every gate valid
    pub fn new(data: GateArray, precision: FieldPrecision) -> Self {
        let mask = GateMask::from_elem(data.dim(), false);
        Self {
            data,
            mask,
            precision,
        }
    }

    /// Field with an explicit validity mask
    pub fn with_mask(data: GateArray, mask: GateMask, precision: FieldPrecision) -> VolResult<Self> {
        if data.dim() != mask.dim() {
            return Err(VolError::Shape(format!(
                "field mask shape {:?} does not match data shape {:?}",
                mask.dim(),
                data.dim()
            )));
        }
        Ok(Self {
            data,
            mask,
            precision,
        })
    }
}

/// Descriptive volume metadata, carried through the transformation untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VolumeMetadata {
    pub radar_name: String,
    pub scan_time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
}

/// Instrument parameters delivered by the ingestion side
///
/// Arrays are per ray in the volume's flat layout, except `prt_mode` which is
/// per sweep. The core transformation only reads `unambiguous_range`; the
/// remaining entries feed the staggered-PRT transforms.
#[derive(Debug, Clone)]
pub struct InstrumentParameters {
    /// Transmit frequency, Hz
    pub frequency: f64,
    /// Maximum unambiguous range per ray, meters
    pub unambiguous_range: Array1<f64>,
    /// Pulse repetition time per ray, seconds
    pub prt: Array1<f64>,
    /// Ratio between the two PRTs of a staggered scheme
    pub prt_ratio: Array1<f64>,
    /// Nyquist velocity per ray, m/s
    pub nyquist_velocity: Array1<f64>,
    /// Pulsing scheme per sweep
    pub prt_mode: Vec<PrtMode>,
    /// High/low PRF marker per ray, present after dual-PRF relabeling
    pub prf_flag: Option<Array1<u8>>,
}

impl Default for InstrumentParameters {
    fn default() -> Self {
        Self {
            frequency: 0.0,
            unambiguous_range: Array1::zeros(0),
            prt: Array1::zeros(0),
            prt_ratio: Array1::zeros(0),
            nyquist_velocity: Array1::zeros(0),
            prt_mode: Vec::new(),
            prf_flag: None,
        }
    }
}

/// A full polar scan volume in the flat per-ray layout delivered by ingestion
///
/// Rays are stored sweep-major: `sweep_start_ray_index` and
/// `sweep_end_ray_index` give the inclusive ray bounds of each sweep, ordered
/// by ascending elevation. The homogenizer mutates the volume in place; on
/// error no partially transformed state is a supported output.
#[derive(Debug, Clone)]
pub struct ScanVolume {
    pub metadata: VolumeMetadata,
    /// Gate distances along every ray, meters, shared by all sweeps
    pub ranges: Array1<f64>,
    /// Per-ray azimuth angles, degrees
    pub azimuth: AngleArray,
    /// Per-ray elevation angles, degrees
    pub elevation: AngleArray,
    /// Inclusive first-ray index of each sweep
    pub sweep_start_ray_index: Vec<usize>,
    /// Inclusive last-ray index of each sweep
    pub sweep_end_ray_index: Vec<usize>,
    /// Named measurements over the volume
    pub fields: HashMap<String, Field>,
    pub instrument: InstrumentParameters,
}

impl ScanVolume {
    /// Number of sweeps in the volume
    pub fn nsweeps(&self) -> usize {
        self.sweep_start_ray_index.len()
    }

    /// Total number of rays across all sweeps
    pub fn nrays(&self) -> usize {
        self.azimuth.len()
    }

    /// Number of gates along every ray
    pub fn ngates(&self) -> usize {
        self.ranges.len()
    }

    /// Half-open ray index range of one sweep
    pub fn sweep_slice(&self, sweep: usize) -> VolResult<Range<usize>> {
        let start = *self.sweep_start_ray_index.get(sweep).ok_or_else(|| {
            VolError::Config(format!(
                "sweep {} is out of bounds ({} sweeps)",
                sweep,
                self.nsweeps()
            ))
        })?;
        let end = *self.sweep_end_ray_index.get(sweep).ok_or_else(|| {
            VolError::Config(format!("sweep {} has no end-ray index", sweep))
        })?;
        if end < start || end >= self.nrays() {
            return Err(VolError::Config(format!(
                "sweep {} has invalid ray bounds {}-{} ({} rays in volume)",
                sweep,
                start,
                end,
                self.nrays()
            )));
        }
        Ok(start..end + 1)
    }

    /// Check that the volume is internally consistent before processing
    pub fn validate(&self) -> VolResult<()> {
        if self.sweep_start_ray_index.is_empty() {
            return Err(VolError::Config("volume contains no sweeps".to_string()));
        }
        if self.sweep_start_ray_index.len() != self.sweep_end_ray_index.len() {
            return Err(VolError::Config(format!(
                "sweep index tables disagree: {} starts, {} ends",
                self.sweep_start_ray_index.len(),
                self.sweep_end_ray_index.len()
            )));
        }
        if self.ranges.is_empty() {
            return Err(VolError::Config("range grid is empty".to_string()));
        }

        let nrays = self.nrays();
        if self.elevation.len() != nrays {
            return Err(VolError::Shape(format!(
                "elevation table covers {} rays, azimuth table {}",
                self.elevation.len(),
                nrays
            )));
        }
        if self.instrument.unambiguous_range.len() != nrays {
            return Err(VolError::Config(format!(
                "unambiguous range table covers {} rays, volume has {}",
                self.instrument.unambiguous_range.len(),
                nrays
            )));
        }

        // Sweeps must tile the ray axis without gaps or overlap
        let mut expected_start = 0;
        for sweep in 0..self.nsweeps() {
            let rays = self.sweep_slice(sweep)?;
            if rays.start != expected_start {
                return Err(VolError::Config(format!(
                    "sweep {} starts at ray {} but the previous sweep ends at ray {}",
                    sweep,
                    rays.start,
                    expected_start
                )));
            }
            expected_start = rays.end;
        }
        if expected_start != nrays {
            return Err(VolError::Config(format!(
                "sweeps cover {} rays but the volume holds {}",
                expected_start, nrays
            )));
        }

        let ngates = self.ngates();
        for (name, field) in &self.fields {
            if field.data.dim() != (nrays, ngates) {
                return Err(VolError::Shape(format!(
                    "field '{}' is shaped {:?}, expected ({}, {})",
                    name,
                    field.data.dim(),
                    nrays,
                    ngates
                )));
            }
            if field.mask.dim() != field.data.dim() {
                return Err(VolError::Shape(format!(
                    "field '{}' mask is shaped {:?}, data {:?}",
                    name,
                    field.mask.dim(),
                    field.data.dim()
                )));
            }
        }
        Ok(())
    }

    /// Register a new field copying the storage precision of an existing one
    pub fn add_field_like(
        &mut self,
        source: &str,
        name: &str,
        data: GateArray,
        mask: GateMask,
    ) -> VolResult<()> {
        let template = self
            .fields
            .get(source)
            .ok_or_else(|| VolError::MissingField(source.to_string()))?;
        if data.dim() != template.data.dim() {
            return Err(VolError::Shape(format!(
                "field '{}' is shaped {:?}, source '{}' is {:?}",
                name,
                data.dim(),
                source,
                template.data.dim()
            )));
        }
        let field = Field::with_mask(data, mask, template.precision)?;
        self.fields.insert(name.to_string(), field);
        Ok(())
    }
}

/// Error types for volume processing
#[derive(Debug, thiserror::Error)]
pub enum VolError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("interpolation error: {0}")]
    Interpolation(String),

    #[error("field not found: {0}")]
    MissingField(String),
}

/// Result type for volume operations
pub type VolResult<T> = Result<T, VolError>;
