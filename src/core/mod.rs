//! Core volume processing modules

pub mod assemble;
pub mod dedup;
pub mod grid;
pub mod homogenize;
pub mod instrument;
pub mod interpolate;
pub mod resample;
pub mod smooth;
pub mod sort;

// Re-export main types
pub use assemble::assemble_volume;
pub use dedup::{trim_wrap_ray, trim_wrap_rows, DUPLICATE_WRAP_RAYS, FULL_CIRCLE_RAYS};
pub use grid::{build_sweep_grids, SweepGrids};
pub use homogenize::VolumeHomogenizer;
pub use instrument::{dual_nyquist, staggered_to_dual, SPEED_OF_LIGHT};
pub use interpolate::{AxisInterpolator, GridInterpolator};
pub use resample::{resample_field, ResampledField};
pub use smooth::{smooth_field, MEDIAN_WINDOW};
pub use sort::{apply_permutation, apply_permutation_rows, azimuth_permutation};
