use ndarray::{s, Array1, Array2};

/// Nominal ray count of a full-circle sweep at one-degree spacing
pub const FULL_CIRCLE_RAYS: usize = 360;

/// Ray count produced by radars that append one duplicate wrap-around ray
/// per sweep. The rule is shape-literal: only this exact count is trimmed,
/// it is not a general N+1 fix.
pub const DUPLICATE_WRAP_RAYS: usize = FULL_CIRCLE_RAYS + 1;

/// Drop the trailing wrap-around ray from a per-ray angle array
///
/// Arrays of any length other than [`DUPLICATE_WRAP_RAYS`] pass through
/// unchanged.
pub fn trim_wrap_ray<T: Clone>(angles: Array1<T>) -> Array1<T> {
    if angles.len() == DUPLICATE_WRAP_RAYS {
        log::debug!("dropping duplicate wrap-around ray");
        angles.slice(s![..FULL_CIRCLE_RAYS]).to_owned()
    } else {
        angles
    }
}

/// Drop the trailing wrap-around ray from a ray-by-gate matrix
pub fn trim_wrap_rows<T: Clone>(rows: Array2<T>) -> Array2<T> {
    if rows.nrows() == DUPLICATE_WRAP_RAYS {
        rows.slice(s![..FULL_CIRCLE_RAYS, ..]).to_owned()
    } else {
        rows
    }
}
