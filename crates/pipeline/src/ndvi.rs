//! Normalized Difference Vegetation Index
//!
//! `NDVI = (NIR - Red) / (NIR + Red)`
//!
//! Values range from -1 to 1:
//! - Dense vegetation: 0.6 to 0.9
//! - Sparse vegetation: 0.2 to 0.5
//! - Bare soil: 0.1 to 0.2
//! - Water/clouds: -1.0 to 0.0

use cropsight_core::{Band, Error, Result};
use ndarray::Array2;
use rayon::prelude::*;

/// Division guard added to the denominator
pub const NDVI_EPSILON: f64 = 1e-10;

/// Compute NDVI from near-infrared and red reflectance bands.
///
/// Both inputs are taken by absolute value (reflectance sign artifacts
/// occur in some products), the denominator carries an epsilon against
/// division by zero, and any non-finite result cell is clamped to 0.0.
/// Pure and deterministic: equal inputs always yield the same array.
///
/// # Arguments
/// * `nir` - Near-infrared band
/// * `red` - Red band
pub fn ndvi(nir: &Band<f64>, red: &Band<f64>) -> Result<Band<f64>> {
    check_dimensions(nir, red)?;

    let (rows, cols) = nir.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let n = unsafe { nir.get_unchecked(row, col) }.abs();
                let r = unsafe { red.get_unchecked(row, col) }.abs();

                let v = (n - r) / (n + r + NDVI_EPSILON);
                if v.is_finite() {
                    *out = v;
                }
            }
            row_data
        })
        .collect();

    let array = Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| Error::Other(e.to_string()))?;
    Ok(Band::from_array(array))
}

fn check_dimensions(a: &Band<f64>, b: &Band<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}
