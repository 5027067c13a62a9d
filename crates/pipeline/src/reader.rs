//! Fault-tolerant band reading
//!
//! A single unreadable band must not abort a multi-candidate search, so
//! read failures are substituted with a zero-filled band of the
//! raster's declared shape and recorded as a diagnostic note.

use cropsight_core::{Band, RasterSource};
use tracing::warn;

/// Read one band (1-based), recovering from failure with zeros.
///
/// The failure is logged and appended to `diagnostics`; the caller
/// always receives a band of the source's declared shape.
pub fn read_band_or_zero(
    source: &dyn RasterSource,
    band: usize,
    diagnostics: &mut Vec<String>,
) -> Band<f64> {
    match source.read_band(band) {
        Ok(b) => b,
        Err(e) => {
            let note = format!("band {} unreadable, substituted zeros: {}", band, e);
            warn!("{}", note);
            diagnostics.push(note);
            let (rows, cols) = source.shape();
            Band::zeros(rows, cols)
        }
    }
}
