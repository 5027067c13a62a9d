//! Native multi-band GeoTIFF reading
//!
//! Uses the `tiff` crate for TIFF decoding. Two band layouts are
//! supported: one band per IFD (page) and pixel-interleaved samples
//! within a single IFD. All samples are widened to f64 at decode time;
//! the declared sample type is kept per band.

use crate::error::{Error, Result};
use crate::raster::{Band, DType, RasterSource};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};

/// One decoded band, or the reason it could not be decoded.
///
/// A corrupt page must not invalidate the whole raster; the failure is
/// held until the band is actually read.
#[derive(Debug, Clone)]
struct BandSlot {
    data: std::result::Result<Band<f64>, String>,
    dtype: DType,
}

/// A multi-band GeoTIFF decoded into memory.
#[derive(Debug, Clone)]
pub struct TiffStack {
    slots: Vec<BandSlot>,
    shape: (usize, usize),
}

impl TiffStack {
    /// Decode a GeoTIFF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::decode(file)
    }

    /// Decode a GeoTIFF from an in-memory buffer
    pub fn from_buffer(data: &[u8]) -> Result<Self> {
        Self::decode(Cursor::new(data))
    }

    fn decode<R: std::io::Read + std::io::Seek>(reader: R) -> Result<Self> {
        let mut decoder = Decoder::new(reader)
            .map_err(|e| Error::Decode(format!("not a TIFF: {}", e)))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| Error::Decode(format!("cannot read dimensions: {}", e)))?;
        let shape = (height as usize, width as usize);
        if shape.0 == 0 || shape.1 == 0 {
            return Err(Error::InvalidDimensions {
                width: shape.1,
                height: shape.0,
            });
        }

        let mut slots = Vec::new();
        loop {
            match decode_page(&mut decoder, shape) {
                Ok(bands) => slots.extend(bands),
                Err(msg) => slots.push(BandSlot {
                    data: Err(msg),
                    dtype: DType::F64,
                }),
            }

            if !decoder.more_images() {
                break;
            }
            if let Err(e) = decoder.next_image() {
                slots.push(BandSlot {
                    data: Err(format!("cannot advance to next page: {}", e)),
                    dtype: DType::F64,
                });
                break;
            }
        }

        Ok(Self { slots, shape })
    }
}

impl RasterSource for TiffStack {
    fn band_count(&self) -> usize {
        self.slots.len()
    }

    fn shape(&self) -> (usize, usize) {
        self.shape
    }

    fn dtype(&self, band: usize) -> DType {
        self.slots
            .get(band.wrapping_sub(1))
            .map(|s| s.dtype)
            .unwrap_or(DType::F64)
    }

    fn read_band(&self, band: usize) -> Result<Band<f64>> {
        let slot = self
            .slots
            .get(band.wrapping_sub(1))
            .ok_or(Error::BandOutOfRange {
                band,
                count: self.slots.len(),
            })?;

        match &slot.data {
            Ok(b) => Ok(b.clone()),
            Err(msg) => Err(Error::Decode(msg.clone())),
        }
    }
}

/// Decode the current IFD into one band per sample channel.
///
/// Failures are reported as strings so the caller can hold them per
/// band instead of aborting the stack.
fn decode_page<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    shape: (usize, usize),
) -> std::result::Result<Vec<BandSlot>, String> {
    let (width, height) = decoder
        .dimensions()
        .map_err(|e| format!("cannot read page dimensions: {}", e))?;
    if (height as usize, width as usize) != shape {
        return Err(format!(
            "page shape {}x{} differs from raster shape {}x{}",
            height, width, shape.0, shape.1
        ));
    }

    let result = decoder
        .read_image()
        .map_err(|e| format!("cannot decode page: {}", e))?;

    let (samples, dtype) = widen_samples(result)?;

    let cells = shape.0 * shape.1;
    if cells == 0 || samples.len() % cells != 0 {
        return Err(format!(
            "sample count {} does not fill {} cells",
            samples.len(),
            cells
        ));
    }

    let channels = samples.len() / cells;
    let mut slots = Vec::with_capacity(channels);

    if channels == 1 {
        let band = Band::from_vec(samples, shape.0, shape.1)
            .map_err(|e| e.to_string())?;
        slots.push(BandSlot {
            data: Ok(band),
            dtype,
        });
    } else {
        // Pixel-interleaved: sample c of pixel p sits at p * channels + c
        for c in 0..channels {
            let data: Vec<f64> = (0..cells).map(|p| samples[p * channels + c]).collect();
            let band = Band::from_vec(data, shape.0, shape.1)
                .map_err(|e| e.to_string())?;
            slots.push(BandSlot {
                data: Ok(band),
                dtype,
            });
        }
    }

    Ok(slots)
}

/// Widen a decoded buffer to f64 and report its declared type
fn widen_samples(result: DecodingResult) -> std::result::Result<(Vec<f64>, DType), String> {
    let widened = match result {
        DecodingResult::U8(buf) => (buf.into_iter().map(f64::from).collect(), DType::U8),
        DecodingResult::U16(buf) => (buf.into_iter().map(f64::from).collect(), DType::U16),
        DecodingResult::U32(buf) => (buf.into_iter().map(f64::from).collect(), DType::U32),
        DecodingResult::I8(buf) => (buf.into_iter().map(f64::from).collect(), DType::I8),
        DecodingResult::I16(buf) => (buf.into_iter().map(f64::from).collect(), DType::I16),
        DecodingResult::I32(buf) => (buf.into_iter().map(f64::from).collect(), DType::I32),
        DecodingResult::F32(buf) => (buf.into_iter().map(f64::from).collect(), DType::F32),
        DecodingResult::F64(buf) => (buf, DType::F64),
        _ => return Err("unsupported TIFF pixel format".to_string()),
    };
    Ok(widened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::colortype::{Gray32Float, RGB8};
    use tiff::encoder::TiffEncoder;

    fn encode_pages(pages: &[Vec<f32>], width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            for page in pages {
                encoder
                    .write_image::<Gray32Float>(width, height, page)
                    .unwrap();
            }
        }
        buf.into_inner()
    }

    #[test]
    fn test_multipage_decode() {
        let pages = vec![vec![50.0f32; 12], vec![200.0f32; 12]];
        let bytes = encode_pages(&pages, 4, 3);

        let stack = TiffStack::from_buffer(&bytes).unwrap();
        assert_eq!(stack.band_count(), 2);
        assert_eq!(stack.shape(), (3, 4));
        assert_eq!(stack.dtype(1), DType::F32);

        let band = stack.read_band(2).unwrap();
        assert_eq!(band.get(1, 1).unwrap(), 200.0);
    }

    #[test]
    fn test_interleaved_decode() {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = TiffEncoder::new(&mut buf).unwrap();
            // 2x2 RGB: every pixel (10, 20, 30)
            let data: Vec<u8> = vec![10, 20, 30, 10, 20, 30, 10, 20, 30, 10, 20, 30];
            encoder.write_image::<RGB8>(2, 2, &data).unwrap();
        }

        let stack = TiffStack::from_buffer(&buf.into_inner()).unwrap();
        assert_eq!(stack.band_count(), 3);
        assert_eq!(stack.dtype(2), DType::U8);
        assert_eq!(stack.read_band(1).unwrap().get(0, 0).unwrap(), 10.0);
        assert_eq!(stack.read_band(2).unwrap().get(1, 1).unwrap(), 20.0);
        assert_eq!(stack.read_band(3).unwrap().get(0, 1).unwrap(), 30.0);
    }

    #[test]
    fn test_not_a_tiff() {
        assert!(TiffStack::from_buffer(b"definitely not a tiff").is_err());
    }

    #[test]
    fn test_band_out_of_range() {
        let bytes = encode_pages(&[vec![1.0f32; 4]], 2, 2);
        let stack = TiffStack::from_buffer(&bytes).unwrap();
        assert!(matches!(
            stack.read_band(2),
            Err(Error::BandOutOfRange { band: 2, count: 1 })
        ));
    }
}
