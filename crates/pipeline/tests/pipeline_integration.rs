//! End-to-end pipeline tests over in-memory and GeoTIFF-backed rasters

use cropsight_core::io::TiffStack;
use cropsight_core::{Band, InMemoryRaster, RasterSource, Result};
use cropsight_pipeline::prelude::*;
use cropsight_pipeline::model::RawLabel;
use std::io::Cursor;
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;

struct StubClassifier(RawLabel);

impl Classifier for StubClassifier {
    fn predict(&self, _features: &cropsight_pipeline::FeatureVector) -> Result<RawLabel> {
        Ok(self.0.clone())
    }
}

fn uniform_bands(values: &[f64], rows: usize, cols: usize) -> InMemoryRaster {
    InMemoryRaster::new(
        values
            .iter()
            .map(|&v| Band::filled(rows, cols, v))
            .collect(),
    )
    .unwrap()
}

fn encode_tiff(pages: &[Vec<f32>], width: u32, height: u32) -> Vec<u8> {
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
fn classifies_healthy_area_from_geotiff() {
    // 5 uniform bands: red=50, nir=200, then thermal/elevation/dtm.
    // Auxiliary values stay within a 4:1 ratio of everything else, so
    // the (1, 2) pairing wins the search at NDVI 0.6
    let pages = vec![
        vec![50.0f32; 16],
        vec![200.0f32; 16],
        vec![80.0f32; 16],
        vec![120.0f32; 16],
        vec![100.0f32; 16],
    ];
    let stack = TiffStack::from_buffer(&encode_tiff(&pages, 4, 4)).unwrap();
    let model = StubClassifier(RawLabel::Vector(vec![1.0]));

    let result = classify(&stack, Some(&model), &PipelineConfig::default()).unwrap();
    assert_eq!(result.status, HealthStatus::Healthy);
    assert!((result.ndvi_value - 0.6).abs() < 1e-6);
    assert_eq!(result.raw_label, Some(1.0));
    match result.confidence {
        Confidence::Percent(p) => assert!((p - 20.0).abs() < 1e-6, "got {}", p),
        other => panic!("expected percent confidence, got {:?}", other),
    }
}

#[test]
fn barren_area_short_circuits_before_model() {
    struct PanickyClassifier;
    impl Classifier for PanickyClassifier {
        fn predict(
            &self,
            _features: &cropsight_pipeline::FeatureVector,
        ) -> Result<RawLabel> {
            panic!("model stage must not run for barren regions");
        }
    }

    // Near-identical bands everywhere: every pairing's NDVI mean stays
    // far below the vegetation threshold
    let raster = uniform_bands(&[100.0, 101.0, 102.0, 103.0, 104.0], 4, 4);

    let result =
        classify(&raster, Some(&PanickyClassifier), &PipelineConfig::default()).unwrap();
    assert_eq!(result.status, HealthStatus::Unhealthy);
    assert_eq!(result.confidence, Confidence::NotApplicable);
    assert!(result.raw_label.is_none());
}

#[test]
fn nan_samples_do_not_poison_the_result() {
    let mut red = Band::filled(4, 4, 50.0);
    red.set(0, 0, f64::NAN).unwrap();
    let mut nir = Band::filled(4, 4, 200.0);
    nir.set(3, 3, f64::NAN).unwrap();

    let raster = InMemoryRaster::new(vec![
        red,
        nir,
        Band::filled(4, 4, 21.0),
        Band::filled(4, 4, 600.0),
        Band::filled(4, 4, 610.0),
    ])
    .unwrap();
    let model = StubClassifier(RawLabel::Scalar(1.0));

    let result = classify(&raster, Some(&model), &PipelineConfig::default()).unwrap();
    assert!(result.ndvi_value.is_finite());
    assert_eq!(result.status, HealthStatus::Healthy);
}

#[test]
fn report_boundary_never_leaks_errors() {
    // One band: below even the ndvi-only minimum
    let raster = uniform_bands(&[42.0], 2, 2);

    let report = run_analysis(&raster, None, &PipelineConfig::ndvi_only());
    match report {
        AnalysisReport::Failed { error } => assert!(error.contains("band")),
        other => panic!("expected failure report, got {:?}", other),
    }
}

#[test]
fn selected_pair_never_degenerate() {
    let raster = uniform_bands(&[10.0, 10.0, 10.0, 10.0, 10.0], 3, 3);
    let model = StubClassifier(RawLabel::Scalar(0.0));

    let result = classify(&raster, Some(&model), &PipelineConfig::default()).unwrap();
    // Identical bands everywhere: NDVI 0 -> threshold reject, and the
    // diagnostics name a non-self pairing
    assert_eq!(result.status, HealthStatus::Unhealthy);
    let note = result
        .diagnostics
        .iter()
        .find(|d| d.contains("selected bands"))
        .expect("selection diagnostic present");
    assert!(note.contains("red=1, nir=2"));
}

#[test]
fn shipped_model_round_trip() {
    // Strongly positive NDVI weight: healthy iff the vegetation signal
    // dominates
    let model = LinearClassifier::from_json(
        r#"{"weights": [10.0, 0.0, 0.0, 0.0], "bias": -4.0}"#,
    )
    .unwrap();

    let healthy = uniform_bands(&[50.0, 200.0, 20.0, 100.0, 100.0], 4, 4);
    let result = classify(&healthy, Some(&model), &PipelineConfig::default()).unwrap();
    assert_eq!(result.status, HealthStatus::Healthy);
    assert_eq!(result.raw_label, Some(1.0));
}

#[test]
fn geotiff_band_count_gate_applies_before_reads() {
    let pages = vec![vec![1.0f32; 4], vec![2.0f32; 4]];
    let stack = TiffStack::from_buffer(&encode_tiff(&pages, 2, 2)).unwrap();
    assert_eq!(stack.band_count(), 2);

    let model = StubClassifier(RawLabel::Scalar(1.0));
    let report = run_analysis(&stack, Some(&model), &PipelineConfig::default());
    match report {
        AnalysisReport::Failed { error } => {
            assert!(error.contains("requires at least 5"))
        }
        other => panic!("expected failure report, got {:?}", other),
    }
}
