//! Backend adapter over a scripted engine.
#![cfg(feature = "paddle")]

use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage};
use kreuzberg_paddle::device::{CollectingSink, DeviceResolver, DeviceType, RequestedDevice, StaticProbe};
use kreuzberg_paddle::ocr::{EngineError, Page, PaddleBackend, PaddleEngine, PaddleOcrConfig, pages_from_json};

/// Returns the same canned output for every image.
struct CannedEngine {
    pages: Vec<Page>,
}

impl PaddleEngine for CannedEngine {
    fn ocr(&self, _image: &RgbImage, _use_angle_cls: bool) -> Result<Vec<Page>, EngineError> {
        Ok(self.pages.clone())
    }
}

fn canned() -> Arc<CannedEngine> {
    let pages = pages_from_json(
        r#"[[
            [[[120, 40], [220, 40], [220, 60], [120, 60]], ["world", 0.9]],
            [[[10, 42], [100, 42], [100, 62], [10, 62]], ["hello", 0.7]],
            [[[10, 90], [100, 90], [100, 110], [10, 110]], ["again", 0.8]]
        ]]"#,
    )
    .unwrap();
    Arc::new(CannedEngine { pages })
}

#[test]
fn test_backend_on_generated_png() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("scan.png");
    DynamicImage::ImageRgb8(RgbImage::from_pixel(240, 120, Rgb([250, 250, 250]))).save(&path)?;

    let resolver = DeviceResolver::new(Arc::new(StaticProbe::new().with_mps())).with_sink(Arc::new(CollectingSink::new()));
    let backend = PaddleBackend::new(canned(), PaddleOcrConfig::default(), &resolver, false)?;

    // Auto resolves to the integrated GPU, but the engine still runs without CUDA.
    assert_eq!(backend.device().device_type, DeviceType::Mps);
    assert!(!backend.options().use_gpu);

    let result = backend.process_file(&path)?;
    assert_eq!(result.content, "hello world\nagain");
    assert_eq!(result.mime_type, "text/plain");
    assert_eq!((result.metadata.width, result.metadata.height), (240, 120));
    assert!((result.metadata.confidence.unwrap() - 0.8).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_backend_with_mps_request_uses_cpu() -> anyhow::Result<()> {
    let sink = Arc::new(CollectingSink::new());
    let resolver = DeviceResolver::new(Arc::new(StaticProbe::new().with_mps())).with_sink(sink.clone());
    let config = PaddleOcrConfig {
        device: RequestedDevice::Mps,
        ..Default::default()
    };

    let backend = PaddleBackend::new(canned(), config, &resolver, true)?;
    assert!(backend.device().is_cpu());
    assert_eq!(sink.len(), 1);
    Ok(())
}

#[test]
fn test_grayscale_input_is_accepted() -> anyhow::Result<()> {
    let resolver = DeviceResolver::new(Arc::new(StaticProbe::new())).with_sink(Arc::new(CollectingSink::new()));
    let backend = PaddleBackend::new(canned(), PaddleOcrConfig::default(), &resolver, false)?;

    let gray = DynamicImage::new_luma8(30, 15);
    let result = backend.process_image(&gray)?;
    assert_eq!(result.metadata.width, 30);
    assert_eq!(result.metadata.height, 15);
    Ok(())
}
