//! Image-facing PaddleOCR backend.
//!
//! The inference engine itself is supplied by the caller through [`PaddleEngine`];
//! this module prepares images, resolves the device once and turns raw engine
//! output into [`ExtractionResult`]s.

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use super::config::PaddleOcrConfig;
use super::engine::{EngineOptions, resolve_device_config};
use super::geometry::Page;
use super::lines::LineReconstructor;
use crate::device::{DeviceInfo, DeviceResolver};
use crate::types::ExtractionResult;
use crate::{KreuzbergError, Result};

/// Error type engines report failures with.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// A PaddleOCR inference engine.
///
/// Implementations must be safe to call from several threads at once, or serialize
/// access internally.
pub trait PaddleEngine: Send + Sync {
    /// Run detection and recognition on one RGB image.
    fn ocr(&self, image: &RgbImage, use_angle_cls: bool) -> std::result::Result<Vec<Page>, EngineError>;
}

/// Outcome of one file in [`PaddleBackend::process_files_batch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResult {
    pub file_path: String,
    pub success: bool,
    pub result: Option<ExtractionResult>,
    pub error: Option<String>,
}

/// PaddleOCR backend bound to a resolved device.
pub struct PaddleBackend<E: PaddleEngine> {
    engine: Arc<E>,
    config: PaddleOcrConfig,
    device: DeviceInfo,
    options: EngineOptions,
    reconstructor: LineReconstructor,
}

impl<E: PaddleEngine> std::fmt::Debug for PaddleBackend<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaddleBackend")
            .field("device", &self.device)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<E: PaddleEngine> PaddleBackend<E> {
    /// Validate `config`, resolve its device and derive the engine options.
    ///
    /// `gpu_runtime_available` tells whether the engine was built with GPU support.
    ///
    /// # Errors
    ///
    /// Validation and device resolution errors.
    pub fn new(
        engine: Arc<E>,
        config: PaddleOcrConfig,
        resolver: &DeviceResolver,
        gpu_runtime_available: bool,
    ) -> Result<Self> {
        config.validate()?;
        let device = resolve_device_config(&config, resolver)?;
        let options = EngineOptions::derive(&config, &device, gpu_runtime_available)?;

        tracing::debug!(
            device = %device.device_type,
            language = %options.language,
            use_gpu = options.use_gpu,
            enable_mkldnn = options.enable_mkldnn,
            "Initialised PaddleOCR backend"
        );

        Ok(Self {
            engine,
            config,
            device,
            options,
            reconstructor: LineReconstructor::default(),
        })
    }

    pub fn config(&self) -> &PaddleOcrConfig {
        &self.config
    }

    /// Device chosen at construction.
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// OCR one image.
    pub fn process_image(&self, image: &DynamicImage) -> Result<ExtractionResult> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let pages = self
            .engine
            .ocr(&rgb, self.options.use_angle_cls)
            .map_err(|e| KreuzbergError::Ocr {
                message: format!("Failed to OCR using PaddleOCR: {}", e),
                source: Some(e),
            })?;

        Ok(self.reconstructor.reconstruct(&pages).into_extraction_result(width, height))
    }

    /// Load an image from disk and OCR it.
    ///
    /// # Errors
    ///
    /// - `KreuzbergError::Io` if the file can't be read
    /// - `KreuzbergError::Ocr` if it can't be decoded or recognised
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<ExtractionResult> {
        let image = image::open(path.as_ref()).map_err(|e| match e {
            image::ImageError::IoError(io) => KreuzbergError::Io(io),
            other => KreuzbergError::ocr_with_source("Failed to load or process image using PaddleOCR", other),
        })?;
        self.process_image(&image)
    }

    /// OCR several images in parallel. Results keep the input order.
    pub fn process_images_batch(&self, images: &[DynamicImage]) -> Vec<Result<ExtractionResult>> {
        use rayon::prelude::*;

        images.par_iter().map(|image| self.process_image(image)).collect()
    }

    /// OCR several files in parallel. Results keep the input order.
    pub fn process_files_batch(&self, file_paths: Vec<String>) -> Vec<BatchItemResult> {
        use rayon::prelude::*;

        file_paths
            .par_iter()
            .map(|path| match self.process_file(path) {
                Ok(result) => BatchItemResult {
                    file_path: path.clone(),
                    success: true,
                    result: Some(result),
                    error: None,
                },
                Err(e) => BatchItemResult {
                    file_path: path.clone(),
                    success: false,
                    result: None,
                    error: Some(e.to_string()),
                },
            })
            .collect()
    }
}
