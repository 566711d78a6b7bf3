use serde::{Deserialize, Serialize};
use std::path::Path;

use super::validation::validate_language_code;
use crate::device::{DeviceRequest, RequestedDevice};
use crate::{KreuzbergError, Result};

/// File name searched for by [`PaddleOcrConfig::discover`].
pub const CONFIG_FILE_NAME: &str = "kreuzberg-paddle.toml";

/// Text detection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DetectionAlgorithm {
    #[default]
    #[serde(rename = "DB")]
    Db,
    #[serde(rename = "EAST")]
    East,
    #[serde(rename = "SAST")]
    Sast,
    #[serde(rename = "PSE")]
    Pse,
    #[serde(rename = "FCE")]
    Fce,
    #[serde(rename = "PAN")]
    Pan,
    #[serde(rename = "CT")]
    Ct,
    #[serde(rename = "DB++")]
    DbPlusPlus,
    Layout,
}

/// Text recognition algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecognitionAlgorithm {
    #[default]
    #[serde(rename = "CRNN")]
    Crnn,
    #[serde(rename = "SRN")]
    Srn,
    #[serde(rename = "NRTR")]
    Nrtr,
    #[serde(rename = "SAR")]
    Sar,
    #[serde(rename = "SEED")]
    Seed,
    #[serde(rename = "SVTR")]
    Svtr,
    #[serde(rename = "SVTR_LCNet")]
    SvtrLcNet,
    #[serde(rename = "ViTSTR")]
    VitStr,
    #[serde(rename = "ABINet")]
    AbiNet,
    VisionLAN,
    #[serde(rename = "SPIN")]
    Spin,
    RobustScanner,
    #[serde(rename = "RFL")]
    Rfl,
}

/// PaddleOCR engine parameters.
///
/// All fields have defaults, so configuration files only need to list what they
/// change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleOcrConfig {
    /// Classifier input shape as `channels,height,width`.
    pub cls_image_shape: String,
    pub det_algorithm: DetectionAlgorithm,
    /// Boxes scoring below this are discarded.
    pub det_db_box_thresh: f64,
    /// Binarization threshold for the DB output map.
    pub det_db_thresh: f64,
    /// Expansion ratio for detected boxes.
    pub det_db_unclip_ratio: f64,
    pub det_east_cover_thresh: f64,
    pub det_east_nms_thresh: f64,
    pub det_east_score_thresh: f64,
    /// Longer image side is resized down to this.
    pub det_max_side_len: u32,
    pub det_model_dir: Option<String>,
    /// Recognition results below this confidence are dropped by the engine.
    pub drop_score: f64,
    /// Intel MKL-DNN acceleration. Unset means on for supported CPUs, off on the GPU.
    pub enable_mkldnn: Option<bool>,
    /// GPU memory in MB reserved at engine start.
    pub gpu_mem: u32,
    pub language: String,
    pub max_text_length: u32,
    pub rec: bool,
    pub rec_algorithm: RecognitionAlgorithm,
    /// Recognizer input shape as `channels,height,width`.
    pub rec_image_shape: String,
    pub rec_model_dir: Option<String>,
    pub table: bool,
    /// Run the text orientation classifier.
    pub use_angle_cls: bool,
    /// Deprecated: use `device`.
    pub use_gpu: bool,
    /// PaddlePaddle has no MPS support; `mps` resolves to the CPU.
    pub device: RequestedDevice,
    /// GPU memory ceiling in GB.
    pub gpu_memory_limit: Option<f64>,
    pub fallback_to_cpu: bool,
    pub use_space_char: bool,
    pub use_zero_copy_run: bool,
}

impl Default for PaddleOcrConfig {
    fn default() -> Self {
        Self {
            cls_image_shape: "3,48,192".to_string(),
            det_algorithm: DetectionAlgorithm::Db,
            det_db_box_thresh: 0.5,
            det_db_thresh: 0.3,
            det_db_unclip_ratio: 2.0,
            det_east_cover_thresh: 0.1,
            det_east_nms_thresh: 0.2,
            det_east_score_thresh: 0.8,
            det_max_side_len: 960,
            det_model_dir: None,
            drop_score: 0.5,
            enable_mkldnn: None,
            gpu_mem: 8000,
            language: "en".to_string(),
            max_text_length: 25,
            rec: true,
            rec_algorithm: RecognitionAlgorithm::Crnn,
            rec_image_shape: "3,32,320".to_string(),
            rec_model_dir: None,
            table: true,
            use_angle_cls: true,
            use_gpu: false,
            device: RequestedDevice::Auto,
            gpu_memory_limit: None,
            fallback_to_cpu: true,
            use_space_char: true,
            use_zero_copy_run: false,
        }
    }
}

fn parse_image_shape(field: &str, value: &str) -> Result<[u32; 3]> {
    let dims: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| KreuzbergError::validation_with_source(format!("Invalid {}: '{}'", field, value), e))?;

    match dims.as_slice() {
        &[c, h, w] if c > 0 && h > 0 && w > 0 => Ok([c, h, w]),
        _ => Err(KreuzbergError::validation(format!(
            "Invalid {}: '{}'. Expected 'channels,height,width' with positive values",
            field, value
        ))),
    }
}

impl PaddleOcrConfig {
    /// Check thresholds, image shapes, memory limit and language.
    pub fn validate(&self) -> Result<()> {
        parse_image_shape("cls_image_shape", &self.cls_image_shape)?;
        parse_image_shape("rec_image_shape", &self.rec_image_shape)?;

        let thresholds = [
            ("det_db_box_thresh", self.det_db_box_thresh),
            ("det_db_thresh", self.det_db_thresh),
            ("det_east_cover_thresh", self.det_east_cover_thresh),
            ("det_east_nms_thresh", self.det_east_nms_thresh),
            ("det_east_score_thresh", self.det_east_score_thresh),
            ("drop_score", self.drop_score),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(KreuzbergError::validation(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if !(self.det_db_unclip_ratio.is_finite() && self.det_db_unclip_ratio > 0.0) {
            return Err(KreuzbergError::validation(format!(
                "det_db_unclip_ratio must be positive, got {}",
                self.det_db_unclip_ratio
            )));
        }

        if let Some(limit) = self.gpu_memory_limit
            && !(limit.is_finite() && limit > 0.0)
        {
            return Err(KreuzbergError::validation(format!(
                "gpu_memory_limit must be a positive finite number, got {}",
                limit
            )));
        }

        validate_language_code(&self.language)?;
        Ok(())
    }

    /// The device preference carried by this configuration.
    pub fn device_request(&self) -> DeviceRequest {
        DeviceRequest {
            device: self.device,
            memory_limit_gb: self.gpu_memory_limit,
            fallback_to_cpu: self.fallback_to_cpu,
        }
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `KreuzbergError::Validation` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| KreuzbergError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| KreuzbergError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| KreuzbergError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, choosing the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(KreuzbergError::validation(format!(
                "Unsupported config file format: {}. Expected .toml, .yaml, .yml or .json",
                path.display()
            ))),
        }
    }

    /// Discover `kreuzberg-paddle.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(KreuzbergError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "Discovered PaddleOCR config");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| KreuzbergError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
