//! Engine initialisation: device selection and derived engine options.

use serde::{Deserialize, Serialize};

use super::config::PaddleOcrConfig;
use super::validation::validate_language_code;
use crate::device::{DeviceInfo, DeviceResolver, DeviceType, Diagnostic, RequestedDevice};
use crate::{KreuzbergError, Result};

/// Backend name used in device diagnostics and errors.
pub const PADDLE_BACKEND_NAME: &str = "PaddleOCR";

/// Engine default for `det_db_thresh`.
pub const ENGINE_DET_DB_THRESH: f64 = 0.3;
/// Engine default for `det_db_box_thresh`.
pub const ENGINE_DET_DB_BOX_THRESH: f64 = 0.5;
/// Engine default for `det_db_unclip_ratio`.
pub const ENGINE_DET_DB_UNCLIP_RATIO: f64 = 1.6;

/// Pick the device a PaddleOCR engine should run on.
///
/// The deprecated `use_gpu` flag is reported but never overrides `device`.
/// PaddlePaddle cannot use MPS, so an `mps` request becomes a CPU request.
///
/// # Errors
///
/// Whatever [`DeviceResolver::resolve`] returns, except that an unavailable CPU
/// request without `use_gpu` yields a plain CPU descriptor.
pub fn resolve_device_config(config: &PaddleOcrConfig, resolver: &DeviceResolver) -> Result<DeviceInfo> {
    let mut device = config.device;

    if config.use_gpu {
        let message = if device == RequestedDevice::Auto {
            "The 'use_gpu' parameter is deprecated and will be removed in a future version. \
             Use 'device=\"cuda\"' or 'device=\"auto\"' instead."
        } else {
            "Both 'use_gpu' and 'device' parameters specified. The 'use_gpu' parameter is deprecated. \
             Using 'device' parameter value."
        };
        resolver.emit(Diagnostic::DeprecatedParameter {
            parameter: "use_gpu".to_string(),
            message: message.to_string(),
        });
    }

    if device == RequestedDevice::Mps {
        resolver.emit(Diagnostic::UnsupportedAccelerator {
            backend: "PaddlePaddle".to_string(),
            device: DeviceType::Mps,
        });
        device = RequestedDevice::Cpu;
    }

    match resolver.resolve(device, PADDLE_BACKEND_NAME, config.gpu_memory_limit, config.fallback_to_cpu) {
        Err(KreuzbergError::DeviceUnavailable { .. }) if !config.use_gpu && device == RequestedDevice::Cpu => {
            Ok(DeviceInfo::cpu())
        }
        other => other,
    }
}

/// Whether MKL-DNN can be used on the given platform.
///
/// `os` and `arch` use the names from `std::env::consts` (`linux`, `macos`,
/// `x86_64`, ...). Windows-style names like `amd64` are accepted too.
pub fn is_mkldnn_supported(os: &str, arch: &str) -> bool {
    let os = os.to_lowercase();
    let arch = arch.to_lowercase();

    match os.as_str() {
        "linux" | "windows" => arch.contains("x86") || arch == "amd64" || arch.contains("intel"),
        "macos" | "darwin" => arch == "x86_64",
        _ => false,
    }
}

/// [`is_mkldnn_supported`] for the running platform.
pub fn current_platform_supports_mkldnn() -> bool {
    is_mkldnn_supported(std::env::consts::OS, std::env::consts::ARCH)
}

/// Options an engine is constructed with, after device resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub language: String,
    pub use_gpu: bool,
    pub enable_mkldnn: bool,
    pub use_angle_cls: bool,
    pub det_db_thresh: f64,
    pub det_db_box_thresh: f64,
    pub det_db_unclip_ratio: f64,
    /// MB.
    pub gpu_mem: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            use_gpu: false,
            enable_mkldnn: false,
            use_angle_cls: true,
            det_db_thresh: ENGINE_DET_DB_THRESH,
            det_db_box_thresh: ENGINE_DET_DB_BOX_THRESH,
            det_db_unclip_ratio: ENGINE_DET_DB_UNCLIP_RATIO,
            gpu_mem: 8000,
        }
    }
}

impl EngineOptions {
    /// Derive engine options for `device`.
    ///
    /// The GPU is only used when the device is CUDA and a GPU runtime is installed.
    /// An explicit `enable_mkldnn` is used as given; when unset, MKL-DNN is on for
    /// supported platforms unless the GPU is used. A memory limit on a CUDA device
    /// overrides `gpu_mem`.
    ///
    /// # Errors
    ///
    /// `KreuzbergError::Validation` for an unsupported language or a memory limit
    /// that is not a positive finite number.
    pub fn derive(config: &PaddleOcrConfig, device: &DeviceInfo, gpu_runtime_available: bool) -> Result<Self> {
        let language = validate_language_code(&config.language)?;
        let on_cuda = device.device_type == DeviceType::Cuda;
        let use_gpu = on_cuda && gpu_runtime_available;

        let enable_mkldnn = config
            .enable_mkldnn
            .unwrap_or_else(|| !use_gpu && current_platform_supports_mkldnn());

        let gpu_mem = match config.gpu_memory_limit {
            Some(limit) if !(limit.is_finite() && limit > 0.0) => {
                return Err(KreuzbergError::validation(format!(
                    "gpu_memory_limit must be a positive finite number, got {}",
                    limit
                )));
            }
            Some(limit) if on_cuda => (limit * 1024.0) as u32,
            _ => config.gpu_mem,
        };

        Ok(Self {
            language,
            use_gpu,
            enable_mkldnn,
            use_angle_cls: config.use_angle_cls,
            det_db_thresh: config.det_db_thresh,
            det_db_box_thresh: config.det_db_box_thresh,
            det_db_unclip_ratio: config.det_db_unclip_ratio,
            gpu_mem,
        })
    }
}
