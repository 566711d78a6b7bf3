use std::sync::Arc;

use super::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use super::probe::{DeviceProbe, PlatformProbe};
use super::types::{DeviceInfo, DeviceRequest, DeviceType, MemoryInfo, RequestedDevice};
use crate::{KreuzbergError, Result};

/// Batch size when an accelerator does not report free memory.
pub const DEFAULT_ACCELERATOR_BATCH_SIZE: usize = 4;

/// Upper bound on recommended batch sizes.
pub const MAX_BATCH_SIZE: usize = 32;

/// Fraction of available memory the batch heuristic may plan for.
const USABLE_MEMORY_FRACTION: f64 = 0.5;

/// Headroom multiplier for intermediate tensors per input.
const TENSOR_OVERHEAD_FACTOR: f64 = 4.0;

/// Default per-item input size for batch estimation, in MB.
pub const DEFAULT_INPUT_SIZE_MB: f64 = 10.0;

/// Discovers compute devices and resolves device requests against them.
///
/// The resolver holds no mutable state: every call re-runs discovery, so it is
/// safe to share one instance (e.g. behind an `Arc`) across worker threads.
/// Serializing access to engine handles bound to a device is the caller's job.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use kreuzberg_paddle::device::{CollectingSink, CpuOnlyProbe, DeviceResolver, DeviceType, RequestedDevice};
///
/// let sink = Arc::new(CollectingSink::new());
/// let resolver = DeviceResolver::new(Arc::new(CpuOnlyProbe)).with_sink(sink.clone());
///
/// let device = resolver.resolve(RequestedDevice::Cuda, "PaddleOCR", None, true).unwrap();
/// assert_eq!(device.device_type, DeviceType::Cpu);
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Clone)]
pub struct DeviceResolver {
    probe: Arc<dyn DeviceProbe>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for DeviceResolver {
    fn default() -> Self {
        Self::new(Arc::new(PlatformProbe))
    }
}

impl std::fmt::Debug for DeviceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceResolver")
            .field("probe", &self.probe.name())
            .finish_non_exhaustive()
    }
}

impl DeviceResolver {
    /// Resolver reporting diagnostics through `tracing`.
    pub fn new(probe: Arc<dyn DeviceProbe>) -> Self {
        Self {
            probe,
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn probe(&self) -> &dyn DeviceProbe {
        self.probe.as_ref()
    }

    /// Emit a diagnostic through this resolver's sink.
    pub fn emit(&self, diagnostic: Diagnostic) {
        self.sink.emit(diagnostic);
    }

    /// List available devices, most preferred first.
    ///
    /// CUDA devices come first, then the integrated GPU if present, then exactly one
    /// CPU entry. Probe failures drop that device class and are logged at debug level.
    pub fn discover(&self) -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        if self.probe.cuda_available() {
            match self.probe.cuda_devices() {
                Ok(cuda) => devices.extend(cuda.into_iter().filter(|d| d.device_type == DeviceType::Cuda)),
                Err(e) => tracing::debug!(probe = self.probe.name(), "CUDA probe failed: {}", e),
            }
        }

        if self.probe.mps_available() {
            match self.probe.mps_device() {
                Ok(Some(mps)) if mps.device_type == DeviceType::Mps => devices.push(mps),
                Ok(_) => {}
                Err(e) => tracing::debug!(probe = self.probe.name(), "MPS probe failed: {}", e),
            }
        }

        devices.push(DeviceInfo::cpu());
        devices
    }

    /// The first discovered device.
    pub fn optimal_device(&self) -> DeviceInfo {
        self.discover().into_iter().next().unwrap_or_else(DeviceInfo::cpu)
    }

    /// Resolve a device request for `backend`.
    ///
    /// - `Auto` picks [`optimal_device`](Self::optimal_device); a memory limit is then
    ///   validated and a violation is an error, never a downgrade.
    /// - A concrete type picks the first matching device and validates the limit.
    /// - When nothing matches and `fallback_to_cpu` is set (and the request was not
    ///   already `cpu`), a [`Diagnostic::DeviceFallback`] is emitted and the CPU returned.
    ///
    /// # Errors
    ///
    /// - `KreuzbergError::DeviceUnavailable` - no match and no fallback
    /// - `KreuzbergError::MemoryLimitExceeded` - limit exceeds the device's total memory
    /// - `KreuzbergError::Validation` - limit is NaN or infinite
    pub fn resolve(
        &self,
        requested: RequestedDevice,
        backend: &str,
        memory_limit_gb: Option<f64>,
        fallback_to_cpu: bool,
    ) -> Result<DeviceInfo> {
        let available = self.discover();

        let Some(device_type) = requested.device_type() else {
            let device = available.into_iter().next().unwrap_or_else(DeviceInfo::cpu);
            if let Some(limit) = memory_limit_gb {
                self.validate_memory(&device, limit)?;
            }
            tracing::debug!(backend, device = %device.device_type, "Resolved auto device");
            return Ok(device);
        };

        if let Some(device) = available.iter().find(|d| d.device_type == device_type) {
            if let Some(limit) = memory_limit_gb {
                self.validate_memory(device, limit)?;
            }
            return Ok(device.clone());
        }

        if fallback_to_cpu
            && device_type != DeviceType::Cpu
            && let Some(cpu) = available.iter().find(|d| d.is_cpu())
        {
            self.sink.emit(Diagnostic::DeviceFallback {
                requested,
                backend: backend.to_string(),
            });
            return Ok(cpu.clone());
        }

        Err(KreuzbergError::DeviceUnavailable {
            requested: device_type,
            backend: backend.to_string(),
            available: available.iter().map(|d| d.device_type).collect(),
        })
    }

    /// [`resolve`](Self::resolve) taking a [`DeviceRequest`].
    pub fn resolve_request(&self, request: &DeviceRequest, backend: &str) -> Result<DeviceInfo> {
        self.resolve(request.device, backend, request.memory_limit_gb, request.fallback_to_cpu)
    }

    /// Current memory figures for `device`.
    ///
    /// CPU memory is not tracked and reports nothing. Accelerators are re-sampled
    /// through the probe when it can, otherwise the discovery snapshot is used.
    pub fn memory_info(&self, device: &DeviceInfo) -> MemoryInfo {
        if device.is_cpu() {
            return MemoryInfo::default();
        }

        self.probe.memory_info(device).unwrap_or(MemoryInfo {
            total_gb: device.memory_total_gb,
            available_gb: device.memory_available_gb,
        })
    }

    /// Check a memory limit against a device.
    ///
    /// A non-finite limit is rejected for every device. Otherwise CPU devices are
    /// exempt. Exceeding total memory is an error; exceeding only the currently
    /// available memory emits [`Diagnostic::AvailableMemoryExceeded`].
    pub fn validate_memory(&self, device: &DeviceInfo, memory_limit_gb: f64) -> Result<()> {
        if !memory_limit_gb.is_finite() {
            return Err(KreuzbergError::validation(format!(
                "Memory limit must be a finite number of GB, got {}",
                memory_limit_gb
            )));
        }

        if device.is_cpu() {
            return Ok(());
        }

        let MemoryInfo { total_gb, available_gb } = self.memory_info(device);

        if let Some(total) = total_gb
            && memory_limit_gb > total
        {
            return Err(KreuzbergError::MemoryLimitExceeded {
                device: device.device_type,
                device_name: device.name.clone(),
                requested_gb: memory_limit_gb,
                total_gb: total,
                available_gb,
            });
        }

        if let Some(available) = available_gb
            && memory_limit_gb > available
        {
            self.sink.emit(Diagnostic::AvailableMemoryExceeded {
                device: device.display_name().to_string(),
                requested_gb: memory_limit_gb,
                available_gb: available,
            });
        }

        Ok(())
    }

    /// Best-effort batch size for inference on `device`.
    ///
    /// CPU always gets 1. Accelerators without a free-memory figure get
    /// [`DEFAULT_ACCELERATOR_BATCH_SIZE`]. Otherwise half the free memory is divided
    /// by four times the per-item input size, clamped to `1..=MAX_BATCH_SIZE`.
    /// This is an estimate, not a reservation.
    pub fn recommended_batch_size(&self, device: &DeviceInfo, input_size_mb: f64) -> usize {
        if device.is_cpu() {
            return 1;
        }

        let Some(available_gb) = self.memory_info(device).available_gb else {
            return DEFAULT_ACCELERATOR_BATCH_SIZE;
        };

        let usable_memory_mb = available_gb * USABLE_MEMORY_FRACTION * 1024.0;
        let estimated = (usable_memory_mb / (input_size_mb * TENSOR_OVERHEAD_FACTOR)).floor();

        // `as` saturates: NaN -> 0, +inf -> usize::MAX.
        (estimated as usize).clamp(1, MAX_BATCH_SIZE)
    }

    /// Release cached memory on the device's type. Never fails.
    pub fn release(&self, device: &DeviceInfo) {
        if device.is_cpu() {
            return;
        }

        if let Err(e) = self.probe.release_cache(device.device_type) {
            tracing::debug!(device = %device.device_type, "Ignoring device cache release failure: {}", e);
        }
    }
}

/// Whether an OCR backend can run on a GPU.
pub fn is_backend_gpu_compatible(backend: &str) -> bool {
    matches!(backend.to_lowercase().as_str(), "easyocr" | "paddleocr")
}
