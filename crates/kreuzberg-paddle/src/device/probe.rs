//! Hardware capability probes.
//!
//! A probe answers "is this device class present, and what does it look like right
//! now?". Discovery treats any probe failure as "device class absent", so probes
//! may return errors freely.

use serde::{Deserialize, Serialize};

use super::types::{DeviceInfo, DeviceType, MemoryInfo};
use crate::Result;

/// Source of truth for accelerator availability.
///
/// Probes must be cheap and thread-safe; `discover` calls them on every resolution.
pub trait DeviceProbe: Send + Sync {
    /// Probe name, for logging.
    fn name(&self) -> &str;

    fn cuda_available(&self) -> bool {
        false
    }

    /// One entry per CUDA device, with memory sampled now.
    fn cuda_devices(&self) -> Result<Vec<DeviceInfo>> {
        Ok(Vec::new())
    }

    fn mps_available(&self) -> bool {
        false
    }

    fn mps_device(&self) -> Result<Option<DeviceInfo>> {
        Ok(None)
    }

    /// Fresh memory figures for `device`.
    ///
    /// `None` means the probe cannot re-sample; callers use the device's snapshot.
    fn memory_info(&self, _device: &DeviceInfo) -> Option<MemoryInfo> {
        None
    }

    /// Release cached allocations on devices of this type.
    fn release_cache(&self, _device_type: DeviceType) -> Result<()> {
        Ok(())
    }
}

/// Reports no accelerators.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuOnlyProbe;

impl DeviceProbe for CpuOnlyProbe {
    fn name(&self) -> &str {
        "cpu-only"
    }
}

/// Reports what the build target implies without touching any driver.
///
/// Apple-silicon macOS always has the integrated GPU; CUDA needs a runtime this
/// probe does not load, so it is never reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformProbe;

impl DeviceProbe for PlatformProbe {
    fn name(&self) -> &str {
        "platform"
    }

    fn mps_available(&self) -> bool {
        cfg!(all(target_os = "macos", target_arch = "aarch64"))
    }

    fn mps_device(&self) -> Result<Option<DeviceInfo>> {
        Ok(self.mps_available().then(DeviceInfo::mps))
    }
}

/// A declared device inventory, typically loaded from configuration.
///
/// ```toml
/// mps = false
///
/// [[cuda]]
/// device_type = "cuda"
/// device_id = 0
/// name = "NVIDIA A10G"
/// memory_total_gb = 24.0
/// memory_available_gb = 22.5
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticProbe {
    pub cuda: Vec<DeviceInfo>,
    pub mps: bool,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cuda(mut self, device: DeviceInfo) -> Self {
        self.cuda.push(device);
        self
    }

    pub fn with_mps(mut self) -> Self {
        self.mps = true;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::KreuzbergError::validation(format!("Invalid device inventory: {}", e)))
    }
}

impl DeviceProbe for StaticProbe {
    fn name(&self) -> &str {
        "static"
    }

    fn cuda_available(&self) -> bool {
        !self.cuda.is_empty()
    }

    fn cuda_devices(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self.cuda.clone())
    }

    fn mps_available(&self) -> bool {
        self.mps
    }

    fn mps_device(&self) -> Result<Option<DeviceInfo>> {
        Ok(self.mps.then(DeviceInfo::mps))
    }

    fn memory_info(&self, device: &DeviceInfo) -> Option<MemoryInfo> {
        if device.device_type != DeviceType::Cuda {
            return None;
        }
        // Entries without an id are told apart by name.
        self.cuda
            .iter()
            .find(|d| d.device_id == device.device_id && (device.device_id.is_some() || d.name == device.name))
            .map(|d| MemoryInfo {
                total_gb: d.memory_total_gb,
                available_gb: d.memory_available_gb,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_memory_info_without_ids() {
        let probe = StaticProbe::from_toml_str(
            r#"
[[cuda]]
device_type = "cuda"
name = "A"
memory_total_gb = 8.0
memory_available_gb = 2.0

[[cuda]]
device_type = "cuda"
name = "B"
memory_total_gb = 24.0
memory_available_gb = 20.0
"#,
        )
        .unwrap();

        let devices = probe.cuda_devices().unwrap();
        let b = probe.memory_info(&devices[1]).unwrap();
        assert_eq!(b.total_gb, Some(24.0));
        assert_eq!(b.available_gb, Some(20.0));
        assert_eq!(probe.memory_info(&devices[0]).unwrap().total_gb, Some(8.0));

        let unknown = DeviceInfo::cuda(0, "A", 8.0, 2.0);
        assert_eq!(probe.memory_info(&unknown), None);
    }

    #[test]
    fn test_cpu_only_probe_reports_nothing() {
        let probe = CpuOnlyProbe;
        assert!(!probe.cuda_available());
        assert!(!probe.mps_available());
        assert!(probe.cuda_devices().unwrap().is_empty());
        assert!(probe.mps_device().unwrap().is_none());
        assert!(probe.release_cache(DeviceType::Cuda).is_ok());
    }

    #[test]
    fn test_platform_probe_never_reports_cuda() {
        let probe = PlatformProbe;
        assert!(!probe.cuda_available());
        assert_eq!(probe.mps_device().unwrap().is_some(), probe.mps_available());
    }

    #[test]
    fn test_static_probe_from_toml() {
        let probe = StaticProbe::from_toml_str(
            r#"
mps = true

[[cuda]]
device_type = "cuda"
device_id = 0
name = "NVIDIA A10G"
memory_total_gb = 24.0
memory_available_gb = 22.5
"#,
        )
        .unwrap();

        assert!(probe.cuda_available());
        assert!(probe.mps_available());
        let devices = probe.cuda_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name.as_deref(), Some("NVIDIA A10G"));
        assert_eq!(probe.mps_device().unwrap(), Some(DeviceInfo::mps()));
    }

    #[test]
    fn test_static_probe_invalid_toml() {
        let result = StaticProbe::from_toml_str("cuda = 12");
        assert!(matches!(result, Err(crate::KreuzbergError::Validation { .. })));
    }

    #[test]
    fn test_static_probe_memory_info_by_id() {
        let probe = StaticProbe::new()
            .with_cuda(DeviceInfo::cuda(0, "GPU 0", 8.0, 6.0))
            .with_cuda(DeviceInfo::cuda(1, "GPU 1", 16.0, 12.0));

        let stale = DeviceInfo::cuda(1, "GPU 1", 16.0, 15.0);
        let fresh = probe.memory_info(&stale).unwrap();
        assert_eq!(fresh.total_gb, Some(16.0));
        assert_eq!(fresh.available_gb, Some(12.0));

        assert!(probe.memory_info(&DeviceInfo::mps()).is_none());
    }
}
