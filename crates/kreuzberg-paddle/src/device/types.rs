use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{KreuzbergError, Result};

/// Kind of compute device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Cpu,
    /// NVIDIA accelerator.
    Cuda,
    /// Apple-silicon integrated GPU (Metal Performance Shaders).
    Mps,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Cpu => "cpu",
            DeviceType::Cuda => "cuda",
            DeviceType::Mps => "mps",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device a caller asks for: a concrete type, or `Auto` for the best discovered one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedDevice {
    #[default]
    Auto,
    Cpu,
    Cuda,
    Mps,
}

impl RequestedDevice {
    /// Concrete device type, `None` for `Auto`.
    pub fn device_type(&self) -> Option<DeviceType> {
        match self {
            RequestedDevice::Auto => None,
            RequestedDevice::Cpu => Some(DeviceType::Cpu),
            RequestedDevice::Cuda => Some(DeviceType::Cuda),
            RequestedDevice::Mps => Some(DeviceType::Mps),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestedDevice::Auto => "auto",
            RequestedDevice::Cpu => "cpu",
            RequestedDevice::Cuda => "cuda",
            RequestedDevice::Mps => "mps",
        }
    }
}

impl From<DeviceType> for RequestedDevice {
    fn from(device_type: DeviceType) -> Self {
        match device_type {
            DeviceType::Cpu => RequestedDevice::Cpu,
            DeviceType::Cuda => RequestedDevice::Cuda,
            DeviceType::Mps => RequestedDevice::Mps,
        }
    }
}

impl fmt::Display for RequestedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestedDevice {
    type Err = KreuzbergError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(RequestedDevice::Auto),
            "cpu" => Ok(RequestedDevice::Cpu),
            "cuda" => Ok(RequestedDevice::Cuda),
            "mps" => Ok(RequestedDevice::Mps),
            other => Err(KreuzbergError::validation(format!(
                "Invalid device '{}'. Must be one of: auto, cpu, cuda, mps",
                other
            ))),
        }
    }
}

/// Snapshot of one compute device.
///
/// Memory figures are sampled at discovery time and are advisory only; they go
/// stale as soon as they are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_type: DeviceType,

    /// Index for multi-GPU hosts. `None` for CPU or a single integrated GPU.
    #[serde(default)]
    pub device_id: Option<u32>,

    /// Total memory in GB, if known.
    #[serde(default)]
    pub memory_total_gb: Option<f64>,

    /// Currently available memory in GB, if known.
    #[serde(default)]
    pub memory_available_gb: Option<f64>,

    #[serde(default)]
    pub name: Option<String>,
}

impl DeviceInfo {
    pub fn cpu() -> Self {
        Self {
            device_type: DeviceType::Cpu,
            device_id: None,
            memory_total_gb: None,
            memory_available_gb: None,
            name: Some("CPU".to_string()),
        }
    }

    pub fn mps() -> Self {
        Self {
            device_type: DeviceType::Mps,
            device_id: None,
            memory_total_gb: None,
            memory_available_gb: None,
            name: Some("Apple Silicon GPU (MPS)".to_string()),
        }
    }

    pub fn cuda(device_id: u32, name: impl Into<String>, total_gb: f64, available_gb: f64) -> Self {
        Self {
            device_type: DeviceType::Cuda,
            device_id: Some(device_id),
            memory_total_gb: Some(total_gb),
            memory_available_gb: Some(available_gb),
            name: Some(name.into()),
        }
    }

    /// Name for messages: the device name, or its type when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.device_type.as_str())
    }

    pub fn is_cpu(&self) -> bool {
        self.device_type == DeviceType::Cpu
    }
}

/// Memory figures for a device, in GB.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_gb: Option<f64>,
    pub available_gb: Option<f64>,
}

/// A caller's device preference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRequest {
    pub device: RequestedDevice,

    /// Memory ceiling in GB to check against the chosen device.
    pub memory_limit_gb: Option<f64>,

    /// Substitute the CPU when the requested accelerator is missing.
    pub fallback_to_cpu: bool,
}

impl Default for DeviceRequest {
    fn default() -> Self {
        Self {
            device: RequestedDevice::Auto,
            memory_limit_gb: None,
            fallback_to_cpu: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_device_from_str() {
        assert_eq!("auto".parse::<RequestedDevice>().unwrap(), RequestedDevice::Auto);
        assert_eq!("CUDA".parse::<RequestedDevice>().unwrap(), RequestedDevice::Cuda);
        assert_eq!(" mps ".parse::<RequestedDevice>().unwrap(), RequestedDevice::Mps);
        assert!(matches!(
            "tpu".parse::<RequestedDevice>(),
            Err(KreuzbergError::Validation { .. })
        ));
    }

    #[test]
    fn test_requested_device_type() {
        assert_eq!(RequestedDevice::Auto.device_type(), None);
        assert_eq!(RequestedDevice::Cpu.device_type(), Some(DeviceType::Cpu));
        assert_eq!(RequestedDevice::from(DeviceType::Mps), RequestedDevice::Mps);
    }

    #[test]
    fn test_device_info_constructors() {
        let cpu = DeviceInfo::cpu();
        assert!(cpu.is_cpu());
        assert_eq!(cpu.display_name(), "CPU");

        let gpu = DeviceInfo::cuda(1, "A100", 40.0, 38.5);
        assert_eq!(gpu.device_id, Some(1));
        assert_eq!(gpu.memory_total_gb, Some(40.0));

        let unnamed = DeviceInfo { name: None, ..DeviceInfo::mps() };
        assert_eq!(unnamed.display_name(), "mps");
    }

    #[test]
    fn test_device_request_defaults_from_json() {
        let request: DeviceRequest = serde_json::from_str(r#"{"device": "cuda"}"#).unwrap();
        assert_eq!(request.device, RequestedDevice::Cuda);
        assert!(request.fallback_to_cpu);
        assert!(request.memory_limit_gb.is_none());
    }

    #[test]
    fn test_device_type_serde_lowercase() {
        assert_eq!(serde_json::to_string(&DeviceType::Mps).unwrap(), "\"mps\"");
        let parsed: DeviceType = serde_json::from_str("\"cuda\"").unwrap();
        assert_eq!(parsed, DeviceType::Cuda);
    }
}
