//! Structured warnings for soft, non-fatal conditions.
//!
//! Resolution keeps going after these events; they are reported through a
//! [`DiagnosticSink`] chosen by the caller instead of a process-wide channel.

use parking_lot::Mutex;
use std::fmt;

use super::types::{DeviceType, RequestedDevice};

/// A non-fatal condition observed while resolving a device.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A deprecated configuration parameter was used.
    DeprecatedParameter { parameter: String, message: String },

    /// The requested accelerator was missing; the CPU was substituted.
    DeviceFallback { requested: RequestedDevice, backend: String },

    /// The memory limit fits the device but not its currently free memory.
    AvailableMemoryExceeded {
        device: String,
        requested_gb: f64,
        available_gb: f64,
    },

    /// The backend cannot use this accelerator type at all.
    UnsupportedAccelerator { backend: String, device: DeviceType },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DeprecatedParameter { message, .. } => f.write_str(message),
            Diagnostic::DeviceFallback { requested, backend } => write!(
                f,
                "Requested device '{}' not available for {}. Falling back to CPU.",
                requested, backend
            ),
            Diagnostic::AvailableMemoryExceeded {
                device,
                requested_gb,
                available_gb,
            } => write!(
                f,
                "Requested memory limit ({:.1}GB) exceeds available memory ({:.1}GB) on {}",
                requested_gb, available_gb, device
            ),
            Diagnostic::UnsupportedAccelerator { backend, device } => write!(
                f,
                "{} does not support {} acceleration. Falling back to CPU.",
                backend, device
            ),
        }
    }
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::DeprecatedParameter { .. } => "deprecated_parameter",
            Diagnostic::DeviceFallback { .. } => "device_fallback",
            Diagnostic::AvailableMemoryExceeded { .. } => "available_memory_exceeded",
            Diagnostic::UnsupportedAccelerator { .. } => "unsupported_accelerator",
        }
    }
}

/// Receiver for diagnostics.
///
/// Sinks must be thread-safe; a single resolver may be shared across workers.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        tracing::warn!(kind = diagnostic.kind(), "{}", diagnostic);
    }
}

/// Records diagnostics in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.events.lock().push(diagnostic);
    }
}
