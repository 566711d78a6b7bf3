//! Compute-device discovery and resolution.
//!
//! OCR backends that can run on accelerators ask a [`DeviceResolver`] once, before
//! initialising their engine, which device to use:
//!
//! 1. **Discovery** - a [`DeviceProbe`] reports CUDA devices and the Apple-silicon
//!    GPU; the CPU is always available and always last.
//! 2. **Resolution** - `auto` takes the first discovered device, a concrete type takes
//!    the first match, and a missing accelerator falls back to the CPU when allowed.
//! 3. **Memory budget** - a memory limit above a device's total memory is an error;
//!    above its free memory it is only a [`Diagnostic`].
//! 4. **Batch sizing** - [`DeviceResolver::recommended_batch_size`] derives a
//!    best-effort batch size from free memory.
//!
//! Soft conditions go to a [`DiagnosticSink`]; [`TracingSink`] is the default and
//! [`CollectingSink`] keeps them for inspection.
pub mod diagnostics;
pub mod probe;
pub mod resolver;
pub mod types;

pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, TracingSink};
pub use probe::{CpuOnlyProbe, DeviceProbe, PlatformProbe, StaticProbe};
pub use resolver::{
    DEFAULT_ACCELERATOR_BATCH_SIZE, DEFAULT_INPUT_SIZE_MB, DeviceResolver, MAX_BATCH_SIZE, is_backend_gpu_compatible,
};
pub use types::{DeviceInfo, DeviceRequest, DeviceType, MemoryInfo, RequestedDevice};
