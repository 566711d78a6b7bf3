//! Kreuzberg PaddleOCR - reading-order reconstruction and device resolution
//!
//! This crate holds the pieces of Kreuzberg's PaddleOCR backend that do not depend on
//! the inference engine itself: rebuilding plain text from detected text boxes, and
//! deciding which compute device (CPU, CUDA, Apple-silicon GPU) an engine runs on.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use kreuzberg_paddle::device::{CpuOnlyProbe, DeviceResolver};
//! use kreuzberg_paddle::ocr::{PaddleOcrConfig, pages_from_json, reconstruct_result, resolve_device_config};
//!
//! # fn main() -> kreuzberg_paddle::Result<()> {
//! let resolver = DeviceResolver::new(Arc::new(CpuOnlyProbe));
//! let device = resolve_device_config(&PaddleOcrConfig::default(), &resolver)?;
//! assert!(device.is_cpu());
//!
//! let pages = pages_from_json(r#"[[[[[0, 0], [40, 0], [40, 20], [0, 20]], ["Hello", 0.95]]]]"#)?;
//! let result = reconstruct_result(&pages, 640, 480);
//! assert_eq!(result.content, "Hello");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Device Module** (`device`): Discovery probes, request resolution, memory checks, batch sizing
//! - **OCR Module** (`ocr`): Box geometry, line reconstruction, engine configuration, backend adapter
//! - **Text** (`text`): Whitespace normalisation shared by OCR output
//!
//! # Features
//!
//! - `paddle` (default): image-facing [`ocr::PaddleBackend`] with parallel batch processing

#![deny(unsafe_code)]

pub mod device;
pub mod error;
pub mod ocr;
pub mod text;
pub mod types;

pub use error::{KreuzbergError, Result};
pub use types::{Chunk, ExtractionResult, Metadata, PLAIN_TEXT_MIME_TYPE};

pub use device::{DeviceInfo, DeviceResolver, DeviceType, RequestedDevice};
