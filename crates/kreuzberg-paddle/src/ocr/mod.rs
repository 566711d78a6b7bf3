//! PaddleOCR integration.
//!
//! This module turns PaddleOCR's raw text boxes into plain text and prepares the
//! engine's configuration for the resolved compute device.
//!
//! # Features
//!
//! - **Line reconstruction**: Group boxes into lines and emit them in reading order
//! - **Configuration**: Engine parameters with TOML/YAML/JSON loading and discovery
//! - **Device selection**: Deprecated `use_gpu` handling, MPS fallback, memory limits
//! - **Backend adapter**: Image loading and parallel batches over a caller-supplied engine
//!
//! # Example
//!
//! ```rust
//! use kreuzberg_paddle::ocr::{Detection, reconstruct_result};
//!
//! let page = vec![
//!     Detection::from_rect(50.0, 100.0, 30.0, 20.0, "B", 0.9),
//!     Detection::from_rect(10.0, 102.0, 30.0, 20.0, "A", 0.8),
//!     Detection::from_rect(5.0, 130.0, 30.0, 20.0, "C", 0.7),
//! ];
//!
//! let result = reconstruct_result(&[Some(page)], 200, 200);
//! assert_eq!(result.content, "A B\nC");
//! ```
//!
//! # Optional Feature
//!
//! [`PaddleBackend`] requires the `paddle` feature (enabled by default).
pub mod config;
pub mod engine;
pub mod geometry;
pub mod lines;
pub mod validation;

#[cfg(feature = "paddle")]
pub mod backend;

pub use config::{CONFIG_FILE_NAME, DetectionAlgorithm, PaddleOcrConfig, RecognitionAlgorithm};
pub use engine::{
    EngineOptions, PADDLE_BACKEND_NAME, current_platform_supports_mkldnn, is_mkldnn_supported, resolve_device_config,
};
pub use geometry::{Detection, Page, Point, pages_from_json};
pub use lines::{LINE_TOLERANCE, LineGroup, LineReconstructor, ReconstructedText, reconstruct_result};
pub use validation::{PADDLEOCR_SUPPORTED_LANGUAGE_CODES, validate_language_code};

#[cfg(feature = "paddle")]
pub use backend::{BatchItemResult, EngineError, PaddleBackend, PaddleEngine};
