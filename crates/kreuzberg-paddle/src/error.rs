//! Error types for the PaddleOCR integration.
//!
//! All fallible operations return [`KreuzbergError`]. The variants follow the same
//! policy as the rest of Kreuzberg:
//!
//! - `Io` errors always bubble up unchanged.
//! - Configuration and input problems are `Validation` errors with context.
//! - Device resolution failures carry structured fields (`DeviceUnavailable`,
//!   `MemoryLimitExceeded`) so callers can report what was requested and what
//!   the host actually offers.
//!
//! Line reconstruction never fails; empty engine output degrades to empty text.
//!
//! # Example
//!
//! ```rust
//! use kreuzberg_paddle::{KreuzbergError, Result};
//!
//! fn check_threshold(value: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&value) {
//!         return Err(KreuzbergError::validation(format!("threshold out of range: {value}")));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(check_threshold(0.5).is_ok());
//! ```
use thiserror::Error;

use crate::device::DeviceType;

/// Result type alias using `KreuzbergError`.
pub type Result<T> = std::result::Result<T, KreuzbergError>;

/// Main error type for OCR and device operations.
#[derive(Debug, Error)]
pub enum KreuzbergError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    /// The requested device type was not discovered and no fallback applied.
    #[error(
        "Requested device '{requested}' is not available for {backend} (available: {})",
        format_device_types(available)
    )]
    DeviceUnavailable {
        requested: DeviceType,
        backend: String,
        available: Vec<DeviceType>,
    },

    /// The memory limit can never be satisfied by the device.
    #[error("Requested memory limit ({requested_gb:.1}GB) exceeds device capacity ({total_gb:.1}GB)")]
    MemoryLimitExceeded {
        device: DeviceType,
        device_name: Option<String>,
        requested_gb: f64,
        total_gb: f64,
        available_gb: Option<f64>,
    },

    #[error("{0}")]
    Other(String),
}

fn format_device_types(types: &[DeviceType]) -> String {
    types.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
}

impl From<serde_json::Error> for KreuzbergError {
    fn from(err: serde_json::Error) -> Self {
        KreuzbergError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl KreuzbergError {
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    /// True for resolution-layer failures (`DeviceUnavailable`, `MemoryLimitExceeded`).
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            KreuzbergError::DeviceUnavailable { .. } | KreuzbergError::MemoryLimitExceeded { .. }
        )
    }
}
