use once_cell::sync::Lazy;
use std::collections::BTreeSet;

use crate::{KreuzbergError, Result};

/// Language codes accepted by PaddleOCR's bundled models.
pub static PADDLEOCR_SUPPORTED_LANGUAGE_CODES: Lazy<BTreeSet<&'static str>> =
    Lazy::new(|| ["ch", "en", "french", "german", "japan", "korean"].into_iter().collect());

/// Normalise a language code to PaddleOCR's form.
///
/// Codes are matched case-insensitively and returned lowercased.
///
/// # Errors
///
/// `KreuzbergError::Validation` naming the code and the supported set.
pub fn validate_language_code(lang_code: &str) -> Result<String> {
    let normalized = lang_code.to_lowercase();
    if PADDLEOCR_SUPPORTED_LANGUAGE_CODES.contains(normalized.as_str()) {
        return Ok(normalized);
    }

    let supported = PADDLEOCR_SUPPORTED_LANGUAGE_CODES
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(",");
    Err(KreuzbergError::validation(format!(
        "The provided language code '{}' is not supported by PaddleOCR (supported: {})",
        lang_code, supported
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_language_code_valid() {
        assert_eq!(validate_language_code("en").unwrap(), "en");
        assert_eq!(validate_language_code("ch").unwrap(), "ch");
        assert_eq!(validate_language_code("german").unwrap(), "german");
    }

    #[test]
    fn test_validate_language_code_case_insensitive() {
        assert_eq!(validate_language_code("EN").unwrap(), "en");
        assert_eq!(validate_language_code("Japan").unwrap(), "japan");
    }

    #[test]
    fn test_validate_language_code_invalid() {
        let err = validate_language_code("eng").unwrap_err();
        assert!(matches!(err, KreuzbergError::Validation { .. }));
        let message = err.to_string();
        assert!(message.contains("'eng'"));
        assert!(message.contains("ch,en,french,german,japan,korean"));
    }

    #[test]
    fn test_language_codes_exist() {
        assert!(PADDLEOCR_SUPPORTED_LANGUAGE_CODES.contains("korean"));
        assert!(!PADDLEOCR_SUPPORTED_LANGUAGE_CODES.contains("deu"));
    }
}
