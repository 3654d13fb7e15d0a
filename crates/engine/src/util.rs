//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim and NFC-normalize a user supplied name, rejecting blank input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::MissingName(label.to_string()));
    }
    Ok(normalized)
}
