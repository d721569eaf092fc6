//! Detection of provider-side safety blocks in image generation failures.
//!
//! Imagen reports a blocked prompt only through the wording of its error
//! message, so detection is a best-effort substring match. The classifier is
//! swappable per client for when that wording changes.

use std::sync::Arc;

pub type SafetyClassifier = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub const SAFETY_BLOCK_MARKERS: &[&str] = &["sensitive words", "Responsible AI practices"];

pub fn is_safety_block(message: &str) -> bool {
    SAFETY_BLOCK_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

pub fn default_classifier() -> SafetyClassifier {
    Arc::new(is_safety_block)
}
