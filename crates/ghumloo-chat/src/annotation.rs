//! Hidden hotel-id annotation carried on user messages.
//!
//! A resolved reference is appended to the utterance as `[hotel_id:N]` so the
//! reasoning engine can price the hotel without searching again. The tag is
//! removed from anything shown back to the user.

use std::sync::LazyLock;

use regex::Regex;

use ghumloo_core::types::HotelId;

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*hotel_id\s*:\s*[^\]]*\]").unwrap());

/// Append the hidden annotation for `hotel_id`.
pub fn annotate(utterance: &str, hotel_id: &HotelId) -> String {
    format!("{} [hotel_id:{}]", utterance, hotel_id)
}

/// Remove every annotation from `text` and trim the result.
pub fn strip_annotations(text: &str) -> String {
    ANNOTATION_RE.replace_all(text, "").trim().to_string()
}
