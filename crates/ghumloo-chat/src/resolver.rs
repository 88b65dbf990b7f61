//! Hotel reference resolution.
//!
//! Maps phrases like "iski price", "option 2" or "dusra hotel" onto a hotel
//! id using the session's [`HotelIndex`] and the hotel currently in focus.
//! Strategies run in a fixed order and the first hit wins.

use std::sync::LazyLock;

use regex::Regex;

use ghumloo_core::types::HotelId;

use crate::index::HotelIndex;

/// Demonstrative / anaphoric phrases (English, Hindi, Hinglish).
const REFERENCE_PHRASES: &[&str] = &[
    "iski",
    "iska",
    "iske",
    "uski",
    "uska",
    "uske",
    "yeh wala",
    "ye wala",
    "yahan",
    "yaha",
    "this hotel",
    "this one",
    "is hotel",
    "same hotel",
    "above",
    "mentioned",
    "previous",
];

/// Keys never matched by the free-text scan.
const SCAN_GUARD_KEYS: &[&str] = &["option", "1", "2", "3", "4", "5"];

/// Spoken ordinals, checked in table order.
const SPOKEN_ORDINALS: &[(&str, &str)] = &[
    ("pehla", "1"),
    ("pehle", "1"),
    ("first", "1"),
    ("dusra", "2"),
    ("dusre", "2"),
    ("second", "2"),
    ("teesra", "3"),
    ("teesre", "3"),
    ("third", "3"),
    ("chautha", "4"),
    ("chauthe", "4"),
    ("fourth", "4"),
    ("panchwa", "5"),
    ("panchwe", "5"),
    ("fifth", "5"),
];

static ORDINAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)(?:st|nd|rd|th)?\s*(?:option|number|hotel|wala)",
        r"option\s*(\d+)",
        r"number\s*(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid ordinal regex"))
    .collect()
});

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    Anaphora,
    KeyScan,
    OrdinalPattern,
    SpokenOrdinal,
}

/// A resolved hotel reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub hotel_id: HotelId,
    pub strategy: ResolutionStrategy,
}

/// Stateless resolver over an index snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct HotelReferenceResolver;

impl HotelReferenceResolver {
    /// Resolve `utterance` to a hotel id, or `None` when nothing matches.
    pub fn resolve(
        &self,
        utterance: &str,
        index: &HotelIndex,
        focus: Option<&HotelId>,
    ) -> Option<HotelId> {
        self.resolve_with_strategy(utterance, index, focus)
            .map(|r| r.hotel_id)
    }

    /// Like [`resolve`](Self::resolve) but also reports the winning strategy.
    pub fn resolve_with_strategy(
        &self,
        utterance: &str,
        index: &HotelIndex,
        focus: Option<&HotelId>,
    ) -> Option<Resolution> {
        let text = utterance.to_lowercase();

        let found = |hotel_id: HotelId, strategy| Some(Resolution { hotel_id, strategy });

        // A reference phrase without a focus hotel falls through to the other strategies.
        if let Some(focus) = focus {
            if REFERENCE_PHRASES.iter().any(|p| text.contains(p)) {
                return found(focus.clone(), ResolutionStrategy::Anaphora);
            }
        }

        // Plain substring containment, not token matching.
        if let Some((_, record)) = index
            .iter()
            .find(|(key, _)| !SCAN_GUARD_KEYS.contains(key) && text.contains(key))
        {
            return found(record.id.clone(), ResolutionStrategy::KeyScan);
        }

        for pattern in ORDINAL_PATTERNS.iter() {
            let Some(caps) = pattern.captures(&text) else {
                continue;
            };
            if let Some(record) = caps.get(1).and_then(|n| index.get(n.as_str())) {
                return found(record.id.clone(), ResolutionStrategy::OrdinalPattern);
            }
        }

        SPOKEN_ORDINALS
            .iter()
            .filter(|(word, _)| text.contains(word))
            .find_map(|(_, key)| index.get(key))
            .and_then(|record| found(record.id.clone(), ResolutionStrategy::SpokenOrdinal))
    }
}
