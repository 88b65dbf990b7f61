//! Hotel index: lookup keys for the most recent search results.
//!
//! Every search registers each hotel under its full name, `"option N"`, the
//! bare position `"N"` and the first word of its name. Keys are lowercase and
//! iterate in insertion order, which the resolver relies on.

use std::collections::HashMap;

use ghumloo_core::types::{HotelId, HotelListing, HotelRecord};

// =============================================================================
// HotelIndex
// =============================================================================

/// Ordered map from lowercase lookup key to hotel record.
#[derive(Debug, Clone, Default)]
pub struct HotelIndex {
    entries: Vec<(String, HotelRecord)>,
    positions: HashMap<String, usize>,
}

impl HotelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole index with keys for `listings`.
    ///
    /// Clears unconditionally. Positions are 1-based over the full listing
    /// slice, so a skipped listing (blank name or missing id) still consumes
    /// its number. Returns the id of the first registered hotel.
    pub fn rebuild(&mut self, listings: &[HotelListing]) -> Option<HotelId> {
        self.entries.clear();
        self.positions.clear();

        let mut first = None;
        for (position, listing) in listings.iter().enumerate().map(|(i, l)| (i + 1, l)) {
            let Some(record) = listing.to_record() else {
                continue;
            };

            let full_name = record.display_name.to_lowercase();
            let first_word = full_name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();

            self.insert(full_name, record.clone());
            self.insert(format!("option {}", position), record.clone());
            self.insert(position.to_string(), record.clone());
            // Earlier hotels keep a shared first word.
            if !self.positions.contains_key(&first_word) {
                self.insert(first_word, record.clone());
            }

            first.get_or_insert(record.id);
        }
        first
    }

    /// Insert or overwrite. An overwritten key keeps its original position.
    fn insert(&mut self, key: String, record: HotelRecord) {
        match self.positions.get(&key) {
            Some(&slot) => self.entries[slot].1 = record,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, record));
            }
        }
    }

    /// Look up a key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&HotelRecord> {
        self.positions
            .get(&key.to_lowercase())
            .map(|&slot| &self.entries[slot].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys and records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HotelRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name for `id`, taken from the first name-derived key that
    /// points at it (positional keys are skipped).
    pub fn display_name(&self, id: &HotelId) -> Option<&str> {
        self.iter()
            .find(|(key, record)| {
                record.id == *id && !key.starts_with("option ") && !is_all_digits(key)
            })
            .map(|(_, record)| record.display_name.as_str())
    }
}

pub(crate) fn is_all_digits(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_digit())
}

// =============================================================================
// HotelMemory
// =============================================================================

/// Per-conversation hotel memory: the index plus the hotel in focus.
#[derive(Debug, Clone, Default)]
pub struct HotelMemory {
    index: HotelIndex,
    focus: Option<HotelId>,
}

impl HotelMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a search result.
    ///
    /// An empty result leaves both the index and the focus untouched and
    /// returns `false`. Otherwise the index is rebuilt and the focus moves to
    /// the first registered hotel (it stays put if no listing was usable).
    pub fn remember_search(&mut self, listings: &[HotelListing]) -> bool {
        if listings.is_empty() {
            return false;
        }
        if let Some(first) = self.index.rebuild(listings) {
            self.focus = Some(first);
        }
        true
    }

    /// Put `id` in focus, e.g. after an explicit rate-plan lookup.
    pub fn focus_on(&mut self, id: HotelId) {
        self.focus = Some(id);
    }

    pub fn focus(&self) -> Option<&HotelId> {
        self.focus.as_ref()
    }

    pub fn index(&self) -> &HotelIndex {
        &self.index
    }
}
