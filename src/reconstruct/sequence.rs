//! Sparse, growable token sequence.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Joins tokens that occupy the same position.
pub const SEPARATOR: char = '|';

/// Position → tokens recovered for one field.
///
/// Positions need not be contiguous. Tokens appended at an occupied position
/// are joined with [`SEPARATOR`] in the order they arrive.
///
/// ```
/// use palimpsest::reconstruct::GrowableStringArray;
///
/// let mut seq = GrowableStringArray::new();
/// seq.append(2, "run");
/// seq.append(2, "ran");
/// seq.append(0, "she");
///
/// assert_eq!(seq.get(2), Some("run|ran"));
/// assert_eq!(seq.get(1), None);
/// assert_eq!(seq.size(), 3);
/// assert_eq!(seq.to_text(" "), "she run|ran");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowableStringArray {
    slots: BTreeMap<u32, String>,
}

impl GrowableStringArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `token` at `position`.
    pub fn append(&mut self, position: u32, token: &str) {
        match self.slots.get_mut(&position) {
            Some(slot) => {
                slot.push(SEPARATOR);
                slot.push_str(token);
            }
            None => {
                self.slots.insert(position, token.to_string());
            }
        }
    }

    pub fn get(&self, position: u32) -> Option<&str> {
        self.slots.get(&position).map(String::as_str)
    }

    /// Number of populated positions.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max_position(&self) -> Option<u32> {
        self.slots.last_key_value().map(|(position, _)| *position)
    }

    /// Largest position plus one, 0 when empty.
    pub fn size(&self) -> usize {
        self.max_position().map_or(0, |p| p as usize + 1)
    }

    /// Populated slots in position order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.slots.iter().map(|(p, s)| (*p, s.as_str()))
    }

    /// Populated slots joined in position order; gaps are skipped.
    pub fn to_text(&self, separator: &str) -> String {
        self.slots
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for GrowableStringArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(" "))
    }
}
