//! Per-document term vectors.

use serde::{Deserialize, Serialize};

/// One term of a document's term vector for a field.
///
/// A vector without positions carries only term frequencies, not layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermVectorEntry {
    pub term: String,
    #[serde(default)]
    pub freq: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Vec<(u32, u32)>>,
}

impl TermVectorEntry {
    /// Entry with frequency 1 and no layout information.
    pub fn new<S: Into<String>>(term: S) -> Self {
        TermVectorEntry {
            term: term.into(),
            freq: 1,
            positions: None,
            offsets: None,
        }
    }

    pub fn with_freq(mut self, freq: u32) -> Self {
        self.freq = freq;
        self
    }

    /// Attach positions; the frequency follows the number of positions.
    pub fn with_positions(mut self, positions: Vec<u32>) -> Self {
        self.freq = positions.len() as u32;
        self.positions = Some(positions);
        self
    }

    pub fn with_offsets(mut self, offsets: Vec<(u32, u32)>) -> Self {
        self.offsets = Some(offsets);
        self
    }
}
