//! Document id ranges.

use std::fmt;
use std::str::FromStr;

use crate::error::{PalimpsestError, Result};

/// A set of document ids given as inclusive ranges.
///
/// Parsed from expressions such as `0-5,15,32-100`. Overlapping and
/// adjacent ranges are merged.
///
/// ```
/// use palimpsest::export::DocRanges;
///
/// let ranges: DocRanges = "5-7,0,6-9".parse().unwrap();
/// assert_eq!(ranges.iter().collect::<Vec<_>>(), vec![0, 5, 6, 7, 8, 9]);
/// assert_eq!(ranges.to_string(), "0,5-9");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRanges {
    /// Sorted, disjoint, non-adjacent inclusive ranges.
    ranges: Vec<(u64, u64)>,
}

impl DocRanges {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every id below `max_doc`.
    pub fn all(max_doc: u64) -> Self {
        if max_doc == 0 {
            Self::empty()
        } else {
            DocRanges {
                ranges: vec![(0, max_doc - 1)],
            }
        }
    }

    /// Parse a range expression. Whitespace is not allowed.
    pub fn parse(expr: &str) -> Result<Self> {
        if expr.is_empty() {
            return Err(PalimpsestError::invalid_argument("empty range expression"));
        }
        if expr.chars().any(char::is_whitespace) {
            return Err(PalimpsestError::invalid_argument(format!(
                "range expression must not contain whitespace: '{expr}'"
            )));
        }

        let mut ranges = DocRanges::empty();
        for part in expr.split(',') {
            let (start, end) = match part.split_once('-') {
                Some((start, end)) => (parse_id(start, expr)?, parse_id(end, expr)?),
                None => {
                    let id = parse_id(part, expr)?;
                    (id, id)
                }
            };
            if start > end {
                return Err(PalimpsestError::invalid_argument(format!(
                    "range {start}-{end} is reversed in '{expr}'"
                )));
            }
            ranges.insert(start, end);
        }
        Ok(ranges)
    }

    /// Add the inclusive range `start..=end`.
    pub fn insert(&mut self, start: u64, end: u64) {
        let mut start = start;
        let mut end = end;
        let mut merged = Vec::with_capacity(self.ranges.len() + 1);
        for &(s, e) in &self.ranges {
            if e.saturating_add(1) < start || end.saturating_add(1) < s {
                merged.push((s, e));
            } else {
                start = start.min(s);
                end = end.max(e);
            }
        }
        merged.push((start, end));
        merged.sort_unstable();
        self.ranges = merged;
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of ids in the set, saturating at `u64::MAX`.
    pub fn cardinality(&self) -> u64 {
        self.ranges
            .iter()
            .fold(0u64, |n, (s, e)| n.saturating_add((e - s).saturating_add(1)))
    }

    /// Number of ids in the set below `limit`.
    pub fn cardinality_below(&self, limit: u64) -> u64 {
        self.ranges
            .iter()
            .take_while(|(s, _)| *s < limit)
            .map(|(s, e)| (*e).min(limit - 1) - s + 1)
            .sum()
    }

    pub fn contains(&self, doc_id: u64) -> bool {
        self.ranges
            .iter()
            .any(|(s, e)| (*s..=*e).contains(&doc_id))
    }

    /// Ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.ranges.iter().flat_map(|(s, e)| *s..=*e)
    }

    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }
}

fn parse_id(text: &str, expr: &str) -> Result<u64> {
    text.parse::<u64>().map_err(|e| {
        PalimpsestError::invalid_argument(format!(
            "invalid document id '{text}' in '{expr}': {e}"
        ))
    })
}

impl FromStr for DocRanges {
    type Err = PalimpsestError;

    fn from_str(s: &str) -> Result<Self> {
        DocRanges::parse(s)
    }
}

impl fmt::Display for DocRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (s, e)) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if s == e {
                write!(f, "{s}")?;
            } else {
                write!(f, "{s}-{e}")?;
            }
        }
        Ok(())
    }
}
