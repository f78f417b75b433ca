use crate::error::{Result, SubsampleError};
use serde::{Deserialize, Serialize};

/// Byte offsets of every token start, in file order.
///
/// Tables built by the scanner also carry `end`, the offset just past the
/// last complete token. It is a boundary, not a token, and is never selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetTable {
    starts: Vec<u64>,
    end: Option<u64>,
}

impl OffsetTable {
    /// Adopts offsets supplied by a caller that already knows them.
    pub fn from_starts(starts: Vec<u64>) -> Result<Self> {
        if let Some(i) = first_unordered(&starts) {
            return Err(SubsampleError::UnorderedOffsets(i));
        }
        Ok(Self { starts, end: None })
    }

    /// Builds a table from scanner boundaries `[0, b1, .., bk]`.
    pub(crate) fn from_boundaries(mut boundaries: Vec<u64>) -> Self {
        debug_assert!(first_unordered(&boundaries).is_none());
        let end = boundaries.pop();
        Self {
            starts: boundaries,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u64> {
        self.starts.get(index).copied()
    }

    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Token starts followed by the end boundary, when known.
    pub fn boundaries(&self) -> Vec<u64> {
        self.starts.iter().copied().chain(self.end).collect()
    }
}

fn first_unordered(offsets: &[u64]) -> Option<usize> {
    offsets
        .windows(2)
        .position(|pair| pair[0] >= pair[1])
        .map(|i| i + 1)
}
