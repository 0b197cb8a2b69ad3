//! Zero-based byte ranges into the original source text

use serde::{Deserialize, Serialize};
use swc_common::{BytePos, Span};

/// Half-open byte range `[start, end)` into the original file text
///
/// swc positions are global to a `SourceMap`; every span in this crate is rebased
/// against the owning file's start position so it can index the text directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    /// Byte offset of the start of the span (inclusive)
    pub start: usize,
    /// Byte offset of the end of the span (exclusive)
    pub end: usize,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        SourceSpan { start, end }
    }

    /// Zero-width span at `offset`
    pub fn point(offset: usize) -> Self {
        SourceSpan {
            start: offset,
            end: offset,
        }
    }

    /// Rebase an swc span against the owning file's start position
    pub fn from_swc(span: Span, base: BytePos) -> Self {
        SourceSpan {
            start: span.lo.0.saturating_sub(base.0) as usize,
            end: span.hi.0.saturating_sub(base.0) as usize,
        }
    }

    /// Get the length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this span contains another span
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if this span overlaps with another span
    ///
    /// Zero-width spans (where start == end) don't overlap with anything,
    /// including themselves.
    pub fn overlaps(&self, other: &SourceSpan) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.start < other.end && other.start < self.end
    }

    /// Slice the covered text out of `source`
    pub fn text<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start..self.end)
    }
}
