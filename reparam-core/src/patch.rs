//! Offset-anchored edits and the merge pass that applies them
//!
//! Global invariants enforced:
//! - Edits address the original text only; no edit is rebased on another
//! - The change list is append-only during a run
//! - Application is all-or-nothing: a contract violation yields no output

use crate::error::PatchError;
use crate::span::SourceSpan;
use serde::Serialize;

/// What produced an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Statement inserted at the start of a function body
    Prologue,
    /// Parameter text removed (or replaced by a placeholder) in a parameter list
    Removal,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditKind::Prologue => "prologue",
            EditKind::Removal => "removal",
        }
    }
}

/// Replace `[start, end)` of the original text with `text`
///
/// A zero-length range is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub kind: EditKind,
}

impl Edit {
    pub fn insert(at: usize, text: impl Into<String>, kind: EditKind) -> Self {
        Edit {
            start: at,
            end: at,
            text: text.into(),
            kind,
        }
    }

    pub fn delete(span: SourceSpan, kind: EditKind) -> Self {
        Edit {
            start: span.start,
            end: span.end,
            text: String::new(),
            kind,
        }
    }

    pub fn replace(span: SourceSpan, text: impl Into<String>, kind: EditKind) -> Self {
        Edit {
            start: span.start,
            end: span.end,
            text: text.into(),
            kind,
        }
    }

    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(self.start, self.end)
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Append-only list of edits shared by every stage working on one file
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
    edits: Vec<Edit>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        tracing::trace!(start = edit.start, end = edit.end, text = %edit.text, "edit");
        self.edits.push(edit);
    }

    pub fn extend(&mut self, edits: impl IntoIterator<Item = Edit>) {
        for edit in edits {
            self.push(edit);
        }
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn as_slice(&self) -> &[Edit] {
        &self.edits
    }

    pub fn into_vec(self) -> Vec<Edit> {
        self.edits
    }
}

/// Apply edits to `source`
///
/// Edits are ordered by `(start, end)`; edits with equal keys keep the order in
/// which they were appended, so insertions sharing an anchor come out in
/// emission order and an insertion at a deletion's start lands before it.
///
/// Rejected (caller error, never merged):
/// - inverted or out-of-bounds ranges, or boundaries inside a UTF-8 sequence
/// - two non-empty ranges that overlap
/// - an insertion strictly inside a non-empty range
pub fn apply_edits(source: &str, edits: &[Edit]) -> Result<String, PatchError> {
    for edit in edits {
        validate_range(source, edit)?;
    }

    let mut ordered: Vec<&Edit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.start, e.end));

    check_disjoint(&ordered)?;

    let inserted: usize = ordered.iter().map(|e| e.text.len()).sum();
    let mut output = String::with_capacity(source.len() + inserted);
    let mut cursor = 0;
    for edit in ordered {
        output.push_str(&source[cursor..edit.start]);
        output.push_str(&edit.text);
        cursor = edit.end;
    }
    output.push_str(&source[cursor..]);

    Ok(output)
}

fn validate_range(source: &str, edit: &Edit) -> Result<(), PatchError> {
    if edit.start > edit.end {
        return Err(PatchError::Inverted {
            start: edit.start,
            end: edit.end,
        });
    }
    if edit.end > source.len() {
        return Err(PatchError::OutOfBounds {
            start: edit.start,
            end: edit.end,
            len: source.len(),
        });
    }
    for offset in [edit.start, edit.end] {
        if !source.is_char_boundary(offset) {
            return Err(PatchError::NotCharBoundary { offset });
        }
    }
    Ok(())
}

/// Ordered edits must not overlap; insertions may touch a range's boundaries
fn check_disjoint(ordered: &[&Edit]) -> Result<(), PatchError> {
    // Furthest end reached so far by a non-empty range, with that range
    let mut covered: Option<&Edit> = None;
    for edit in ordered {
        if let Some(prev) = covered {
            if edit.start < prev.end {
                return Err(PatchError::Overlap {
                    first_start: prev.start,
                    first_end: prev.end,
                    second_start: edit.start,
                    second_end: edit.end,
                });
            }
        }
        if !edit.is_insertion() {
            covered = Some(edit);
        }
    }
    Ok(())
}
