//! Run-scoped identifier set
//!
//! Created at the start of a run, append-only while it lasts, dropped at the end.
//! Every identifier seen in any discovered file and every name introduced by a
//! rewrite is recorded here so later stages can pick non-colliding names.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
pub struct IdentifierSet {
    names: HashSet<String>,
    /// Next suffix to try per prefix
    next_suffix: HashMap<String, usize>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name; returns false when it was already present
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Allocate `<prefix><n>` with the smallest `n` not yet taken and record it
    pub fn fresh(&mut self, prefix: &str) -> String {
        let mut suffix = self.next_suffix.get(prefix).copied().unwrap_or(0);
        loop {
            let candidate = format!("{}{}", prefix, suffix);
            suffix += 1;
            if !self.names.contains(&candidate) {
                self.next_suffix.insert(prefix.to_string(), suffix);
                self.names.insert(candidate.clone());
                return candidate;
            }
        }
    }
}
