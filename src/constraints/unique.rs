//! Session-scoped uniqueness tracking
//!
//! One tracker belongs to one validation pass. It is never shared between
//! passes or threads; a new pass starts from an empty tracker.

use std::collections::{HashMap, HashSet};

/// Remembers which keys each tracked slot has produced so far.
///
/// Keys are the canonical formatted text of a cast value, so `1` and `1.0`
/// on a number field collide as they should.
#[derive(Debug, Default)]
pub struct UniqueTracker {
    seen: HashMap<usize, HashSet<String>>,
}

impl UniqueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` for `slot`.
    ///
    /// Returns `true` if the key was already seen, i.e. this occurrence
    /// violates uniqueness. The first occurrence never does.
    pub fn observe(&mut self, slot: usize, key: String) -> bool {
        !self.seen.entry(slot).or_default().insert(key)
    }
}
