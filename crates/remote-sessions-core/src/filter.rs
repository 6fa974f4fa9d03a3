//! Session filter predicates.
//!
//! The same criteria are applied to locally tracked sessions and to sessions
//! returned by remote queries, so both sources produce structurally identical
//! results for the same filter.

use serde::{Deserialize, Serialize};

use crate::session::{Session, SessionId, SessionState};

/// A conjunction of optional predicates.
///
/// Name patterns and instance ids form independent OR-groups whose results
/// are unioned, then intersected with the state predicate: a session matches
/// if it matches (any name pattern OR any instance id) AND the state filter.
/// Empty criteria match every session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Wildcard patterns matched against `Session.name` (`*` and `?`).
    pub name_patterns: Vec<String>,
    /// Exact matches against `Session.instance_id`.
    pub instance_ids: Vec<SessionId>,
    /// Exact state match; `None` means any state.
    pub state: Option<SessionState>,
}

impl FilterCriteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_name(mut self, pattern: impl Into<String>) -> Self {
        self.name_patterns.push(pattern.into());
        self
    }

    #[must_use]
    pub fn with_instance_id(mut self, id: SessionId) -> Self {
        self.instance_ids.push(id);
        self
    }

    #[must_use]
    pub const fn with_state(mut self, state: SessionState) -> Self {
        self.state = Some(state);
        self
    }

    /// Whether no predicate is set ("list everything" mode).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_patterns.is_empty() && self.instance_ids.is_empty() && self.state.is_none()
    }

    /// Apply the criteria to one session. Pure and stateless.
    #[must_use]
    pub fn matches(&self, session: &Session) -> bool {
        let has_identity_filter = !self.name_patterns.is_empty() || !self.instance_ids.is_empty();
        if has_identity_filter {
            let by_name = self
                .name_patterns
                .iter()
                .any(|p| wildcard_match(p, &session.name));
            let by_id = self.instance_ids.contains(&session.instance_id);
            if !by_name && !by_id {
                return false;
            }
        }
        self.state.is_none_or(|s| s == session.state)
    }
}

/// Case-insensitive wildcard match supporting `*` (any run) and `?` (any
/// single character).
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    let text: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            // Backtrack: let the last `*` absorb one more character.
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}
