// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Search limits for the breathing and matching engines.
//!
//! Both searches are exhaustive unless a limit is set. A limit never changes
//! the answer of a search that finishes under it; hitting one is reported as
//! an error rather than returning a partial result.

/// Tunables shared by [`Breather`](crate::Breather) and
/// [`Matcher`](crate::Matcher).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineSettings {
    /// Branch-and-bound nodes overlap trimming may visit. `None` is unlimited.
    pub trim_node_limit: Option<usize>,
    /// Backtracking nodes the matcher may visit. `None` is unlimited.
    pub search_node_limit: Option<usize>,
}

impl EngineSettings {
    /// Unlimited, exhaustive searches.
    #[must_use]
    pub const fn exhaustive() -> Self {
        Self { trim_node_limit: None, search_node_limit: None }
    }

    /// Same settings with a trim node limit.
    #[must_use]
    pub const fn with_trim_node_limit(mut self, limit: usize) -> Self {
        self.trim_node_limit = Some(limit);
        self
    }

    /// Same settings with a matcher node limit.
    #[must_use]
    pub const fn with_search_node_limit(mut self, limit: usize) -> Self {
        self.search_node_limit = Some(limit);
        self
    }
}
