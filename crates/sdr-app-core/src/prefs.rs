// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted engine preferences (breathing and matcher search limits).

use sdr_core::EngineSettings;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ConfigService, ConfigStore};

/// Config key the engine preferences are stored under.
pub const ENGINE_PREFS_KEY: &str = "engine";

/// Saved preferences for the formation engines.
///
/// Missing fields mean "no limit", matching [`EngineSettings::default`],
/// so an older or hand-trimmed file still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnginePrefs {
    /// Overlap trimming limits.
    pub breathe: BreathePrefs,
    /// Formation search limits.
    pub matcher: MatcherPrefs,
}

/// Limits for the breathing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BreathePrefs {
    /// Branch-and-bound nodes before breathing fails; `None` searches exhaustively.
    pub trim_node_limit: Option<usize>,
}

/// Limits for the formation matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MatcherPrefs {
    /// Backtracking nodes before a match fails; `None` searches exhaustively.
    pub search_node_limit: Option<usize>,
}

impl EnginePrefs {
    /// Settings handed to `Breather` and `Matcher`.
    pub const fn settings(&self) -> EngineSettings {
        EngineSettings {
            trim_node_limit: self.breathe.trim_node_limit,
            search_node_limit: self.matcher.search_node_limit,
        }
    }

    /// Rejects limits that would make every search fail outright.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = |field: &str| ConfigError::Invalid {
            key: ENGINE_PREFS_KEY.to_owned(),
            reason: format!("{field} must be positive"),
        };
        if self.breathe.trim_node_limit == Some(0) {
            return Err(zero("breathe.trim_node_limit"));
        }
        if self.matcher.search_node_limit == Some(0) {
            return Err(zero("matcher.search_node_limit"));
        }
        Ok(())
    }

    /// Loads and validates the stored prefs, defaulting when none are saved.
    pub fn load<S: ConfigStore>(config: &ConfigService<S>) -> Result<Self, ConfigError> {
        let prefs: Self = config.load_or_default(ENGINE_PREFS_KEY)?;
        prefs.validate()?;
        Ok(prefs)
    }

    /// Persists these prefs under [`ENGINE_PREFS_KEY`].
    pub fn save<S: ConfigStore>(&self, config: &ConfigService<S>) -> Result<(), ConfigError> {
        self.validate()?;
        config.save(ENGINE_PREFS_KEY, self)
    }
}

impl From<EngineSettings> for EnginePrefs {
    fn from(s: EngineSettings) -> Self {
        Self {
            breathe: BreathePrefs { trim_node_limit: s.trim_node_limit },
            matcher: MatcherPrefs { search_node_limit: s.search_node_limit },
        }
    }
}
