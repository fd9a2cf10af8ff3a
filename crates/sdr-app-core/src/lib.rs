// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for sdr tools (config port, engine prefs).
//! Keeps storage adapters thin and the engine crate free of I/O.

pub mod config;
pub mod prefs;
