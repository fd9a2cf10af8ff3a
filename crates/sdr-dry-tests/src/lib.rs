// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for sdr crates.
#![forbid(unsafe_code)]
//!
//! This crate collects the helpers the sdr test suites kept rewriting.
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`formation`] - Formation builders and call-like movement helpers

pub mod config;
pub mod formation;

// Re-export commonly used items at crate root for convenience
pub use config::InMemoryConfigStore;
pub use formation::{assert_diagram, side_step, standard_names, step_forward, FormationBuilder};
