// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared graph fixtures and generators for mpflow crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`fixtures`] - Small hand-checked SDF and SADF graphs
//! - [`random`] - Proptest strategies producing acyclic SDF graphs

pub mod fixtures;
pub mod random;

pub use fixtures::{alternating_sadf, single_actor, two_actor_chain, AlternatingSadf};
pub use random::{arb_acyclic_graph, AcyclicBlueprint};
