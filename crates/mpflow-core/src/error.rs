// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

use crate::ident::Scenario;

/// Defects in the shape or wiring of a dataflow model.
///
/// These are never transient: once raised, the firing data of the graph is
/// not a usable schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// An actor has no channel, state or primary input, so its firing times
    /// are underdetermined.
    #[error("actor `{actor}` has no inputs")]
    NoInputs {
        /// Name of the offending actor.
        actor: String,
    },
    /// A scenario-aware actor reads from a state but has no scenario.
    #[error("actor `{actor}` has state inputs but no scenario")]
    MissingScenario {
        /// Name of the offending actor.
        actor: String,
    },
    /// A state must produce in a scenario for which no provider is wired.
    #[error("state `{state}` has no provider for scenario `{scenario}`")]
    MissingProvider {
        /// Name of the offending state.
        state: String,
        /// Scenario that lacks a provider.
        scenario: Scenario,
    },
    /// An actor's execution delay is negative, NaN or infinite.
    #[error("actor `{actor}` has an invalid delay")]
    InvalidDelay {
        /// Name of the offending actor.
        actor: String,
    },
    /// An actor with this name is already registered.
    #[error("duplicate actor name: {0}")]
    DuplicateActor(String),
    /// A state with this name is already registered.
    #[error("duplicate state name: {0}")]
    DuplicateState(String),
    /// No actor with this name is registered.
    #[error("unknown actor: {0}")]
    UnknownActor(String),
    /// No state with this name is registered.
    #[error("unknown state: {0}")]
    UnknownState(String),
}
