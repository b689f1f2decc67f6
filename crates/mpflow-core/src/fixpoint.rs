// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Kahn-style fixpoint computation of dataflow schedules.
//!
//! Both drivers repeat whole-graph relaxation passes until one complete pass
//! leaves every sequence length unchanged. Updates only ever extend
//! sequences, so the result is the least fixed point and does not depend on
//! the order of entities within a pass.
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::config::FixpointConfig;
use crate::error::ModelError;
use crate::graph::{DataflowGraph, Growth};
use crate::ident::{ActorId, Scenario, StateId};

/// Errors raised while computing a fixpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FixpointError {
    /// The model itself is defective.
    #[error(transparent)]
    Model(#[from] ModelError),
    /// No fixpoint was reached within the configured pass limit.
    #[error("no fixpoint after {passes} passes")]
    Diverged {
        /// Passes completed before giving up.
        passes: usize,
    },
    /// An update shrank a sequence or rewrote an already computed firing.
    #[error("firings of `{entity}` changed an already computed prefix")]
    NotMonotone {
        /// Name of the actor or state.
        entity: String,
    },
}

/// Summary of a converged fixpoint computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixpointReport {
    /// Full passes run, including the final pass that confirmed stability.
    pub passes: usize,
}

struct Passes<'c> {
    config: &'c FixpointConfig,
    done: usize,
}

impl<'c> Passes<'c> {
    fn new(config: &'c FixpointConfig) -> Self {
        Self { config, done: 0 }
    }

    fn begin(&mut self) -> Result<(), FixpointError> {
        if self.config.max_passes.is_some_and(|max| self.done >= max) {
            return Err(FixpointError::Diverged { passes: self.done });
        }
        self.done += 1;
        Ok(())
    }

    fn check(
        &self,
        growth: Growth,
        entity: impl FnOnce() -> String,
    ) -> Result<bool, FixpointError> {
        if self.config.verify_prefixes && !growth.prefix_preserved {
            return Err(FixpointError::NotMonotone { entity: entity() });
        }
        Ok(growth.unchanged)
    }
}

/// Computes the SDF fixpoint over `actors`.
///
/// Every pass applies the plain update rule to each actor in slice order.
///
/// # Errors
/// - [`FixpointError::Model`] if an actor has no inputs.
/// - [`FixpointError::Diverged`] when `config.max_passes` is exhausted.
/// - [`FixpointError::NotMonotone`] if prefix verification is enabled and
///   fails.
#[instrument(skip_all, fields(actors = actors.len()))]
pub fn compute_fixpoint(
    graph: &mut DataflowGraph,
    actors: &[ActorId],
    config: &FixpointConfig,
) -> Result<FixpointReport, FixpointError> {
    let mut passes = Passes::new(config);
    loop {
        passes.begin()?;
        let mut fixpoint = true;
        for &id in actors {
            let growth = graph.relax_actor(id)?;
            // evaluate every actor; no short circuit
            fixpoint &= passes.check(growth, || graph.actor(id).name().to_owned())?;
        }
        trace!(pass = passes.done, fixpoint, "sdf pass");
        if fixpoint {
            debug!(passes = passes.done, "sdf fixpoint reached");
            return Ok(FixpointReport {
                passes: passes.done,
            });
        }
    }
}

/// Computes the SADF fixpoint for `scenario_sequence`.
///
/// Every pass first updates all `actors`, then all `states`.
///
/// # Errors
/// - [`FixpointError::Model`] for missing scenarios or providers.
/// - [`FixpointError::Diverged`] when `config.max_passes` is exhausted.
/// - [`FixpointError::NotMonotone`] if prefix verification is enabled and
///   fails.
#[instrument(
    skip_all,
    fields(steps = scenario_sequence.len(), actors = actors.len(), states = states.len())
)]
pub fn compute_fixpoint_sadf(
    graph: &mut DataflowGraph,
    scenario_sequence: &[Scenario],
    actors: &[ActorId],
    states: &[StateId],
    config: &FixpointConfig,
) -> Result<FixpointReport, FixpointError> {
    let mut passes = Passes::new(config);
    loop {
        passes.begin()?;
        let mut fixpoint = true;
        for &id in actors {
            let growth = graph.relax_actor_sadf(id, scenario_sequence)?;
            fixpoint &= passes.check(growth, || graph.actor(id).name().to_owned())?;
        }
        for &id in states {
            let growth = graph.relax_state(id, scenario_sequence)?;
            fixpoint &= passes.check(growth, || graph.state(id).name().to_owned())?;
        }
        trace!(pass = passes.done, fixpoint, "sadf pass");
        if fixpoint {
            debug!(passes = passes.done, "sadf fixpoint reached");
            return Ok(FixpointReport {
                passes: passes.done,
            });
        }
    }
}

impl DataflowGraph {
    /// SDF fixpoint over every actor in registration order.
    ///
    /// # Errors
    /// See [`compute_fixpoint`].
    pub fn fixpoint(&mut self, config: &FixpointConfig) -> Result<FixpointReport, FixpointError> {
        let actors: Vec<ActorId> = self.actor_ids().collect();
        compute_fixpoint(self, &actors, config)
    }

    /// SADF fixpoint over every actor and state in registration order.
    ///
    /// # Errors
    /// See [`compute_fixpoint_sadf`].
    pub fn fixpoint_sadf(
        &mut self,
        scenario_sequence: &[Scenario],
        config: &FixpointConfig,
    ) -> Result<FixpointReport, FixpointError> {
        let actors: Vec<ActorId> = self.actor_ids().collect();
        let states: Vec<StateId> = self.state_ids().collect();
        compute_fixpoint_sadf(self, scenario_sequence, &actors, &states, config)
    }
}
