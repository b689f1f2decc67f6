// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Graph registry owning every actor and state.
//!
//! Actors and states never own each other; they hold [`ActorId`] /
//! [`StateId`] handles into this registry. That keeps feedback loops
//! (actor → state → actor) expressible without reference cycles.
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::actor::{Actor, ChannelInput, StateInput};
use crate::error::ModelError;
use crate::ident::{ActorId, Scenario, StateId};
use crate::maxplus::{Sequence, Timestamp};
use crate::state::State;

/// Outcome of replacing a firing sequence during one local update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Growth {
    /// Length is the same as before the update.
    pub unchanged: bool,
    /// Every previously computed element is still present and equal.
    pub prefix_preserved: bool,
}

impl Growth {
    pub(crate) fn replace(slot: &mut Sequence, next: Sequence) -> Self {
        let unchanged = slot.len() == next.len();
        let prefix_preserved = next.get(..slot.len()).is_some_and(|head| head == &slot[..]);
        *slot = next;
        Self {
            unchanged,
            prefix_preserved,
        }
    }
}

/// Firing data handed to external renderers for one actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorSchedule {
    /// Actor name.
    pub name: String,
    /// Scenario of the actor, if any.
    pub scenario: Option<Scenario>,
    /// `(start, end)` of every firing.
    pub intervals: Vec<(Timestamp, Timestamp)>,
}

/// A dataflow graph: fixed topology, mutable firing data.
#[derive(Clone, Debug, Default)]
pub struct DataflowGraph {
    actors: Vec<Actor>,
    states: Vec<State>,
    actor_names: BTreeMap<String, ActorId>,
    state_names: BTreeMap<String, StateId>,
}

impl DataflowGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an actor with execution delay `delay`.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateActor`] if the name is taken and
    /// [`ModelError::InvalidDelay`] unless `delay` is finite and non-negative.
    pub fn add_actor(
        &mut self,
        name: impl Into<String>,
        delay: Timestamp,
        scenario: Option<Scenario>,
    ) -> Result<ActorId, ModelError> {
        let name = name.into();
        if self.actor_names.contains_key(&name) {
            return Err(ModelError::DuplicateActor(name));
        }
        if !delay.is_finite() || delay < 0.0 {
            return Err(ModelError::InvalidDelay { actor: name });
        }
        let id = ActorId(self.actors.len());
        self.actor_names.insert(name.clone(), id);
        self.actors.push(Actor::new(name, delay, scenario));
        Ok(id)
    }

    /// Registers a state buffer.
    ///
    /// # Errors
    /// Returns [`ModelError::DuplicateState`] if the name is taken.
    pub fn add_state<I, O>(
        &mut self,
        name: impl Into<String>,
        input_scenarios: I,
        output_scenarios: O,
    ) -> Result<StateId, ModelError>
    where
        I: IntoIterator<Item = Scenario>,
        O: IntoIterator<Item = Scenario>,
    {
        let name = name.into();
        if self.state_names.contains_key(&name) {
            return Err(ModelError::DuplicateState(name));
        }
        let id = StateId(self.states.len());
        self.state_names.insert(name.clone(), id);
        self.states.push(State::new(
            name,
            input_scenarios.into_iter().collect::<BTreeSet<_>>(),
            output_scenarios.into_iter().collect::<BTreeSet<_>>(),
        ));
        Ok(id)
    }

    /// Looks up an actor handle by name.
    pub fn actor_id(&self, name: &str) -> Option<ActorId> {
        self.actor_names.get(name).copied()
    }

    /// Looks up a state handle by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_names.get(name).copied()
    }

    /// Borrow an actor.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this graph.
    pub fn actor(&self, id: ActorId) -> &Actor {
        &self.actors[id.0]
    }

    /// Borrow a state.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this graph.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    /// All actors in registration order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// All states in registration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Handles of all actors in registration order.
    pub fn actor_ids(&self) -> impl Iterator<Item = ActorId> {
        (0..self.actors.len()).map(ActorId)
    }

    /// Handles of all states in registration order.
    pub fn state_ids(&self) -> impl Iterator<Item = StateId> {
        (0..self.states.len()).map(StateId)
    }

    /// Wires a channel from `input.producer` into `consumer`.
    ///
    /// One channel per producer: a second registration replaces the first and
    /// the replaced input is returned.
    pub fn add_channel_input(
        &mut self,
        consumer: ActorId,
        input: ChannelInput,
    ) -> Option<ChannelInput> {
        let replaced = self.actors[consumer.0].insert_channel_input(input);
        if replaced.is_some() {
            debug!(
                consumer = self.actors[consumer.0].name(),
                producer = self.actors[input.producer.0].name(),
                "channel input replaced"
            );
        }
        replaced
    }

    /// Wires a state dependency into `consumer`; replaces any previous
    /// dependency on the same state.
    pub fn add_state_input(&mut self, consumer: ActorId, input: StateInput) -> Option<StateInput> {
        let replaced = self.actors[consumer.0].insert_state_input(input);
        if replaced.is_some() {
            debug!(
                consumer = self.actors[consumer.0].name(),
                state = self.states[input.state.0].name(),
                "state input replaced"
            );
        }
        replaced
    }

    /// Appends an exogenous arrival sequence to `consumer`.
    pub fn add_primary_input(&mut self, consumer: ActorId, sequence: impl Into<Sequence>) {
        self.actors[consumer.0].push_primary_input(sequence.into());
    }

    /// Makes `actor` the provider of `state` while `scenario` is active.
    pub fn set_provider(
        &mut self,
        state: StateId,
        scenario: Scenario,
        actor: ActorId,
    ) -> Option<ActorId> {
        self.states[state.0].insert_provider(scenario, actor)
    }

    /// Assigns (or clears) the scenario of `actor`.
    pub fn set_scenario(&mut self, actor: ActorId, scenario: Option<Scenario>) {
        self.actors[actor.0].set_scenario(scenario);
    }

    /// Applies the SDF update rule to one actor.
    ///
    /// Returns `true` when the number of firings did not change.
    ///
    /// # Errors
    /// Returns [`ModelError::NoInputs`] for an actor without channel or
    /// primary inputs.
    pub fn update_firings(&mut self, id: ActorId) -> Result<bool, ModelError> {
        Ok(self.relax_actor(id)?.unchanged)
    }

    /// Applies the scenario-aware update rule to one actor.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingScenario`] if the actor has state inputs
    /// but no scenario.
    pub fn update_firings_sadf(
        &mut self,
        id: ActorId,
        scenario_sequence: &[Scenario],
    ) -> Result<bool, ModelError> {
        Ok(self.relax_actor_sadf(id, scenario_sequence)?.unchanged)
    }

    /// Rebuilds the production stream of one state.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingProvider`] when an output scenario occurs
    /// in the sequence without a registered provider.
    pub fn update_state_sadf(
        &mut self,
        id: StateId,
        scenario_sequence: &[Scenario],
    ) -> Result<bool, ModelError> {
        Ok(self.relax_state(id, scenario_sequence)?.unchanged)
    }

    pub(crate) fn relax_actor(&mut self, id: ActorId) -> Result<Growth, ModelError> {
        let next = self.actors[id.0].next_firings(self)?;
        Ok(self.actors[id.0].replace_firings(next))
    }

    pub(crate) fn relax_actor_sadf(
        &mut self,
        id: ActorId,
        scenario_sequence: &[Scenario],
    ) -> Result<Growth, ModelError> {
        let next = self.actors[id.0].next_firings_sadf(self, scenario_sequence)?;
        Ok(self.actors[id.0].replace_firings(next))
    }

    pub(crate) fn relax_state(
        &mut self,
        id: StateId,
        scenario_sequence: &[Scenario],
    ) -> Result<Growth, ModelError> {
        let next = self.states[id.0].next_firings(self, scenario_sequence)?;
        Ok(self.states[id.0].replace_firings(next))
    }

    /// Firing intervals of every actor, for rendering.
    pub fn schedule(&self) -> Vec<ActorSchedule> {
        self.actors
            .iter()
            .map(|actor| ActorSchedule {
                name: actor.name().to_owned(),
                scenario: actor.scenario().cloned(),
                intervals: actor.firing_intervals(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn growth_tracks_length_and_prefix() {
        let mut slot = vec![1.0, 2.0];
        assert_eq!(
            Growth::replace(&mut slot, vec![1.0, 2.0, 3.0]),
            Growth {
                unchanged: false,
                prefix_preserved: true
            }
        );
        assert_eq!(
            Growth::replace(&mut slot, vec![1.0, 9.0, 3.0]),
            Growth {
                unchanged: true,
                prefix_preserved: false
            }
        );
        assert_eq!(
            Growth::replace(&mut slot, vec![1.0]),
            Growth {
                unchanged: false,
                prefix_preserved: false
            }
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut graph = DataflowGraph::new();
        graph.add_actor("A", 1.0, None).unwrap();
        assert_eq!(
            graph.add_actor("A", 2.0, None),
            Err(ModelError::DuplicateActor("A".into()))
        );
        let none: [Scenario; 0] = [];
        graph.add_state("s", none.clone(), none.clone()).unwrap();
        assert_eq!(
            graph.add_state("s", none.clone(), none),
            Err(ModelError::DuplicateState("s".into()))
        );
    }

    #[test]
    fn negative_or_non_finite_delays_are_rejected() {
        let mut graph = DataflowGraph::new();
        for delay in [-1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(
                graph.add_actor("A", delay, None),
                Err(ModelError::InvalidDelay { actor: "A".into() })
            );
        }
        assert!(graph.actor_id("A").is_none());
        let a = graph.add_actor("A", 0.0, None).unwrap();
        assert_eq!(graph.actor(a).delay(), 0.0);
    }

    #[test]
    fn channel_registration_is_last_write_wins() {
        let mut graph = DataflowGraph::new();
        let a = graph.add_actor("A", 1.0, None).unwrap();
        let b = graph.add_actor("B", 1.0, None).unwrap();
        assert!(graph.add_channel_input(b, ChannelInput::new(a)).is_none());
        let replaced = graph.add_channel_input(b, ChannelInput::new(a).initial_tokens(2));
        assert_eq!(replaced, Some(ChannelInput::new(a)));
        let inputs: Vec<_> = graph.actor(b).channel_inputs().copied().collect();
        assert_eq!(inputs, vec![ChannelInput::new(a).initial_tokens(2)]);
    }

    #[test]
    fn names_resolve_to_handles() {
        let mut graph = DataflowGraph::new();
        let a = graph.add_actor("A", 1.0, None).unwrap();
        let none: [Scenario; 0] = [];
        let s = graph.add_state("s", none.clone(), none).unwrap();
        assert_eq!(graph.actor_id("A"), Some(a));
        assert_eq!(graph.state_id("s"), Some(s));
        assert_eq!(graph.actor_id("missing"), None);
        assert_eq!(graph.actor_ids().collect::<Vec<_>>(), vec![a]);
        assert_eq!(graph.state_ids().collect::<Vec<_>>(), vec![s]);
    }

    #[test]
    fn primary_input_actor_fires_on_arrivals() {
        let mut graph = DataflowGraph::new();
        let a = graph.add_actor("A", 5.0, None).unwrap();
        graph.add_primary_input(a, vec![0.0, 10.0, 20.0]);
        assert!(!graph.update_firings(a).unwrap());
        assert!(graph.update_firings(a).unwrap());
        let schedule = graph.schedule();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].name, "A");
        assert_eq!(
            schedule[0].intervals,
            vec![(0.0, 5.0), (10.0, 15.0), (20.0, 25.0)]
        );
    }
}
