// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dataflow actors and their local update rules.
use std::collections::BTreeMap;

use crate::error::ModelError;
use crate::graph::{DataflowGraph, Growth};
use crate::ident::{ActorId, Scenario, StateId};
use crate::maxplus::{
    max2, max_n, output_sequence, plus, trace, Sequence, Timestamp, MINUS_INFINITY,
};

/// Channel dependency on another actor's completions.
///
/// Built with [`ChannelInput::new`] and the builder methods; the defaults
/// are zero initial tokens, zero arc delay and initial tokens carrying
/// [`MINUS_INFINITY`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelInput {
    /// Producing actor.
    pub producer: ActorId,
    /// Initial tokens on the channel; negative values consume tokens.
    pub initial_tokens: i64,
    /// Transport delay added to every token.
    pub arc_delay: Timestamp,
    /// Availability time of the initial tokens.
    pub initial_time: Timestamp,
}

impl ChannelInput {
    /// A plain channel from `producer`.
    pub fn new(producer: ActorId) -> Self {
        Self {
            producer,
            initial_tokens: 0,
            arc_delay: 0.0,
            initial_time: MINUS_INFINITY,
        }
    }

    /// Sets the number of initial tokens.
    pub fn initial_tokens(mut self, tokens: i64) -> Self {
        self.initial_tokens = tokens;
        self
    }

    /// Sets the arc delay.
    pub fn arc_delay(mut self, arc_delay: Timestamp) -> Self {
        self.arc_delay = arc_delay;
        self
    }

    /// Sets the time stamp carried by the initial tokens.
    pub fn initial_time(mut self, initial_time: Timestamp) -> Self {
        self.initial_time = initial_time;
        self
    }

    fn sequence(&self, graph: &DataflowGraph) -> Sequence {
        output_sequence(
            &graph.actor(self.producer).completions(),
            self.initial_tokens,
            self.arc_delay,
            self.initial_time,
        )
    }
}

/// Scenario-aware dependency on a [`State`](crate::State).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateInput {
    /// State read from.
    pub state: StateId,
    /// Token shift applied to the state's event stream before splicing.
    pub token_delay: i64,
    /// Time delay added to every spliced event.
    pub arc_delay: Timestamp,
}

impl StateInput {
    /// A plain dependency on `state`.
    pub fn new(state: StateId) -> Self {
        Self {
            state,
            token_delay: 0,
            arc_delay: 0.0,
        }
    }

    /// Sets the token delay.
    pub fn token_delay(mut self, tokens: i64) -> Self {
        self.token_delay = tokens;
        self
    }

    /// Sets the arc delay.
    pub fn arc_delay(mut self, arc_delay: Timestamp) -> Self {
        self.arc_delay = arc_delay;
        self
    }
}

/// A node of a dataflow graph.
///
/// Actors are created through [`DataflowGraph::add_actor`] and refer to
/// producers and states by handle. `firings` grows monotonically across a
/// fixpoint computation.
#[derive(Clone, Debug)]
pub struct Actor {
    name: String,
    delay: Timestamp,
    scenario: Option<Scenario>,
    channel_inputs: BTreeMap<ActorId, ChannelInput>,
    state_inputs: BTreeMap<StateId, StateInput>,
    primary_inputs: Vec<Sequence>,
    firings: Sequence,
}

impl Actor {
    pub(crate) fn new(name: String, delay: Timestamp, scenario: Option<Scenario>) -> Self {
        Self {
            name,
            delay,
            scenario,
            channel_inputs: BTreeMap::new(),
            state_inputs: BTreeMap::new(),
            primary_inputs: Vec::new(),
            firings: Vec::new(),
        }
    }

    /// Actor name, unique within its graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution delay of one firing.
    pub fn delay(&self) -> Timestamp {
        self.delay
    }

    /// Scenario in which this actor is active, if any.
    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    pub(crate) fn set_scenario(&mut self, scenario: Option<Scenario>) {
        self.scenario = scenario;
    }

    /// Start times computed so far.
    pub fn firings(&self) -> &[Timestamp] {
        &self.firings
    }

    /// Registered channel inputs, keyed by producer.
    pub fn channel_inputs(&self) -> impl Iterator<Item = &ChannelInput> {
        self.channel_inputs.values()
    }

    /// Registered state inputs, keyed by state.
    pub fn state_inputs(&self) -> impl Iterator<Item = &StateInput> {
        self.state_inputs.values()
    }

    /// Exogenous arrival sequences in registration order.
    pub fn primary_inputs(&self) -> &[Sequence] {
        &self.primary_inputs
    }

    pub(crate) fn insert_channel_input(&mut self, input: ChannelInput) -> Option<ChannelInput> {
        self.channel_inputs.insert(input.producer, input)
    }

    pub(crate) fn insert_state_input(&mut self, input: StateInput) -> Option<StateInput> {
        self.state_inputs.insert(input.state, input)
    }

    pub(crate) fn push_primary_input(&mut self, sequence: Sequence) {
        self.primary_inputs.push(sequence);
    }

    /// Completion times: every firing shifted by the actor delay.
    pub fn completions(&self) -> Sequence {
        plus(&self.firings, self.delay)
    }

    /// `(start, end)` of every firing, in firing order.
    pub fn firing_intervals(&self) -> Vec<(Timestamp, Timestamp)> {
        self.firings.iter().map(|&f| (f, f + self.delay)).collect()
    }

    /// Occupancy string of `length` time units for this actor.
    pub fn trace(&self, length: usize) -> String {
        trace(&self.firings, self.delay, length)
    }

    /// Plain SDF rule: the max over every channel input and every primary
    /// input.
    pub(crate) fn next_firings(&self, graph: &DataflowGraph) -> Result<Sequence, ModelError> {
        let channels: Vec<Sequence> = self
            .channel_inputs
            .values()
            .map(|input| input.sequence(graph))
            .collect();
        let all = channels
            .iter()
            .chain(&self.primary_inputs)
            .map(Vec::as_slice);
        max_n(all).ok_or_else(|| ModelError::NoInputs {
            actor: self.name.clone(),
        })
    }

    /// Scenario-aware rule.
    ///
    /// Primary inputs are assumed to belong to a single scenario. Without
    /// any, the starting point is an all-sentinel sequence as long as the
    /// scenario sequence; it stands in for an unbounded one and caps the
    /// number of firings at `scenario_sequence.len()`.
    pub(crate) fn next_firings_sadf(
        &self,
        graph: &DataflowGraph,
        scenario_sequence: &[Scenario],
    ) -> Result<Sequence, ModelError> {
        let mut firings = max_n(self.primary_inputs.iter().map(Vec::as_slice))
            .unwrap_or_else(|| vec![MINUS_INFINITY; scenario_sequence.len()]);

        if !self.state_inputs.is_empty() {
            let scenario = self
                .scenario
                .as_ref()
                .ok_or_else(|| ModelError::MissingScenario {
                    actor: self.name.clone(),
                })?;
            for input in self.state_inputs.values() {
                let spliced = graph.state(input.state).spliced_firings(
                    scenario_sequence,
                    scenario,
                    input.token_delay,
                );
                firings = max2(&firings, &plus(&spliced, input.arc_delay));
            }
        }

        for input in self.channel_inputs.values() {
            firings = max2(&firings, &input.sequence(graph));
        }
        Ok(firings)
    }

    pub(crate) fn replace_firings(&mut self, next: Sequence) -> Growth {
        Growth::replace(&mut self.firings, next)
    }
}
