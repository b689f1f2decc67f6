// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Serializable description of a dataflow model.
//!
//! Entities refer to each other by name. [`GraphModel::build`] first
//! registers every actor and state, then wires them, so forward references
//! and feedback loops need no particular declaration order.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::{ChannelInput, StateInput};
use crate::error::ModelError;
use crate::graph::DataflowGraph;
use crate::ident::{ActorId, Scenario, StateId};
use crate::maxplus::{is_minus_infinity, Sequence, Timestamp, MINUS_INFINITY};

/// A complete model: topology plus, for SADF graphs, the scenario sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphModel {
    /// Actors in registration order.
    #[serde(default)]
    pub actors: Vec<ActorModel>,
    /// States in registration order.
    #[serde(default)]
    pub states: Vec<StateModel>,
    /// Scenario per macro step; present for scenario-aware models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_sequence: Option<Vec<Scenario>>,
}

/// One actor and its inputs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorModel {
    /// Unique actor name.
    pub name: String,
    /// Execution delay.
    pub delay: Timestamp,
    /// Scenario the actor belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<Scenario>,
    /// Exogenous arrival sequences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_inputs: Vec<Sequence>,
    /// Channel dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelModel>,
    /// State dependencies.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub state_inputs: Vec<StateInputModel>,
}

/// Channel from a named producer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelModel {
    /// Producing actor.
    pub from: String,
    /// Initial tokens.
    #[serde(default)]
    pub initial_tokens: i64,
    /// Transport delay.
    #[serde(default)]
    pub arc_delay: Timestamp,
    /// Availability of the initial tokens; "no event" when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_time: Option<Timestamp>,
}

/// Dependency on a named state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateInputModel {
    /// State read from.
    pub state: String,
    /// Token shift.
    #[serde(default)]
    pub token_delay: i64,
    /// Transport delay.
    #[serde(default)]
    pub arc_delay: Timestamp,
}

/// One state buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateModel {
    /// Unique state name.
    pub name: String,
    /// Consuming scenarios.
    #[serde(default)]
    pub input_scenarios: Vec<Scenario>,
    /// Producing scenarios.
    #[serde(default)]
    pub output_scenarios: Vec<Scenario>,
    /// Producing actor per scenario.
    #[serde(default)]
    pub providers: BTreeMap<Scenario, String>,
}

impl GraphModel {
    /// Instantiates the model as a [`DataflowGraph`].
    ///
    /// # Errors
    /// Duplicate names and references to unknown actors or states.
    pub fn build(&self) -> Result<DataflowGraph, ModelError> {
        let mut graph = DataflowGraph::new();
        for actor in &self.actors {
            graph.add_actor(actor.name.clone(), actor.delay, actor.scenario.clone())?;
        }
        for state in &self.states {
            graph.add_state(
                state.name.clone(),
                state.input_scenarios.iter().cloned(),
                state.output_scenarios.iter().cloned(),
            )?;
        }

        for actor in &self.actors {
            let consumer = resolve_actor(&graph, &actor.name)?;
            for channel in &actor.channels {
                let producer = resolve_actor(&graph, &channel.from)?;
                let input = ChannelInput::new(producer)
                    .initial_tokens(channel.initial_tokens)
                    .arc_delay(channel.arc_delay)
                    .initial_time(channel.initial_time.unwrap_or(MINUS_INFINITY));
                graph.add_channel_input(consumer, input);
            }
            for dependency in &actor.state_inputs {
                let state = resolve_state(&graph, &dependency.state)?;
                let input = StateInput::new(state)
                    .token_delay(dependency.token_delay)
                    .arc_delay(dependency.arc_delay);
                graph.add_state_input(consumer, input);
            }
            for sequence in &actor.primary_inputs {
                graph.add_primary_input(consumer, sequence.clone());
            }
        }

        for state in &self.states {
            let id = resolve_state(&graph, &state.name)?;
            for (scenario, provider) in &state.providers {
                let provider = resolve_actor(&graph, provider)?;
                graph.set_provider(id, scenario.clone(), provider);
            }
        }
        Ok(graph)
    }

    /// Describes the topology of `graph`; firing data is not part of a model.
    ///
    /// Initial tokens carrying the "no event" sentinel are written without an
    /// `initial_time`, so `GraphModel::from_graph(&model.build()?, seq)`
    /// reproduces `model` up to the order of channel and state inputs.
    pub fn from_graph(graph: &DataflowGraph, scenario_sequence: Option<Vec<Scenario>>) -> Self {
        let actors = graph
            .actors()
            .iter()
            .map(|actor| ActorModel {
                name: actor.name().to_owned(),
                delay: actor.delay(),
                scenario: actor.scenario().cloned(),
                primary_inputs: actor.primary_inputs().to_vec(),
                channels: actor
                    .channel_inputs()
                    .map(|input| ChannelModel {
                        from: graph.actor(input.producer).name().to_owned(),
                        initial_tokens: input.initial_tokens,
                        arc_delay: input.arc_delay,
                        initial_time: (!is_minus_infinity(input.initial_time))
                            .then_some(input.initial_time),
                    })
                    .collect(),
                state_inputs: actor
                    .state_inputs()
                    .map(|input| StateInputModel {
                        state: graph.state(input.state).name().to_owned(),
                        token_delay: input.token_delay,
                        arc_delay: input.arc_delay,
                    })
                    .collect(),
            })
            .collect();
        let states = graph
            .states()
            .iter()
            .map(|state| StateModel {
                name: state.name().to_owned(),
                input_scenarios: state.input_scenarios().iter().cloned().collect(),
                output_scenarios: state.output_scenarios().iter().cloned().collect(),
                providers: state
                    .providers()
                    .map(|(scenario, actor)| {
                        (scenario.clone(), graph.actor(actor).name().to_owned())
                    })
                    .collect(),
            })
            .collect();
        Self {
            actors,
            states,
            scenario_sequence,
        }
    }

    /// Whether the model must be evaluated with the scenario-aware rules.
    pub fn is_scenario_aware(&self) -> bool {
        self.scenario_sequence.is_some()
    }
}

fn resolve_actor(graph: &DataflowGraph, name: &str) -> Result<ActorId, ModelError> {
    graph
        .actor_id(name)
        .ok_or_else(|| ModelError::UnknownActor(name.to_owned()))
}

fn resolve_state(graph: &DataflowGraph, name: &str) -> Result<StateId, ModelError> {
    graph
        .state_id(name)
        .ok_or_else(|| ModelError::UnknownState(name.to_owned()))
}
