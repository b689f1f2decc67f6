// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scenario-aware state buffers.
//!
//! A state carries tokens across scenario boundaries. Its event stream
//! interleaves the productions of all scenarios in `output_scenarios`, in the
//! order dictated by the scenario sequence; consumers demultiplex it again
//! with [`State::spliced_firings`].
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ModelError;
use crate::graph::{DataflowGraph, Growth};
use crate::ident::{ActorId, Scenario};
use crate::maxplus::{delay, Sequence, Timestamp, MINUS_INFINITY};

/// Buffer between scenarios of an SADF graph.
#[derive(Clone, Debug)]
pub struct State {
    name: String,
    input_scenarios: BTreeSet<Scenario>,
    output_scenarios: BTreeSet<Scenario>,
    providers: BTreeMap<Scenario, ActorId>,
    firings: Sequence,
}

impl State {
    pub(crate) fn new(
        name: String,
        input_scenarios: BTreeSet<Scenario>,
        output_scenarios: BTreeSet<Scenario>,
    ) -> Self {
        Self {
            name,
            input_scenarios,
            output_scenarios,
            providers: BTreeMap::new(),
            firings: Vec::new(),
        }
    }

    /// State name, unique within its graph.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scenarios that consume one token of this state per macro step.
    pub fn input_scenarios(&self) -> &BTreeSet<Scenario> {
        &self.input_scenarios
    }

    /// Scenarios that produce one token of this state per macro step.
    pub fn output_scenarios(&self) -> &BTreeSet<Scenario> {
        &self.output_scenarios
    }

    /// Provider registered for `scenario`.
    pub fn provider(&self, scenario: &Scenario) -> Option<ActorId> {
        self.providers.get(scenario).copied()
    }

    /// Every `(scenario, provider)` pair, ordered by scenario.
    pub fn providers(&self) -> impl Iterator<Item = (&Scenario, ActorId)> {
        self.providers.iter().map(|(scenario, &actor)| (scenario, actor))
    }

    /// Token production times computed so far.
    pub fn firings(&self) -> &[Timestamp] {
        &self.firings
    }

    pub(crate) fn insert_provider(
        &mut self,
        scenario: Scenario,
        actor: ActorId,
    ) -> Option<ActorId> {
        self.providers.insert(scenario, actor)
    }

    /// The sub-stream of this state's events consumed in `scenario`.
    ///
    /// The event stream is first shifted by `token_delay`. Walking the
    /// scenario sequence, every step whose scenario is an input scenario
    /// consumes the next event; the event is kept when that step runs
    /// `scenario`. The walk ends when either the steps or the events run
    /// out.
    pub fn spliced_firings(
        &self,
        scenario_sequence: &[Scenario],
        scenario: &Scenario,
        token_delay: i64,
    ) -> Sequence {
        let delayed = delay(&self.firings, token_delay, MINUS_INFINITY);
        let mut events = delayed.iter();
        let mut splice = Vec::new();
        for active in scenario_sequence {
            if !self.input_scenarios.contains(active) {
                continue;
            }
            let Some(&event) = events.next() else {
                break;
            };
            if active == scenario {
                splice.push(event);
            }
        }
        splice
    }

    /// Rebuilds the production stream from the providers' completions.
    ///
    /// Each step running an output scenario takes the next unconsumed
    /// completion of that scenario's provider. The stream stops at the first
    /// step whose provider has not completed enough firings yet.
    pub(crate) fn next_firings(
        &self,
        graph: &DataflowGraph,
        scenario_sequence: &[Scenario],
    ) -> Result<Sequence, ModelError> {
        // per scenario: provider completions and a read cursor
        let mut cursors: BTreeMap<&Scenario, (Sequence, usize)> = BTreeMap::new();
        let mut firings = Vec::new();
        for active in scenario_sequence {
            if !self.output_scenarios.contains(active) {
                continue;
            }
            let (completions, next) = match cursors.entry(active) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    let provider = self.provider(active).ok_or_else(|| {
                        ModelError::MissingProvider {
                            state: self.name.clone(),
                            scenario: active.clone(),
                        }
                    })?;
                    slot.insert((graph.actor(provider).completions(), 0))
                }
            };
            let Some(&event) = completions.get(*next) else {
                break;
            };
            firings.push(event);
            *next += 1;
        }
        Ok(firings)
    }

    pub(crate) fn replace_firings(&mut self, next: Sequence) -> Growth {
        Growth::replace(&mut self.firings, next)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::ident::scenario_sequence;

    fn xy_state(firings: Sequence) -> State {
        let both: BTreeSet<Scenario> = scenario_sequence(["x", "y"]).into_iter().collect();
        let mut state = State::new("s".into(), both.clone(), both);
        let _ = state.replace_firings(firings);
        state
    }

    #[test]
    fn splices_interleaved_stream_per_scenario() {
        let seq = scenario_sequence(["x", "y", "x", "y"]);
        let state = xy_state(vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(state.spliced_firings(&seq, &"x".into(), 0), vec![1.0, 3.0]);
        assert_eq!(state.spliced_firings(&seq, &"y".into(), 0), vec![2.0, 4.0]);
    }

    #[test]
    fn splice_stops_when_events_run_out() {
        let seq = scenario_sequence(["x", "y", "x", "y"]);
        let state = xy_state(vec![1.0, 2.0, 3.0]);
        assert_eq!(state.spliced_firings(&seq, &"y".into(), 0), vec![2.0]);
    }

    #[test]
    fn splice_applies_token_delay() {
        let seq = scenario_sequence(["x", "y", "x", "y"]);
        let state = xy_state(vec![1.0, 2.0, 3.0]);
        assert_eq!(
            state.spliced_firings(&seq, &"x".into(), 1),
            vec![MINUS_INFINITY, 2.0]
        );
        assert_eq!(state.spliced_firings(&seq, &"y".into(), -1), vec![3.0]);
    }

    #[test]
    fn steps_outside_input_scenarios_consume_nothing() {
        let only_x: BTreeSet<Scenario> = [Scenario::from("x")].into_iter().collect();
        let mut state = State::new("s".into(), only_x.clone(), only_x);
        let _ = state.replace_firings(vec![1.0, 2.0]);
        let seq = scenario_sequence(["z", "x", "z", "x", "x"]);
        assert_eq!(state.spliced_firings(&seq, &"x".into(), 0), vec![1.0, 2.0]);
        assert!(state.spliced_firings(&seq, &"z".into(), 0).is_empty());
    }
}
