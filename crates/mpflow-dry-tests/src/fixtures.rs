// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hand-checked graphs with known schedules.
//!
//! Builders return `Result` so tests can `?`/`expect` on wiring mistakes
//! instead of the fixture panicking.

use mpflow_core::{
    scenario_sequence, ActorId, ChannelInput, DataflowGraph, ModelError, Scenario, StateId,
    StateInput,
};

/// Actor `A` (delay 5) driven by the primary input `[0, 10, 20]`.
pub fn single_actor() -> Result<(DataflowGraph, ActorId), ModelError> {
    let mut graph = DataflowGraph::new();
    let a = graph.add_actor("A", 5.0, None)?;
    graph.add_primary_input(a, vec![0.0, 10.0, 20.0]);
    Ok((graph, a))
}

/// [`single_actor`] followed by `B` (delay 3) on a plain channel.
pub fn two_actor_chain() -> Result<(DataflowGraph, ActorId, ActorId), ModelError> {
    let (mut graph, a) = single_actor()?;
    let b = graph.add_actor("B", 3.0, None)?;
    graph.add_channel_input(b, ChannelInput::new(a));
    Ok((graph, a, b))
}

/// Two scenario actors sharing one state in a feedback loop.
pub struct AlternatingSadf {
    /// The wired graph.
    pub graph: DataflowGraph,
    /// Driving sequence `x, y, x, y`.
    pub scenarios: Vec<Scenario>,
    /// Actor of scenario `x` (delay 2, primary input `[0, 4]`).
    pub ax: ActorId,
    /// Actor of scenario `y` (delay 3).
    pub ay: ActorId,
    /// State written by `ax` in `x` and by `ay` in `y`, read by both.
    pub state: StateId,
}

/// Builds [`AlternatingSadf`].
///
/// Both actors read the state with one initial token, so the very first
/// step can fire. The converged schedule is `ax = [0, 5]`, `ay = [2, 7]`
/// and state productions `[2, 5, 7, 10]`.
pub fn alternating_sadf() -> Result<AlternatingSadf, ModelError> {
    let x = Scenario::from("x");
    let y = Scenario::from("y");
    let mut graph = DataflowGraph::new();
    let ax = graph.add_actor("Ax", 2.0, Some(x.clone()))?;
    let ay = graph.add_actor("Ay", 3.0, Some(y.clone()))?;
    let both = [x.clone(), y.clone()];
    let state = graph.add_state("s", both.clone(), both)?;
    graph.set_provider(state, x, ax);
    graph.set_provider(state, y, ay);
    graph.add_state_input(ax, StateInput::new(state).token_delay(1));
    graph.add_state_input(ay, StateInput::new(state).token_delay(1));
    graph.add_primary_input(ax, vec![0.0, 4.0]);
    Ok(AlternatingSadf {
        graph,
        scenarios: scenario_sequence(["x", "y", "x", "y"]),
        ax,
        ay,
        state,
    })
}
