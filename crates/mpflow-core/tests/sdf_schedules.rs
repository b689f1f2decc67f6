// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]
//! SDF update rule and fixpoint driver on small hand-checked graphs.

use mpflow_core::{
    compute_fixpoint, maxplus, ChannelInput, DataflowGraph, FixpointConfig, FixpointError,
    ModelError, MINUS_INFINITY,
};
use mpflow_dry_tests::{single_actor, two_actor_chain};

#[test]
fn single_actor_follows_primary_input() {
    let (mut graph, a) = single_actor().expect("fixture");
    graph.update_firings(a).expect("update");
    let actor = graph.actor(a);
    assert_eq!(actor.firings(), &[0.0, 10.0, 20.0]);
    assert_eq!(actor.completions(), vec![5.0, 15.0, 25.0]);
    assert_eq!(
        actor.firing_intervals(),
        vec![(0.0, 5.0), (10.0, 15.0), (20.0, 25.0)]
    );
}

#[test]
fn chain_consumer_starts_on_producer_completion() {
    let (mut graph, a, b) = two_actor_chain().expect("fixture");
    compute_fixpoint(&mut graph, &[a, b], &FixpointConfig::default()).expect("fixpoint");
    assert_eq!(graph.actor(b).firings(), &[5.0, 15.0, 25.0]);
    assert_eq!(graph.actor(b).firings(), &graph.actor(a).completions()[..]);
}

#[test]
fn chain_result_does_not_depend_on_pass_order() {
    let (mut forward, a, b) = two_actor_chain().expect("fixture");
    let (mut backward, _, _) = two_actor_chain().expect("fixture");
    compute_fixpoint(&mut forward, &[a, b], &FixpointConfig::default()).expect("forward");
    let report =
        compute_fixpoint(&mut backward, &[b, a], &FixpointConfig::default()).expect("backward");
    assert_eq!(forward.actor(b).firings(), backward.actor(b).firings());
    // B lags one pass behind A when visited first
    assert_eq!(report.passes, 3);
}

#[test]
fn trace_renders_busy_windows() {
    let (mut graph, a) = single_actor().expect("fixture");
    graph.update_firings(a).expect("update");
    let expected = "*****-----*****-----*****-----";
    assert_eq!(graph.actor(a).trace(30), expected);
    assert_eq!(maxplus::trace(graph.actor(a).firings(), 5.0, 30), expected);
}

#[test]
fn trace_covers_firings_out_of_time_order() {
    let mut graph = DataflowGraph::new();
    let a = graph.add_actor("A", 3.0, None).expect("add");
    let b = graph.add_actor("B", 3.0, None).expect("add");
    graph.add_primary_input(a, vec![2.0, 12.0]);
    // the initial token is available later than A's first completion
    graph.add_channel_input(b, ChannelInput::new(a).initial_tokens(1).initial_time(10.0));
    graph.fixpoint(&FixpointConfig::default()).expect("fixpoint");
    assert_eq!(graph.actor(b).firings(), &[10.0, 5.0, 15.0]);
    assert_eq!(graph.actor(b).trace(20), "-----***--***--***--");
}

#[test]
fn actor_without_inputs_fails_fast() {
    let mut graph = DataflowGraph::new();
    let lonely = graph.add_actor("lonely", 1.0, None).expect("add");
    assert_eq!(
        graph.update_firings(lonely),
        Err(ModelError::NoInputs {
            actor: "lonely".into()
        })
    );
}

#[test]
fn no_inputs_aborts_the_whole_fixpoint() {
    let (mut graph, _, _) = two_actor_chain().expect("fixture");
    graph.add_actor("dangling", 1.0, None).expect("add");
    let err = graph.fixpoint(&FixpointConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        FixpointError::Model(ModelError::NoInputs { ref actor }) if actor == "dangling"
    ));
}

#[test]
fn converged_graph_reports_unchanged_everywhere() {
    let (mut graph, a, b) = two_actor_chain().expect("fixture");
    let c = graph.add_actor("C", 1.0, None).expect("add");
    graph.add_channel_input(c, ChannelInput::new(a).arc_delay(1.0));
    graph.add_channel_input(c, ChannelInput::new(b).initial_tokens(1));
    graph.fixpoint(&FixpointConfig::default()).expect("fixpoint");
    let before: Vec<Vec<f64>> = graph.actors().iter().map(|x| x.firings().to_vec()).collect();
    for id in [a, b, c] {
        assert!(graph.update_firings(id).expect("update"));
    }
    let after: Vec<Vec<f64>> = graph.actors().iter().map(|x| x.firings().to_vec()).collect();
    assert_eq!(before, after);
}

#[test]
fn join_waits_for_slowest_input() {
    let (mut graph, a, b) = two_actor_chain().expect("fixture");
    let c = graph.add_actor("C", 1.0, None).expect("add");
    graph.add_channel_input(c, ChannelInput::new(a).arc_delay(1.0));
    graph.add_channel_input(c, ChannelInput::new(b).initial_tokens(1));
    graph.fixpoint(&FixpointConfig::default()).expect("fixpoint");
    // from A: [6, 16, 26]; from B: [-inf, 8, 18, 28]
    assert_eq!(graph.actor(c).firings(), &[6.0, 16.0, 26.0]);
}

#[test]
fn initial_tokens_with_initial_time_shift_the_schedule() {
    let (mut graph, a) = single_actor().expect("fixture");
    let b = graph.add_actor("B", 2.0, None).expect("add");
    graph.add_channel_input(b, ChannelInput::new(a).initial_tokens(1).initial_time(1.0));
    graph.fixpoint(&FixpointConfig::default()).expect("fixpoint");
    assert_eq!(graph.actor(b).firings(), &[1.0, 5.0, 15.0, 25.0]);
}

#[test]
fn negative_tokens_skip_leading_completions() {
    let (mut graph, a) = single_actor().expect("fixture");
    let b = graph.add_actor("B", 2.0, None).expect("add");
    graph.add_channel_input(b, ChannelInput::new(a).initial_tokens(-1));
    graph.fixpoint(&FixpointConfig::default()).expect("fixpoint");
    assert_eq!(graph.actor(b).firings(), &[15.0, 25.0]);
}

#[test]
fn feedback_loop_bounded_by_primary_input() {
    // A consumes its own previous completion: one token in flight.
    let (mut graph, a) = single_actor().expect("fixture");
    graph.add_primary_input(a, vec![0.0, 1.0, 2.0, 3.0]);
    graph.add_channel_input(a, ChannelInput::new(a).initial_tokens(1));
    graph.fixpoint(&FixpointConfig::default()).expect("fixpoint");
    let firings = graph.actor(a).firings();
    assert_eq!(firings, &[0.0, 10.0, 20.0]);
    assert!(firings.iter().all(|&t| t > MINUS_INFINITY));
}

#[test]
fn prefix_verification_passes_on_monotone_updates() {
    let (mut graph, _, _) = two_actor_chain().expect("fixture");
    let config = FixpointConfig::default().with_verify_prefixes(true);
    let report = graph.fixpoint(&config).expect("fixpoint");
    assert_eq!(report.passes, 2);
}
