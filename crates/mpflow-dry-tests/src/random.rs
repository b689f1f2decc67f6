// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Random acyclic SDF graphs for property tests.
//!
//! Channels only run from lower to higher actor index, so every generated
//! graph converges regardless of token counts.

use std::collections::BTreeMap;

use mpflow_core::{ActorId, ChannelInput, DataflowGraph, ModelError, Sequence};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

/// Plain-data description of a generated graph.
#[derive(Clone, Debug)]
pub struct AcyclicBlueprint {
    /// Execution delay per actor.
    pub delays: Vec<f64>,
    /// Primary input per actor, sorted arrival times.
    pub primaries: Vec<Option<Sequence>>,
    /// Channels as `(producer, consumer, initial_tokens, arc_delay)`, with
    /// `producer < consumer` and at most one channel per pair.
    pub channels: Vec<(usize, usize, i64, f64)>,
}

impl AcyclicBlueprint {
    /// Instantiates the blueprint; actors are named `a0`, `a1`, ...
    pub fn build(&self) -> Result<(DataflowGraph, Vec<ActorId>), ModelError> {
        let mut graph = DataflowGraph::new();
        let ids = self
            .delays
            .iter()
            .enumerate()
            .map(|(i, &delay)| graph.add_actor(format!("a{i}"), delay, None))
            .collect::<Result<Vec<_>, _>>()?;
        for (id, primary) in ids.iter().zip(&self.primaries) {
            if let Some(arrivals) = primary {
                graph.add_primary_input(*id, arrivals.clone());
            }
        }
        for &(from, to, tokens, arc_delay) in &self.channels {
            graph.add_channel_input(
                ids[to],
                ChannelInput::new(ids[from])
                    .initial_tokens(tokens)
                    .arc_delay(arc_delay)
                    .initial_time(0.0),
            );
        }
        Ok((graph, ids))
    }
}

fn arb_arrivals() -> impl Strategy<Value = Sequence> {
    vec(0u8..20, 0..6).prop_map(|gaps| {
        gaps.into_iter()
            .scan(0.0, |t, gap| {
                *t += f64::from(gap);
                Some(*t)
            })
            .collect()
    })
}

/// Strategy for acyclic graphs of 1 to `max_actors` actors.
///
/// Every actor gets at least one input: actors left without a primary input
/// and without an incoming channel receive the primary input `[0]`.
pub fn arb_acyclic_graph(max_actors: usize) -> impl Strategy<Value = AcyclicBlueprint> {
    (1..=max_actors.max(1))
        .prop_flat_map(|n| {
            let actors = vec((0u8..10, option::of(arb_arrivals())), n);
            let channels = vec((0..n, 0..n, 0i64..3, 0u8..4), 0..=2 * n);
            (actors, channels)
        })
        .prop_map(|(actors, raw_channels)| {
            // one channel per (producer, consumer); later draws win
            let unique: BTreeMap<(usize, usize), (i64, f64)> = raw_channels
                .into_iter()
                .filter(|(a, b, _, _)| a != b)
                .map(|(a, b, tokens, arc)| ((a.min(b), a.max(b)), (tokens, f64::from(arc))))
                .collect();
            let channels: Vec<(usize, usize, i64, f64)> = unique
                .into_iter()
                .map(|((from, to), (tokens, arc))| (from, to, tokens, arc))
                .collect();
            let (delays, mut primaries): (Vec<f64>, Vec<Option<Sequence>>) = actors
                .into_iter()
                .map(|(delay, primary)| (f64::from(delay), primary))
                .unzip();
            for (i, primary) in primaries.iter_mut().enumerate() {
                let fed = channels.iter().any(|&(_, to, _, _)| to == i);
                if primary.is_none() && !fed {
                    *primary = Some(vec![0.0]);
                }
            }
            AcyclicBlueprint {
                delays,
                primaries,
                channels,
            }
        })
}
