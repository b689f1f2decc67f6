// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! mpflow-core: self-timed schedules of dataflow graphs in (max,+) algebra.
//!
//! A [`DataflowGraph`] holds actors wired by token channels and, for
//! scenario-aware (SADF) graphs, by [`State`] buffers whose behaviour depends
//! on a driving scenario sequence. The schedule (the start time of every
//! firing of every actor) is the least fixed point of the graph's (max,+)
//! equations, computed by [`compute_fixpoint`] or [`compute_fixpoint_sadf`].
//!
//! ```
//! use mpflow_core::{ChannelInput, DataflowGraph, FixpointConfig};
//!
//! let mut graph = DataflowGraph::new();
//! let a = graph.add_actor("A", 5.0, None)?;
//! let b = graph.add_actor("B", 3.0, None)?;
//! graph.add_primary_input(a, vec![0.0, 10.0, 20.0]);
//! graph.add_channel_input(b, ChannelInput::new(a));
//! graph.fixpoint(&FixpointConfig::default())?;
//! assert_eq!(graph.actor(b).firings(), &[5.0, 15.0, 25.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![forbid(unsafe_code)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

/// (max,+) operations over event sequences.
pub mod maxplus;

mod actor;
mod config;
mod error;
mod fixpoint;
mod graph;
mod ident;
#[cfg(feature = "serde")]
mod model;
mod state;

pub use actor::{Actor, ChannelInput, StateInput};
pub use config::{FixpointConfig, DEFAULT_MAX_PASSES};
pub use error::ModelError;
pub use fixpoint::{compute_fixpoint, compute_fixpoint_sadf, FixpointError, FixpointReport};
pub use graph::{ActorSchedule, DataflowGraph};
pub use ident::{scenario_sequence, ActorId, Scenario, StateId};
pub use maxplus::{Sequence, Timestamp, MINUS_INFINITY};
/// Serializable model description (requires the `serde` feature).
#[cfg(feature = "serde")]
pub use model::{ActorModel, ChannelModel, GraphModel, StateInputModel, StateModel};
pub use state::State;
