// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `mpflow run`: load, evaluate, print.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use mpflow_core::maxplus::is_minus_infinity;
use mpflow_core::{DataflowGraph, FixpointConfig, GraphModel, Timestamp};
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct RunArgs {
    /// JSON model description.
    model: PathBuf,

    /// JSON fixpoint configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Give up after this many relaxation passes.
    #[arg(long)]
    max_passes: Option<usize>,

    /// Fail if an update rewrites an already computed firing.
    #[arg(long)]
    verify_prefixes: bool,

    /// Print an occupancy trace of this many time units per actor.
    #[arg(long)]
    trace_len: Option<usize>,

    /// Print the schedule as JSON instead of text.
    #[arg(long, conflicts_with = "trace_len")]
    json: bool,
}

pub(crate) fn run(args: &RunArgs, out: &mut impl Write) -> Result<()> {
    let model = load_model(&args.model)?;
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => FixpointConfig::default(),
    };
    if let Some(max) = args.max_passes {
        config.max_passes = Some(max);
    }
    config.verify_prefixes |= args.verify_prefixes;

    let graph = evaluate(&model, &config)?;
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &graph.schedule())?;
        writeln!(out)?;
    } else {
        render_text(&graph, args.trace_len, out)?;
    }
    Ok(())
}

fn load_model(path: &Path) -> Result<GraphModel> {
    let bytes = fs::read(path).with_context(|| format!("reading model {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing model {}", path.display()))
}

fn load_config(path: &Path) -> Result<FixpointConfig> {
    let bytes = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing config {}", path.display()))
}

/// Builds the graph and runs the SADF driver when the model carries a
/// scenario sequence, the SDF driver otherwise.
fn evaluate(model: &GraphModel, config: &FixpointConfig) -> Result<DataflowGraph> {
    let mut graph = model.build().context("building graph")?;
    let report = match &model.scenario_sequence {
        Some(sequence) => graph.fixpoint_sadf(sequence, config),
        None => graph.fixpoint(config),
    }
    .context("computing fixpoint")?;
    info!(
        passes = report.passes,
        actors = graph.actors().len(),
        "schedule computed"
    );
    Ok(graph)
}

fn label(name: &str, scenario: Option<&mpflow_core::Scenario>) -> String {
    match scenario {
        Some(scenario) => format!("{scenario}/{name}"),
        None => name.to_owned(),
    }
}

fn fmt_time(t: Timestamp) -> String {
    if is_minus_infinity(t) {
        "-inf".to_owned()
    } else {
        t.to_string()
    }
}

fn render_text(
    graph: &DataflowGraph,
    trace_len: Option<usize>,
    out: &mut impl Write,
) -> Result<()> {
    let labels: Vec<String> = graph
        .actors()
        .iter()
        .map(|actor| label(actor.name(), actor.scenario()))
        .collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);
    for (actor, label) in graph.actors().iter().zip(&labels) {
        match trace_len {
            Some(len) => writeln!(out, "{label:<width$} |{}|", actor.trace(len))?,
            None => {
                let intervals: Vec<String> = actor
                    .firing_intervals()
                    .into_iter()
                    .map(|(start, end)| format!("[{}, {})", fmt_time(start), fmt_time(end)))
                    .collect();
                writeln!(out, "{label:<width$} {}", intervals.join(" "))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use mpflow_dry_tests::two_actor_chain;

    fn rendered(graph: &DataflowGraph, trace_len: Option<usize>) -> String {
        let mut out = Vec::new();
        render_text(graph, trace_len, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_output_lists_intervals() {
        let (mut graph, _, _) = two_actor_chain().unwrap();
        graph.fixpoint(&FixpointConfig::default()).unwrap();
        assert_eq!(
            rendered(&graph, None),
            "A [0, 5) [10, 15) [20, 25)\nB [5, 8) [15, 18) [25, 28)\n"
        );
    }

    #[test]
    fn trace_output_is_aligned() {
        let (mut graph, _, _) = two_actor_chain().unwrap();
        graph.fixpoint(&FixpointConfig::default()).unwrap();
        assert_eq!(
            rendered(&graph, Some(12)),
            "A |*****-----**|\nB |-----***----|\n"
        );
    }

    #[test]
    fn scenario_model_runs_sadf_driver() {
        let model: GraphModel = serde_json::from_str(
            r#"{
                "actors": [
                    { "name": "A", "delay": 1, "scenario": "x", "primary_inputs": [[0, 1, 2]] }
                ],
                "scenario_sequence": ["x", "x"]
            }"#,
        )
        .unwrap();
        let graph = evaluate(&model, &FixpointConfig::default()).unwrap();
        assert_eq!(rendered(&graph, None), "x/A [0, 1) [1, 2) [2, 3)\n");
    }

    #[test]
    fn sentinel_firings_render_as_minus_infinity() {
        let model: GraphModel = serde_json::from_str(
            r#"{ "actors": [ { "name": "A", "delay": 1, "scenario": "x" } ],
                 "scenario_sequence": ["x"] }"#,
        )
        .unwrap();
        let graph = evaluate(&model, &FixpointConfig::default()).unwrap();
        assert_eq!(rendered(&graph, None), "x/A [-inf, -inf)\n");
    }

    #[test]
    fn diverging_model_reports_pass_limit() {
        let model: GraphModel = serde_json::from_str(
            r#"{ "actors": [ { "name": "A", "delay": 1,
                 "channels": [ { "from": "A", "initial_tokens": 1, "initial_time": 0 } ] } ] }"#,
        )
        .unwrap();
        let err = evaluate(&model, &FixpointConfig::default().with_max_passes(10)).unwrap_err();
        assert!(format!("{err:#}").contains("no fixpoint after 10 passes"));
    }
}
