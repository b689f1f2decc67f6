// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Handles and labels used to wire a dataflow graph.
use std::fmt;

/// Stable handle to an actor registered in a [`DataflowGraph`](crate::DataflowGraph).
///
/// Handles are plain indices into the graph's registry, so actors and states
/// can reference each other in cycles without owning one another.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ActorId(pub(crate) usize);

/// Stable handle to a state registered in a [`DataflowGraph`](crate::DataflowGraph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct StateId(pub(crate) usize);

/// Label of one operating mode of a scenario-aware graph.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Scenario(String);

impl Scenario {
    /// Creates a scenario label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Borrow the label text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Scenario {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Scenario {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// Builds a scenario sequence from string labels.
pub fn scenario_sequence<I, S>(labels: I) -> Vec<Scenario>
where
    I: IntoIterator<Item = S>,
    S: Into<Scenario>,
{
    labels.into_iter().map(Into::into).collect()
}
