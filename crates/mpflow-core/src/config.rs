// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tuning knobs for the fixpoint driver.

/// Default cap on relaxation passes.
pub const DEFAULT_MAX_PASSES: usize = 100_000;

/// Configuration of a fixpoint computation.
///
/// With the `serde` feature, missing fields fall back to [`Default`], so a
/// config file may list only what it overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct FixpointConfig {
    /// Upper bound on full passes; `None` iterates until convergence.
    ///
    /// A feedback loop carrying initial tokens and no bounding input grows
    /// by one firing per pass forever, so leaving this unbounded is only
    /// safe for models known to converge.
    pub max_passes: Option<usize>,
    /// Check after every local update that previously computed firings were
    /// kept unchanged, not only that the length did not shrink.
    pub verify_prefixes: bool,
}

impl Default for FixpointConfig {
    fn default() -> Self {
        Self {
            max_passes: Some(DEFAULT_MAX_PASSES),
            verify_prefixes: false,
        }
    }
}

impl FixpointConfig {
    /// Iterate until convergence with no pass limit.
    pub fn unbounded() -> Self {
        Self {
            max_passes: None,
            ..Self::default()
        }
    }

    /// Sets the pass limit.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    /// Enables or disables prefix verification.
    pub fn with_verify_prefixes(mut self, verify: bool) -> Self {
        self.verify_prefixes = verify;
        self
    }
}
