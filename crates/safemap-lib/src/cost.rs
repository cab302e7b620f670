//! Edge cost model and the policy for weights that break it.
//!
//! Both desirability-aware cost functions divide a length by a term derived
//! from the segment weight:
//!
//! | Mode             | Cost                                  | Degenerate when   |
//! |------------------|---------------------------------------|-------------------|
//! | `balanced`       | `length / (1 + weight)`               | `weight <= -1`    |
//! | `most_desirable` | `100 * length / (1 + 2 * weight)`     | `weight <= -0.5`  |
//! | `shortest`       | `length`                              | never             |
//!
//! A non-positive divisor would produce a negative or infinite cost, which
//! Dijkstra cannot handle. [`DegenerateCostPolicy`] decides what happens
//! instead.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Divisor substituted for a non-positive one under [`DegenerateCostPolicy::Clamp`].
pub const DEFAULT_CLAMP_DIVISOR: f64 = 0.01;

/// Scale factor applied to the `most_desirable` cost.
pub const DESIRABILITY_SCALE: f64 = 100.0;

/// What to do with a segment whose weight makes a cost divisor non-positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateCostPolicy {
    /// Fail with [`Error::DegenerateCost`](crate::Error::DegenerateCost).
    #[default]
    Reject,
    /// Replace the divisor with the configured clamp divisor.
    Clamp,
    /// Make the segment impassable in the affected mode.
    Exclude,
}

impl fmt::Display for DegenerateCostPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            DegenerateCostPolicy::Reject => "reject",
            DegenerateCostPolicy::Clamp => "clamp",
            DegenerateCostPolicy::Exclude => "exclude",
        };
        f.write_str(value)
    }
}

/// Policy plus the clamp divisor it needs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSettings {
    pub policy: DegenerateCostPolicy,
    pub clamp_divisor: f64,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            policy: DegenerateCostPolicy::default(),
            clamp_divisor: DEFAULT_CLAMP_DIVISOR,
        }
    }
}

impl CostSettings {
    /// Divide `numerator` by `divisor`, applying the policy when the divisor
    /// is not strictly positive.
    ///
    /// Returns `None` only under [`DegenerateCostPolicy::Reject`]; callers turn
    /// that into an error carrying the offending record. An excluded segment
    /// gets an infinite cost.
    pub fn divide(&self, numerator: f64, divisor: f64) -> Option<f64> {
        if divisor > 0.0 {
            return Some(numerator / divisor);
        }
        match self.policy {
            DegenerateCostPolicy::Reject => None,
            DegenerateCostPolicy::Clamp => Some(numerator / self.clamp_divisor),
            DegenerateCostPolicy::Exclude => Some(f64::INFINITY),
        }
    }
}

/// Divisor of the default (`balanced`) cost.
pub fn balanced_divisor(weight: f64) -> f64 {
    1.0 + weight
}

/// Divisor of the `most_desirable` cost.
pub fn desirability_divisor(weight: f64) -> f64 {
    1.0 + 2.0 * weight
}

/// `length / (1 + weight)` under the given settings.
pub fn balanced_cost(length: f64, weight: f64, settings: &CostSettings) -> Option<f64> {
    settings.divide(length, balanced_divisor(weight))
}

/// `100 * length / (1 + 2 * weight)` under the given settings.
pub fn desirability_cost(length: f64, weight: f64, settings: &CostSettings) -> Option<f64> {
    settings.divide(DESIRABILITY_SCALE * length, desirability_divisor(weight))
}
