//! Dataset location and graph build options shared by every subcommand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use safemap_lib::{
    DegenerateCostPolicy, FieldMapping, GraphBuildOptions, RouteMode, RouteNetwork,
    DEFAULT_CLAMP_DIVISOR,
};

/// Environment variable consulted when `--dataset` is not given.
pub const DATASET_ENV: &str = "SAFEMAP_DATASET";

/// Optimization mode as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    #[default]
    Balanced,
    Shortest,
    MostDesirable,
}

impl From<ModeArg> for RouteMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Balanced => RouteMode::Balanced,
            ModeArg::Shortest => RouteMode::Shortest,
            ModeArg::MostDesirable => RouteMode::MostDesirable,
        }
    }
}

/// Degenerate cost policy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyArg {
    #[default]
    Reject,
    Clamp,
    Exclude,
}

impl From<PolicyArg> for DegenerateCostPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Reject => DegenerateCostPolicy::Reject,
            PolicyArg::Clamp => DegenerateCostPolicy::Clamp,
            PolicyArg::Exclude => DegenerateCostPolicy::Exclude,
        }
    }
}

/// Where the network comes from and how it is turned into a graph.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// GeoJSON FeatureCollection of line segments. Falls back to SAFEMAP_DATASET.
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Property holding the primary desirability weight.
    #[arg(long, global = true, default_value = "weight")]
    pub weight_field: String,

    /// Property holding the secondary desirability weight.
    #[arg(long, global = true, default_value = "weight_light")]
    pub light_weight_field: String,

    /// Property holding the segment length.
    #[arg(long, global = true, default_value = "length")]
    pub length_field: String,

    /// How to treat segments whose weight makes a cost divisor non-positive.
    #[arg(long, global = true, value_enum, default_value_t = PolicyArg::Reject)]
    pub cost_policy: PolicyArg,

    /// Divisor substituted under `--cost-policy clamp`.
    #[arg(long, global = true, default_value_t = DEFAULT_CLAMP_DIVISOR)]
    pub clamp_divisor: f64,

    /// Check most-desirable costs of every segment while loading.
    #[arg(long, global = true)]
    pub strict_costs: bool,
}

impl DatasetArgs {
    /// Dataset path from the flag, else from the environment.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        self.dataset
            .clone()
            .or_else(|| std::env::var_os(DATASET_ENV).map(PathBuf::from))
            .with_context(|| format!("no dataset given; pass --dataset or set {DATASET_ENV}"))
    }

    pub fn field_mapping(&self) -> FieldMapping {
        FieldMapping {
            primary_weight_field: self.weight_field.clone(),
            secondary_weight_field: self.light_weight_field.clone(),
            length_field: self.length_field.clone(),
        }
    }

    pub fn build_options(&self) -> GraphBuildOptions {
        GraphBuildOptions {
            cost_policy: self.cost_policy.into(),
            clamp_divisor: self.clamp_divisor,
            strict_costs: self.strict_costs,
        }
    }

    /// Resolve, load and build the network.
    pub fn load_network(&self) -> Result<RouteNetwork> {
        let path = self.resolve_path()?;
        RouteNetwork::load(&path, &self.field_mapping(), &self.build_options())
            .with_context(|| format!("failed to load network from {}", path.display()))
    }
}
