use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::graph::NodeId;
use crate::routing::RouteMode;

/// Convenient result alias for the safemap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Which end of a route request an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => f.write_str("start"),
            Endpoint::End => f.write_str("end"),
        }
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a nearest-node lookup runs against a graph without nodes.
    #[error("graph has no nodes to snap to")]
    EmptyGraph,

    /// Raised when a route endpoint is not a node of the graph.
    #[error("{endpoint} node {node} is not part of the graph")]
    UnknownNode { endpoint: Endpoint, node: NodeId },

    /// Raised when start and end sit in different connected components.
    #[error(
        "no connected path exists between {start} and {end}: start is in component \
         {start_component}, end is in component {end_component}"
    )]
    Unreachable {
        start: NodeId,
        end: NodeId,
        start_component: usize,
        end_component: usize,
    },

    /// Raised when both endpoints share a component but every connecting
    /// route uses edges excluded from the requested mode.
    #[error("no traversable {mode} route between {start} and {end}")]
    RouteNotFound {
        start: NodeId,
        end: NodeId,
        mode: RouteMode,
    },

    /// Raised when a path does not match the graph it is resolved against.
    #[error("path segment {position} ({from} -> {to}) has no matching edge in the graph")]
    BrokenPath {
        position: usize,
        from: NodeId,
        to: NodeId,
    },

    /// Raised when a path's node and edge lists cannot describe a walk.
    #[error("malformed path with {nodes} nodes and {edges} edges")]
    MalformedPath { nodes: usize, edges: usize },

    /// Raised when a segment weight makes the mode's cost divisor non-positive
    /// and the configured policy rejects such segments.
    #[error("segment {orig_idx} has weight {weight} which makes its {mode} cost degenerate")]
    DegenerateCost {
        orig_idx: usize,
        weight: f64,
        mode: RouteMode,
    },

    /// Raised when a source record carries values the builder cannot use.
    #[error("invalid segment record {orig_idx}: {message}")]
    InvalidRecord { orig_idx: usize, message: String },

    /// Raised when a coordinate string cannot be parsed.
    #[error("invalid coordinate '{input}'; expected 'x,y'")]
    InvalidCoordinate { input: String },

    /// Raised when build or ingest options are inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Raised when the dataset document is not a usable feature collection.
    #[error("unsupported dataset format: {message}")]
    DatasetFormat { message: String },

    /// Raised when a feature lacks a configured numeric property.
    #[error("feature {orig_idx} is missing numeric property '{field}'")]
    MissingField { orig_idx: usize, field: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON parsing errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
