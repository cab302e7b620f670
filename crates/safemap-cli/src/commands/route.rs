//! Route command handler for planning a path between two coordinates.

use anyhow::{Context, Result};
use serde_json::json;

use safemap_lib::{
    render_mode_comparison, route, route_feature_collection, Coordinate, Error as LibError,
    NodeId, RouteMetrics, RouteMode, RouteNetwork, RouteSummary,
};

use safemap_cli::config::ModeArg;
use safemap_cli::output::{RouteFormat, UNREACHABLE_HINTS};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    pub from: Coordinate,
    pub to: Coordinate,
    pub mode: ModeArg,
    pub format: RouteFormat,
    /// Also report length and average weight under every mode.
    pub compare: bool,
}

/// Handle the route subcommand.
pub fn handle_route_command(network: &RouteNetwork, args: &RouteCommandArgs) -> Result<()> {
    let mode = RouteMode::from(args.mode);
    let result = match network.plan_route(args.from, args.to, mode) {
        Ok(result) => result,
        Err(err) => {
            if matches!(err, LibError::Unreachable { .. }) {
                eprintln!("{UNREACHABLE_HINTS}");
            }
            return Err(anyhow::Error::new(err).context(format!(
                "failed to plan a {mode} route from {} to {}",
                args.from, args.to
            )));
        }
    };

    let comparison = if args.compare {
        compare_modes(network, result.start.node, result.end.node)
    } else {
        Vec::new()
    };

    match args.format {
        RouteFormat::Text => {
            print!("{}", RouteSummary::from_result(&result).render_text());
            if args.compare {
                println!();
                println!("=== Comparing optimization strategies ===");
                print!("{}", render_mode_comparison(&comparison));
            }
        }
        RouteFormat::Json => {
            let summary = RouteSummary::from_result(&result);
            let body = if args.compare {
                json!({ "route": summary, "comparison": comparison })
            } else {
                serde_json::to_value(&summary)?
            };
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        RouteFormat::Geojson => {
            let collection = route_feature_collection(network.records(), &result.orig_indices)
                .context("failed to export route")?;
            println!("{}", serde_json::to_string_pretty(&collection)?);
        }
    }

    Ok(())
}

/// Metrics for every mode between the already snapped endpoints.
///
/// A mode that fails (for example under a rejecting cost policy) is logged
/// and left out.
fn compare_modes(network: &RouteNetwork, start: NodeId, end: NodeId) -> Vec<RouteMetrics> {
    RouteMode::ALL
        .into_iter()
        .filter_map(|mode| match route(network.graph(), start, end, mode) {
            Ok((_, metrics)) => Some(metrics),
            Err(err) => {
                tracing::warn!(%mode, error = %err, "mode skipped in comparison");
                None
            }
        })
        .collect()
}
