//! Nearest command handler for snapping a coordinate onto the network.

use anyhow::{Context, Result};

use safemap_lib::{Coordinate, RouteNetwork};

use safemap_cli::output::{render_snapped, ReportFormat};

pub fn handle_nearest_command(
    network: &RouteNetwork,
    point: Coordinate,
    format: ReportFormat,
) -> Result<()> {
    let snapped = network
        .snap(point)
        .with_context(|| format!("failed to snap {point} to the network"))?;
    match format {
        ReportFormat::Text => print!("{}", render_snapped(&snapped)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&snapped)?),
    }
    Ok(())
}
