//! Analyze command handler for connectivity diagnostics.

use anyhow::Result;

use safemap_lib::RouteNetwork;

use safemap_cli::output::{render_connectivity, ConnectivitySummary, ReportFormat};

pub fn handle_analyze_command(network: &RouteNetwork, format: ReportFormat) -> Result<()> {
    let report = network.analyze_connectivity();
    match format {
        ReportFormat::Text => print!("{}", render_connectivity(&report)),
        ReportFormat::Json => {
            let summary = ConnectivitySummary::from(&report);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
