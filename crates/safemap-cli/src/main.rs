use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use safemap_cli::config::{DatasetArgs, ModeArg};
use safemap_cli::output::{ReportFormat, RouteFormat};
use safemap_lib::Coordinate;

mod commands;

use commands::analyze::handle_analyze_command;
use commands::nearest::handle_nearest_command;
use commands::route::{handle_route_command, RouteCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Desirability-aware pedestrian routing")]
struct Cli {
    #[command(flatten)]
    dataset: DatasetArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a route between the network nodes nearest to two coordinates.
    Route {
        /// Start coordinate as `x,y`.
        #[arg(long = "from", allow_hyphen_values = true)]
        from: Coordinate,
        /// Destination coordinate as `x,y`.
        #[arg(long = "to", allow_hyphen_values = true)]
        to: Coordinate,
        /// Optimization criterion.
        #[arg(long, value_enum, default_value_t = ModeArg::Balanced)]
        mode: ModeArg,
        #[arg(long, value_enum, default_value_t = RouteFormat::Text)]
        format: RouteFormat,
        /// Also report length and average weight for every mode.
        #[arg(long)]
        compare: bool,
    },
    /// Report connected components, dead ends and intersections.
    Analyze {
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Snap a coordinate to its nearest network node.
    Nearest {
        /// Coordinate as `x,y`.
        #[arg(long, allow_hyphen_values = true)]
        point: Coordinate,
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let network = cli.dataset.load_network()?;

    match cli.command {
        Command::Route {
            from,
            to,
            mode,
            format,
            compare,
        } => handle_route_command(
            &network,
            &RouteCommandArgs {
                from,
                to,
                mode,
                format,
                compare,
            },
        ),
        Command::Analyze { format } => handle_analyze_command(&network, format),
        Command::Nearest { point, format } => handle_nearest_command(&network, point, format),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
