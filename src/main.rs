use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use routeplanner::command::{is_route_command, parse_route_request};
use routeplanner::config::{LoggingConfig, RoutePlannerConfig};
use routeplanner::output::{OutputFormat, render_place, render_plan};
use routeplanner::{RouteError, RoutePlan, RoutePlanner, TollTable};

#[derive(Parser)]
#[command(name = "routeplanner")]
#[command(version)]
#[command(about = "Fastest, cheapest and balanced driving estimates between two places")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to <config dir>/routeplanner/config.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t)]
    format: OutputFormat,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a trip; the origin defaults to the current location
    Route {
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: String,

        /// Open the chosen route in the browser
        #[arg(long)]
        open: bool,
    },
    /// Plan a trip from a spoken phrase, e.g. "best route to Interlaken"
    Ask {
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,

        #[arg(long)]
        open: bool,
    },
    /// Resolve a place name, or the current location when omitted
    Locate { place: Option<String> },
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RoutePlannerConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging, cli.verbose);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let message = e
                .downcast_ref::<RouteError>()
                .map_or_else(|| format!("{e}"), RouteError::user_message);
            eprintln!("Sorry, I couldn't plan the route. {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, mut config: RoutePlannerConfig) -> Result<()> {
    let tolls = TollTable::load(config.toll.table_path.as_deref())
        .context("Failed to load toll table")?;

    match cli.command {
        Commands::Route { from, to, open } => {
            config.navigation.open_browser &= open;
            let planner = RoutePlanner::from_config(&config, &tolls)?;
            let plan = planner.plan(from.as_deref(), &to).await?;
            report(&planner, &plan, cli.format)?;
        }
        Commands::Ask { utterance, open } => {
            let utterance = utterance.join(" ");
            if !is_route_command(&utterance) {
                anyhow::bail!(RouteError::validation(format!(
                    "'{utterance}' is not a route request"
                )));
            }
            let request = parse_route_request(&utterance);
            let Some(destination) = request.destination else {
                println!("Please tell me where you want to go. For example, 'directions to New York'.");
                return Ok(());
            };
            info!("Finding best routes to {}", destination);

            config.navigation.open_browser &= open;
            let planner = RoutePlanner::from_config(&config, &tolls)?;
            let plan = planner.plan(request.origin.as_deref(), &destination).await?;
            report(&planner, &plan, cli.format)?;
        }
        Commands::Locate { place } => {
            let planner = RoutePlanner::from_config(&config, &tolls)?;
            let place = planner.geolocator().locate_origin(place.as_deref()).await?;
            println!("{}", render_place(cli.format, &place)?);
        }
    }

    Ok(())
}

fn report(planner: &RoutePlanner<'_>, plan: &RoutePlan, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Table {
        for line in plan.announcement() {
            println!("{line}");
        }
    }
    println!("{}", render_plan(format, plan)?);

    if planner.hand_off(plan)? {
        info!("Opening the {} route", plan.chosen);
    }
    Ok(())
}
