use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use argh::FromArgs;
use smartcity::{
    ApiClient, City, Dashboard, DashboardConfig, DashboardError, TerminalReport, logging, web,
};

#[derive(FromArgs)]
/// Smart City dashboard - real-time traffic and pollution data for major Indian cities
struct Args {
    /// path to a TOML config file
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    verbose: bool,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Cities(CitiesArgs),
    Report(ReportArgs),
    Serve(ServeArgs),
}

/// List the supported cities
#[derive(FromArgs)]
#[argh(subcommand, name = "cities")]
struct CitiesArgs {}

/// Fetch and print the dashboard for one city
#[derive(FromArgs)]
#[argh(subcommand, name = "report")]
struct ReportArgs {
    /// city to report on (see `cities`)
    #[argh(option)]
    city: String,

    /// print the snapshot as JSON instead of text
    #[argh(switch)]
    json: bool,

    /// number of days in the AQI trend (default: from config)
    #[argh(option)]
    trend_days: Option<usize>,
}

/// Serve the dashboard as a JSON API
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
struct ServeArgs {
    /// port to listen on (default: from config)
    #[argh(option, short = 'p')]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let config = DashboardConfig::load_from_path(args.config.clone())?;
    logging::init(&config.logging, args.verbose)?;
    for name in config.api_keys.missing() {
        tracing::warn!("{name} is not set; requests that need it will fail upstream");
    }
    let config = Arc::new(config);

    match args.command {
        Command::Cities(_) => {
            for city in City::ALL {
                println!("{city}");
            }
        }
        Command::Report(report) => {
            let city: City = report
                .city
                .parse()
                .map_err(|e: DashboardError| anyhow!(e.user_message()))?;
            let dashboard = build_dashboard(config.clone())?;
            let snapshot = dashboard.snapshot(city.name()).await;

            if report.json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                let days = report.trend_days.unwrap_or(config.dashboard.trend_days);
                print!("{}", TerminalReport::new(&snapshot, days));
            }
        }
        Command::Serve(serve) => {
            let dashboard = Arc::new(build_dashboard(config.clone())?);
            web::run(dashboard, serve.port.unwrap_or(config.server.port)).await?;
        }
    }

    Ok(())
}

fn build_dashboard(config: Arc<DashboardConfig>) -> Result<Dashboard> {
    let client = ApiClient::new(&config.http)?;
    Ok(Dashboard::new(Arc::new(client), config))
}
