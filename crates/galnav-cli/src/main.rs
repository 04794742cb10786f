use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use galnav_cli::logging::{init_logging, LogFormat};
use galnav_cli::output::{render_event, render_query_types, OutputFormat};
use galnav_cli::state::StateFile;
use galnav_cli::terminal::ColorPalette;
use galnav_lib::{load_catalog, ConfigStore, JsonConfigStore, NavigationService, Query, QueryType};

#[derive(Parser, Debug)]
#[command(author, version, about = "Navigation queries over a star catalogue")]
struct Cli {
    /// Star catalogue JSON. Defaults to catalog.json in the platform data directory.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Traveller state JSON. Defaults to state.json in the platform data directory.
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Navigation config file. Defaults to the platform configuration directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Log line format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a navigation query and print the route.
    Resolve {
        /// Query type, e.g. nearest, route, neutron, raw.
        query: QueryType,
        /// First string argument (destination, home system).
        #[arg(long)]
        arg0: Option<String>,
        /// Second string argument (station name).
        #[arg(long)]
        arg1: Option<String>,
        /// Numeric argument (radius, jump range, max station distance).
        #[arg(long)]
        numeric: Option<f64>,
        /// Boolean argument (prefer orbital stations).
        #[arg(long)]
        flag: Option<bool>,
    },
    /// List the supported query types.
    Queries,
    /// Print the stored navigation config.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, "warn");

    match &cli.command {
        Command::Resolve {
            query,
            arg0,
            arg1,
            numeric,
            flag,
        } => handle_resolve(
            &cli,
            Query {
                query_type: *query,
                arg0: arg0.clone(),
                arg1: arg1.clone(),
                numeric: *numeric,
                flag: *flag,
                from_ui: true,
            },
        ),
        Command::Queries => {
            render_query_types(&mut io::stdout().lock())?;
            Ok(())
        }
        Command::Config => handle_config(&cli),
    }
}

fn handle_resolve(cli: &Cli, query: Query) -> Result<()> {
    let catalog_path = data_file(cli.catalog.as_ref(), "catalog.json")?;
    let catalog = load_catalog(&catalog_path)
        .with_context(|| format!("failed to load star catalogue from {}", catalog_path.display()))?;

    let state_path = data_file(cli.state.as_ref(), "state.json")?;
    let snapshot = Arc::new(StateFile::load(&state_path)?.into_snapshot(&catalog)?);

    let service = NavigationService::new(
        Arc::new(catalog),
        snapshot.clone(),
        snapshot,
        config_store(cli)?,
    )
    .context("failed to load navigation config")?;

    let query_type = query.query_type;
    let Some(event) = service.resolve(query) else {
        bail!("no result for query {query_type}");
    };
    render_event(&mut io::stdout().lock(), &event, cli.format, &ColorPalette::detect())?;
    Ok(())
}

fn handle_config(cli: &Cli) -> Result<()> {
    let config = config_store(cli)?
        .load()
        .context("failed to load navigation config")?;
    serde_json::to_writer_pretty(io::stdout().lock(), &config)?;
    println!();
    Ok(())
}

fn config_store(cli: &Cli) -> Result<Arc<dyn ConfigStore>> {
    let store = match &cli.config {
        Some(path) => JsonConfigStore::new(path),
        None => JsonConfigStore::at_default_location()
            .context("no --config given and no platform configuration directory")?,
    };
    Ok(Arc::new(store))
}

/// An explicit path, or `name` in the platform data directory.
fn data_file(explicit: Option<&PathBuf>, name: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    let dirs = ProjectDirs::from("com", "galnav", "galnav")
        .context("failed to resolve the platform data directory")?;
    Ok(dirs.data_dir().join(name))
}
