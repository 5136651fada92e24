use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process;

use devsheets::catalog::Catalog;
use devsheets::router::{Route, RouteTable, RouterSession};
use devsheets::site::{assemble_catalog, route_to_output_path, BuildError, SiteBuilder};
use devsheets::{NavigationState, SiteConfig};

#[derive(Debug, Parser)]
#[command(name = "devsheets", version, about = "Build the DevSheets cheatsheet site")]
struct Cli {
    /// Config file (defaults to ./devsheets.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra dataset directory, overrides the config file
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render every page into the output directory
    Build {
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Rewrite every file even if unchanged
        #[arg(long)]
        no_cache: bool,
    },
    /// Validate all datasets
    Check,
    /// List the routes of the site
    Routes,
    /// Show which page a URL selects and what it highlights
    Resolve {
        /// A path such as `/php#arrays` or a full `https://...` URL
        url: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Cli::parse()) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BuildError> {
    let mut config = SiteConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.content_dir {
        config.content_dir = Some(dir);
    }

    match cli.command {
        Command::Build { out_dir, no_cache } => {
            if let Some(dir) = out_dir {
                config.out_dir = dir;
            }
            if no_cache {
                config.cache = false;
            }
            let catalog = load_strict(&config)?;
            SiteBuilder::new(&config, &catalog).build()?;
        }
        Command::Check => {
            let catalog = load_strict(&config)?;
            SiteBuilder::new(&config, &catalog).render_all()?;
            info!("{} topic(s) OK", catalog.len());
        }
        Command::Routes => {
            let catalog = load_strict(&config)?;
            let table = RouteTable::from_catalog(&catalog);
            println!("/\t{}", route_to_output_path("/"));
            for path in table.topic_paths() {
                println!("{}\t{}", path, route_to_output_path(path));
            }
            for path in &config.planned_routes {
                if !table.is_mapped(path) {
                    println!("{}\t{}\t(coming soon)", path, route_to_output_path(path));
                }
            }
        }
        Command::Resolve { url } => {
            let catalog = load_strict(&config)?;
            let mut session = RouterSession::new(RouteTable::from_catalog(&catalog));
            let outcome = session.navigate(&url);
            match outcome.route {
                Route::Home => println!("home\t{}", config.site_name),
                Route::Topic(topic) => {
                    let (nav, scroll) =
                        NavigationState::mounted(topic, outcome.location.fragment.as_deref());
                    println!("topic\t{}", topic.title);
                    println!("highlight\t{}", nav.highlighted().unwrap_or("(none)"));
                    if let Some(intent) = scroll {
                        println!("scroll\t#{}", intent.target);
                    }
                }
                Route::Fallback(page) => println!("fallback\t{}", page.heading),
            }
        }
    }

    Ok(())
}

/// Load the catalog, failing if any dataset did not load.
fn load_strict(config: &SiteConfig) -> Result<Catalog, BuildError> {
    let (catalog, failures) = assemble_catalog(config)?;
    if failures.is_empty() {
        return Ok(catalog);
    }
    for failure in &failures {
        error!("{}", failure);
    }
    Err(BuildError::DatasetFailures(failures.len()))
}
