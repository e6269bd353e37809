//! Command-line interface for `plateau-catalog`, an inspection tool for PLATEAU data catalogs.
//!
//! This binary loads JSON dumps of CMS records, builds one tenant per dump through the
//! [`plateau_catalog_core`] cache and answers catalog queries against the merged view.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It parses arguments, configures logging, loads the dumps and delegates to command handlers.
//!
//! # Available Commands
//!
//! - `warnings` - Print the conversion warnings of every project
//! - `areas` - List prefectures, cities and wards
//! - `datasets` - List datasets
//! - `types` - List dataset types
//! - `specs` - List specification versions
//! - `years` - List data years
//! - `node` - Look up any node by id

mod display;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{Level, debug, info};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use display::{AreaRow, DatasetRow, DatasetTypeRow, SpecRow, print_list};
use plateau_catalog_common::{
    AreaCode, AreaType, AreasInput, DatasetTypeCategory, DatasetTypesInput, DatasetsInput, Id,
    QueryContext, Repo,
};
use plateau_catalog_core::{CatalogConfig, CmsConfig, Dump, Repos, StaticFetcher};

#[derive(Parser)]
#[command(
    name = "plateau-catalog",
    version,
    about = "Inspect PLATEAU data catalogs built from CMS record dumps"
)]
/// Command-line arguments and options for the `plateau-catalog` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Record dump of one project. Repeat to merge several projects.
    #[arg(short, long = "input", value_name = "DUMP", required = true)]
    inputs: Vec<PathBuf>,

    /// Keep admin metadata in results.
    #[arg(long, global = true)]
    admin: bool,

    /// Show records in beta stage.
    #[arg(long, global = true)]
    include_beta: bool,

    /// Minimum seconds between two refreshes of a project.
    #[arg(long, value_name = "SECS", default_value_t = 10, global = true)]
    min_interval_secs: u64,

    /// CMS base URL used for admin links.
    #[arg(long, value_name = "URL", requires = "cms_workspace", global = true)]
    cms_url: Option<String>,

    /// CMS workspace used for admin links.
    #[arg(long, value_name = "WORKSPACE", global = true)]
    cms_workspace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Area levels accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
enum AreaLevel {
    Prefecture,
    City,
    Ward,
}

impl From<AreaLevel> for AreaType {
    fn from(level: AreaLevel) -> Self {
        match level {
            AreaLevel::Prefecture => AreaType::Prefecture,
            AreaLevel::City => AreaType::City,
            AreaLevel::Ward => AreaType::Ward,
        }
    }
}

fn parse_category(s: &str) -> Result<DatasetTypeCategory, String> {
    DatasetTypeCategory::parse(s).ok_or_else(|| format!("unknown category '{s}'"))
}

/// Available subcommands for the `plateau-catalog` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Prints the conversion warnings of every project.
    Warnings,

    /// Lists areas.
    Areas {
        /// Restrict to an area level.
        #[arg(long = "type", value_enum)]
        area_types: Vec<AreaLevel>,

        /// Keep children of this area.
        #[arg(long, value_name = "CODE")]
        parent: Option<String>,

        /// With `--parent`, keep all descendants.
        #[arg(long)]
        deep: bool,

        /// Keep areas whose name contains this text.
        #[arg(long = "search", value_name = "TEXT")]
        search: Vec<String>,

        /// Keep areas hosting datasets of this type code.
        #[arg(long = "dataset-type", value_name = "CODE")]
        dataset_types: Vec<String>,

        /// Also keep the parents of hosting areas.
        #[arg(long)]
        include_parents: bool,
    },

    /// Lists datasets.
    Datasets {
        /// Keep datasets of this area.
        #[arg(long = "area", value_name = "CODE")]
        areas: Vec<String>,

        /// Match `--area` against the most specific area only.
        #[arg(long)]
        shallow: bool,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        registration_year: Option<i32>,

        /// Specification version such as `3.2`.
        #[arg(long, value_name = "VERSION")]
        spec: Option<String>,

        /// Keep datasets of this type code or category.
        #[arg(long = "include", value_name = "TYPE")]
        include: Vec<String>,

        /// Drop datasets of this type code or category.
        #[arg(long = "exclude", value_name = "TYPE")]
        exclude: Vec<String>,

        /// Keep datasets whose texts contain every given token.
        #[arg(long = "search", value_name = "TEXT")]
        search: Vec<String>,
    },

    /// Lists dataset types.
    Types {
        #[arg(long, value_parser = parse_category)]
        category: Option<DatasetTypeCategory>,

        #[arg(long)]
        year: Option<i32>,

        /// Specification version such as `3.2`.
        #[arg(long, value_name = "VERSION")]
        spec: Option<String>,
    },

    /// Lists specification versions.
    Specs,

    /// Lists data years.
    Years,

    /// Looks up a node by id (`c_13101`, `d_13101_bldg`...).
    Node {
        #[arg(value_name = "ID")]
        id: String,
    },
}

/// Entry point for the `plateau-catalog` command-line interface.
///
/// # Errors
///
/// Returns an error if a dump cannot be loaded or a query fails.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let repos = load(&cli).await?;
    let ctx = QueryContext::admin(cli.admin, cli.include_beta);

    if matches!(cli.command, Commands::Warnings) {
        handle_warnings(&repos);
        return Ok(());
    }

    let projects = repos.projects();
    let projects: Vec<&str> = projects.iter().map(String::as_str).collect();
    let repo = repos
        .merged(&projects)
        .await?
        .ok_or_else(|| anyhow!("No project loaded."))?;
    debug!("Querying {}", repo.name());

    run(repo.as_ref(), &ctx, cli.command, cli.json).await
}

fn config(cli: &Cli) -> CatalogConfig {
    let config = CatalogConfig::default()
        .with_min_update_interval(Duration::from_secs(cli.min_interval_secs));
    match (&cli.cms_url, &cli.cms_workspace) {
        (Some(url), Some(workspace)) => config.with_cms(CmsConfig {
            url: url.clone(),
            workspace: workspace.clone(),
        }),
        _ => config,
    }
}

fn read_dump(path: &Path) -> Result<Dump> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Registers one tenant per dump and loads it.
async fn load(cli: &Cli) -> Result<Repos> {
    let dumps = cli
        .inputs
        .iter()
        .map(|path| read_dump(path))
        .collect::<Result<Vec<_>>>()?;

    let projects: Vec<(String, i32)> = dumps.iter().map(|d| (d.project.clone(), d.year)).collect();
    let fetcher = Arc::new(dumps.into_iter().fold(StaticFetcher::new(), StaticFetcher::with_dump));

    let repos = Repos::new(config(cli))?;
    for (project, year) in projects {
        info!("Loading {project} ({year})");
        repos.prepare(&project, year, fetcher.clone()).await?;
    }
    Ok(repos)
}

fn handle_warnings(repos: &Repos) {
    for project in repos.projects() {
        let warnings = repos.warnings(&project);
        println!("{project}: {} warnings", warnings.len());
        for warning in warnings {
            println!("  {warning}");
        }
    }
}

async fn run(repo: &dyn Repo, ctx: &QueryContext, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Warnings => {},
        Commands::Areas {
            area_types,
            parent,
            deep,
            search,
            dataset_types,
            include_parents,
        } => {
            let input = AreasInput {
                area_types: area_types.into_iter().map(AreaType::from).collect(),
                search_tokens: search,
                parent_code: parent.map(AreaCode::new),
                deep,
                dataset_types: (!dataset_types.is_empty()).then_some(dataset_types),
                categories: vec![],
                include_parents,
            };
            let areas = repo.areas(ctx, &input).await?;
            print_list::<_, AreaRow>(&areas, json, "Areas")?;
        },
        Commands::Datasets {
            areas,
            shallow,
            year,
            registration_year,
            spec,
            include,
            exclude,
            search,
        } => {
            let input = DatasetsInput {
                area_codes: areas.into_iter().map(AreaCode::new).collect(),
                shallow,
                year,
                registration_year,
                plateau_spec: spec,
                include_types: include,
                exclude_types: exclude,
                search_tokens: search,
            };
            let datasets = repo.datasets(ctx, &input).await?;
            print_list::<_, DatasetRow>(&datasets, json, "Datasets")?;
        },
        Commands::Types {
            category,
            year,
            spec,
        } => {
            let input = DatasetTypesInput {
                category,
                year,
                plateau_spec: spec,
            };
            let types = repo.dataset_types(ctx, &input).await?;
            print_list::<_, DatasetTypeRow>(&types, json, "Dataset Types")?;
        },
        Commands::Specs => {
            let specs = repo.plateau_specs(ctx).await?;
            print_list::<_, SpecRow>(&specs, json, "Specifications")?;
        },
        Commands::Years => {
            let years = repo.years(ctx).await?;
            if json {
                println!("{}", serde_json::to_string(&years)?);
            } else {
                for year in years {
                    println!("{year}");
                }
            }
        },
        Commands::Node { id } => {
            let node = repo
                .node(ctx, &Id::from(id.as_str()))
                .await?
                .ok_or_else(|| anyhow!("Node '{id}' not found."))?;
            println!("{}", serde_json::to_string_pretty(&node)?);
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("Related"), Ok(DatasetTypeCategory::Related));
        assert_eq!(
            parse_category("misc"),
            Err("unknown category 'misc'".to_string())
        );
    }

    #[test]
    fn test_config_from_flags() {
        let cli = Cli::parse_from([
            "plateau-catalog",
            "--input",
            "a.json",
            "--min-interval-secs",
            "0",
            "--cms-url",
            "https://cms.example.com",
            "--cms-workspace",
            "ws",
            "years",
        ]);
        let config = config(&cli);
        assert_eq!(config.min_update_interval, Duration::ZERO);
        assert_eq!(
            config.cms.map(|c| c.workspace),
            Some("ws".to_string())
        );
        assert!(matches!(cli.command, Commands::Years));
    }

    #[test]
    fn test_missing_dump() {
        let err = read_dump(Path::new("does-not-exist.json"));
        assert!(err.is_err_and(|e| e.to_string().starts_with("Failed to open")));
    }
}
