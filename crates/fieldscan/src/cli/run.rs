//! `fieldscan run` - inventory one or more categories under a set of roots.
//!
//! # Usage
//!
//! ```bash
//! fieldscan run --root /data/field --output ./inventory --category tables
//! fieldscan run --root /a --root /b --output ./out --prefix neom \
//!     --category geodatabases --category images --config fieldscan.toml
//! ```

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::error::HelpfulError;
use crate::cli::output::{print_table, report_rows, REPORT_HEADERS};
use crate::config::InventoryConfig;
use crate::pipeline::process_category;
use crate::types::{Category, PipelineReport};

/// Arguments for the `run` command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory to scan (repeatable)
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Directory receiving the CSV files
    #[arg(long, short, value_name = "DIR")]
    pub output: PathBuf,

    /// Prefix for output file names
    #[arg(long, default_value = "metadata")]
    pub prefix: String,

    /// Category to inventory (repeatable)
    #[arg(long = "category", short = 'c', value_enum)]
    pub categories: Vec<Category>,

    /// TOML file overriding vocabularies, suffixes and constants
    #[arg(long, env = "FIELDSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<InventoryConfig, HelpfulError> {
    match path {
        Some(path) => InventoryConfig::load(path)
            .map_err(|err| HelpfulError::config_error(path, &err.to_string())),
        None => Ok(InventoryConfig::default()),
    }
}

fn validate(args: &RunArgs) -> Result<Vec<Category>, HelpfulError> {
    if args.roots.is_empty() {
        return Err(HelpfulError::no_roots());
    }
    for root in &args.roots {
        if !root.exists() {
            return Err(HelpfulError::root_not_found(root));
        }
        if !root.is_dir() {
            return Err(HelpfulError::not_a_directory(root));
        }
    }
    if args.prefix.is_empty()
        || args.prefix.contains(['/', '\\'])
        || args.prefix.starts_with('.')
    {
        return Err(HelpfulError::invalid_prefix(&args.prefix));
    }
    if args.categories.is_empty() {
        return Err(HelpfulError::new("No categories selected")
            .with_context("Choose at least one of: geodatabases, shapefiles, tables, images")
            .with_suggestion("TRY: fieldscan run --root DIR --output DIR --category tables"));
    }

    // Fixed pipeline order, each category once.
    Ok(Category::ALL
        .into_iter()
        .filter(|category| args.categories.contains(category))
        .collect())
}

pub fn run(args: RunArgs) -> Result<()> {
    let categories = validate(&args)?;
    let config = load_config(args.config.as_deref())?;

    let mut reports: Vec<PipelineReport> = Vec::new();
    for category in categories {
        info!(category = %category, roots = args.roots.len(), "Starting pipeline");
        let report = process_category(category, &args.roots, &args.output, &args.prefix, &config)
            .map_err(|err| HelpfulError::pipeline_failed(category.as_str(), &format!("{:#}", err)))?;
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_table(&REPORT_HEADERS, report_rows(&reports));
    }
    Ok(())
}
