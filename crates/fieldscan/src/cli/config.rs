//! `fieldscan config` - print the effective configuration

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::run::load_config;
use fieldscan_logging::{fieldscan_home, logs_dir};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Show this file merged over the defaults instead of the defaults
    #[arg(long, env = "FIELDSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the configuration to a file instead of printing it
    #[arg(long, value_name = "FILE")]
    pub write: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    if let Some(path) = &args.write {
        config.save(path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if args.json {
        let value = serde_json::json!({
            "home": fieldscan_home().to_string_lossy(),
            "logs": logs_dir().to_string_lossy(),
            "inventory": config,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("# home: {}", fieldscan_home().display());
        println!("# logs: {}", logs_dir().display());
        print!("{}", config.to_toml()?);
    }
    Ok(())
}
