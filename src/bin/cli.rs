// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detector geometry CLI

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dpsim::cli::Reporter;
use dpsim::{io, DetectorConfig, DetectorConstruction, MaterialCatalog};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dpsim-geom")]
#[command(about = "Build and inspect the test-stand detector geometry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Construct the detector and print a summary
    Build {
        #[command(flatten)]
        settings: Settings,

        /// Placement tree depth to print
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },

    /// Construct the detector and write its description as JSON
    Export {
        #[command(flatten)]
        settings: Settings,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the structural fingerprint of the constructed detector
    Fingerprint {
        #[command(flatten)]
        settings: Settings,
    },

    /// List the material catalog
    Materials,
}

/// Pre-construction settings; flags override the config file and environment
#[derive(Args)]
struct Settings {
    /// TOML configuration file (defaults to dpsim.toml when present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    target_material: Option<String>,

    /// Recoil tracker field (tesla)
    #[arg(long)]
    recoil_field: Option<f64>,

    /// Tag tracker field (tesla)
    #[arg(long)]
    tag_field: Option<f64>,

    /// Step-length hint for tracker planes (mm)
    #[arg(long)]
    max_step: Option<f64>,

    #[arg(long)]
    no_overlap_check: bool,
}

impl Settings {
    fn resolve(&self) -> Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_file(path)?.with_env_overrides(|key| std::env::var(key).ok())?,
            None => DetectorConfig::load()?,
        };
        if let Some(material) = &self.target_material {
            config = config.with_target_material(material.clone());
        }
        if let Some(field) = self.recoil_field {
            config = config.with_recoil_field(field);
        }
        if let Some(field) = self.tag_field {
            config = config.with_tag_field(field);
        }
        if self.max_step.is_some() {
            config = config.with_max_step(self.max_step);
        }
        if self.no_overlap_check {
            config = config.with_check_overlaps(false);
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli.command) {
        Reporter::report_error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    let mut construction = DetectorConstruction::new();

    match command {
        Commands::Build { settings, depth } => {
            let config = settings.resolve()?;
            if !config.check_overlaps {
                Reporter::report_warning("overlap checking is disabled");
            }
            let start = Instant::now();
            let detector = construction.construct(&config)?;
            Reporter::report_build(&detector, depth, start.elapsed());
        }
        Commands::Export { settings, output } => {
            let detector = construction.construct(&settings.resolve()?)?;
            io::export_json(&detector, &output)?;
            Reporter::success(&format!("Wrote {}", output.display()));
        }
        Commands::Fingerprint { settings } => {
            let detector = construction.construct(&settings.resolve()?)?;
            println!("{}", detector.fingerprint());
        }
        Commands::Materials => {
            Reporter::report_materials(&MaterialCatalog::new());
        }
    }

    Ok(())
}
