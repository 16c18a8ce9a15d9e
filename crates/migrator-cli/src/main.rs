// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Bulk credential migrator binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use migrator_config::{
	load_config, LogFormat, LoggingConfig, MigrationConfigLayer, MigratorConfig,
	MigratorConfigLayer, TerminationMode,
};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod migrate;

use migrate::{RunOptions, RunStatus};

/// Migrate credentials from a CSV export into the identity service.
#[derive(Parser, Debug)]
#[command(name = "migrator", version, about, long_about = None)]
struct Args {
	/// Headerless CSV: external id, email, password hash, salt
	#[arg(short, long)]
	file: PathBuf,

	/// Number of concurrent workers (overrides config)
	#[arg(short, long)]
	concurrency: Option<usize>,

	/// Read and batch the input, then exit without sending anything
	#[arg(short, long)]
	dry_run: bool,

	/// Path to configuration file (default: ./config/migrator.toml)
	#[arg(long, env = "MIGRATOR_CONFIG")]
	config: Option<PathBuf>,

	/// Records per bulk request (overrides config)
	#[arg(long)]
	batch_size: Option<usize>,

	/// Directory for the run log (overrides config)
	#[arg(long)]
	log_dir: Option<PathBuf>,

	/// Stop dispatching after the first failed batch
	#[arg(long)]
	fail_fast: bool,
}

impl From<&Args> for MigratorConfigLayer {
	fn from(args: &Args) -> Self {
		let migration = MigrationConfigLayer {
			batch_size: args.batch_size,
			concurrency: args.concurrency,
			termination: args.fail_fast.then_some(TerminationMode::FailFast),
			log_dir: args.log_dir.clone(),
			..Default::default()
		};
		MigratorConfigLayer {
			migration: Some(migration),
			..Default::default()
		}
	}
}

fn init_tracing(logging: &LoggingConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(std::io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(std::io::stderr))
				.init();
		}
	}
}

fn log_resolved(config: &MigratorConfig) {
	info!(
		sts_url = %config.sts.url,
		scim_url = %config.scim.url,
		batch_size = config.migration.batch_size.get(),
		concurrency = config.migration.concurrency.get(),
		termination = %config.migration.termination,
		log_dir = %config.migration.log_dir.display(),
		"configuration loaded"
	);
}

async fn run(args: Args) -> Result<RunStatus> {
	let config = load_config(args.config.clone(), MigratorConfigLayer::from(&args))
		.context("failed to load configuration")?;

	init_tracing(&config.logging);
	log_resolved(&config);

	let options = RunOptions {
		file: args.file,
		dry_run: args.dry_run,
	};
	migrate::run(&config, &options).await
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	match run(args).await {
		Ok(status) => status.exit_code(),
		Err(e) => {
			eprintln!("error: {e:#}");
			RunStatus::fatal_exit()
		}
	}
}
