// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! One migration run, from CSV to summary.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use migrator_config::{MigratorConfig, TerminationMode};
use migrator_pipeline::{
	read_credentials, run_prefix, Batcher, Dispatcher, DispatcherConfig, LogFileSink,
	TerminationPolicy,
};
use migrator_scim::{ScimClient, ScimClientConfig};
use migrator_sts::{token_url, SigningKey, StsClient, StsClientConfig};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunOptions {
	pub file: PathBuf,
	pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
	/// Every record got an outcome from the service (or nothing was sent in a
	/// dry run).
	Success,
	/// At least one batch failed or was skipped, or some record outcomes are
	/// unknown.
	Incomplete,
}

impl RunStatus {
	pub fn exit_code(self) -> ExitCode {
		match self {
			Self::Success => ExitCode::SUCCESS,
			Self::Incomplete => ExitCode::from(1),
		}
	}

	/// Configuration, input or key errors that stop the run before dispatch.
	pub fn fatal_exit() -> ExitCode {
		ExitCode::from(2)
	}
}

fn termination_policy(mode: TerminationMode) -> TerminationPolicy {
	match mode {
		TerminationMode::Drain => TerminationPolicy::DrainToCompletion,
		TerminationMode::FailFast => TerminationPolicy::FailFast,
	}
}

/// Everything that can abort the run happens before the first batch is
/// dispatched: reading the CSV, parsing the signing key, building clients
/// and opening the run log.
pub async fn run(config: &MigratorConfig, options: &RunOptions) -> Result<RunStatus> {
	let run_started = Utc::now();

	let records = read_credentials(&options.file)
		.with_context(|| format!("failed to read {}", options.file.display()))?;
	let total_records = records.len();

	let prefix = config
		.migration
		.batch_prefix
		.clone()
		.unwrap_or_else(|| run_prefix(run_started));
	let batches = Batcher::new(config.migration.batch_size, prefix).split(records);

	let signing_key = SigningKey::from_file(config.sts.key_id.clone(), &config.sts.key_path)
		.context("failed to load STS signing key")?;

	info!(
		records = total_records,
		batches = batches.len(),
		first = batches.first().map(|b| b.id().to_string()),
		last = batches.last().map(|b| b.id().to_string()),
		"input batched"
	);

	if options.dry_run {
		println!(
			"dry run: {total_records} records in {} batches, nothing sent",
			batches.len()
		);
		return Ok(RunStatus::Success);
	}

	let sts = StsClient::new(StsClientConfig {
		token_url: token_url(&config.sts.url, &config.sts.token_path)?,
		client_id: config.client_id.clone(),
		signing_key,
		scopes: Vec::new(),
		refresh_period: config.sts.refresh_period,
		request_timeout: config.sts.request_timeout,
		cache_tokens: config.sts.cache_tokens,
	})?;

	let scim = ScimClient::new(ScimClientConfig {
		base_url: config.scim.url.clone(),
		client_id: config.client_id.clone(),
		entity_id: config.scim.entity_id.clone(),
		locale: config.scim.locale.clone(),
		request_timeout: config.scim.request_timeout,
	})?;

	let sink = LogFileSink::open(&config.migration.log_dir, run_started)
		.await
		.context("failed to open run log")?;
	info!(path = %sink.path().display(), "writing run log");

	let dispatcher = Dispatcher::new(
		DispatcherConfig {
			concurrency: config.migration.concurrency,
			batch_pause: config.migration.batch_pause,
			termination: termination_policy(config.migration.termination),
		},
		Arc::new(sts),
		Arc::new(scim),
		Arc::new(sink),
	);

	println!("start migrating users");
	let summary = dispatcher.run(batches).await;

	Ok(if summary.is_success() {
		RunStatus::Success
	} else {
		RunStatus::Incomplete
	})
}
