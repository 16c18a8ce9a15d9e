// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Feeds batches to a bounded worker pool and collects their outcomes.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use migrator_common_core::{Batch, BatchId};
use migrator_scim::BulkUserApi;
use migrator_sts::TokenProvider;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::sink::{MigrationEvent, ResultSink, RunTotals};
use crate::worker::{run_worker, BatchOutcome, BatchResult, WorkerContext};

/// How the run reacts to a failed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TerminationPolicy {
	/// Attempt every batch; failures are only recorded.
	#[default]
	DrainToCompletion,
	/// Stop handing out batches after the first failure. Workers finish the
	/// batch they hold; everything not yet started is reported as skipped.
	FailFast,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
	pub concurrency: NonZeroUsize,
	pub batch_pause: Duration,
	pub termination: TerminationPolicy,
}

impl Default for DispatcherConfig {
	fn default() -> Self {
		Self {
			concurrency: NonZeroUsize::MIN,
			batch_pause: Duration::from_secs(1),
			termination: TerminationPolicy::default(),
		}
	}
}

/// Everything that happened during one run.
#[derive(Debug, Clone)]
pub struct MigrationSummary {
	/// One outcome per batch, in completion order.
	pub outcomes: Vec<BatchOutcome>,
	pub elapsed: Duration,
}

impl MigrationSummary {
	pub fn totals(&self) -> RunTotals {
		let mut totals = RunTotals {
			batches: self.outcomes.len(),
			..RunTotals::default()
		};
		for outcome in &self.outcomes {
			match &outcome.result {
				BatchResult::Completed {
					succeeded,
					rejected,
					unreported,
				} => {
					totals.completed += 1;
					totals.succeeded_records += succeeded;
					totals.rejected_records += rejected;
					totals.unknown_records += unreported;
				}
				BatchResult::Failed { .. } => {
					totals.failed += 1;
					totals.unknown_records += outcome.records;
				}
				BatchResult::Skipped => totals.skipped += 1,
			}
		}
		totals
	}

	pub fn failed_batches(&self) -> Vec<BatchId> {
		let mut failed: Vec<BatchId> = self
			.outcomes
			.iter()
			.filter(|o| o.is_failed())
			.map(|o| o.batch_id.clone())
			.collect();
		failed.sort();
		failed
	}

	/// True when every batch was answered with an outcome for each of its
	/// records. Unreported records are unknown, not successes.
	pub fn is_success(&self) -> bool {
		self.outcomes
			.iter()
			.all(|o| matches!(o.result, BatchResult::Completed { unreported: 0, .. }))
	}
}

pub struct Dispatcher {
	config: DispatcherConfig,
	tokens: Arc<dyn TokenProvider>,
	api: Arc<dyn BulkUserApi>,
	sink: Arc<dyn ResultSink>,
}

impl Dispatcher {
	pub fn new(
		config: DispatcherConfig,
		tokens: Arc<dyn TokenProvider>,
		api: Arc<dyn BulkUserApi>,
		sink: Arc<dyn ResultSink>,
	) -> Self {
		Self {
			config,
			tokens,
			api,
			sink,
		}
	}

	async fn emit(&self, event: MigrationEvent) {
		if let Err(e) = self.sink.emit(&event).await {
			warn!(error = %e, line = %event, "failed to write result line");
		}
	}

	/// Runs every batch through the pool and returns once all workers have
	/// exited.
	#[instrument(skip_all, fields(batches = batches.len(), workers = self.config.concurrency.get()))]
	pub async fn run(&self, batches: Vec<Batch>) -> MigrationSummary {
		let started = Instant::now();
		let workers = self.config.concurrency.get();
		let cancel = CancellationToken::new();

		let (batch_tx, batch_rx) = mpsc::channel::<Batch>(workers);
		let queue = Arc::new(Mutex::new(batch_rx));
		let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

		let ctx = Arc::new(WorkerContext {
			tokens: Arc::clone(&self.tokens),
			api: Arc::clone(&self.api),
			sink: Arc::clone(&self.sink),
			batch_pause: self.config.batch_pause,
			stop_on_failure: self.config.termination == TerminationPolicy::FailFast,
		});

		info!(
			workers,
			termination = ?self.config.termination,
			"starting migration"
		);

		let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(workers + 1);
		for worker in 0..workers {
			handles.push(tokio::spawn(run_worker(
				worker,
				Arc::clone(&ctx),
				Arc::clone(&queue),
				outcome_tx.clone(),
				cancel.clone(),
			)));
		}

		handles.push(tokio::spawn(produce(
			batches,
			batch_tx,
			Arc::clone(&ctx),
			outcome_tx,
			cancel.clone(),
		)));

		let mut outcomes = Vec::new();
		while let Some(outcome) = outcome_rx.recv().await {
			outcomes.push(outcome);
		}

		for handle in handles {
			if let Err(e) = handle.await {
				error!(error = %e, "migration task panicked");
			}
		}

		let summary = MigrationSummary {
			outcomes,
			elapsed: started.elapsed(),
		};

		self.emit(MigrationEvent::Elapsed(summary.elapsed)).await;
		self.emit(MigrationEvent::Summary {
			totals: summary.totals(),
			failed: summary.failed_batches(),
		})
		.await;
		info!(
			elapsed_ms = summary.elapsed.as_millis() as u64,
			success = summary.is_success(),
			"migration finished"
		);

		summary
	}
}

/// Enqueues batches until done or cancelled, then closes the queue by
/// dropping the sender.
async fn produce(
	batches: Vec<Batch>,
	queue: mpsc::Sender<Batch>,
	ctx: Arc<WorkerContext>,
	outcomes: mpsc::UnboundedSender<BatchOutcome>,
	cancel: CancellationToken,
) {
	let mut batches = batches.into_iter();

	for batch in batches.by_ref() {
		let permit = tokio::select! {
			biased;
			_ = cancel.cancelled() => None,
			permit = queue.reserve() => permit.ok(),
		};

		match permit {
			Some(permit) => permit.send(batch),
			None => {
				let _ = outcomes.send(ctx.skip(&batch).await);
				break;
			}
		}
	}

	for batch in batches {
		let _ = outcomes.send(ctx.skip(&batch).await);
	}
}
