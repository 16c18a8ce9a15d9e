// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Migration workers: pull a batch, fetch a token, send, report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use migrator_common_core::{AccessToken, Batch, BatchId};
use migrator_scim::BulkUserApi;
use migrator_sts::TokenProvider;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::sink::{MigrationEvent, ResultSink};

/// What happened to one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
	/// The service answered; per-record outcomes were counted.
	Completed {
		succeeded: usize,
		rejected: usize,
		/// Records with no matching operation in the response.
		unreported: usize,
	},
	/// The send or decode failed; every record's outcome is unknown.
	Failed { error: String },
	/// Never attempted because the run was stopped early.
	Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
	pub batch_id: BatchId,
	pub records: usize,
	/// Set when the token fetch failed and the batch was sent without one.
	pub token_error: Option<String>,
	pub result: BatchResult,
}

impl BatchOutcome {
	pub fn skipped(batch: &Batch) -> Self {
		Self {
			batch_id: batch.id().clone(),
			records: batch.len(),
			token_error: None,
			result: BatchResult::Skipped,
		}
	}

	pub fn is_failed(&self) -> bool {
		matches!(self.result, BatchResult::Failed { .. })
	}
}

/// Shared, read-only state every worker is built with.
pub struct WorkerContext {
	pub tokens: Arc<dyn TokenProvider>,
	pub api: Arc<dyn BulkUserApi>,
	pub sink: Arc<dyn ResultSink>,
	pub batch_pause: Duration,
	/// Cancel the run as soon as a batch fails.
	pub stop_on_failure: bool,
}

impl WorkerContext {
	async fn emit(&self, event: MigrationEvent) {
		if let Err(e) = self.sink.emit(&event).await {
			warn!(error = %e, line = %event, "failed to write result line");
		}
	}

	/// Sends one batch and reports every result line for it.
	#[instrument(skip_all, fields(batch_id = %batch.id(), records = batch.len()))]
	pub async fn process(&self, batch: &Batch) -> BatchOutcome {
		let started = Instant::now();
		let batch_id = batch.id().clone();
		self.emit(MigrationEvent::BatchStarted {
			batch_id: batch_id.clone(),
			records: batch.len(),
		})
		.await;

		let mut token_error = None;
		let token = match self.tokens.access_token().await {
			Ok(token) => token,
			Err(e) => {
				warn!(error = %e, "token acquisition failed, sending without a token");
				self.emit(MigrationEvent::TokenFailed {
					batch_id: batch_id.clone(),
					error: e.to_string(),
				})
				.await;
				token_error = Some(e.to_string());
				AccessToken::empty()
			}
		};

		let result = match self.api.migrate_users(&token, batch).await {
			Ok(response) => {
				let mut succeeded = 0;
				let mut rejected = 0;
				for (ordinal, op) in response.operations.iter().enumerate() {
					self.emit(MigrationEvent::OperationStatus {
						batch_id: batch_id.clone(),
						path: op.path.clone(),
						status: op.status.to_string(),
					})
					.await;
					if ordinal >= batch.len() {
						continue;
					}
					if op.status.is_success() {
						succeeded += 1;
					} else {
						rejected += 1;
					}
				}

				let unreported = batch.len() - succeeded - rejected;
				if unreported > 0 {
					self.emit(MigrationEvent::OutcomesUnknown {
						batch_id: batch_id.clone(),
						records: unreported,
					})
					.await;
				}
				BatchResult::Completed {
					succeeded,
					rejected,
					unreported,
				}
			}
			Err(e) => {
				warn!(error = %e, status = ?e.status(), "batch failed");
				self.emit(MigrationEvent::BatchFailed {
					batch_id: batch_id.clone(),
					error: e.to_string(),
				})
				.await;
				self.emit(MigrationEvent::OutcomesUnknown {
					batch_id: batch_id.clone(),
					records: batch.len(),
				})
				.await;
				BatchResult::Failed {
					error: e.to_string(),
				}
			}
		};

		self.emit(MigrationEvent::BatchDone {
			batch_id: batch_id.clone(),
		})
		.await;
		info!(
			elapsed_ms = started.elapsed().as_millis() as u64,
			failed = matches!(result, BatchResult::Failed { .. }),
			"batch finished"
		);

		BatchOutcome {
			batch_id,
			records: batch.len(),
			token_error,
			result,
		}
	}

	pub(crate) async fn skip(&self, batch: &Batch) -> BatchOutcome {
		self.emit(MigrationEvent::BatchSkipped {
			batch_id: batch.id().clone(),
		})
		.await;
		BatchOutcome::skipped(batch)
	}
}

/// Runs until the queue is closed and drained.
///
/// Batches pulled after `cancel` fires are reported as skipped rather than
/// sent.
pub async fn run_worker(
	worker: usize,
	ctx: Arc<WorkerContext>,
	queue: Arc<Mutex<mpsc::Receiver<Batch>>>,
	outcomes: mpsc::UnboundedSender<BatchOutcome>,
	cancel: CancellationToken,
) {
	debug!(worker, "worker started");
	let mut handled = 0usize;

	loop {
		let next = {
			let mut rx = queue.lock().await;
			rx.recv().await
		};
		let Some(batch) = next else {
			break;
		};
		handled += 1;

		if cancel.is_cancelled() {
			let _ = outcomes.send(ctx.skip(&batch).await);
			continue;
		}

		let outcome = ctx.process(&batch).await;
		if outcome.is_failed() && ctx.stop_on_failure {
			info!(worker, batch_id = %outcome.batch_id, "stopping run after failed batch");
			cancel.cancel();
		}
		let _ = outcomes.send(outcome);

		if !ctx.batch_pause.is_zero() {
			tokio::select! {
				_ = tokio::time::sleep(ctx.batch_pause) => {}
				_ = cancel.cancelled() => {}
			}
		}
	}

	debug!(worker, batches = handled, "worker finished");
}
