// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Line-oriented result reporting.
//!
//! Every line is keyed by batch id so the append-only log can be grepped per
//! batch after a run.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use migrator_common_core::BatchId;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

#[derive(Debug, Error)]
pub enum SinkError {
	#[error("Failed to create log directory {}: {source}", .path.display())]
	CreateDir {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("Failed to open log file {}: {source}", .path.display())]
	Open {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("Failed to write result line: {0}")]
	Write(#[from] io::Error),
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTotals {
	pub batches: usize,
	pub completed: usize,
	pub failed: usize,
	pub skipped: usize,
	pub succeeded_records: usize,
	pub rejected_records: usize,
	pub unknown_records: usize,
}

/// One result line. `Display` renders the exact text written to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
	BatchStarted { batch_id: BatchId, records: usize },
	OperationStatus { batch_id: BatchId, path: String, status: String },
	TokenFailed { batch_id: BatchId, error: String },
	BatchFailed { batch_id: BatchId, error: String },
	OutcomesUnknown { batch_id: BatchId, records: usize },
	BatchDone { batch_id: BatchId },
	BatchSkipped { batch_id: BatchId },
	Elapsed(Duration),
	Summary { totals: RunTotals, failed: Vec<BatchId> },
}

impl fmt::Display for MigrationEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::BatchStarted { batch_id, records } => {
				write!(f, "begin batch {batch_id} ({records} records)")
			}
			Self::OperationStatus {
				batch_id,
				path,
				status,
			} => write!(f, "batch {batch_id}, path {path} status {status}"),
			Self::TokenFailed { batch_id, error } => {
				write!(f, "ERROR: batch: {batch_id}, token: {error}")
			}
			Self::BatchFailed { batch_id, error } => write!(f, "ERROR: batch: {batch_id}, {error}"),
			Self::OutcomesUnknown { batch_id, records } => {
				write!(f, "batch {batch_id}: {records} record outcomes unknown")
			}
			Self::BatchDone { batch_id } => write!(f, "done batch {batch_id}"),
			Self::BatchSkipped { batch_id } => write!(f, "skipped batch {batch_id}"),
			Self::Elapsed(elapsed) => write!(
				f,
				"Elapsed time {}",
				humantime::format_duration(Duration::from_millis(elapsed.as_millis() as u64))
			),
			Self::Summary { totals, failed } => {
				write!(
					f,
					"summary: {} batches, {} completed, {} failed, {} skipped; records: {} succeeded, {} rejected, {} unknown",
					totals.batches,
					totals.completed,
					totals.failed,
					totals.skipped,
					totals.succeeded_records,
					totals.rejected_records,
					totals.unknown_records,
				)?;
				if !failed.is_empty() {
					let ids: Vec<&str> = failed.iter().map(BatchId::as_str).collect();
					write!(f, "; failed batches: {}", ids.join(", "))?;
				}
				Ok(())
			}
		}
	}
}

/// Destination for result lines, shared by all workers.
///
/// Implementations must write each event as one whole line, even when called
/// concurrently.
#[async_trait]
pub trait ResultSink: Send + Sync {
	async fn emit(&self, event: &MigrationEvent) -> Result<(), SinkError>;
}

type Console = Box<dyn AsyncWrite + Send + Unpin>;

struct LogFileHandle {
	console: Console,
	file: File,
}

/// Writes results to the console and appends them, timestamped, to
/// `<log_dir>/<run start>.log`.
pub struct LogFileSink {
	path: PathBuf,
	handle: tokio::sync::Mutex<LogFileHandle>,
}

impl LogFileSink {
	/// Opens the run log, creating `log_dir` if needed. Console output goes to
	/// stdout.
	pub async fn open(log_dir: &Path, run_started: DateTime<Utc>) -> Result<Self, SinkError> {
		Self::with_console(log_dir, run_started, Box::new(tokio::io::stdout())).await
	}

	pub async fn with_console(
		log_dir: &Path,
		run_started: DateTime<Utc>,
		console: Console,
	) -> Result<Self, SinkError> {
		tokio::fs::create_dir_all(log_dir)
			.await
			.map_err(|e| SinkError::CreateDir {
				path: log_dir.to_path_buf(),
				source: e,
			})?;

		let path = log_dir.join(log_file_name(run_started));
		let file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&path)
			.await
			.map_err(|e| SinkError::Open {
				path: path.clone(),
				source: e,
			})?;

		debug!(path = %path.display(), "opened result log");
		Ok(Self {
			path,
			handle: tokio::sync::Mutex::new(LogFileHandle { console, file }),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

fn log_file_name(run_started: DateTime<Utc>) -> String {
	format!(
		"{}.log",
		run_started.to_rfc3339_opts(SecondsFormat::Secs, true)
	)
}

#[async_trait]
impl ResultSink for LogFileSink {
	async fn emit(&self, event: &MigrationEvent) -> Result<(), SinkError> {
		let line = event.to_string();
		let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
		let console_line = format!("{line}\n");
		let file_line = format!("{stamp} {line}\n");

		let mut handle = self.handle.lock().await;
		handle.console.write_all(console_line.as_bytes()).await?;
		handle.console.flush().await?;
		handle.file.write_all(file_line.as_bytes()).await?;
		handle.file.flush().await?;
		Ok(())
	}
}

/// Collects lines in memory.
#[derive(Default)]
pub struct MemorySink {
	events: Mutex<Vec<MigrationEvent>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn events(&self) -> Vec<MigrationEvent> {
		self.events.lock().clone()
	}

	pub fn lines(&self) -> Vec<String> {
		self.events.lock().iter().map(ToString::to_string).collect()
	}
}

#[async_trait]
impl ResultSink for MemorySink {
	async fn emit(&self, event: &MigrationEvent) -> Result<(), SinkError> {
		self.events.lock().push(event.clone());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use std::sync::Arc;
	use tokio::io::AsyncReadExt;

	fn id(s: &str) -> BatchId {
		BatchId::new(s)
	}

	#[test]
	fn lines_match_log_format() {
		let cases = [
			(
				MigrationEvent::BatchStarted {
					batch_id: id("r-0"),
					records: 100,
				},
				"begin batch r-0 (100 records)",
			),
			(
				MigrationEvent::OperationStatus {
					batch_id: id("r-0"),
					path: "/Users".to_string(),
					status: "201".to_string(),
				},
				"batch r-0, path /Users status 201",
			),
			(
				MigrationEvent::TokenFailed {
					batch_id: id("r-1"),
					error: "Request timed out".to_string(),
				},
				"ERROR: batch: r-1, token: Request timed out",
			),
			(
				MigrationEvent::BatchFailed {
					batch_id: id("r-1"),
					error: "not success got 500: boom".to_string(),
				},
				"ERROR: batch: r-1, not success got 500: boom",
			),
			(
				MigrationEvent::OutcomesUnknown {
					batch_id: id("r-1"),
					records: 100,
				},
				"batch r-1: 100 record outcomes unknown",
			),
			(
				MigrationEvent::BatchDone { batch_id: id("r-0") },
				"done batch r-0",
			),
			(
				MigrationEvent::BatchSkipped { batch_id: id("r-2") },
				"skipped batch r-2",
			),
			(
				MigrationEvent::Elapsed(Duration::from_millis(61_500)),
				"Elapsed time 1m 1s 500ms",
			),
		];

		for (event, expected) in cases {
			assert_eq!(event.to_string(), expected);
		}
	}

	#[test]
	fn summary_lists_failed_batches() {
		let event = MigrationEvent::Summary {
			totals: RunTotals {
				batches: 3,
				completed: 1,
				failed: 1,
				skipped: 1,
				succeeded_records: 99,
				rejected_records: 1,
				unknown_records: 100,
			},
			failed: vec![id("r-1")],
		};
		assert_eq!(
			event.to_string(),
			"summary: 3 batches, 1 completed, 1 failed, 1 skipped; records: 99 succeeded, 1 rejected, 100 unknown; failed batches: r-1"
		);
	}

	#[tokio::test]
	async fn log_file_gets_timestamped_lines() {
		let dir = tempfile::tempdir().unwrap();
		let log_dir = dir.path().join("logs");
		let started = Utc.with_ymd_and_hms(2026, 10, 18, 10, 15, 0).unwrap();

		let sink = LogFileSink::with_console(&log_dir, started, Box::new(tokio::io::sink()))
			.await
			.unwrap();
		assert_eq!(sink.path(), log_dir.join("2026-10-18T10:15:00Z.log"));

		sink.emit(&MigrationEvent::BatchDone { batch_id: id("r-0") })
			.await
			.unwrap();
		sink.emit(&MigrationEvent::BatchSkipped { batch_id: id("r-1") })
			.await
			.unwrap();

		let content = std::fs::read_to_string(sink.path()).unwrap();
		let lines: Vec<&str> = content.lines().collect();
		assert_eq!(lines.len(), 2);
		assert!(lines[0].ends_with(" done batch r-0"));
		assert!(lines[1].ends_with(" skipped batch r-1"));
		let stamp = lines[0].split(' ').next().unwrap();
		assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
	}

	#[tokio::test]
	async fn reopening_appends() {
		let dir = tempfile::tempdir().unwrap();
		let started = Utc.with_ymd_and_hms(2026, 10, 18, 10, 15, 0).unwrap();

		for batch in ["a", "b"] {
			let sink = LogFileSink::with_console(dir.path(), started, Box::new(tokio::io::sink()))
				.await
				.unwrap();
			sink.emit(&MigrationEvent::BatchDone { batch_id: id(batch) })
				.await
				.unwrap();
		}

		let content = std::fs::read_to_string(dir.path().join("2026-10-18T10:15:00Z.log")).unwrap();
		assert_eq!(content.lines().count(), 2);
	}

	#[tokio::test]
	async fn unwritable_log_dir_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let blocker = dir.path().join("not-a-dir");
		std::fs::write(&blocker, "").unwrap();

		let result = LogFileSink::open(&blocker.join("logs"), Utc::now()).await;
		assert!(matches!(result, Err(SinkError::CreateDir { .. })));
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
	async fn concurrent_emits_keep_lines_whole() {
		let dir = tempfile::tempdir().unwrap();
		let sink = Arc::new(
			LogFileSink::with_console(dir.path(), Utc::now(), Box::new(tokio::io::sink()))
				.await
				.unwrap(),
		);

		let handles: Vec<_> = (0..8)
			.map(|t| {
				let sink = Arc::clone(&sink);
				tokio::spawn(async move {
					for i in 0..50 {
						sink.emit(&MigrationEvent::BatchDone {
							batch_id: BatchId::new(format!("t{t}-{i}")),
						})
						.await
						.unwrap();
					}
				})
			})
			.collect();
		for handle in handles {
			handle.await.unwrap();
		}

		let content = std::fs::read_to_string(sink.path()).unwrap();
		assert_eq!(content.lines().count(), 400);
		assert!(content.lines().all(|line| line.contains(" done batch t")));
	}

	#[tokio::test]
	async fn console_gets_plain_lines() {
		let dir = tempfile::tempdir().unwrap();
		let (console, mut reader) = tokio::io::duplex(1024);
		let sink = LogFileSink::with_console(dir.path(), Utc::now(), Box::new(console))
			.await
			.unwrap();

		sink.emit(&MigrationEvent::BatchDone { batch_id: id("r-0") })
			.await
			.unwrap();
		drop(sink);

		let mut out = String::new();
		reader.read_to_string(&mut out).await.unwrap();
		assert_eq!(out, "done batch r-0\n");
	}

	#[tokio::test]
	async fn memory_sink_collects_lines() {
		let sink = MemorySink::new();
		sink.emit(&MigrationEvent::BatchDone { batch_id: id("x") })
			.await
			.unwrap();
		assert_eq!(sink.lines(), vec!["done batch x".to_string()]);
		assert_eq!(sink.events().len(), 1);
	}
}
