// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Concurrent batch migration pipeline.
//!
//! Credentials read by [`source`] are split by the [`Batcher`], handed to a
//! bounded pool of workers by the [`Dispatcher`], and every result line goes
//! to a [`ResultSink`].

pub mod batcher;
pub mod dispatcher;
pub mod sink;
pub mod source;
pub mod worker;

pub use batcher::{run_prefix, Batcher};
pub use dispatcher::{Dispatcher, DispatcherConfig, MigrationSummary, TerminationPolicy};
pub use sink::{LogFileSink, MemorySink, MigrationEvent, ResultSink, RunTotals, SinkError};
pub use source::{read_credentials, read_credentials_from, SourceError};
pub use worker::{BatchOutcome, BatchResult, WorkerContext};
