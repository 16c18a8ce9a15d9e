// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Splits the credential set into fixed-size, uniquely identified batches.

use std::num::NonZeroUsize;

use chrono::{DateTime, Utc};
use migrator_common_core::{Batch, BatchId, CredentialRecord};

/// Run prefix derived from the run start time, e.g. `20261018T101500`.
pub fn run_prefix(started: DateTime<Utc>) -> String {
	started.format("%Y%m%dT%H%M%S").to_string()
}

/// Produces batches of at most `capacity` records with ids
/// `<prefix>-<sequence>`, the sequence starting at 0.
#[derive(Debug, Clone)]
pub struct Batcher {
	capacity: NonZeroUsize,
	prefix: String,
	next_seq: u64,
}

impl Batcher {
	pub fn new(capacity: NonZeroUsize, prefix: impl Into<String>) -> Self {
		Self {
			capacity,
			prefix: prefix.into(),
			next_seq: 0,
		}
	}

	fn next_id(&mut self) -> BatchId {
		let id = BatchId::new(format!("{}-{}", self.prefix, self.next_seq));
		self.next_seq += 1;
		id
	}

	/// Every record lands in exactly one batch, in input order. Only the last
	/// batch may be short; empty input yields no batches.
	pub fn split(&mut self, records: Vec<CredentialRecord>) -> Vec<Batch> {
		let capacity = self.capacity.get();
		let mut batches = Vec::with_capacity(records.len().div_ceil(capacity));
		let mut records = records.into_iter().peekable();

		while records.peek().is_some() {
			let chunk: Vec<CredentialRecord> = records.by_ref().take(capacity).collect();
			let id = self.next_id();
			batches.push(Batch::new(id, chunk));
		}

		batches
	}
}
