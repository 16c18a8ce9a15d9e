// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! A group of records sent in one bulk request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credential::CredentialRecord;

/// Run-unique batch identifier, used as the SCIM `bulkId` of every operation
/// in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for BatchId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// An ordered, owned group of credential records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
	id: BatchId,
	records: Vec<CredentialRecord>,
}

impl Batch {
	pub fn new(id: BatchId, records: Vec<CredentialRecord>) -> Self {
		Self { id, records }
	}

	pub fn id(&self) -> &BatchId {
		&self.id
	}

	pub fn records(&self) -> &[CredentialRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn into_records(self) -> Vec<CredentialRecord> {
		self.records
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn batch_id_serializes_as_plain_string() {
		let id = BatchId::new("20261018T101500-3");
		assert_eq!(serde_json::to_string(&id).unwrap(), "\"20261018T101500-3\"");
		assert_eq!(id.to_string(), "20261018T101500-3");
	}

	#[test]
	fn batch_exposes_records_in_order() {
		let batch = Batch::new(
			BatchId::new("run-0"),
			vec![
				CredentialRecord::new("a", "a@example.com"),
				CredentialRecord::new("b", "b@example.com"),
			],
		);
		assert_eq!(batch.len(), 2);
		let ids: Vec<&str> = batch.records().iter().map(|r| r.external_id()).collect();
		assert_eq!(ids, ["a", "b"]);
	}
}
