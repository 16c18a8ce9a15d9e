// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Credential ingestion from headerless CSV.
//!
//! Each row carries exactly four fields: external id, email, bcrypt password
//! hash and salt. An empty password means the user is created without one.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use migrator_common_core::CredentialRecord;
use thiserror::Error;
use tracing::{debug, instrument};

const FIELDS_PER_ROW: usize = 4;

#[derive(Debug, Error)]
pub enum SourceError {
	#[error("Failed to open credential file {}: {source}", .path.display())]
	Open {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Malformed CSV at line {line}: {source}")]
	Csv {
		line: u64,
		#[source]
		source: csv::Error,
	},

	#[error("Line {line}: expected 4 fields, found {found}")]
	FieldCount { line: u64, found: usize },
}

/// Reads every credential in `path`; any malformed row fails the whole read.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_credentials(path: &Path) -> Result<Vec<CredentialRecord>, SourceError> {
	let file = File::open(path).map_err(|e| SourceError::Open {
		path: path.to_path_buf(),
		source: e,
	})?;
	let records = read_credentials_from(file)?;
	debug!(records = records.len(), "read credential file");
	Ok(records)
}

pub fn read_credentials_from<R: Read>(reader: R) -> Result<Vec<CredentialRecord>, SourceError> {
	let mut csv_reader = csv::ReaderBuilder::new()
		.has_headers(false)
		.flexible(true)
		.from_reader(reader);

	let mut credentials = Vec::new();
	for result in csv_reader.records() {
		let row = result.map_err(|e| SourceError::Csv {
			line: e.position().map(|p| p.line()).unwrap_or(0),
			source: e,
		})?;
		let line = row.position().map(|p| p.line()).unwrap_or(0);

		if row.len() != FIELDS_PER_ROW {
			return Err(SourceError::FieldCount {
				line,
				found: row.len(),
			});
		}

		credentials.push(CredentialRecord::from_fields(
			&row[0], &row[1], &row[2], &row[3],
		));
	}

	Ok(credentials)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_rows_in_order() {
		let input = "\
testtitle,test@title.com,$2y$12$ChbwHQfqD5OhGdpApsS6rOZ1GHd/m5QATPfrlguAAdE8lWsyiUTMG,24f270110bee22027bcb18
u-2,two@example.com,,
";
		let records = read_credentials_from(input.as_bytes()).unwrap();

		assert_eq!(records.len(), 2);
		assert_eq!(records[0].external_id(), "testtitle");
		assert_eq!(records[0].email(), "test@title.com");
		assert_eq!(records[0].password().unwrap().salt(), "24f270110bee22027bcb18");
		assert_eq!(records[1].external_id(), "u-2");
		assert!(records[1].password().is_none());
	}

	#[test]
	fn quoted_fields_are_unescaped() {
		let input = "\"u,1\",\"a@example.com\",,\n";
		let records = read_credentials_from(input.as_bytes()).unwrap();
		assert_eq!(records[0].external_id(), "u,1");
	}

	#[test]
	fn empty_file_has_no_records() {
		assert!(read_credentials_from("".as_bytes()).unwrap().is_empty());
	}

	#[test]
	fn short_row_is_rejected_with_line_number() {
		let input = "u-1,a@example.com,,\nu-2,b@example.com\n";
		let err = read_credentials_from(input.as_bytes()).unwrap_err();
		assert!(matches!(err, SourceError::FieldCount { line: 2, found: 2 }));
	}

	#[test]
	fn missing_file_is_open_error() {
		let err = read_credentials(Path::new("/nonexistent/users.csv")).unwrap_err();
		assert!(matches!(err, SourceError::Open { .. }));
		assert!(err.to_string().contains("/nonexistent/users.csv"));
	}

	#[test]
	fn reads_from_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("users.csv");
		std::fs::write(&path, "u-1,a@example.com,hash,salt\n").unwrap();

		let records = read_credentials(&path).unwrap();
		assert_eq!(records.len(), 1);
		assert!(records[0].password().is_some());
	}
}
