// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Everything that can make a bulk request fail as a whole.
///
/// Each variant is terminal for the batch: no per-record outcome is known.
#[derive(Debug, Error)]
pub enum ScimError {
	#[error("failed to encode bulk request: {0}")]
	Encode(#[source] serde_json::Error),

	#[error("network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("request timed out")]
	Timeout,

	#[error("not success got {status}: {message}")]
	UnexpectedStatus { status: u16, message: String },

	#[error("failed to decode bulk response: {0}")]
	Decode(#[source] serde_json::Error),

	#[error("configuration error: {0}")]
	Config(String),
}

impl ScimError {
	pub fn unexpected_status(status: u16, message: impl Into<String>) -> Self {
		Self::UnexpectedStatus {
			status,
			message: message.into(),
		}
	}

	/// HTTP status observed, when the failure was a rejected request.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::UnexpectedStatus { status, .. } => Some(*status),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unexpected_status_display_carries_code() {
		let err = ScimError::unexpected_status(503, "upstream unavailable");
		assert_eq!(err.to_string(), "not success got 503: upstream unavailable");
		assert_eq!(err.status(), Some(503));
	}

	#[test]
	fn timeout_has_no_status() {
		assert_eq!(ScimError::Timeout.status(), None);
	}
}
