// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the STS client.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StsError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	#[error("Request timed out")]
	Timeout,

	/// The STS did not accept the client assertion.
	#[error("Unauthorized: client assertion rejected")]
	Unauthorized,

	#[error("Forbidden: client not allowed to obtain tokens")]
	Forbidden,

	#[error("STS error: {status} - {message}")]
	ApiError { status: u16, message: String },

	#[error("Invalid response from STS: {0}")]
	InvalidResponse(String),

	#[error("Configuration error: {0}")]
	Config(String),

	/// The signing key could not be read or parsed.
	#[error("Signing key error ({}): {message}", .path.display())]
	Key { path: PathBuf, message: String },

	/// JWT signing/encoding error.
	#[error("JWT error: {0}")]
	Jwt(String),
}

impl StsError {
	pub fn api_error(status: u16, message: impl Into<String>) -> Self {
		Self::ApiError {
			status,
			message: message.into(),
		}
	}

	pub fn key(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
		Self::Key {
			path: path.into(),
			message: message.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn api_error_display() {
		let err = StsError::api_error(500, "boom");
		assert_eq!(err.to_string(), "STS error: 500 - boom");
	}

	#[test]
	fn key_error_names_the_file() {
		let err = StsError::key("/etc/migrator/sts.pem", "not a PEM file");
		assert_eq!(
			err.to_string(),
			"Signing key error (/etc/migrator/sts.pem): not a PEM file"
		);
	}
}
