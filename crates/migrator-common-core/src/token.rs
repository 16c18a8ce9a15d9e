// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use migrator_common_secret::SecretString;

/// Bearer token presented to the identity service.
///
/// An empty token is a legal value: when the STS cannot be reached the worker
/// still attempts the send, and the identity service rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(SecretString);

impl AccessToken {
	pub fn new(token: impl Into<SecretString>) -> Self {
		Self(token.into())
	}

	pub fn empty() -> Self {
		Self(SecretString::from(""))
	}

	pub fn expose(&self) -> &str {
		self.0.expose()
	}
}
