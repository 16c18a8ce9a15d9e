// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client with a consistent User-Agent header.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::debug;

/// Creates a client builder carrying the migrator User-Agent.
///
/// Use this when a caller needs more than a timeout, e.g. a custom
/// connection pool size.
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Builds a client whose requests fail after `timeout`.
///
/// TLS backend initialisation can fail on stripped-down hosts, so the build
/// error is returned rather than unwrapped.
pub fn client_with_timeout(timeout: Duration) -> Result<Client, reqwest::Error> {
	debug!(timeout_ms = timeout.as_millis() as u64, "building HTTP client");
	builder().timeout(timeout).build()
}

/// Returns the User-Agent string: `corporate-admin-migrator/{version}`.
pub fn user_agent() -> String {
	format!("corporate-admin-migrator/{}", env!("CARGO_PKG_VERSION"))
}
