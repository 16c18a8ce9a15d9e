// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing helpers shared by the section finalizers.

use std::num::NonZeroUsize;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub(crate) fn require<T>(key: &str, value: Option<T>) -> Result<T, ConfigError> {
	value.ok_or_else(|| ConfigError::missing(key))
}

/// Parses a humantime duration such as `1s`, `500ms` or `10m`.
pub(crate) fn duration(key: &str, raw: &str) -> Result<Duration, ConfigError> {
	humantime::parse_duration(raw.trim())
		.map_err(|e| ConfigError::invalid(key, format!("invalid duration '{raw}': {e}")))
}

pub(crate) fn duration_or(
	key: &str,
	raw: Option<String>,
	default: Duration,
) -> Result<Duration, ConfigError> {
	match raw {
		Some(raw) => duration(key, &raw),
		None => Ok(default),
	}
}

/// Parses an absolute `http`/`https` URL.
pub(crate) fn http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw.trim())
		.map_err(|e| ConfigError::invalid(key, format!("invalid URL '{raw}': {e}")))?;
	match url.scheme() {
		"http" | "https" => Ok(url),
		other => Err(ConfigError::invalid(
			key,
			format!("unsupported scheme '{other}', expected http or https"),
		)),
	}
}

pub(crate) fn positive(key: &str, value: usize) -> Result<NonZeroUsize, ConfigError> {
	NonZeroUsize::new(value).ok_or_else(|| ConfigError::invalid(key, "must be greater than zero"))
}
