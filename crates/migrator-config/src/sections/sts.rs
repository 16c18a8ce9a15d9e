// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security token service configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::value;

pub const DEFAULT_TOKEN_PATH: &str = "/oauth2/token";
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_STS_TIMEOUT: Duration = Duration::from_secs(30);

/// STS configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq)]
pub struct StsConfig {
	pub url: Url,
	pub key_id: String,
	/// PEM file holding the RSA private key used to sign client assertions.
	pub key_path: PathBuf,
	pub token_path: String,
	pub refresh_period: Duration,
	pub request_timeout: Duration,
	pub cache_tokens: bool,
}

/// STS configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StsConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub key_id: Option<String>,
	#[serde(default)]
	pub key_path: Option<PathBuf>,
	#[serde(default)]
	pub token_path: Option<String>,
	#[serde(default)]
	pub refresh_period: Option<String>,
	#[serde(default)]
	pub request_timeout: Option<String>,
	#[serde(default)]
	pub cache_tokens: Option<bool>,
}

impl StsConfigLayer {
	pub fn merge(&mut self, other: StsConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.key_id.is_some() {
			self.key_id = other.key_id;
		}
		if other.key_path.is_some() {
			self.key_path = other.key_path;
		}
		if other.token_path.is_some() {
			self.token_path = other.token_path;
		}
		if other.refresh_period.is_some() {
			self.refresh_period = other.refresh_period;
		}
		if other.request_timeout.is_some() {
			self.request_timeout = other.request_timeout;
		}
		if other.cache_tokens.is_some() {
			self.cache_tokens = other.cache_tokens;
		}
	}

	pub fn finalize(self) -> Result<StsConfig, ConfigError> {
		let url = value::require("sts.url", self.url)?;
		Ok(StsConfig {
			url: value::http_url("sts.url", &url)?,
			key_id: value::require("sts.key_id", self.key_id)?,
			key_path: value::require("sts.key_path", self.key_path)?,
			token_path: self
				.token_path
				.unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string()),
			refresh_period: value::duration_or(
				"sts.refresh_period",
				self.refresh_period,
				DEFAULT_REFRESH_PERIOD,
			)?,
			request_timeout: value::duration_or(
				"sts.request_timeout",
				self.request_timeout,
				DEFAULT_STS_TIMEOUT,
			)?,
			cache_tokens: self.cache_tokens.unwrap_or(true),
		})
	}
}
