// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity service (SCIM) configuration.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::value;

pub const DEFAULT_ENTITY_ID: &str = "FP_SG";
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_SCIM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct ScimConfig {
	pub url: Url,
	/// Tenant constant sent as `X-Global-Entity-ID` and `globalEntityId`.
	pub entity_id: String,
	pub locale: String,
	pub request_timeout: Duration,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScimConfigLayer {
	#[serde(default)]
	pub url: Option<String>,
	#[serde(default)]
	pub entity_id: Option<String>,
	#[serde(default)]
	pub locale: Option<String>,
	#[serde(default)]
	pub request_timeout: Option<String>,
}

impl ScimConfigLayer {
	pub fn merge(&mut self, other: ScimConfigLayer) {
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.entity_id.is_some() {
			self.entity_id = other.entity_id;
		}
		if other.locale.is_some() {
			self.locale = other.locale;
		}
		if other.request_timeout.is_some() {
			self.request_timeout = other.request_timeout;
		}
	}

	pub fn finalize(self) -> Result<ScimConfig, ConfigError> {
		let url = value::require("scim.url", self.url)?;
		let entity_id = self
			.entity_id
			.unwrap_or_else(|| DEFAULT_ENTITY_ID.to_string());
		if entity_id.trim().is_empty() {
			return Err(ConfigError::invalid("scim.entity_id", "must not be empty"));
		}

		Ok(ScimConfig {
			url: value::http_url("scim.url", &url)?,
			entity_id,
			locale: self.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
			request_timeout: value::duration_or(
				"scim.request_timeout",
				self.request_timeout,
				DEFAULT_SCIM_TIMEOUT,
			)?,
		})
	}
}
