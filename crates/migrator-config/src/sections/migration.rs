// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch dispatch configuration.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::value;

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(100) {
	Some(size) => size,
	None => panic!("batch size must be positive"),
};
pub const DEFAULT_CONCURRENCY: NonZeroUsize = NonZeroUsize::MIN;
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(1);

fn default_log_dir() -> PathBuf {
	PathBuf::from("./logs")
}

/// What the dispatcher does after a batch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationMode {
	/// Attempt every batch and report failures at the end.
	#[default]
	#[serde(alias = "drain-to-completion")]
	Drain,
	/// Stop handing out batches after the first failure.
	FailFast,
}

impl FromStr for TerminationMode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"drain" | "drain-to-completion" => Ok(Self::Drain),
			"fail-fast" | "failfast" => Ok(Self::FailFast),
			other => Err(ConfigError::invalid(
				"migration.termination",
				format!("unknown mode '{other}', expected 'drain' or 'fail-fast'"),
			)),
		}
	}
}

impl fmt::Display for TerminationMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Drain => f.write_str("drain"),
			Self::FailFast => f.write_str("fail-fast"),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MigrationConfig {
	pub batch_size: NonZeroUsize,
	pub concurrency: NonZeroUsize,
	/// Pause a worker takes after each batch before pulling the next one.
	pub batch_pause: Duration,
	pub termination: TerminationMode,
	pub log_dir: PathBuf,
	/// Run prefix for batch ids; a timestamp is used when unset.
	pub batch_prefix: Option<String>,
}

impl Default for MigrationConfig {
	fn default() -> Self {
		Self {
			batch_size: DEFAULT_BATCH_SIZE,
			concurrency: DEFAULT_CONCURRENCY,
			batch_pause: DEFAULT_BATCH_PAUSE,
			termination: TerminationMode::default(),
			log_dir: default_log_dir(),
			batch_prefix: None,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfigLayer {
	#[serde(default)]
	pub batch_size: Option<usize>,
	#[serde(default)]
	pub concurrency: Option<usize>,
	#[serde(default)]
	pub batch_pause: Option<String>,
	#[serde(default)]
	pub termination: Option<TerminationMode>,
	#[serde(default)]
	pub log_dir: Option<PathBuf>,
	#[serde(default)]
	pub batch_prefix: Option<String>,
}

impl MigrationConfigLayer {
	pub fn merge(&mut self, other: MigrationConfigLayer) {
		if other.batch_size.is_some() {
			self.batch_size = other.batch_size;
		}
		if other.concurrency.is_some() {
			self.concurrency = other.concurrency;
		}
		if other.batch_pause.is_some() {
			self.batch_pause = other.batch_pause;
		}
		if other.termination.is_some() {
			self.termination = other.termination;
		}
		if other.log_dir.is_some() {
			self.log_dir = other.log_dir;
		}
		if other.batch_prefix.is_some() {
			self.batch_prefix = other.batch_prefix;
		}
	}

	pub fn finalize(self) -> Result<MigrationConfig, ConfigError> {
		let batch_prefix = self.batch_prefix.filter(|p| !p.trim().is_empty());
		Ok(MigrationConfig {
			batch_size: value::positive(
				"migration.batch_size",
				self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE.get()),
			)?,
			concurrency: value::positive(
				"migration.concurrency",
				self.concurrency.unwrap_or(DEFAULT_CONCURRENCY.get()),
			)?,
			batch_pause: value::duration_or(
				"migration.batch_pause",
				self.batch_pause,
				DEFAULT_BATCH_PAUSE,
			)?,
			termination: self.termination.unwrap_or_default(),
			log_dir: self.log_dir.unwrap_or_else(default_log_dir),
			batch_prefix,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layer_finalize_defaults() {
		let config = MigrationConfigLayer::default().finalize().unwrap();
		assert_eq!(config, MigrationConfig::default());
		assert_eq!(config.batch_size.get(), 100);
		assert_eq!(config.concurrency.get(), 1);
		assert_eq!(config.batch_pause, Duration::from_secs(1));
		assert_eq!(config.termination, TerminationMode::Drain);
		assert_eq!(config.log_dir, PathBuf::from("./logs"));
		assert!(config.batch_prefix.is_none());
	}

	#[test]
	fn zero_concurrency_is_rejected() {
		let err = MigrationConfigLayer {
			concurrency: Some(0),
			..Default::default()
		}
		.finalize()
		.unwrap_err();
		assert!(err.to_string().contains("migration.concurrency"));
	}

	#[test]
	fn zero_pause_is_allowed() {
		let config = MigrationConfigLayer {
			batch_pause: Some("0s".to_string()),
			..Default::default()
		}
		.finalize()
		.unwrap();
		assert_eq!(config.batch_pause, Duration::ZERO);
	}

	#[test]
	fn blank_prefix_falls_back_to_timestamp() {
		let config = MigrationConfigLayer {
			batch_prefix: Some(" ".to_string()),
			..Default::default()
		}
		.finalize()
		.unwrap();
		assert!(config.batch_prefix.is_none());
	}

	#[test]
	fn termination_parses_from_toml_and_text() {
		let layer: MigrationConfigLayer = toml::from_str(r#"termination = "fail-fast""#).unwrap();
		assert_eq!(layer.termination, Some(TerminationMode::FailFast));

		let layer: MigrationConfigLayer =
			toml::from_str(r#"termination = "drain-to-completion""#).unwrap();
		assert_eq!(layer.termination, Some(TerminationMode::Drain));

		assert_eq!(
			"FAIL-FAST".parse::<TerminationMode>().unwrap(),
			TerminationMode::FailFast
		);
		assert!("sometimes".parse::<TerminationMode>().is_err());
	}

	#[test]
	fn unknown_keys_are_rejected() {
		let result: Result<MigrationConfigLayer, _> = toml::from_str("batchsize = 10");
		assert!(result.is_err());
	}
}
