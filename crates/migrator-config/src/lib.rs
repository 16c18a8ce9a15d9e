// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the credential migrator.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file,
//!   environment, command line)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`MIGRATOR_*`)
//!
//! # Usage
//!
//! ```ignore
//! use migrator_config::{load_config, MigratorConfigLayer};
//!
//! let config = load_config(None, MigratorConfigLayer::default())?;
//! println!("sending to {}", config.scim.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;
mod value;

pub use error::ConfigError;
pub use layer::MigratorConfigLayer;
pub use sections::*;
pub use sources::{
	CliSource, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource, DEFAULT_CONFIG_PATH,
};

use std::path::PathBuf;

use tracing::debug;

/// Fully resolved migrator configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MigratorConfig {
	pub client_id: String,
	pub sts: StsConfig,
	pub scim: ScimConfig,
	pub migration: MigrationConfig,
	pub logging: LoggingConfig,
}

/// Load configuration with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables (`MIGRATOR_*`)
/// 3. Config file (`config_path`, or `./config/migrator.toml`)
/// 4. Built-in defaults
pub fn load_config(
	config_path: Option<PathBuf>,
	overrides: MigratorConfigLayer,
) -> Result<MigratorConfig, ConfigError> {
	let toml = config_path.map(TomlSource::new).unwrap_or_default();
	load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(toml),
		Box::new(EnvSource::system()),
		Box::new(CliSource::new(overrides)),
	])
}

/// Merge `sources` in precedence order and finalize the result.
pub fn load_config_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<MigratorConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = MigratorConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: MigratorConfigLayer) -> Result<MigratorConfig, ConfigError> {
	let client_id = value::require("client_id", layer.client_id)?;
	if client_id.trim().is_empty() {
		return Err(ConfigError::invalid("client_id", "must not be empty"));
	}

	let sts = layer.sts.unwrap_or_default().finalize()?;
	let scim = layer.scim.unwrap_or_default().finalize()?;
	let migration = layer.migration.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	Ok(MigratorConfig {
		client_id,
		sts,
		scim,
		migration,
		logging,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use std::time::Duration;

	const FILE: &str = r#"
client_id = "file-client"

[sts]
url = "https://sts.example.com"
key_id = "kid-1"
key_path = "/etc/migrator/sts.pem"

[scim]
url = "https://idm.example.com/keymaker"

[migration]
batch_size = 50
concurrency = 2
batch_pause = "250ms"
"#;

	fn write_config(dir: &tempfile::TempDir) -> PathBuf {
		let path = dir.path().join("migrator.toml");
		std::fs::write(&path, FILE).unwrap();
		path
	}

	fn env(pairs: &[(&str, &str)]) -> EnvSource {
		let vars: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		EnvSource::with_lookup(move |name| vars.get(name).cloned())
	}

	#[test]
	fn file_values_resolve_with_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let config = load_config_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::new(write_config(&dir))),
		])
		.unwrap();

		assert_eq!(config.client_id, "file-client");
		assert_eq!(config.sts.token_path, "/oauth2/token");
		assert_eq!(config.scim.entity_id, "FP_SG");
		assert_eq!(config.migration.batch_size.get(), 50);
		assert_eq!(config.migration.batch_pause, Duration::from_millis(250));
		assert_eq!(config.logging.level, "info");
	}

	#[test]
	fn later_sources_win_regardless_of_order_given() {
		let dir = tempfile::tempdir().unwrap();
		let overrides = MigratorConfigLayer {
			migration: Some(MigrationConfigLayer {
				concurrency: Some(8),
				..Default::default()
			}),
			..Default::default()
		};

		let config = load_config_from_sources(vec![
			Box::new(CliSource::new(overrides)),
			Box::new(env(&[
				("MIGRATOR_CLIENT_ID", "env-client"),
				("MIGRATOR_MIGRATION_CONCURRENCY", "4"),
			])),
			Box::new(TomlSource::new(write_config(&dir))),
			Box::new(DefaultsSource),
		])
		.unwrap();

		assert_eq!(config.client_id, "env-client");
		assert_eq!(config.migration.concurrency.get(), 8);
		assert_eq!(config.migration.batch_size.get(), 50);
	}

	#[test]
	fn missing_client_id_is_fatal() {
		let err = load_config_from_sources(vec![Box::new(DefaultsSource)]).unwrap_err();
		assert!(matches!(err, ConfigError::MissingField(ref key) if key == "client_id"));
	}

	#[test]
	fn invalid_sts_url_is_fatal() {
		let layer = MigratorConfigLayer {
			client_id: Some("c".to_string()),
			sts: Some(StsConfigLayer {
				url: Some("sts.example.com".to_string()),
				key_id: Some("kid".to_string()),
				key_path: Some(PathBuf::from("k.pem")),
				..Default::default()
			}),
			..Default::default()
		};
		let err = finalize(layer).unwrap_err();
		assert!(err.to_string().contains("sts.url"));
	}
}
