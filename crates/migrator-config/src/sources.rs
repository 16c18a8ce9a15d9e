// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML file, environment and command line.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::MigratorConfigLayer;
use crate::sections::{
	LoggingConfigLayer, MigrationConfigLayer, ScimConfigLayer, StsConfigLayer,
};

pub const DEFAULT_CONFIG_PATH: &str = "./config/migrator.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
	CommandLine = 80,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<MigratorConfigLayer, ConfigError>;
}

/// Built-in defaults source.
///
/// Defaults live in each section's `finalize`, so this layer is empty; it
/// anchors the bottom of the precedence order.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<MigratorConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(MigratorConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl Default for TomlSource {
	fn default() -> Self {
		Self::new(DEFAULT_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<MigratorConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(MigratorConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: MigratorConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Environment variable source.
///
/// Convention: `MIGRATOR_<SECTION>_<FIELD>`, plus `MIGRATOR_CLIENT_ID`.
pub struct EnvSource {
	lookup: Lookup,
}

impl EnvSource {
	/// Reads the process environment.
	pub fn system() -> Self {
		Self::with_lookup(|name| std::env::var(name).ok())
	}

	/// Reads variables through `lookup` instead of the process environment.
	pub fn with_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String> + Send + Sync + 'static,
	{
		Self {
			lookup: Box::new(lookup),
		}
	}

	fn var(&self, name: &str) -> Option<String> {
		(self.lookup)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Result<Option<bool>, ConfigError> {
		match self.var(name) {
			Some(v) => match v.to_ascii_lowercase().as_str() {
				"true" | "1" | "yes" => Ok(Some(true)),
				"false" | "0" | "no" => Ok(Some(false)),
				_ => Err(ConfigError::invalid(name, format!("invalid bool value '{v}'"))),
			},
			None => Ok(None),
		}
	}

	fn parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
		match self.var(name) {
			Some(v) => v.trim().parse().map(Some).map_err(|_| {
				ConfigError::invalid(name, format!("invalid value '{v}'"))
			}),
			None => Ok(None),
		}
	}

	fn sts(&self) -> Result<StsConfigLayer, ConfigError> {
		Ok(StsConfigLayer {
			url: self.var("MIGRATOR_STS_URL"),
			key_id: self.var("MIGRATOR_STS_KEY_ID"),
			key_path: self.var("MIGRATOR_STS_KEY_PATH").map(PathBuf::from),
			token_path: self.var("MIGRATOR_STS_TOKEN_PATH"),
			refresh_period: self.var("MIGRATOR_STS_REFRESH_PERIOD"),
			request_timeout: self.var("MIGRATOR_STS_REQUEST_TIMEOUT"),
			cache_tokens: self.bool("MIGRATOR_STS_CACHE_TOKENS")?,
		})
	}

	fn scim(&self) -> ScimConfigLayer {
		ScimConfigLayer {
			url: self.var("MIGRATOR_SCIM_URL"),
			entity_id: self.var("MIGRATOR_SCIM_ENTITY_ID"),
			locale: self.var("MIGRATOR_SCIM_LOCALE"),
			request_timeout: self.var("MIGRATOR_SCIM_REQUEST_TIMEOUT"),
		}
	}

	fn migration(&self) -> Result<MigrationConfigLayer, ConfigError> {
		Ok(MigrationConfigLayer {
			batch_size: self.parsed("MIGRATOR_MIGRATION_BATCH_SIZE")?,
			concurrency: self.parsed("MIGRATOR_MIGRATION_CONCURRENCY")?,
			batch_pause: self.var("MIGRATOR_MIGRATION_BATCH_PAUSE"),
			termination: self
				.var("MIGRATOR_MIGRATION_TERMINATION")
				.map(|v| v.parse())
				.transpose()?,
			log_dir: self.var("MIGRATOR_MIGRATION_LOG_DIR").map(PathBuf::from),
			batch_prefix: self.var("MIGRATOR_MIGRATION_BATCH_PREFIX"),
		})
	}

	fn logging(&self) -> Result<LoggingConfigLayer, ConfigError> {
		Ok(LoggingConfigLayer {
			level: self.var("MIGRATOR_LOGGING_LEVEL"),
			format: self
				.var("MIGRATOR_LOGGING_FORMAT")
				.map(|v| v.parse())
				.transpose()?,
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<MigratorConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(MigratorConfigLayer {
			client_id: self.var("MIGRATOR_CLIENT_ID"),
			sts: Some(self.sts()?),
			scim: Some(self.scim()),
			migration: Some(self.migration()?),
			logging: Some(self.logging()?),
		})
	}
}

/// Overrides given on the command line; these win over every other source.
pub struct CliSource {
	layer: MigratorConfigLayer,
}

impl CliSource {
	pub fn new(layer: MigratorConfigLayer) -> Self {
		Self { layer }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"command-line"
	}

	fn precedence(&self) -> Precedence {
		Precedence::CommandLine
	}

	fn load(&self) -> Result<MigratorConfigLayer, ConfigError> {
		debug!("applying command-line overrides");
		Ok(self.layer.clone())
	}
}
