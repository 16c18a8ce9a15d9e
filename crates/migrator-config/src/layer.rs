// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{LoggingConfigLayer, MigrationConfigLayer, ScimConfigLayer, StsConfigLayer};

/// Migrator configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MigratorConfigLayer {
	/// Client identifier presented to both the STS and the identity service.
	#[serde(default)]
	pub client_id: Option<String>,
	#[serde(default)]
	pub sts: Option<StsConfigLayer>,
	#[serde(default)]
	pub scim: Option<ScimConfigLayer>,
	#[serde(default)]
	pub migration: Option<MigrationConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl MigratorConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: MigratorConfigLayer) {
		if other.client_id.is_some() {
			self.client_id = other.client_id;
		}
		merge_option(&mut self.sts, other.sts, StsConfigLayer::merge);
		merge_option(&mut self.scim, other.scim, ScimConfigLayer::merge);
		merge_option(
			&mut self.migration,
			other.migration,
			MigrationConfigLayer::merge,
		);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = MigratorConfigLayer::default();
		base.merge(MigratorConfigLayer::default());
		assert_eq!(base, MigratorConfigLayer::default());
	}

	#[test]
	fn test_merge_other_overwrites() {
		let mut base = MigratorConfigLayer {
			client_id: Some("file-client".to_string()),
			migration: Some(MigrationConfigLayer {
				batch_size: Some(50),
				concurrency: Some(2),
				..Default::default()
			}),
			..Default::default()
		};
		let other = MigratorConfigLayer {
			migration: Some(MigrationConfigLayer {
				concurrency: Some(8),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(other);

		let migration = base.migration.as_ref().unwrap();
		assert_eq!(base.client_id.as_deref(), Some("file-client"));
		assert_eq!(migration.batch_size, Some(50));
		assert_eq!(migration.concurrency, Some(8));
	}

	#[test]
	fn test_merge_adds_missing_sections() {
		let mut base = MigratorConfigLayer::default();
		base.merge(MigratorConfigLayer {
			scim: Some(ScimConfigLayer {
				url: Some("https://idm.example.com".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(
			base.scim.unwrap().url.as_deref(),
			Some("https://idm.example.com")
		);
	}
}
