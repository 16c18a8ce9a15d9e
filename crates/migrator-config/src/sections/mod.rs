// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for the migrator.

pub mod logging;
pub mod migration;
pub mod scim;
pub mod sts;

pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use migration::{MigrationConfig, MigrationConfigLayer, TerminationMode};
pub use scim::{ScimConfig, ScimConfigLayer};
pub use sts::{StsConfig, StsConfigLayer};
