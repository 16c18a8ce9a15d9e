// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SCIM 2.0 bulk provisioning for credential migration.
//!
//! [`BulkEncoder`] turns a [`Batch`](migrator_common_core::Batch) into a
//! `BulkRequest` with one `POST /Users` operation per record,
//! [`decode_response`] parses the `BulkResponse`, and [`ScimClient`] sends the
//! request to `<base-url>/scim/v2/Bulk`.

pub mod client;
pub mod codec;
pub mod error;
pub mod types;

pub use client::{BulkUserApi, ScimClient, ScimClientConfig};
pub use codec::{decode_response, BulkEncoder, DEFAULT_LOCALE};
pub use error::ScimError;
pub use types::{
	BulkOperation, BulkRequest, BulkResponse, BulkResponseOperation, HashedPassword,
	MigrateUserData, OperationStatus,
};
