// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batch ⇄ SCIM bulk message conversion.

use migrator_common_core::{Batch, CredentialRecord};

use crate::error::ScimError;
use crate::types::{
	BulkOperation, BulkRequest, BulkResponse, HashedPassword, MigrateUserData,
	CRYPT_ALGORITHM_BCRYPT, METHOD_POST, SCHEMA_CORE_USER, USERS_PATH,
};

pub const DEFAULT_LOCALE: &str = "en-US";

/// Builds bulk requests for one deployment.
///
/// The entity id and locale are the same for every user of a run, so they
/// are fixed at construction.
#[derive(Debug, Clone)]
pub struct BulkEncoder {
	entity_id: String,
	locale: String,
}

impl BulkEncoder {
	pub fn new(entity_id: impl Into<String>) -> Self {
		Self {
			entity_id: entity_id.into(),
			locale: DEFAULT_LOCALE.to_string(),
		}
	}

	pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = locale.into();
		self
	}

	pub fn entity_id(&self) -> &str {
		&self.entity_id
	}

	/// One `POST /Users` operation per record, in batch order, all tagged
	/// with the batch id.
	pub fn encode(&self, batch: &Batch) -> BulkRequest {
		let bulk_id = batch.id().as_str();
		let operations = batch
			.records()
			.iter()
			.map(|record| BulkOperation {
				method: METHOD_POST.to_string(),
				path: USERS_PATH.to_string(),
				bulk_id: bulk_id.to_string(),
				data: self.user_data(record),
			})
			.collect();

		BulkRequest::new(operations)
	}

	pub fn encode_to_vec(&self, batch: &Batch) -> Result<Vec<u8>, ScimError> {
		serde_json::to_vec(&self.encode(batch)).map_err(ScimError::Encode)
	}

	fn user_data(&self, record: &CredentialRecord) -> MigrateUserData {
		MigrateUserData {
			schemas: vec![SCHEMA_CORE_USER.to_string()],
			external_id: record.external_id().to_string(),
			email: record.email().to_string(),
			global_entity_id: self.entity_id.clone(),
			hashed_password: record.password().map(|password| HashedPassword {
				password: password.hash().expose().clone(),
				crypt_algorithm: CRYPT_ALGORITHM_BCRYPT.to_string(),
				salt: password.salt().to_string(),
			}),
			preferred_language: self.locale.clone(),
		}
	}
}

pub fn decode_response(body: &[u8]) -> Result<BulkResponse, ScimError> {
	serde_json::from_slice(body).map_err(ScimError::Decode)
}
