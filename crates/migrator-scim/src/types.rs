// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const SCHEMA_CORE_USER: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const SCHEMA_BULK_REQUEST: &str = "urn:ietf:params:scim:api:messages:2.0:BulkRequest";
pub const SCHEMA_BULK_RESPONSE: &str = "urn:ietf:params:scim:api:messages:2.0:BulkResponse";

pub const METHOD_POST: &str = "POST";
pub const USERS_PATH: &str = "/Users";
pub const CRYPT_ALGORITHM_BCRYPT: &str = "bcrypt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
	pub schemas: Vec<String>,
	#[serde(rename = "Operations")]
	pub operations: Vec<BulkOperation>,
}

impl BulkRequest {
	pub fn new(operations: Vec<BulkOperation>) -> Self {
		Self {
			schemas: vec![SCHEMA_BULK_REQUEST.to_string()],
			operations,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperation {
	pub method: String,
	pub path: String,
	pub bulk_id: String,
	pub data: MigrateUserData,
}

/// User payload of a single create operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateUserData {
	pub schemas: Vec<String>,
	pub external_id: String,
	pub email: String,
	pub global_entity_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub hashed_password: Option<HashedPassword>,
	pub preferred_language: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashedPassword {
	pub password: String,
	pub crypt_algorithm: String,
	pub salt: String,
}

impl fmt::Debug for HashedPassword {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HashedPassword")
			.field("password", &"[REDACTED]")
			.field("crypt_algorithm", &self.crypt_algorithm)
			.field("salt", &self.salt)
			.finish()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
	#[serde(default)]
	pub schemas: Vec<String>,
	#[serde(rename = "Operations", alias = "operations", default)]
	pub operations: Vec<BulkResponseOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponseOperation {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub method: Option<String>,
	#[serde(default)]
	pub bulk_id: String,
	#[serde(default)]
	pub path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	pub status: OperationStatus,
	/// Error detail returned for failed operations.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub response: Option<serde_json::Value>,
}

/// Per-operation status as reported by the identity service.
///
/// RFC 7644 carries it as a string (`"201"`), some servers send a bare
/// integer; both are accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationStatus(String);

impl OperationStatus {
	pub fn new(status: impl Into<String>) -> Self {
		Self(status.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The HTTP-style code, if the status starts with one.
	pub fn code(&self) -> Option<u16> {
		let digits: String = self.0.trim().chars().take_while(char::is_ascii_digit).collect();
		digits.parse().ok()
	}

	pub fn is_success(&self) -> bool {
		matches!(self.code(), Some(200..=299))
	}
}

impl fmt::Display for OperationStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Serialize for OperationStatus {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for OperationStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Text(String),
			Code(u64),
		}

		Ok(match Raw::deserialize(deserializer)? {
			Raw::Text(text) => Self(text),
			Raw::Code(code) => Self(code.to_string()),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_accepts_string_and_integer() {
		let text: OperationStatus = serde_json::from_str("\"201\"").unwrap();
		let number: OperationStatus = serde_json::from_str("409").unwrap();
		assert_eq!(text.code(), Some(201));
		assert!(text.is_success());
		assert_eq!(number.as_str(), "409");
		assert!(!number.is_success());
	}

	#[test]
	fn status_with_reason_phrase_still_has_a_code() {
		let status = OperationStatus::new("201 Created");
		assert_eq!(status.code(), Some(201));
	}

	#[test]
	fn non_numeric_status_is_not_success() {
		let status = OperationStatus::new("unknown");
		assert_eq!(status.code(), None);
		assert!(!status.is_success());
	}

	#[test]
	fn hashed_password_debug_hides_the_hash() {
		let block = HashedPassword {
			password: "$2y$12$hash".to_string(),
			crypt_algorithm: CRYPT_ALGORITHM_BCRYPT.to_string(),
			salt: "salt".to_string(),
		};
		assert!(!format!("{block:?}").contains("$2y$12$hash"));
	}
}
