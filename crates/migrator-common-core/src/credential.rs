// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! One user to migrate, as read from the credential export.

use migrator_common_secret::SecretString;

/// A bcrypt hash and the salt it was produced with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
	hash: SecretString,
	salt: String,
}

impl PasswordHash {
	pub fn new(hash: impl Into<SecretString>, salt: impl Into<String>) -> Self {
		Self {
			hash: hash.into(),
			salt: salt.into(),
		}
	}

	pub fn hash(&self) -> &SecretString {
		&self.hash
	}

	pub fn salt(&self) -> &str {
		&self.salt
	}
}

/// An identity record: external id, email and an optional password hash.
///
/// Records are immutable once built. A record without a password is still
/// migrated; the identity service then expects the user to reset it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
	external_id: String,
	email: String,
	password: Option<PasswordHash>,
}

impl CredentialRecord {
	pub fn new(external_id: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			external_id: external_id.into(),
			email: email.into(),
			password: None,
		}
	}

	/// Builds a record from the four export columns.
	///
	/// An empty password column means the user has no password; the salt is
	/// dropped with it.
	pub fn from_fields(
		external_id: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
		salt: impl Into<String>,
	) -> Self {
		Self::new(external_id, email).with_password(password, salt)
	}

	pub fn with_password(mut self, password: impl Into<String>, salt: impl Into<String>) -> Self {
		let password = password.into();
		self.password = if password.is_empty() {
			None
		} else {
			Some(PasswordHash::new(password, salt))
		};
		self
	}

	pub fn external_id(&self) -> &str {
		&self.external_id
	}

	pub fn email(&self) -> &str {
		&self.email
	}

	pub fn password(&self) -> Option<&PasswordHash> {
		self.password.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_password_means_no_password() {
		let record = CredentialRecord::from_fields("u-1", "a@example.com", "", "somesalt");
		assert!(record.password().is_none());
	}

	#[test]
	fn password_and_salt_are_kept_verbatim() {
		let record = CredentialRecord::from_fields(
			"u-2",
			"b@example.com",
			"$2y$12$ChbwHQfqD5OhGdpApsS6rO",
			"24f270110bee22027bcb18",
		);
		let password = record.password().unwrap();
		assert_eq!(password.hash().expose(), "$2y$12$ChbwHQfqD5OhGdpApsS6rO");
		assert_eq!(password.salt(), "24f270110bee22027bcb18");
	}

	#[test]
	fn debug_does_not_print_the_hash() {
		let record = CredentialRecord::from_fields("u-3", "c@example.com", "$2y$12$secret", "s");
		let debug = format!("{record:?}");
		assert!(!debug.contains("$2y$12$secret"));
		assert!(debug.contains("c@example.com"));
	}
}
