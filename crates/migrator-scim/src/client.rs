// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport for SCIM bulk user creation.

use std::time::Duration;

use async_trait::async_trait;
use migrator_common_core::{AccessToken, Batch};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::codec::{decode_response, BulkEncoder};
use crate::error::ScimError;
use crate::types::BulkResponse;

const BULK_ENDPOINT: &str = "/scim/v2/Bulk";
const HEADER_ENTITY_ID: &str = "X-Global-Entity-ID";
const HEADER_CLIENT_ID: &str = "X-CLIENT-ID";
const JSON: &str = "application/json";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// The remote call a migration worker makes for each batch.
#[async_trait]
pub trait BulkUserApi: Send + Sync {
	async fn migrate_users(
		&self,
		token: &AccessToken,
		batch: &Batch,
	) -> Result<BulkResponse, ScimError>;
}

#[derive(Debug, Clone)]
pub struct ScimClientConfig {
	pub base_url: Url,
	pub client_id: String,
	pub entity_id: String,
	pub locale: String,
	pub request_timeout: Duration,
}

/// Client for the identity service's bulk endpoint.
#[derive(Clone)]
pub struct ScimClient {
	http: Client,
	bulk_url: Url,
	client_id: String,
	encoder: BulkEncoder,
}

impl ScimClient {
	pub fn new(config: ScimClientConfig) -> Result<Self, ScimError> {
		let http = migrator_common_http::client_with_timeout(config.request_timeout)
			.map_err(|e| ScimError::Config(format!("failed to create HTTP client: {e}")))?;
		let bulk_url = bulk_url(&config.base_url)?;

		debug!(bulk_url = %bulk_url, entity_id = %config.entity_id, "created SCIM client");

		Ok(Self {
			http,
			bulk_url,
			client_id: config.client_id,
			encoder: BulkEncoder::new(config.entity_id).with_locale(config.locale),
		})
	}
}

#[async_trait]
impl BulkUserApi for ScimClient {
	#[instrument(skip_all, fields(batch_id = %batch.id(), records = batch.len()))]
	async fn migrate_users(
		&self,
		token: &AccessToken,
		batch: &Batch,
	) -> Result<BulkResponse, ScimError> {
		let body = self.encoder.encode_to_vec(batch)?;

		let response = self
			.http
			.post(self.bulk_url.clone())
			.bearer_auth(token.expose())
			.header(HEADER_ENTITY_ID, self.encoder.entity_id())
			.header(HEADER_CLIENT_ID, &self.client_id)
			.header(CONTENT_TYPE, JSON)
			.header(ACCEPT, JSON)
			.body(body)
			.send()
			.await
			.map_err(map_send_error)?;

		let status = response.status();
		if status != StatusCode::OK && status != StatusCode::CREATED {
			let body = response.text().await.unwrap_or_default();
			warn!(status = status.as_u16(), "bulk request rejected");
			return Err(ScimError::unexpected_status(
				status.as_u16(),
				truncate(&body, MAX_ERROR_BODY_CHARS),
			));
		}

		let bytes = response.bytes().await.map_err(map_send_error)?;
		let decoded = decode_response(&bytes)?;
		debug!(operations = decoded.operations.len(), "bulk response decoded");
		Ok(decoded)
	}
}

fn bulk_url(base: &Url) -> Result<Url, ScimError> {
	let raw = format!("{}{BULK_ENDPOINT}", base.as_str().trim_end_matches('/'));
	Url::parse(&raw).map_err(|e| ScimError::Config(format!("invalid SCIM base URL '{base}': {e}")))
}

fn map_send_error(e: reqwest::Error) -> ScimError {
	if e.is_timeout() {
		ScimError::Timeout
	} else {
		ScimError::Network(e)
	}
}

fn truncate(body: &str, max_chars: usize) -> String {
	match body.char_indices().nth(max_chars) {
		Some((idx, _)) => format!("{}…", &body[..idx]),
		None => body.to_string(),
	}
}
