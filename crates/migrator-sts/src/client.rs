// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client-credentials exchange against the security token service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use migrator_common_core::AccessToken;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace, warn};
use url::Url;

use crate::error::StsError;
use crate::jwt::{generate_client_assertion, SigningKey};

const GRANT_TYPE: &str = "client_credentials";
const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// A cached token is refreshed this long before it actually expires.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

pub const DEFAULT_TOKEN_PATH: &str = "/oauth2/token";
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(10 * 60);

/// Source of bearer tokens for outbound identity-service calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
	async fn access_token(&self) -> Result<AccessToken, StsError>;
}

#[derive(Debug, Clone)]
pub struct StsClientConfig {
	/// Full token endpoint URL, also used as the assertion audience.
	pub token_url: Url,
	pub client_id: String,
	pub signing_key: SigningKey,
	pub scopes: Vec<String>,
	/// Token lifetime assumed when the STS omits `expires_in`.
	pub refresh_period: Duration,
	pub request_timeout: Duration,
	pub cache_tokens: bool,
}

/// Joins the STS base URL and the token path.
pub fn token_url(base: &Url, path: &str) -> Result<Url, StsError> {
	let raw = format!(
		"{}/{}",
		base.as_str().trim_end_matches('/'),
		path.trim_start_matches('/')
	);
	Url::parse(&raw).map_err(|e| StsError::Config(format!("invalid STS token URL '{raw}': {e}")))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default)]
	expires_in: Option<u64>,
}

struct CachedToken {
	token: AccessToken,
	expires_at: Instant,
}

impl CachedToken {
	fn new(token: AccessToken, valid_for: Duration) -> Self {
		Self {
			token,
			expires_at: Instant::now() + valid_for,
		}
	}

	fn is_valid(&self, margin: Duration) -> bool {
		Instant::now() + margin < self.expires_at
	}
}

/// Token provider backed by the STS token endpoint.
///
/// With caching enabled a token is reused until it is within a minute of
/// expiry; concurrent callers that miss the cache wait on a single fetch.
#[derive(Clone)]
pub struct StsClient {
	http: Client,
	config: StsClientConfig,
	token_cache: Arc<Mutex<Option<CachedToken>>>,
	/// Serializes token fetches so a cold cache triggers one exchange.
	fetch_lock: Arc<Mutex<()>>,
}

impl StsClient {
	pub fn new(config: StsClientConfig) -> Result<Self, StsError> {
		let http = migrator_common_http::client_with_timeout(config.request_timeout)
			.map_err(|e| StsError::Config(format!("failed to create HTTP client: {e}")))?;

		debug!(
			token_url = %config.token_url,
			key_id = config.signing_key.key_id(),
			cache_tokens = config.cache_tokens,
			"created STS client"
		);

		Ok(Self {
			http,
			config,
			token_cache: Arc::new(Mutex::new(None)),
			fetch_lock: Arc::new(Mutex::new(())),
		})
	}

	async fn cached(&self) -> Option<AccessToken> {
		let cache = self.token_cache.lock().await;
		cache
			.as_ref()
			.filter(|cached| cached.is_valid(Duration::from_secs(TOKEN_REFRESH_MARGIN_SECS)))
			.map(|cached| cached.token.clone())
	}

	async fn cached_access_token(&self) -> Result<AccessToken, StsError> {
		if let Some(token) = self.cached().await {
			trace!("Using cached access token");
			return Ok(token);
		}

		let _guard = self.fetch_lock.lock().await;

		if let Some(token) = self.cached().await {
			trace!("Using cached access token (post-lock)");
			return Ok(token);
		}

		let (token, valid_for) = self.fetch_token().await?;
		let mut cache = self.token_cache.lock().await;
		*cache = Some(CachedToken::new(token.clone(), valid_for));

		info!(valid_for_secs = valid_for.as_secs(), "Access token refreshed");
		Ok(token)
	}

	#[instrument(skip(self), fields(token_url = %self.config.token_url))]
	async fn fetch_token(&self) -> Result<(AccessToken, Duration), StsError> {
		let assertion = generate_client_assertion(
			&self.config.client_id,
			self.config.token_url.as_str(),
			&self.config.signing_key,
		)?;
		let scope = self.config.scopes.join(" ");

		let form = [
			("grant_type", GRANT_TYPE),
			("client_assertion_type", CLIENT_ASSERTION_TYPE),
			("client_assertion", assertion.as_str()),
			("client_id", self.config.client_id.as_str()),
			("scope", scope.as_str()),
		];

		let response = self
			.http
			.post(self.config.token_url.clone())
			.form(&form)
			.send()
			.await
			.map_err(|e| {
				if e.is_timeout() {
					StsError::Timeout
				} else {
					StsError::Network(e)
				}
			})?;

		let status = response.status();
		match status {
			StatusCode::UNAUTHORIZED => return Err(StsError::Unauthorized),
			StatusCode::FORBIDDEN => return Err(StsError::Forbidden),
			s if !s.is_success() => {
				let message = response.text().await.unwrap_or_default();
				warn!(status = s.as_u16(), "token request rejected");
				return Err(StsError::api_error(s.as_u16(), message));
			}
			_ => {}
		}

		let body: TokenResponse = response
			.json()
			.await
			.map_err(|e| StsError::InvalidResponse(e.to_string()))?;

		if body.access_token.is_empty() {
			return Err(StsError::InvalidResponse(
				"response carried no access_token".to_string(),
			));
		}
		if let Some(token_type) = body.token_type.as_deref() {
			if !token_type.eq_ignore_ascii_case("bearer") {
				debug!(token_type, "STS returned a non-bearer token type");
			}
		}

		let valid_for = body
			.expires_in
			.map(Duration::from_secs)
			.unwrap_or(self.config.refresh_period);

		Ok((AccessToken::new(body.access_token), valid_for))
	}
}

#[async_trait]
impl TokenProvider for StsClient {
	async fn access_token(&self) -> Result<AccessToken, StsError> {
		if self.config.cache_tokens {
			self.cached_access_token().await
		} else {
			let (token, _) = self.fetch_token().await?;
			Ok(token)
		}
	}
}
