// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client for the security token service (STS).
//!
//! The migrator proves its identity with an RS256-signed client assertion and
//! exchanges it for a short-lived bearer token. [`StsClient`] caches the token
//! until shortly before it expires; callers only see the [`TokenProvider`]
//! capability.

pub mod client;
pub mod error;
pub mod jwt;

pub use client::{
	token_url, StsClient, StsClientConfig, TokenProvider, DEFAULT_REFRESH_PERIOD, DEFAULT_TOKEN_PATH,
};
pub use error::StsError;
pub use jwt::{generate_client_assertion, SigningKey};
