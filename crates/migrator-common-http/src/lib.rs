// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the migrator.
//!
//! Both outbound services (the STS and the SCIM endpoint) are reached through
//! clients built here so they carry the same User-Agent and an explicit
//! request timeout.

mod client;

pub use client::{builder, client_with_timeout, user_agent};
