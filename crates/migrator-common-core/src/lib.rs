// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Types shared by every stage of a migration run.

pub mod batch;
pub mod credential;
pub mod token;

pub use batch::{Batch, BatchId};
pub use credential::{CredentialRecord, PasswordHash};
pub use token::AccessToken;
