// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the external service clients.
///
/// Workflows decide per step whether a client error is fatal; the client only
/// reports what went wrong.
#[derive(Error, Debug)]
pub enum ClientError {
	/// The requested name (username, principal or email) is already taken.
	#[error("already exists: {0}")]
	Conflict(String),

	#[error("not found: {0}")]
	NotFound(String),

	/// The backing service could not be reached or refused to answer.
	#[error("service unavailable: {0}")]
	Unavailable(String),

	/// The service understood the request and rejected it.
	#[error("rejected: {0}")]
	Rejected(String),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),
}

impl ClientError {
	pub fn is_conflict(&self) -> bool {
		matches!(self, ClientError::Conflict(_))
	}

	pub fn is_not_found(&self) -> bool {
		matches!(self, ClientError::NotFound(_))
	}
}
