// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use lifecycle_audit::AuditError;
use lifecycle_config::TemplateError;
use lifecycle_core::ClientError;
use thiserror::Error;

/// Errors that can occur during lifecycle workflows.
///
/// Only the fatal variants are ever returned from a workflow run. The
/// non-fatal ones describe a step that failed while the run carried on; they
/// are written to the run log at WARN and reflected in the step outcomes.
#[derive(Debug, Error)]
pub enum ProvisioningError {
	#[error("no role template for department '{0}'")]
	TemplateNotFound(String),

	#[error("role template error: {0}")]
	Template(#[source] TemplateError),

	#[error("invalid employee record: {0}")]
	InvalidRecord(String),

	#[error("directory unavailable: {0}")]
	DirectoryUnavailable(#[source] ClientError),

	#[error("failed to create identity '{username}': {source}")]
	IdentityCreation {
		username: String,
		#[source]
		source: ClientError,
	},

	#[error("identity '{0}' not found")]
	NotFound(String),

	#[error("failed to disable '{username}': {source}")]
	Disable {
		username: String,
		#[source]
		source: ClientError,
	},

	#[error("group '{group}' change failed for '{username}': {source}")]
	Membership {
		username: String,
		group: String,
		#[source]
		source: ClientError,
	},

	#[error("home folder step failed for '{username}': {source}")]
	Resource {
		username: String,
		#[source]
		source: ClientError,
	},

	#[error("license assignment failed for '{username}': {message}")]
	License { username: String, message: String },

	#[error("mail forwarding failed for '{username}': {source}")]
	MailForwarding {
		username: String,
		#[source]
		source: ClientError,
	},

	#[error("failed to read batch input {path}: {source}")]
	BatchInput {
		path: PathBuf,
		#[source]
		source: csv::Error,
	},

	#[error(transparent)]
	Audit(#[from] AuditError),
}

impl ProvisioningError {
	/// Whether this error aborts the run it occurred in.
	pub fn is_fatal(&self) -> bool {
		!matches!(
			self,
			ProvisioningError::Membership { .. }
				| ProvisioningError::Resource { .. }
				| ProvisioningError::License { .. }
				| ProvisioningError::MailForwarding { .. }
		)
	}
}

impl From<TemplateError> for ProvisioningError {
	fn from(err: TemplateError) -> Self {
		match err {
			TemplateError::NotFound(department) => ProvisioningError::TemplateNotFound(department),
			other => ProvisioningError::Template(other),
		}
	}
}
