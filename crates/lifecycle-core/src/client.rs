// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interfaces to the external systems a workflow touches.
//!
//! Every concrete SDK sits behind one of these traits. Mutating directory
//! calls are assumed to reach the cloud suite through an external
//! synchronization job, so a change is not guaranteed to be visible to
//! [`LicenseClient`] or [`MailClient`] immediately.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::credential::TemporaryCredential;
use crate::error::ClientResult;
use crate::model::{CloudUser, HomeResource, Identity, NewIdentity};

/// The on-premises directory service.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
	async fn lookup(&self, username: &str) -> ClientResult<Option<Identity>>;

	/// Fails with [`crate::ClientError::Conflict`] when the username,
	/// principal name or email address is already taken.
	async fn create(&self, request: NewIdentity) -> ClientResult<Identity>;

	async fn disable(&self, username: &str) -> ClientResult<()>;

	async fn reset_credential(
		&self,
		username: &str,
		secret: &TemporaryCredential,
	) -> ClientResult<()>;

	async fn add_to_group(&self, username: &str, group: &str) -> ClientResult<()>;

	async fn remove_from_group(&self, username: &str, group: &str) -> ClientResult<()>;

	async fn set_expiration(&self, username: &str, date: NaiveDate) -> ClientResult<()>;

	async fn move_to(&self, username: &str, ou: &str) -> ClientResult<()>;

	async fn set_description(&self, username: &str, text: &str) -> ClientResult<()>;

	async fn set_home_directory(&self, username: &str, path: &Path) -> ClientResult<()>;
}

/// Home folder storage.
#[async_trait]
pub trait HomeProvisioner: Send + Sync {
	/// Create `base/username` and grant the identity modify access to it.
	async fn create_home(&self, identity: &Identity, base: &Path) -> ClientResult<HomeResource>;

	/// Copy the whole tree at `source` to `archive_base/username_YYYYMMDD`.
	/// The source is left in place.
	async fn archive_home(
		&self,
		source: &Path,
		archive_base: &Path,
		username: &str,
		date: NaiveDate,
	) -> ClientResult<PathBuf>;
}

/// The cloud mail service.
#[async_trait]
pub trait MailClient: Send + Sync {
	async fn set_forwarding(
		&self,
		identity: &Identity,
		target: &str,
		keep_copy: bool,
	) -> ClientResult<()>;
}

/// The cloud license service.
#[async_trait]
pub trait LicenseClient: Send + Sync {
	/// Find a synchronized account by principal name.
	async fn find_user(&self, principal_name: &str) -> ClientResult<Option<CloudUser>>;

	async fn assign_license(
		&self,
		user: &CloudUser,
		sku: &str,
		usage_location: &str,
	) -> ClientResult<()>;
}
