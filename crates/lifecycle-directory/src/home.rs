// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Home folders on a locally mounted share.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use lifecycle_core::{
	archive_path_for, home_path_for, qualified_account_for, AccessRight, AccessRule,
	ClientError, ClientResult, HomeProvisioner, HomeResource, Identity,
};
use tracing::{debug, info, warn};

/// Creates home folders under a mounted share and archives them by copy.
///
/// Share-level access control lists are applied by the file server; on unix
/// the folder itself is restricted to its owner (mode `0700`).
pub struct FsHomeProvisioner {
	netbios_name: String,
}

impl FsHomeProvisioner {
	pub fn new(netbios_name: impl Into<String>) -> Self {
		Self {
			netbios_name: netbios_name.into(),
		}
	}
}

#[async_trait]
impl HomeProvisioner for FsHomeProvisioner {
	async fn create_home(&self, identity: &Identity, base: &Path) -> ClientResult<HomeResource> {
		if !tokio::fs::metadata(base).await.is_ok_and(|m| m.is_dir()) {
			return Err(ClientError::NotFound(format!(
				"home share {}",
				base.display()
			)));
		}

		let path = home_path_for(base, &identity.username);
		match tokio::fs::create_dir(&path).await {
			Ok(()) => {}
			Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
				debug!(path = %path.display(), "home folder already exists");
			}
			Err(e) => return Err(e.into()),
		}
		restrict_to_owner(&path).await?;

		info!(path = %path.display(), username = %identity.username, "home folder ready");

		Ok(HomeResource {
			path,
			access: AccessRule {
				principal: qualified_account_for(&self.netbios_name, &identity.username),
				right: AccessRight::Modify,
				inherited: true,
			},
		})
	}

	async fn archive_home(
		&self,
		source: &Path,
		archive_base: &Path,
		username: &str,
		date: NaiveDate,
	) -> ClientResult<PathBuf> {
		if !tokio::fs::metadata(source).await.is_ok_and(|m| m.is_dir()) {
			return Err(ClientError::NotFound(format!(
				"home folder {}",
				source.display()
			)));
		}

		let destination = archive_path_for(archive_base, username, date);
		if tokio::fs::try_exists(&destination).await? {
			return Err(ClientError::Conflict(format!(
				"archive {}",
				destination.display()
			)));
		}

		tokio::fs::create_dir_all(archive_base).await?;
		let files = match copy_tree(source, &destination).await {
			Ok(files) => files,
			Err(e) => {
				discard_partial(&destination).await;
				return Err(e);
			}
		};
		info!(
			source = %source.display(),
			destination = %destination.display(),
			files,
			"archived home folder"
		);
		Ok(destination)
	}
}

/// Copy directories and regular files. Symlinks and special files are skipped.
async fn copy_tree(source: &Path, destination: &Path) -> ClientResult<u64> {
	let mut pending = vec![(source.to_path_buf(), destination.to_path_buf())];
	let mut files = 0u64;

	while let Some((from, to)) = pending.pop() {
		tokio::fs::create_dir(&to).await?;
		let mut entries = tokio::fs::read_dir(&from).await?;
		while let Some(entry) = entries.next_entry().await? {
			let file_type = entry.file_type().await?;
			let target = to.join(entry.file_name());
			if file_type.is_dir() {
				pending.push((entry.path(), target));
			} else if file_type.is_file() {
				tokio::fs::copy(entry.path(), &target).await?;
				files += 1;
			} else {
				debug!(path = %entry.path().display(), "skipping non-regular file");
			}
		}
	}

	Ok(files)
}

/// Remove whatever a failed copy left at `destination`.
async fn discard_partial(destination: &Path) {
	match tokio::fs::remove_dir_all(destination).await {
		Ok(()) => debug!(destination = %destination.display(), "removed partial archive"),
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => warn!(
			destination = %destination.display(),
			error = %e,
			"could not remove partial archive"
		),
	}
}

#[cfg(unix)]
async fn restrict_to_owner(path: &Path) -> ClientResult<()> {
	use std::os::unix::fs::PermissionsExt;
	tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700)).await?;
	Ok(())
}

#[cfg(not(unix))]
async fn restrict_to_owner(_path: &Path) -> ClientResult<()> {
	Ok(())
}
