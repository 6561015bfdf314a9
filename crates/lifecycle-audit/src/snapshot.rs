// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group membership snapshots taken before offboarding removes anything.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{AuditError, AuditResult};
use crate::run_log::{create_unique, sanitize_component};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipSnapshot {
	pub username: String,
	pub captured_at: DateTime<Utc>,
	pub groups: Vec<String>,
}

impl MembershipSnapshot {
	pub fn capture<I, S>(username: &str, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			username: username.to_string(),
			captured_at: Utc::now(),
			groups: groups.into_iter().map(Into::into).collect(),
		}
	}

	/// Write the snapshot as pretty JSON to
	/// `<log_dir>/<username>_groups_<YYYYMMDD_HHMMSS>.json` and return the path.
	/// An earlier snapshot with the same name is kept; this one gets a numeric
	/// suffix.
	pub async fn write(&self, log_dir: &Path) -> AuditResult<PathBuf> {
		tokio::fs::create_dir_all(log_dir)
			.await
			.map_err(|e| AuditError::CreateDir {
				path: log_dir.to_path_buf(),
				source: e,
			})?;

		let stem = format!(
			"{}_groups_{}",
			sanitize_component(&self.username),
			self.captured_at.format("%Y%m%d_%H%M%S")
		);
		let json = serde_json::to_vec_pretty(self)?;

		let (path, mut file) = create_unique(log_dir, &stem, "json").await?;
		let written = async {
			file.write_all(&json).await?;
			file.sync_all().await
		}
		.await;
		if let Err(e) = written {
			return Err(AuditError::Write { path, source: e });
		}

		tracing::debug!(path = %path.display(), groups = self.groups.len(), "wrote membership snapshot");
		Ok(path)
	}

	pub async fn read(path: &Path) -> AuditResult<Self> {
		let bytes = tokio::fs::read(path).await.map_err(|e| AuditError::Open {
			path: path.to_path_buf(),
			source: e,
		})?;
		Ok(serde_json::from_slice(&bytes)?)
	}
}
