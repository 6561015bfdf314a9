// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! File share roots for home folders and their archives.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharesConfig {
	pub home_root: PathBuf,
	pub archive_root: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SharesConfigLayer {
	#[serde(default)]
	pub home_root: Option<PathBuf>,
	#[serde(default)]
	pub archive_root: Option<PathBuf>,
}

impl SharesConfigLayer {
	pub fn merge(&mut self, other: SharesConfigLayer) {
		if other.home_root.is_some() {
			self.home_root = other.home_root;
		}
		if other.archive_root.is_some() {
			self.archive_root = other.archive_root;
		}
	}

	pub fn finalize(self) -> Result<SharesConfig, ConfigError> {
		let home_root = self
			.home_root
			.filter(|p| !p.as_os_str().is_empty())
			.ok_or_else(|| ConfigError::missing_field("shares.home_root"))?;
		let archive_root = self
			.archive_root
			.filter(|p| !p.as_os_str().is_empty())
			.ok_or_else(|| ConfigError::missing_field("shares.archive_root"))?;

		if home_root == archive_root {
			return Err(ConfigError::Validation(
				"shares.home_root and shares.archive_root must differ".to_string(),
			));
		}

		Ok(SharesConfig {
			home_root,
			archive_root,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_finalize_requires_both_roots() {
		let layer = SharesConfigLayer {
			home_root: Some(PathBuf::from("/srv/home")),
			archive_root: None,
		};
		let err = layer.finalize().unwrap_err();
		assert!(err.to_string().contains("shares.archive_root"));
	}

	#[test]
	fn test_finalize_rejects_same_root() {
		let layer = SharesConfigLayer {
			home_root: Some(PathBuf::from("/srv/home")),
			archive_root: Some(PathBuf::from("/srv/home")),
		};
		assert!(matches!(layer.finalize(), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_deserialize_partial() {
		let layer: SharesConfigLayer = toml::from_str(r#"home_root = "/srv/home""#).unwrap();
		assert_eq!(layer.home_root, Some(PathBuf::from("/srv/home")));
		assert!(layer.archive_root.is_none());
	}
}
