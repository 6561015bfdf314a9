// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local paths: run logs, role templates and the local directory state.

use std::path::PathBuf;

use serde::Deserialize;

fn default_log_dir() -> PathBuf {
	PathBuf::from("./logs")
}

fn default_templates_dir() -> PathBuf {
	PathBuf::from("./templates")
}

fn default_state_file() -> PathBuf {
	PathBuf::from("./lifecycle-state.json")
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PathsConfigLayer {
	#[serde(default)]
	pub log_dir: Option<PathBuf>,
	#[serde(default)]
	pub templates_dir: Option<PathBuf>,
	#[serde(default)]
	pub state_file: Option<PathBuf>,
}

impl PathsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.log_dir.is_some() {
			self.log_dir = other.log_dir;
		}
		if other.templates_dir.is_some() {
			self.templates_dir = other.templates_dir;
		}
		if other.state_file.is_some() {
			self.state_file = other.state_file;
		}
	}

	pub fn finalize(self) -> PathsConfig {
		PathsConfig {
			log_dir: self.log_dir.unwrap_or_else(default_log_dir),
			templates_dir: self.templates_dir.unwrap_or_else(default_templates_dir),
			state_file: self.state_file.unwrap_or_else(default_state_file),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathsConfig {
	/// Run logs and membership snapshots.
	pub log_dir: PathBuf,
	/// One `<department>.toml` per role template.
	pub templates_dir: PathBuf,
	/// State file for the local directory backend.
	pub state_file: PathBuf,
}

impl Default for PathsConfig {
	fn default() -> Self {
		PathsConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = PathsConfig::default();
		assert_eq!(config.log_dir, PathBuf::from("./logs"));
		assert_eq!(config.templates_dir, PathBuf::from("./templates"));
		assert_eq!(config.state_file, PathBuf::from("./lifecycle-state.json"));
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = PathsConfigLayer {
			log_dir: Some(PathBuf::from("/var/log/lifecycle")),
			templates_dir: None,
			state_file: None,
		};
		base.merge(PathsConfigLayer {
			templates_dir: Some(PathBuf::from("/etc/lifecycle/templates")),
			..Default::default()
		});
		let config = base.finalize();
		assert_eq!(config.log_dir, PathBuf::from("/var/log/lifecycle"));
		assert_eq!(
			config.templates_dir,
			PathBuf::from("/etc/lifecycle/templates")
		);
	}
}
