// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Department role templates.
//!
//! A template bundles what a new hire in a department receives: group
//! memberships, a license SKU, the OU the account lands in and the share that
//! hosts the home folder. Templates live one per file as
//! `<templates_dir>/<department>.toml`:
//!
//! ```toml
//! groups = ["Engineering", "VPN-Users", "GitHub-Org"]
//! license_sku = "ENTERPRISEPACK"
//! ou = "OU=Engineering,OU=Users,DC=corp,DC=example,DC=com"
//! home_share = "/srv/home/engineering"
//! channels = ["Engineering/General"]
//! sites = ["https://example.sharepoint.com/sites/eng"]
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
	#[error("no role template registered for department '{0}'")]
	NotFound(String),

	#[error("failed to read role template {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse role template {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
}

/// A department's provisioning bundle. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTemplate {
	pub department: String,
	/// Groups in file order, duplicates removed.
	pub groups: Vec<String>,
	pub license_sku: Option<String>,
	pub ou: Option<String>,
	pub home_share: Option<PathBuf>,
	pub channels: Vec<String>,
	pub sites: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoleTemplateFile {
	#[serde(default)]
	department: Option<String>,
	#[serde(default)]
	groups: Vec<String>,
	#[serde(default)]
	license_sku: Option<String>,
	#[serde(default)]
	ou: Option<String>,
	#[serde(default)]
	home_share: Option<PathBuf>,
	#[serde(default)]
	channels: Vec<String>,
	#[serde(default)]
	sites: Vec<String>,
}

impl RoleTemplateFile {
	fn into_template(self, fallback_department: &str) -> RoleTemplate {
		let mut seen = HashSet::new();
		let groups = self
			.groups
			.into_iter()
			.map(|g| g.trim().to_string())
			.filter(|g| !g.is_empty() && seen.insert(g.to_ascii_lowercase()))
			.collect();

		RoleTemplate {
			department: self
				.department
				.unwrap_or_else(|| fallback_department.to_string()),
			groups,
			license_sku: self.license_sku.filter(|s| !s.trim().is_empty()),
			ou: self.ou.filter(|s| !s.trim().is_empty()),
			home_share: self.home_share,
			channels: self.channels,
			sites: self.sites,
		}
	}
}

enum Backing {
	Directory(PathBuf),
	Static(BTreeMap<String, RoleTemplate>),
}

/// Lookup of role templates by department name (case-insensitive).
pub struct RoleTemplateStore {
	backing: Backing,
}

impl RoleTemplateStore {
	/// Templates stored as `<dir>/<department>.toml`.
	pub fn open(dir: impl Into<PathBuf>) -> Self {
		Self {
			backing: Backing::Directory(dir.into()),
		}
	}

	/// Templates held in memory, keyed by their department.
	pub fn from_templates(templates: impl IntoIterator<Item = RoleTemplate>) -> Self {
		let map = templates
			.into_iter()
			.map(|t| (t.department.to_ascii_lowercase(), t))
			.collect();
		Self {
			backing: Backing::Static(map),
		}
	}

	pub fn load(&self, department: &str) -> Result<RoleTemplate, TemplateError> {
		let department = department.trim();
		if !is_plain_name(department) {
			return Err(TemplateError::NotFound(department.to_string()));
		}

		match &self.backing {
			Backing::Static(map) => map
				.get(&department.to_ascii_lowercase())
				.cloned()
				.ok_or_else(|| TemplateError::NotFound(department.to_string())),
			Backing::Directory(dir) => {
				let path = find_template_file(dir, department)?
					.ok_or_else(|| TemplateError::NotFound(department.to_string()))?;
				load_template_file(&path, department)
			}
		}
	}
}

fn is_plain_name(department: &str) -> bool {
	!department.is_empty()
		&& !department.contains(['/', '\\'])
		&& department != "."
		&& !department.contains("..")
}

fn find_template_file(dir: &Path, department: &str) -> Result<Option<PathBuf>, TemplateError> {
	let exact = dir.join(format!("{department}.toml"));
	if exact.is_file() {
		return Ok(Some(exact));
	}

	let entries = match std::fs::read_dir(dir) {
		Ok(entries) => entries,
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(e) => {
			return Err(TemplateError::Read {
				path: dir.to_path_buf(),
				source: e,
			})
		}
	};

	for entry in entries.flatten() {
		let path = entry.path();
		let is_toml = path.extension().is_some_and(|ext| ext == "toml");
		let matches = path
			.file_stem()
			.and_then(|s| s.to_str())
			.is_some_and(|stem| stem.eq_ignore_ascii_case(department));
		if is_toml && matches && path.is_file() {
			return Ok(Some(path));
		}
	}

	Ok(None)
}

fn load_template_file(path: &Path, department: &str) -> Result<RoleTemplate, TemplateError> {
	debug!(path = %path.display(), department, "loading role template");
	let content = std::fs::read_to_string(path).map_err(|e| TemplateError::Read {
		path: path.to_path_buf(),
		source: e,
	})?;
	let file: RoleTemplateFile = toml::from_str(&content).map_err(|e| TemplateError::Parse {
		path: path.to_path_buf(),
		source: e,
	})?;
	Ok(file.into_template(department))
}
