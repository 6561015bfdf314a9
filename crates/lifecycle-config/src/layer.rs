// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	DirectoryConfigLayer, LoggingConfigLayer, OffboardingConfigLayer, PathsConfigLayer,
	SharesConfigLayer, TenantConfigLayer,
};

/// Configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleConfigLayer {
	#[serde(default)]
	pub directory: Option<DirectoryConfigLayer>,
	#[serde(default)]
	pub shares: Option<SharesConfigLayer>,
	#[serde(default)]
	pub tenant: Option<TenantConfigLayer>,
	#[serde(default)]
	pub offboarding: Option<OffboardingConfigLayer>,
	#[serde(default)]
	pub paths: Option<PathsConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl LifecycleConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: LifecycleConfigLayer) {
		merge_option(
			&mut self.directory,
			other.directory,
			DirectoryConfigLayer::merge,
		);
		merge_option(&mut self.shares, other.shares, SharesConfigLayer::merge);
		merge_option(&mut self.tenant, other.tenant, TenantConfigLayer::merge);
		merge_option(
			&mut self.offboarding,
			other.offboarding,
			OffboardingConfigLayer::merge,
		);
		merge_option(&mut self.paths, other.paths, PathsConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = LifecycleConfigLayer::default();
		base.merge(LifecycleConfigLayer::default());
		assert!(base.directory.is_none());
		assert!(base.shares.is_none());
	}

	#[test]
	fn test_merge_fills_missing_section() {
		let mut base = LifecycleConfigLayer::default();
		base.merge(LifecycleConfigLayer {
			tenant: Some(TenantConfigLayer {
				tenant_id: Some("tenant-1".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		assert_eq!(
			base.tenant.and_then(|t| t.tenant_id).as_deref(),
			Some("tenant-1")
		);
	}

	#[test]
	fn test_merge_precedence_within_section() {
		let mut base: LifecycleConfigLayer = toml::from_str(
			r#"
[directory]
domain = "corp.example.com"
organization = "Example"
"#,
		)
		.unwrap();
		let overlay: LifecycleConfigLayer = toml::from_str(
			r#"
[directory]
organization = "Example Ltd"
"#,
		)
		.unwrap();
		base.merge(overlay);
		let directory = base.directory.unwrap();
		assert_eq!(directory.domain.as_deref(), Some("corp.example.com"));
		assert_eq!(directory.organization.as_deref(), Some("Example Ltd"));
	}

	#[test]
	fn test_unknown_section_rejected() {
		let result: Result<LifecycleConfigLayer, _> = toml::from_str("[mystery]\nkey = 1\n");
		assert!(result.is_err());
	}
}
