// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cloud suite tenant section.

use std::time::Duration;

use serde::Deserialize;

/// Default wait for directory changes to reach the cloud suite.
pub const DEFAULT_LICENSE_PROPAGATION_DELAY_SECS: u64 = 30;

fn default_usage_location() -> String {
	"US".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantConfig {
	pub tenant_id: Option<String>,
	/// Two-letter country code required before a license can be assigned.
	pub usage_location: String,
	pub license_propagation_delay_secs: u64,
}

impl TenantConfig {
	pub fn license_propagation_delay(&self) -> Duration {
		Duration::from_secs(self.license_propagation_delay_secs)
	}
}

impl Default for TenantConfig {
	fn default() -> Self {
		TenantConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TenantConfigLayer {
	#[serde(default)]
	pub tenant_id: Option<String>,
	#[serde(default)]
	pub usage_location: Option<String>,
	#[serde(default)]
	pub license_propagation_delay_secs: Option<u64>,
}

impl TenantConfigLayer {
	pub fn merge(&mut self, other: TenantConfigLayer) {
		if other.tenant_id.is_some() {
			self.tenant_id = other.tenant_id;
		}
		if other.usage_location.is_some() {
			self.usage_location = other.usage_location;
		}
		if other.license_propagation_delay_secs.is_some() {
			self.license_propagation_delay_secs = other.license_propagation_delay_secs;
		}
	}

	pub fn finalize(self) -> TenantConfig {
		TenantConfig {
			tenant_id: self.tenant_id,
			usage_location: self
				.usage_location
				.map(|l| l.to_ascii_uppercase())
				.unwrap_or_else(default_usage_location),
			license_propagation_delay_secs: self
				.license_propagation_delay_secs
				.unwrap_or(DEFAULT_LICENSE_PROPAGATION_DELAY_SECS),
		}
	}
}
