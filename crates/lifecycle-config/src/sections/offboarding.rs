// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Offboarding policy section.

use serde::Deserialize;

use crate::error::ConfigError;

/// Days between offboarding and account expiry when not configured.
pub const DEFAULT_ACCOUNT_EXPIRY_DAYS: u32 = 90;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffboardingConfig {
	pub account_expiry_days: u32,
}

impl Default for OffboardingConfig {
	fn default() -> Self {
		Self {
			account_expiry_days: DEFAULT_ACCOUNT_EXPIRY_DAYS,
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct OffboardingConfigLayer {
	#[serde(default)]
	pub account_expiry_days: Option<u32>,
}

impl OffboardingConfigLayer {
	pub fn merge(&mut self, other: OffboardingConfigLayer) {
		if other.account_expiry_days.is_some() {
			self.account_expiry_days = other.account_expiry_days;
		}
	}

	pub fn finalize(self) -> Result<OffboardingConfig, ConfigError> {
		let account_expiry_days = self
			.account_expiry_days
			.unwrap_or(DEFAULT_ACCOUNT_EXPIRY_DAYS);
		if account_expiry_days == 0 {
			return Err(ConfigError::invalid_value(
				"offboarding.account_expiry_days",
				"must be at least 1",
			));
		}
		Ok(OffboardingConfig {
			account_expiry_days,
		})
	}
}
