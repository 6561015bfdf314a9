// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory naming and placement section.

use serde::Deserialize;

use crate::error::ConfigError;

fn default_all_users_group() -> String {
	"Domain Users".to_string()
}

/// Directory configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
	/// Primary domain used for principal names, e.g. `corp.example.com`.
	pub domain: String,
	/// Domain used for email addresses, e.g. `example.com`.
	pub email_domain: String,
	pub organization: String,
	/// Short domain prefix for access rules, e.g. `CORP`.
	pub netbios_name: String,
	/// OU for new accounts when the role template does not name one.
	pub new_account_ou: String,
	/// Where offboarded accounts are moved; `None` leaves them in place.
	pub disabled_ou: Option<String>,
	/// Membership every account keeps, even when offboarded.
	pub all_users_group: String,
}

/// Directory configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct DirectoryConfigLayer {
	#[serde(default)]
	pub domain: Option<String>,
	#[serde(default)]
	pub email_domain: Option<String>,
	#[serde(default)]
	pub organization: Option<String>,
	#[serde(default)]
	pub netbios_name: Option<String>,
	#[serde(default)]
	pub new_account_ou: Option<String>,
	#[serde(default)]
	pub disabled_ou: Option<String>,
	#[serde(default)]
	pub all_users_group: Option<String>,
}

impl DirectoryConfigLayer {
	pub fn merge(&mut self, other: DirectoryConfigLayer) {
		if other.domain.is_some() {
			self.domain = other.domain;
		}
		if other.email_domain.is_some() {
			self.email_domain = other.email_domain;
		}
		if other.organization.is_some() {
			self.organization = other.organization;
		}
		if other.netbios_name.is_some() {
			self.netbios_name = other.netbios_name;
		}
		if other.new_account_ou.is_some() {
			self.new_account_ou = other.new_account_ou;
		}
		if other.disabled_ou.is_some() {
			self.disabled_ou = other.disabled_ou;
		}
		if other.all_users_group.is_some() {
			self.all_users_group = other.all_users_group;
		}
	}

	pub fn finalize(self) -> Result<DirectoryConfig, ConfigError> {
		let domain = required(self.domain, "directory.domain")?;
		let email_domain = required(self.email_domain, "directory.email_domain")?;
		let organization = required(self.organization, "directory.organization")?;
		let new_account_ou = required(self.new_account_ou, "directory.new_account_ou")?;

		if email_domain.contains('@') {
			return Err(ConfigError::invalid_value(
				"directory.email_domain",
				"must be a bare domain without '@'",
			));
		}

		let netbios_name = match self.netbios_name {
			Some(name) if !name.trim().is_empty() => name,
			_ => domain
				.split('.')
				.next()
				.unwrap_or(domain.as_str())
				.to_ascii_uppercase(),
		};

		Ok(DirectoryConfig {
			domain,
			email_domain,
			organization,
			netbios_name,
			new_account_ou,
			disabled_ou: self.disabled_ou.filter(|ou| !ou.trim().is_empty()),
			all_users_group: self
				.all_users_group
				.unwrap_or_else(default_all_users_group),
		})
	}
}

pub(crate) fn required(value: Option<String>, field: &str) -> Result<String, ConfigError> {
	value
		.filter(|v| !v.trim().is_empty())
		.ok_or_else(|| ConfigError::missing_field(field))
}
