// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::LifecycleConfigLayer;
use crate::sections::{
	DirectoryConfigLayer, LoggingConfigLayer, OffboardingConfigLayer, PathsConfigLayer,
	SharesConfigLayer, TenantConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<LifecycleConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<LifecycleConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(LifecycleConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
	required: bool,
}

impl TomlSource {
	/// A file that must exist; a missing file is [`ConfigError::NotFound`].
	pub fn required(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: true,
		}
	}

	/// A file that is skipped when absent.
	pub fn optional(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<LifecycleConfigLayer, ConfigError> {
		if !self.path.exists() {
			if self.required {
				return Err(ConfigError::NotFound(self.path.clone()));
			}
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(LifecycleConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: LifecycleConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LIFECYCLE_<FIELD>
pub struct EnvSource {
	vars: Option<HashMap<String, String>>,
}

impl EnvSource {
	/// Read from the process environment.
	pub fn process() -> Self {
		Self { vars: None }
	}

	/// Read from a fixed set of variables instead of the process environment.
	pub fn from_vars(vars: HashMap<String, String>) -> Self {
		Self { vars: Some(vars) }
	}

	fn var(&self, name: &str) -> Option<String> {
		let value = match &self.vars {
			Some(vars) => vars.get(name).cloned(),
			None => std::env::var(name).ok(),
		};
		value.filter(|s| !s.is_empty())
	}

	fn var_u32(&self, name: &str) -> Result<Option<u32>, ConfigError> {
		match self.var(name) {
			Some(v) => v
				.parse()
				.map(Some)
				.map_err(|_| ConfigError::invalid_value(name, format!("invalid u32 value '{v}'"))),
			None => Ok(None),
		}
	}

	fn var_u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		match self.var(name) {
			Some(v) => v
				.parse()
				.map(Some)
				.map_err(|_| ConfigError::invalid_value(name, format!("invalid u64 value '{v}'"))),
			None => Ok(None),
		}
	}

	fn var_path(&self, name: &str) -> Option<PathBuf> {
		self.var(name).map(PathBuf::from)
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::process()
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<LifecycleConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(LifecycleConfigLayer {
			directory: Some(DirectoryConfigLayer {
				domain: self.var("LIFECYCLE_DOMAIN"),
				email_domain: self.var("LIFECYCLE_EMAIL_DOMAIN"),
				organization: self.var("LIFECYCLE_ORGANIZATION"),
				netbios_name: self.var("LIFECYCLE_NETBIOS_NAME"),
				new_account_ou: self.var("LIFECYCLE_NEW_ACCOUNT_OU"),
				disabled_ou: self.var("LIFECYCLE_DISABLED_OU"),
				all_users_group: self.var("LIFECYCLE_ALL_USERS_GROUP"),
			}),
			shares: Some(SharesConfigLayer {
				home_root: self.var_path("LIFECYCLE_HOME_ROOT"),
				archive_root: self.var_path("LIFECYCLE_ARCHIVE_ROOT"),
			}),
			tenant: Some(TenantConfigLayer {
				tenant_id: self.var("LIFECYCLE_TENANT_ID"),
				usage_location: self.var("LIFECYCLE_USAGE_LOCATION"),
				license_propagation_delay_secs: self.var_u64("LIFECYCLE_LICENSE_DELAY_SECS")?,
			}),
			offboarding: Some(OffboardingConfigLayer {
				account_expiry_days: self.var_u32("LIFECYCLE_ACCOUNT_EXPIRY_DAYS")?,
			}),
			paths: Some(PathsConfigLayer {
				log_dir: self.var_path("LIFECYCLE_LOG_DIR"),
				templates_dir: self.var_path("LIFECYCLE_TEMPLATES_DIR"),
				state_file: self.var_path("LIFECYCLE_STATE_FILE"),
			}),
			logging: Some(LoggingConfigLayer {
				level: self.var("LIFECYCLE_LOG_LEVEL"),
			}),
		})
	}
}
