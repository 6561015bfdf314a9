// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for employee lifecycle provisioning.
//!
//! This crate provides:
//! - Layered environment configuration (defaults, TOML file, `LIFECYCLE_*`
//!   environment variables), validated eagerly into [`LifecycleConfig`]
//! - [`RoleTemplateStore`], the per-department template lookup
//!
//! # Usage
//!
//! ```ignore
//! use lifecycle_config::{load_config_with_file, RoleTemplateStore};
//!
//! let config = load_config_with_file("lifecycle.toml")?;
//! let templates = RoleTemplateStore::open(&config.paths.templates_dir);
//! let engineering = templates.load("Engineering")?;
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;
pub mod templates;

pub use error::ConfigError;
pub use layer::LifecycleConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};
pub use templates::{RoleTemplate, RoleTemplateStore, TemplateError};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved configuration. Loaded once per process and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
	pub directory: DirectoryConfig,
	pub shares: SharesConfig,
	pub tenant: TenantConfig,
	pub offboarding: OffboardingConfig,
	pub paths: PathsConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from a config file that must exist.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LIFECYCLE_*`)
/// 2. The config file
/// 3. Built-in defaults
pub fn load_config_with_file(
	config_path: impl Into<PathBuf>,
) -> Result<LifecycleConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::required(config_path)),
		Box::new(EnvSource::process()),
	])
}

/// Merge the given sources in precedence order and validate the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<LifecycleConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = LifecycleConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: LifecycleConfigLayer) -> Result<LifecycleConfig, ConfigError> {
	let directory = layer.directory.unwrap_or_default().finalize()?;
	let shares = layer.shares.unwrap_or_default().finalize()?;
	let tenant = layer.tenant.unwrap_or_default().finalize();
	let offboarding = layer.offboarding.unwrap_or_default().finalize()?;
	let paths = layer.paths.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		domain = %directory.domain,
		organization = %directory.organization,
		home_root = %shares.home_root.display(),
		archive_root = %shares.archive_root.display(),
		disabled_ou_configured = directory.disabled_ou.is_some(),
		tenant_id = tenant.tenant_id.as_deref().unwrap_or("unset"),
		usage_location = %tenant.usage_location,
		license_delay_secs = tenant.license_propagation_delay_secs,
		account_expiry_days = offboarding.account_expiry_days,
		"Lifecycle configuration loaded"
	);

	Ok(LifecycleConfig {
		directory,
		shares,
		tenant,
		offboarding,
		paths,
		logging,
	})
}
