// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use lifecycle_config::{
	load_config_with_file, load_from_sources, DefaultsSource, EnvSource, LifecycleConfig,
	RoleTemplateStore, TomlSource,
};
use lifecycle_directory::{FsHomeProvisioner, LocalDirectory};
use lifecycle_provisioning::{OffboardingWorkflow, OnboardingWorkflow, ProvisioningClients};

pub const DEFAULT_CONFIG_FILE: &str = "lifecycle.toml";

/// An explicit config path must exist; the default one is optional.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<LifecycleConfig> {
	let config = match path {
		Some(path) => load_config_with_file(path)
			.with_context(|| format!("loading configuration from {}", path.display()))?,
		None => load_from_sources(vec![
			Box::new(DefaultsSource),
			Box::new(TomlSource::optional(DEFAULT_CONFIG_FILE)),
			Box::new(EnvSource::process()),
		])
		.context("loading configuration")?,
	};
	Ok(config)
}

pub struct CliContext {
	pub config: Arc<LifecycleConfig>,
	pub templates: Arc<RoleTemplateStore>,
	pub clients: ProvisioningClients,
	pub json: bool,
	pub reveal_password: bool,
}

impl CliContext {
	pub async fn new(
		config: LifecycleConfig,
		state: Option<PathBuf>,
		json: bool,
		reveal_password: bool,
	) -> anyhow::Result<Self> {
		let state_file = state.unwrap_or_else(|| config.paths.state_file.clone());
		let directory = Arc::new(
			LocalDirectory::open(&state_file)
				.await
				.with_context(|| format!("opening directory state {}", state_file.display()))?,
		);
		tracing::debug!(state_file = %state_file.display(), "local directory opened");

		let clients = ProvisioningClients {
			directory: directory.clone(),
			homes: Arc::new(FsHomeProvisioner::new(config.directory.netbios_name.clone())),
			mail: directory.clone(),
			licenses: directory,
		};
		let templates = Arc::new(RoleTemplateStore::open(&config.paths.templates_dir));

		Ok(Self {
			config: Arc::new(config),
			templates,
			clients,
			json,
			reveal_password,
		})
	}

	pub fn onboarding(&self) -> OnboardingWorkflow {
		OnboardingWorkflow::new(
			self.config.clone(),
			self.templates.clone(),
			self.clients.clone(),
		)
	}

	pub fn offboarding(&self) -> OffboardingWorkflow {
		OffboardingWorkflow::new(self.config.clone(), self.clients.clone())
	}

	pub fn log_dir(&self) -> &Path {
		&self.config.paths.log_dir
	}
}
