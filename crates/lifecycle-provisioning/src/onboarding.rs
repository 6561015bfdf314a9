// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! New-hire onboarding.
//!
//! A run moves through a fixed sequence of states:
//!
//! ```text
//! Validating -> CreatingIdentity -> AssigningGroups -> ProvisioningHome
//!            -> AssigningLicense -> Complete
//! ```
//!
//! Only `Validating` and `CreatingIdentity` can abort the run. Every later
//! step records its failure and the run continues.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use lifecycle_audit::RunLog;
use lifecycle_config::{LifecycleConfig, RoleTemplate, RoleTemplateStore};
use lifecycle_core::{
	derive_username, email_for, principal_name_for, with_suffix, EmployeeRecord, Identity,
	NamingError, NewIdentity, TemporaryCredential,
};
use serde::Serialize;

use crate::clients::ProvisioningClients;
use crate::error::ProvisioningError;
use crate::license::LicenseProvisioner;
use crate::outcome::{StepOutcome, StepStatus, WorkflowStatus};

pub type Result<T> = std::result::Result<T, ProvisioningError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OnboardingState {
	Validating,
	CreatingIdentity,
	AssigningGroups,
	ProvisioningHome,
	AssigningLicense,
	Complete,
	Aborted,
}

impl fmt::Display for OnboardingState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			OnboardingState::Validating => "validating",
			OnboardingState::CreatingIdentity => "creating identity",
			OnboardingState::AssigningGroups => "assigning groups",
			OnboardingState::ProvisioningHome => "provisioning home",
			OnboardingState::AssigningLicense => "assigning license",
			OnboardingState::Complete => "complete",
			OnboardingState::Aborted => "aborted",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResult {
	pub username: String,
	pub principal_name: String,
	pub email: String,
	pub display_name: String,
	pub department: String,
	pub title: String,
	pub manager: Option<String>,
	pub start_date: Option<NaiveDate>,
	pub ou: String,
	pub home_directory: Option<PathBuf>,
	pub groups_assigned: Vec<String>,
	pub groups_failed: Vec<String>,
	pub license_sku: Option<String>,
	pub license_assigned: bool,
	pub channels: Vec<String>,
	pub sites: Vec<String>,
	pub steps: Vec<StepOutcome>,
	pub log_path: Option<PathBuf>,
	pub status: WorkflowStatus,
	/// Serialized as `[REDACTED]`; call `expose()` to hand it over.
	pub temporary_password: TemporaryCredential,
}

pub struct OnboardingWorkflow {
	config: Arc<LifecycleConfig>,
	templates: Arc<RoleTemplateStore>,
	clients: ProvisioningClients,
	licenses: LicenseProvisioner,
}

impl OnboardingWorkflow {
	pub fn new(
		config: Arc<LifecycleConfig>,
		templates: Arc<RoleTemplateStore>,
		clients: ProvisioningClients,
	) -> Self {
		let licenses = LicenseProvisioner::new(clients.licenses.clone(), &config.tenant);
		Self {
			config,
			templates,
			clients,
			licenses,
		}
	}

	/// Onboard one employee, writing every step to `log`.
	///
	/// Returns an error only when the run aborts: missing template, invalid
	/// record, directory unreachable during validation, or identity creation
	/// failing (including a second username conflict).
	#[tracing::instrument(skip_all, fields(run_id = %log.run_id(), department = %record.department))]
	pub async fn run(&self, record: &EmployeeRecord, log: &mut RunLog) -> Result<OnboardingResult> {
		log.info(format!(
			"Starting onboarding for {} ({})",
			record.display_name(),
			record.department.trim()
		))
		.await;

		let mut steps = Vec::new();

		// Validating
		enter(OnboardingState::Validating);
		let template = match self.templates.load(&record.department) {
			Ok(template) => template,
			Err(e) => return Err(abort(log, OnboardingState::Validating, e.into()).await),
		};
		log.info(format!(
			"Loaded role template '{}' ({} groups)",
			template.department,
			template.groups.len()
		))
		.await;

		let base = match derive_username(&record.first_name, &record.last_name) {
			Ok(base) => base,
			Err(e) => {
				return Err(abort(log, OnboardingState::Validating, invalid_record(e)).await)
			}
		};

		let mut suffix = match self.clients.directory.lookup(&base).await {
			Ok(None) => 0,
			Ok(Some(_)) => {
				log.warn(format!(
					"Username '{base}' already exists; using '{}'",
					with_suffix(&base, 1)
				))
				.await;
				1
			}
			Err(e) => {
				let err = ProvisioningError::DirectoryUnavailable(e);
				return Err(abort(log, OnboardingState::Validating, err).await);
			}
		};
		steps.push(StepOutcome::succeeded(
			"validate",
			Some(format!("template '{}'", template.department)),
		));

		// CreatingIdentity
		enter(OnboardingState::CreatingIdentity);
		let password = TemporaryCredential::generate();
		let mut retried = false;
		let identity = loop {
			let username = with_suffix(&base, suffix);
			let request = self.new_identity(record, &template, &username, password.clone());
			match self.clients.directory.create(request).await {
				Ok(identity) => break identity,
				Err(e) if e.is_conflict() && !retried => {
					retried = true;
					suffix += 1;
					log.warn(format!(
						"Username '{username}' collided ({e}); retrying as '{}'",
						with_suffix(&base, suffix)
					))
					.await;
				}
				Err(e) => {
					let err = ProvisioningError::IdentityCreation {
						username,
						source: e,
					};
					return Err(abort(log, OnboardingState::CreatingIdentity, err).await);
				}
			}
		};
		log.success(format!(
			"Created identity {} ({}) in {}",
			identity.username, identity.principal_name, identity.ou
		))
		.await;
		steps.push(StepOutcome::succeeded(
			"create_identity",
			Some(identity.username.clone()),
		));

		// AssigningGroups
		enter(OnboardingState::AssigningGroups);
		let (groups_assigned, groups_failed) = self.assign_groups(&identity, &template, log).await;
		steps.push(StepOutcome::from_counts(
			"assign_groups",
			groups_assigned.len(),
			groups_failed.len(),
		));

		// ProvisioningHome
		enter(OnboardingState::ProvisioningHome);
		let (home_directory, home_step) = self.provision_home(&identity, &template, log).await;
		steps.push(home_step);

		// AssigningLicense
		enter(OnboardingState::AssigningLicense);
		let license_assigned = match &template.license_sku {
			Some(sku) => {
				log.info(format!(
					"Waiting {}s for directory sync before assigning {sku}",
					self.licenses.propagation_delay().as_secs()
				))
				.await;
				match self.licenses.assign(&identity, sku).await {
					Ok(_) => {
						log.success(format!("Assigned license {sku}")).await;
						steps.push(StepOutcome::succeeded("assign_license", Some(sku.clone())));
						true
					}
					Err(e) => {
						log.warn(e.to_string()).await;
						steps.push(StepOutcome::failed("assign_license", Some(e.to_string())));
						false
					}
				}
			}
			None => {
				log.info("Role template has no license SKU; skipping license assignment")
					.await;
				steps.push(StepOutcome::skipped("assign_license", None));
				false
			}
		};

		// Complete
		enter(OnboardingState::Complete);
		let status = WorkflowStatus::from_steps(&steps);
		log.success(format!(
			"Onboarding {status} for {} <{}>",
			identity.username, identity.email
		))
		.await;

		Ok(OnboardingResult {
			username: identity.username,
			principal_name: identity.principal_name,
			email: identity.email,
			display_name: identity.display_name,
			department: template.department,
			title: record.title.trim().to_string(),
			manager: identity.manager,
			start_date: record.start_date,
			ou: identity.ou,
			home_directory,
			groups_assigned,
			groups_failed,
			license_sku: template.license_sku,
			license_assigned,
			channels: template.channels,
			sites: template.sites,
			steps,
			log_path: log.path().map(|p| p.to_path_buf()),
			status,
			temporary_password: password,
		})
	}

	fn new_identity(
		&self,
		record: &EmployeeRecord,
		template: &RoleTemplate,
		username: &str,
		initial_password: TemporaryCredential,
	) -> NewIdentity {
		let directory = &self.config.directory;
		NewIdentity {
			username: username.to_string(),
			principal_name: principal_name_for(username, &directory.domain),
			email: email_for(username, &directory.email_domain),
			display_name: record.display_name(),
			given_name: record.first_name.trim().to_string(),
			surname: record.last_name.trim().to_string(),
			department: template.department.clone(),
			title: record.title.trim().to_string(),
			manager: record
				.manager
				.as_deref()
				.map(str::trim)
				.filter(|m| !m.is_empty())
				.map(str::to_string),
			ou: template
				.ou
				.clone()
				.unwrap_or_else(|| directory.new_account_ou.clone()),
			initial_password,
			must_change_password: true,
		}
	}

	async fn assign_groups(
		&self,
		identity: &Identity,
		template: &RoleTemplate,
		log: &mut RunLog,
	) -> (Vec<String>, Vec<String>) {
		let mut assigned = Vec::new();
		let mut failed = Vec::new();

		for group in &template.groups {
			match self
				.clients
				.directory
				.add_to_group(&identity.username, group)
				.await
			{
				Ok(()) => {
					log.success(format!("Added {} to group {group}", identity.username))
						.await;
					assigned.push(group.clone());
				}
				Err(source) => {
					let err = ProvisioningError::Membership {
						username: identity.username.clone(),
						group: group.clone(),
						source,
					};
					log.warn(err.to_string()).await;
					failed.push(group.clone());
				}
			}
		}

		(assigned, failed)
	}

	async fn provision_home(
		&self,
		identity: &Identity,
		template: &RoleTemplate,
		log: &mut RunLog,
	) -> (Option<PathBuf>, StepOutcome) {
		let base = template
			.home_share
			.clone()
			.unwrap_or_else(|| self.config.shares.home_root.clone());

		let home = match self.clients.homes.create_home(identity, &base).await {
			Ok(home) => home,
			Err(source) => {
				let err = ProvisioningError::Resource {
					username: identity.username.clone(),
					source,
				};
				log.warn(err.to_string()).await;
				return (None, StepOutcome::failed("provision_home", Some(err.to_string())));
			}
		};
		log.success(format!(
			"Created home folder {} ({} has {} access)",
			home.path.display(),
			home.access.principal,
			home.access.right
		))
		.await;

		match self
			.clients
			.directory
			.set_home_directory(&identity.username, &home.path)
			.await
		{
			Ok(()) => {
				log.info(format!("Bound home directory on {}", identity.username))
					.await;
				let detail = home.path.display().to_string();
				(
					Some(home.path),
					StepOutcome::succeeded("provision_home", Some(detail)),
				)
			}
			Err(source) => {
				let err = ProvisioningError::Resource {
					username: identity.username.clone(),
					source,
				};
				log.warn(format!("Home folder created but not bound: {err}"))
					.await;
				(
					Some(home.path),
					StepOutcome::new("provision_home", StepStatus::Partial, Some(err.to_string())),
				)
			}
		}
	}
}

fn enter(state: OnboardingState) {
	tracing::debug!(%state, "onboarding state");
}

async fn abort(log: &mut RunLog, state: OnboardingState, err: ProvisioningError) -> ProvisioningError {
	enter(OnboardingState::Aborted);
	log.error(format!("Onboarding aborted while {state}: {err}"))
		.await;
	err
}

fn invalid_record(err: NamingError) -> ProvisioningError {
	ProvisioningError::InvalidRecord(err.to_string())
}
