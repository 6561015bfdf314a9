// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Leaver offboarding.
//!
//! Steps run in a fixed order. Resolving the identity and disabling it are
//! the only fatal steps; everything after the disable is best effort. The
//! membership snapshot is taken before any group is removed.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use lifecycle_audit::{MembershipSnapshot, RunLog};
use lifecycle_config::LifecycleConfig;
use lifecycle_core::{Identity, TemporaryCredential};
use serde::Serialize;

use crate::clients::ProvisioningClients;
use crate::error::ProvisioningError;
use crate::outcome::{StepOutcome, WorkflowStatus};

pub type Result<T> = std::result::Result<T, ProvisioningError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffboardingRequest {
	pub username: String,
	/// Mailbox forwarding target, if mail should keep flowing to someone.
	pub forward_to: Option<String>,
	/// The day the offboarding takes effect; expiry and archive names derive
	/// from it.
	pub run_date: NaiveDate,
	/// Overrides the configured account expiry days.
	pub retention_days: Option<u32>,
}

impl OffboardingRequest {
	pub fn new(username: impl Into<String>, run_date: NaiveDate) -> Self {
		Self {
			username: username.into(),
			forward_to: None,
			run_date,
			retention_days: None,
		}
	}

	pub fn forward_to(mut self, target: impl Into<String>) -> Self {
		self.forward_to = Some(target.into());
		self
	}

	pub fn retention_days(mut self, days: u32) -> Self {
		self.retention_days = Some(days);
		self
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct OffboardingResult {
	pub username: String,
	pub display_name: String,
	pub status: WorkflowStatus,
	pub groups_removed: Vec<String>,
	pub groups_failed: Vec<String>,
	pub groups_kept: Vec<String>,
	pub moved_to: Option<String>,
	pub expires_on: Option<NaiveDate>,
	pub forwarded_to: Option<String>,
	pub archive_path: Option<PathBuf>,
	pub log_path: Option<PathBuf>,
	pub snapshot_path: Option<PathBuf>,
	pub snapshot: MembershipSnapshot,
	pub steps: Vec<StepOutcome>,
}

pub struct OffboardingWorkflow {
	config: Arc<LifecycleConfig>,
	clients: ProvisioningClients,
}

impl OffboardingWorkflow {
	pub fn new(config: Arc<LifecycleConfig>, clients: ProvisioningClients) -> Self {
		Self { config, clients }
	}

	/// Offboard one identity, writing every step to `log`.
	///
	/// Returns an error only when the identity cannot be resolved or disabled.
	#[tracing::instrument(skip_all, fields(run_id = %log.run_id(), username = %request.username))]
	pub async fn run(
		&self,
		request: &OffboardingRequest,
		log: &mut RunLog,
	) -> Result<OffboardingResult> {
		let username = request.username.trim();
		log.info(format!("Starting offboarding for {username}")).await;

		if request.retention_days == Some(0) {
			let err = ProvisioningError::InvalidRecord(
				"retention must be at least one day".to_string(),
			);
			return Err(abort(log, err).await);
		}

		let mut steps = Vec::new();

		// (a) resolve
		let identity = match self.clients.directory.lookup(username).await {
			Ok(Some(identity)) => identity,
			Ok(None) => {
				return Err(abort(log, ProvisioningError::NotFound(username.to_string())).await)
			}
			Err(e) => return Err(abort(log, ProvisioningError::DirectoryUnavailable(e)).await),
		};
		let username = identity.username.clone();
		log.info(format!(
			"Resolved {} ({}, {} groups)",
			identity.display_name,
			identity.principal_name,
			identity.groups.len()
		))
		.await;
		steps.push(StepOutcome::succeeded("resolve_identity", None));

		// (b) snapshot before anything is removed
		let snapshot = MembershipSnapshot::capture(&username, identity.groups.iter().cloned());
		let snapshot_path = match snapshot.write(&self.config.paths.log_dir).await {
			Ok(path) => {
				log.success(format!(
					"Saved membership snapshot ({} groups) to {}",
					snapshot.groups.len(),
					path.display()
				))
				.await;
				steps.push(StepOutcome::succeeded(
					"snapshot_groups",
					Some(path.display().to_string()),
				));
				Some(path)
			}
			Err(e) => {
				log.warn(format!(
					"Could not write membership snapshot ({e}); groups were: {}",
					snapshot.groups.join(", ")
				))
				.await;
				steps.push(StepOutcome::failed("snapshot_groups", Some(e.to_string())));
				None
			}
		};

		// (c) disable
		if let Err(source) = self.clients.directory.disable(&username).await {
			let err = ProvisioningError::Disable {
				username: username.clone(),
				source,
			};
			return Err(abort(log, err).await);
		}
		log.success(format!("Disabled {username}")).await;
		steps.push(StepOutcome::succeeded("disable", None));

		// (d) credential reset; the new secret is never surfaced
		let discarded = TemporaryCredential::generate();
		match self
			.clients
			.directory
			.reset_credential(&username, &discarded)
			.await
		{
			Ok(()) => {
				log.success("Reset credential to a random value").await;
				steps.push(StepOutcome::succeeded("reset_credential", None));
			}
			Err(e) => {
				log.warn(format!("Credential reset failed: {e}")).await;
				steps.push(StepOutcome::failed("reset_credential", Some(e.to_string())));
			}
		}
		drop(discarded);

		// (e) groups
		let (groups_removed, groups_failed, groups_kept) = self.remove_groups(&identity, log).await;
		steps.push(StepOutcome::from_counts(
			"remove_groups",
			groups_removed.len(),
			groups_failed.len(),
		));

		// (f) description
		let description = offboarded_description(request.run_date, identity.department.as_deref());
		match self
			.clients
			.directory
			.set_description(&username, &description)
			.await
		{
			Ok(()) => {
				log.success(format!("Set description: {description}")).await;
				steps.push(StepOutcome::succeeded("set_description", Some(description)));
			}
			Err(e) => {
				log.warn(format!("Setting description failed: {e}")).await;
				steps.push(StepOutcome::failed("set_description", Some(e.to_string())));
			}
		}

		// (g) move
		let moved_to = match &self.config.directory.disabled_ou {
			Some(ou) => match self.clients.directory.move_to(&username, ou).await {
				Ok(()) => {
					log.success(format!("Moved {username} to {ou}")).await;
					steps.push(StepOutcome::succeeded("move_to_disabled_ou", Some(ou.clone())));
					Some(ou.clone())
				}
				Err(e) => {
					log.warn(format!("Move to {ou} failed: {e}")).await;
					steps.push(StepOutcome::failed("move_to_disabled_ou", Some(e.to_string())));
					None
				}
			},
			None => {
				log.info("No disabled-accounts OU configured; leaving account in place")
					.await;
				steps.push(StepOutcome::skipped("move_to_disabled_ou", None));
				None
			}
		};

		// (h) expiration
		let days = request
			.retention_days
			.unwrap_or(self.config.offboarding.account_expiry_days);
		let expires_on = match expiration_date(request.run_date, days) {
			Some(date) => match self.clients.directory.set_expiration(&username, date).await {
				Ok(()) => {
					log.success(format!("Account expires on {date}")).await;
					steps.push(StepOutcome::succeeded("set_expiration", Some(date.to_string())));
					Some(date)
				}
				Err(e) => {
					log.warn(format!("Setting expiration failed: {e}")).await;
					steps.push(StepOutcome::failed("set_expiration", Some(e.to_string())));
					None
				}
			},
			None => {
				let message = format!("{days} days after {} is out of range", request.run_date);
				log.warn(format!("Setting expiration failed: {message}")).await;
				steps.push(StepOutcome::failed("set_expiration", Some(message)));
				None
			}
		};

		// (i) forwarding
		let forwarded_to = match request.forward_to.as_deref().map(str::trim) {
			Some(target) if !target.is_empty() => {
				match self.clients.mail.set_forwarding(&identity, target, true).await {
					Ok(()) => {
						log.success(format!("Forwarding mail to {target} (copy kept)"))
							.await;
						steps.push(StepOutcome::succeeded("forward_mail", Some(target.to_string())));
						Some(target.to_string())
					}
					Err(source) => {
						let err = ProvisioningError::MailForwarding {
							username: username.clone(),
							source,
						};
						log.warn(err.to_string()).await;
						steps.push(StepOutcome::failed("forward_mail", Some(err.to_string())));
						None
					}
				}
			}
			_ => {
				steps.push(StepOutcome::skipped("forward_mail", None));
				None
			}
		};

		// (j) archive
		let archive_path = match &identity.home_directory {
			Some(home) => match self
				.clients
				.homes
				.archive_home(
					home,
					&self.config.shares.archive_root,
					&username,
					request.run_date,
				)
				.await
			{
				Ok(path) => {
					log.success(format!(
						"Archived {} to {}",
						home.display(),
						path.display()
					))
					.await;
					steps.push(StepOutcome::succeeded(
						"archive_home",
						Some(path.display().to_string()),
					));
					Some(path)
				}
				Err(source) => {
					let err = ProvisioningError::Resource {
						username: username.clone(),
						source,
					};
					log.warn(err.to_string()).await;
					steps.push(StepOutcome::failed("archive_home", Some(err.to_string())));
					None
				}
			},
			None => {
				log.info("No home directory recorded; nothing to archive").await;
				steps.push(StepOutcome::skipped("archive_home", None));
				None
			}
		};

		let status = WorkflowStatus::from_steps(&steps);
		log.success(format!("Offboarding {status} for {username}"))
			.await;

		Ok(OffboardingResult {
			username,
			display_name: identity.display_name,
			status,
			groups_removed,
			groups_failed,
			groups_kept,
			moved_to,
			expires_on,
			forwarded_to,
			archive_path,
			log_path: log.path().map(|p| p.to_path_buf()),
			snapshot_path,
			snapshot,
			steps,
		})
	}

	async fn remove_groups(
		&self,
		identity: &Identity,
		log: &mut RunLog,
	) -> (Vec<String>, Vec<String>, Vec<String>) {
		let keep = &self.config.directory.all_users_group;
		let mut removed = Vec::new();
		let mut failed = Vec::new();
		let mut kept = Vec::new();

		for group in &identity.groups {
			if group.eq_ignore_ascii_case(keep) {
				kept.push(group.clone());
				continue;
			}
			match self
				.clients
				.directory
				.remove_from_group(&identity.username, group)
				.await
			{
				Ok(()) => {
					log.success(format!("Removed from group {group}")).await;
					removed.push(group.clone());
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

		(removed, failed, kept)
	}
}

/// `run_date + days`, or `None` past the end of the calendar.
pub fn expiration_date(run_date: NaiveDate, days: u32) -> Option<NaiveDate> {
	run_date.checked_add_days(Days::new(u64::from(days)))
}

fn offboarded_description(run_date: NaiveDate, department: Option<&str>) -> String {
	format!(
		"Offboarded {} (former department: {})",
		run_date.format("%Y-%m-%d"),
		department.filter(|d| !d.is_empty()).unwrap_or("unknown")
	)
}

async fn abort(log: &mut RunLog, err: ProvisioningError) -> ProvisioningError {
	log.error(format!("Offboarding aborted: {err}")).await;
	err
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn test_expiration_date_default_retention() {
		assert_eq!(expiration_date(date(2026, 1, 1), 90), Some(date(2026, 4, 1)));
	}

	#[test]
	fn test_expiration_date_crosses_leap_day() {
		assert_eq!(expiration_date(date(2028, 2, 1), 30), Some(date(2028, 3, 2)));
	}

	#[test]
	fn test_description() {
		assert_eq!(
			offboarded_description(date(2026, 1, 1), Some("Engineering")),
			"Offboarded 2026-01-01 (former department: Engineering)"
		);
		assert_eq!(
			offboarded_description(date(2026, 1, 1), None),
			"Offboarded 2026-01-01 (former department: unknown)"
		);
	}

	#[test]
	fn test_request_builder() {
		let request = OffboardingRequest::new("jsmith", date(2026, 1, 1))
			.forward_to("manager@example.com")
			.retention_days(30);
		assert_eq!(request.forward_to.as_deref(), Some("manager@example.com"));
		assert_eq!(request.retention_days, Some(30));
	}
}
