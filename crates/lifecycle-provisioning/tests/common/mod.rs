// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures for workflow tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use lifecycle_audit::RunLog;
use lifecycle_config::{
	DirectoryConfig, LifecycleConfig, LoggingConfig, OffboardingConfig, PathsConfig,
	RoleTemplate, RoleTemplateStore, SharesConfig, TenantConfig,
};
use lifecycle_core::{
	ClientError, ClientResult, CloudUser, DirectoryClient, EmployeeRecord, Identity,
	LicenseClient, NewIdentity, TemporaryCredential,
};
use lifecycle_directory::{FsHomeProvisioner, LocalDirectory};
use lifecycle_provisioning::{OffboardingWorkflow, OnboardingWorkflow, ProvisioningClients};
use tempfile::TempDir;

pub const SEED_SECRET: &str = "Seed-Secret-42";

/// Wraps the local directory, records every call and fails chosen operations.
pub struct FlakyDirectory {
	inner: Arc<LocalDirectory>,
	failing_groups: Mutex<HashSet<String>>,
	failing_disable: AtomicBool,
	calls: Mutex<Vec<String>>,
}

impl FlakyDirectory {
	pub fn new(inner: Arc<LocalDirectory>) -> Self {
		Self {
			inner,
			failing_groups: Mutex::new(HashSet::new()),
			failing_disable: AtomicBool::new(false),
			calls: Mutex::new(Vec::new()),
		}
	}

	pub fn fail_group(&self, group: &str) {
		self.failing_groups
			.lock()
			.unwrap()
			.insert(group.to_ascii_lowercase());
	}

	pub fn fail_disable(&self) {
		self.failing_disable.store(true, Ordering::SeqCst);
	}

	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().unwrap().clone()
	}

	pub fn calls_to(&self, operation: &str) -> usize {
		let prefix = format!("{operation}:");
		self.calls()
			.iter()
			.filter(|c| c.starts_with(&prefix))
			.count()
	}

	fn record(&self, call: String) {
		self.calls.lock().unwrap().push(call);
	}

	fn check_group(&self, group: &str) -> ClientResult<()> {
		if self
			.failing_groups
			.lock()
			.unwrap()
			.contains(&group.to_ascii_lowercase())
		{
			return Err(ClientError::Unavailable(format!("group '{group}' is locked")));
		}
		Ok(())
	}
}

#[async_trait]
impl DirectoryClient for FlakyDirectory {
	async fn lookup(&self, username: &str) -> ClientResult<Option<Identity>> {
		self.record(format!("lookup:{username}"));
		self.inner.lookup(username).await
	}

	async fn create(&self, request: NewIdentity) -> ClientResult<Identity> {
		self.record(format!("create:{}", request.username));
		self.inner.create(request).await
	}

	async fn disable(&self, username: &str) -> ClientResult<()> {
		self.record(format!("disable:{username}"));
		if self.failing_disable.load(Ordering::SeqCst) {
			return Err(ClientError::Rejected(format!("'{username}' is protected")));
		}
		self.inner.disable(username).await
	}

	async fn reset_credential(
		&self,
		username: &str,
		secret: &TemporaryCredential,
	) -> ClientResult<()> {
		self.record(format!("reset_credential:{username}"));
		self.inner.reset_credential(username, secret).await
	}

	async fn add_to_group(&self, username: &str, group: &str) -> ClientResult<()> {
		self.record(format!("add_to_group:{username}:{group}"));
		self.check_group(group)?;
		self.inner.add_to_group(username, group).await
	}

	async fn remove_from_group(&self, username: &str, group: &str) -> ClientResult<()> {
		self.record(format!("remove_from_group:{username}:{group}"));
		self.check_group(group)?;
		self.inner.remove_from_group(username, group).await
	}

	async fn set_expiration(&self, username: &str, date: NaiveDate) -> ClientResult<()> {
		self.record(format!("set_expiration:{username}"));
		self.inner.set_expiration(username, date).await
	}

	async fn move_to(&self, username: &str, ou: &str) -> ClientResult<()> {
		self.record(format!("move_to:{username}"));
		self.inner.move_to(username, ou).await
	}

	async fn set_description(&self, username: &str, text: &str) -> ClientResult<()> {
		self.record(format!("set_description:{username}"));
		self.inner.set_description(username, text).await
	}

	async fn set_home_directory(&self, username: &str, path: &Path) -> ClientResult<()> {
		self.record(format!("set_home_directory:{username}"));
		self.inner.set_home_directory(username, path).await
	}
}

/// A cloud directory the new account has not reached yet.
pub struct UnsyncedLicenses;

#[async_trait]
impl LicenseClient for UnsyncedLicenses {
	async fn find_user(&self, _principal_name: &str) -> ClientResult<Option<CloudUser>> {
		Ok(None)
	}

	async fn assign_license(
		&self,
		user: &CloudUser,
		_sku: &str,
		_usage_location: &str,
	) -> ClientResult<()> {
		Err(ClientError::NotFound(user.principal_name.clone()))
	}
}

pub fn engineering() -> RoleTemplate {
	RoleTemplate {
		department: "Engineering".to_string(),
		groups: vec![
			"Engineering".to_string(),
			"VPN-Users".to_string(),
			"GitHub-Org".to_string(),
		],
		license_sku: Some("ENTERPRISEPACK".to_string()),
		ou: Some("OU=Engineering,OU=Users,DC=corp,DC=example,DC=com".to_string()),
		home_share: None,
		channels: vec!["Engineering/General".to_string()],
		sites: vec![],
	}
}

pub fn finance() -> RoleTemplate {
	RoleTemplate {
		department: "Finance".to_string(),
		groups: vec!["Finance".to_string()],
		license_sku: None,
		ou: None,
		home_share: None,
		channels: vec![],
		sites: vec![],
	}
}

pub fn record(first: &str, last: &str, department: &str) -> EmployeeRecord {
	EmployeeRecord {
		first_name: first.to_string(),
		last_name: last.to_string(),
		department: department.to_string(),
		title: "Engineer".to_string(),
		manager: Some("Jane Doe".to_string()),
		start_date: NaiveDate::from_ymd_opt(2026, 2, 1),
	}
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
	NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub struct Harness {
	pub dir: TempDir,
	pub config: Arc<LifecycleConfig>,
	pub local: Arc<LocalDirectory>,
	pub directory: Arc<FlakyDirectory>,
	pub templates: Arc<RoleTemplateStore>,
}

impl Harness {
	pub fn new() -> Self {
		Self::with_config(|_| {})
	}

	/// A harness whose configuration is adjusted by `customize` before use.
	pub fn with_config(customize: impl FnOnce(&mut LifecycleConfig)) -> Self {
		let dir = tempfile::tempdir().unwrap();
		let home_root = dir.path().join("home");
		let archive_root = dir.path().join("archive");
		std::fs::create_dir_all(&home_root).unwrap();

		let mut config = LifecycleConfig {
			directory: DirectoryConfig {
				domain: "corp.example.com".to_string(),
				email_domain: "example.com".to_string(),
				organization: "Example Ltd".to_string(),
				netbios_name: "CORP".to_string(),
				new_account_ou: "OU=Users,DC=corp,DC=example,DC=com".to_string(),
				disabled_ou: Some("OU=Disabled,DC=corp,DC=example,DC=com".to_string()),
				all_users_group: "Domain Users".to_string(),
			},
			shares: SharesConfig {
				home_root,
				archive_root,
			},
			tenant: TenantConfig {
				tenant_id: None,
				usage_location: "US".to_string(),
				license_propagation_delay_secs: 0,
			},
			offboarding: OffboardingConfig::default(),
			paths: PathsConfig {
				log_dir: dir.path().join("logs"),
				templates_dir: dir.path().join("templates"),
				state_file: dir.path().join("state.json"),
			},
			logging: LoggingConfig::default(),
		};
		customize(&mut config);

		let local = Arc::new(LocalDirectory::in_memory());
		let directory = Arc::new(FlakyDirectory::new(local.clone()));

		Self {
			dir,
			config: Arc::new(config),
			local,
			directory,
			templates: Arc::new(RoleTemplateStore::from_templates([engineering(), finance()])),
		}
	}

	pub fn path(&self) -> &Path {
		self.dir.path()
	}

	pub fn log_dir(&self) -> PathBuf {
		self.config.paths.log_dir.clone()
	}

	pub fn clients(&self) -> ProvisioningClients {
		ProvisioningClients {
			directory: self.directory.clone(),
			homes: Arc::new(FsHomeProvisioner::new(
				self.config.directory.netbios_name.clone(),
			)),
			mail: self.local.clone(),
			licenses: self.local.clone(),
		}
	}

	pub fn onboarding(&self) -> OnboardingWorkflow {
		OnboardingWorkflow::new(self.config.clone(), self.templates.clone(), self.clients())
	}

	pub fn offboarding(&self) -> OffboardingWorkflow {
		OffboardingWorkflow::new(self.config.clone(), self.clients())
	}

	pub async fn run_log(&self, kind: &str, subject: &str) -> RunLog {
		RunLog::create(&self.log_dir(), kind, subject).await.unwrap()
	}

	/// Create an account directly in the backing directory, bypassing the
	/// workflows and the call recorder.
	pub async fn seed(&self, username: &str, groups: &[&str], home: Option<&Path>) -> Identity {
		self.local
			.create(NewIdentity {
				username: username.to_string(),
				principal_name: format!("{username}@corp.example.com"),
				email: format!("{username}@example.com"),
				display_name: format!("Seeded {username}"),
				given_name: "Seeded".to_string(),
				surname: username.to_string(),
				department: "Engineering".to_string(),
				title: String::new(),
				manager: None,
				ou: self.config.directory.new_account_ou.clone(),
				initial_password: TemporaryCredential::new(SEED_SECRET.to_string()),
				must_change_password: false,
			})
			.await
			.unwrap();
		for group in groups {
			self.local.add_to_group(username, group).await.unwrap();
		}
		if let Some(home) = home {
			self.local.set_home_directory(username, home).await.unwrap();
		}
		self.local.lookup(username).await.unwrap().unwrap()
	}

	pub async fn identity(&self, username: &str) -> Identity {
		self.local.lookup(username).await.unwrap().unwrap()
	}

	pub async fn groups(&self, username: &str) -> BTreeSet<String> {
		self.identity(username).await.groups
	}
}
