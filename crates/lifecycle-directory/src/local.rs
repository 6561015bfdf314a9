// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A directory, mail and license backend kept in a single JSON state file.
//!
//! Used for staging runs and tests where no live tenant is available. The
//! state file is rewritten atomically (temp file + rename) after every
//! successful mutation; a mutation whose write fails is rolled back in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use lifecycle_core::{
	ClientError, ClientResult, CloudUser, DirectoryClient, ForwardingRule, Identity,
	LicenseClient, MailClient, NewIdentity, TemporaryCredential,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryState {
	/// Accounts keyed by lower-cased username.
	#[serde(default)]
	pub identities: BTreeMap<String, Identity>,
	/// Known groups. When empty, any group name is accepted.
	#[serde(default)]
	pub groups: BTreeSet<String>,
	/// SHA-256 of the current credential, hex encoded. Never the credential.
	#[serde(default)]
	pub credential_digests: BTreeMap<String, String>,
	#[serde(default)]
	pub forwarding: BTreeMap<String, ForwardingRule>,
	/// Assigned SKUs keyed by lower-cased username.
	#[serde(default)]
	pub licenses: BTreeMap<String, BTreeSet<String>>,
	#[serde(default)]
	pub usage_locations: BTreeMap<String, String>,
}

impl DirectoryState {
	fn identity_mut(&mut self, username: &str) -> ClientResult<&mut Identity> {
		self.identities
			.get_mut(&key(username))
			.ok_or_else(|| ClientError::NotFound(format!("identity '{username}'")))
	}

	fn find_by_principal(&self, principal_name: &str) -> Option<&Identity> {
		self.identities
			.values()
			.find(|i| i.principal_name.eq_ignore_ascii_case(principal_name))
	}

	fn resolve_group(&self, group: &str) -> ClientResult<String> {
		if self.groups.is_empty() {
			return Ok(group.to_string());
		}
		self.groups
			.iter()
			.find(|g| g.eq_ignore_ascii_case(group))
			.cloned()
			.ok_or_else(|| ClientError::NotFound(format!("group '{group}'")))
	}
}

pub struct LocalDirectory {
	state: Mutex<DirectoryState>,
	path: Option<PathBuf>,
}

impl LocalDirectory {
	/// A directory that lives only in memory.
	pub fn in_memory() -> Self {
		Self::with_state(DirectoryState::default())
	}

	pub fn with_state(state: DirectoryState) -> Self {
		Self {
			state: Mutex::new(state),
			path: None,
		}
	}

	/// Load the state file at `path`, or start empty if it does not exist yet.
	pub async fn open(path: impl Into<PathBuf>) -> ClientResult<Self> {
		let path = path.into();
		let state = match tokio::fs::read(&path).await {
			Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
				ClientError::Rejected(format!("invalid state file {}: {e}", path.display()))
			})?,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				debug!(path = %path.display(), "state file not found, starting empty");
				DirectoryState::default()
			}
			Err(e) => return Err(e.into()),
		};

		Ok(Self {
			state: Mutex::new(state),
			path: Some(path),
		})
	}

	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	/// A copy of the current state.
	pub async fn state(&self) -> DirectoryState {
		self.state.lock().await.clone()
	}

	/// Whether `secret` is the account's current credential.
	pub async fn credential_matches(&self, username: &str, secret: &str) -> bool {
		let state = self.state.lock().await;
		state
			.credential_digests
			.get(&key(username))
			.is_some_and(|d| *d == digest(secret))
	}

	async fn mutate<T, F>(&self, f: F) -> ClientResult<T>
	where
		F: FnOnce(&mut DirectoryState) -> ClientResult<T>,
	{
		let mut state = self.state.lock().await;
		let before = state.clone();
		let value = f(&mut state)?;

		if let Some(path) = &self.path {
			if let Err(e) = persist(path, &state).await {
				*state = before;
				return Err(e);
			}
		}

		Ok(value)
	}
}

async fn persist(path: &Path, state: &DirectoryState) -> ClientResult<()> {
	let json = serde_json::to_vec_pretty(state)
		.map_err(|e| ClientError::Rejected(format!("failed to serialize state: {e}")))?;

	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		tokio::fs::create_dir_all(parent).await?;
	}

	let tmp = path.with_extension("json.tmp");
	tokio::fs::write(&tmp, json).await?;
	tokio::fs::rename(&tmp, path).await?;
	Ok(())
}

fn key(username: &str) -> String {
	username.to_ascii_lowercase()
}

fn digest(secret: &str) -> String {
	hex::encode(Sha256::digest(secret.as_bytes()))
}

#[async_trait]
impl DirectoryClient for LocalDirectory {
	async fn lookup(&self, username: &str) -> ClientResult<Option<Identity>> {
		let state = self.state.lock().await;
		Ok(state.identities.get(&key(username)).cloned())
	}

	async fn create(&self, request: NewIdentity) -> ClientResult<Identity> {
		self.mutate(|state| {
			let k = key(&request.username);
			if state.identities.contains_key(&k) {
				return Err(ClientError::Conflict(format!(
					"username '{}'",
					request.username
				)));
			}
			if let Some(existing) = state.identities.values().find(|i| {
				i.principal_name.eq_ignore_ascii_case(&request.principal_name)
					|| i.email.eq_ignore_ascii_case(&request.email)
			}) {
				return Err(ClientError::Conflict(format!(
					"principal or email already used by '{}'",
					existing.username
				)));
			}

			let identity = request.to_identity();
			state
				.credential_digests
				.insert(k.clone(), digest(request.initial_password.expose()));
			state.identities.insert(k, identity.clone());
			info!(username = %identity.username, ou = %identity.ou, "created identity");
			Ok(identity)
		})
		.await
	}

	async fn disable(&self, username: &str) -> ClientResult<()> {
		self.mutate(|state| {
			state.identity_mut(username)?.enabled = false;
			Ok(())
		})
		.await
	}

	async fn reset_credential(
		&self,
		username: &str,
		secret: &TemporaryCredential,
	) -> ClientResult<()> {
		self.mutate(|state| {
			state.identity_mut(username)?;
			state
				.credential_digests
				.insert(key(username), digest(secret.expose()));
			Ok(())
		})
		.await
	}

	async fn add_to_group(&self, username: &str, group: &str) -> ClientResult<()> {
		self.mutate(|state| {
			let group = state.resolve_group(group)?;
			let identity = state.identity_mut(username)?;
			if !identity.is_member_of(&group) {
				identity.groups.insert(group);
			}
			Ok(())
		})
		.await
	}

	async fn remove_from_group(&self, username: &str, group: &str) -> ClientResult<()> {
		self.mutate(|state| {
			let identity = state.identity_mut(username)?;
			let member = identity
				.groups
				.iter()
				.find(|g| g.eq_ignore_ascii_case(group))
				.cloned()
				.ok_or_else(|| {
					ClientError::NotFound(format!("'{username}' is not a member of '{group}'"))
				})?;
			identity.groups.remove(&member);
			Ok(())
		})
		.await
	}

	async fn set_expiration(&self, username: &str, date: NaiveDate) -> ClientResult<()> {
		self.mutate(|state| {
			state.identity_mut(username)?.expires_on = Some(date);
			Ok(())
		})
		.await
	}

	async fn move_to(&self, username: &str, ou: &str) -> ClientResult<()> {
		self.mutate(|state| {
			state.identity_mut(username)?.ou = ou.to_string();
			Ok(())
		})
		.await
	}

	async fn set_description(&self, username: &str, text: &str) -> ClientResult<()> {
		self.mutate(|state| {
			state.identity_mut(username)?.description = Some(text.to_string());
			Ok(())
		})
		.await
	}

	async fn set_home_directory(&self, username: &str, path: &Path) -> ClientResult<()> {
		self.mutate(|state| {
			state.identity_mut(username)?.home_directory = Some(path.to_path_buf());
			Ok(())
		})
		.await
	}
}

#[async_trait]
impl LicenseClient for LocalDirectory {
	async fn find_user(&self, principal_name: &str) -> ClientResult<Option<CloudUser>> {
		let state = self.state.lock().await;
		Ok(state.find_by_principal(principal_name).map(|i| CloudUser {
			id: format!("local:{}", key(&i.username)),
			principal_name: i.principal_name.clone(),
		}))
	}

	async fn assign_license(
		&self,
		user: &CloudUser,
		sku: &str,
		usage_location: &str,
	) -> ClientResult<()> {
		self.mutate(|state| {
			let username = state
				.find_by_principal(&user.principal_name)
				.map(|i| key(&i.username))
				.ok_or_else(|| ClientError::NotFound(format!("cloud user '{}'", user.principal_name)))?;
			state
				.usage_locations
				.insert(username.clone(), usage_location.to_string());
			state
				.licenses
				.entry(username)
				.or_default()
				.insert(sku.to_string());
			Ok(())
		})
		.await
	}
}

#[async_trait]
impl MailClient for LocalDirectory {
	async fn set_forwarding(
		&self,
		identity: &Identity,
		target: &str,
		keep_copy: bool,
	) -> ClientResult<()> {
		if !target.contains('@') {
			return Err(ClientError::Rejected(format!(
				"forwarding target '{target}' is not an email address"
			)));
		}
		self.mutate(|state| {
			state.identity_mut(&identity.username)?;
			state.forwarding.insert(
				key(&identity.username),
				ForwardingRule {
					target: target.to_string(),
					keep_copy,
				},
			);
			Ok(())
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(username: &str) -> NewIdentity {
		NewIdentity {
			username: username.to_string(),
			principal_name: format!("{username}@corp.example.com"),
			email: format!("{username}@example.com"),
			display_name: "John Smith".to_string(),
			given_name: "John".to_string(),
			surname: "Smith".to_string(),
			department: "Engineering".to_string(),
			title: "Engineer".to_string(),
			manager: None,
			ou: "OU=Users".to_string(),
			initial_password: TemporaryCredential::new("Initial-Secret-9".to_string()),
			must_change_password: true,
		}
	}

	#[tokio::test]
	async fn test_create_and_lookup() {
		let directory = LocalDirectory::in_memory();
		directory.create(request("jsmith")).await.unwrap();

		let identity = directory.lookup("JSmith").await.unwrap().unwrap();
		assert_eq!(identity.username, "jsmith");
		assert!(identity.enabled);
		assert!(
			directory
				.credential_matches("jsmith", "Initial-Secret-9")
				.await
		);
	}

	#[tokio::test]
	async fn test_create_conflict() {
		let directory = LocalDirectory::in_memory();
		directory.create(request("jsmith")).await.unwrap();
		let err = directory.create(request("jsmith")).await.unwrap_err();
		assert!(err.is_conflict());
	}

	#[tokio::test]
	async fn test_email_collision_is_conflict() {
		let directory = LocalDirectory::in_memory();
		directory.create(request("jsmith")).await.unwrap();
		let mut other = request("jsmith2");
		other.email = "jsmith@example.com".to_string();
		assert!(directory.create(other).await.unwrap_err().is_conflict());
	}

	#[tokio::test]
	async fn test_group_membership_is_a_set() {
		let directory = LocalDirectory::in_memory();
		directory.create(request("jsmith")).await.unwrap();
		directory.add_to_group("jsmith", "VPN").await.unwrap();
		directory.add_to_group("jsmith", "vpn").await.unwrap();

		let identity = directory.lookup("jsmith").await.unwrap().unwrap();
		assert_eq!(identity.groups.len(), 1);

		directory.remove_from_group("jsmith", "VPN").await.unwrap();
		let err = directory
			.remove_from_group("jsmith", "VPN")
			.await
			.unwrap_err();
		assert!(err.is_not_found());
	}

	#[tokio::test]
	async fn test_known_groups_enforced() {
		let mut state = DirectoryState::default();
		state.groups.insert("Engineering".to_string());
		let directory = LocalDirectory::with_state(state);
		directory.create(request("jsmith")).await.unwrap();

		directory.add_to_group("jsmith", "engineering").await.unwrap();
		assert!(directory
			.add_to_group("jsmith", "Ghost")
			.await
			.unwrap_err()
			.is_not_found());

		let identity = directory.lookup("jsmith").await.unwrap().unwrap();
		assert!(identity.groups.contains("Engineering"));
	}

	#[tokio::test]
	async fn test_mutations_on_missing_identity() {
		let directory = LocalDirectory::in_memory();
		assert!(directory.disable("ghost").await.unwrap_err().is_not_found());
		assert!(directory
			.move_to("ghost", "OU=Disabled")
			.await
			.unwrap_err()
			.is_not_found());
	}

	#[tokio::test]
	async fn test_reset_credential_replaces_digest() {
		let directory = LocalDirectory::in_memory();
		directory.create(request("jsmith")).await.unwrap();
		let replacement = TemporaryCredential::new("Replacement-7".to_string());
		directory
			.reset_credential("jsmith", &replacement)
			.await
			.unwrap();
		assert!(!directory.credential_matches("jsmith", "Initial-Secret-9").await);
		assert!(directory.credential_matches("jsmith", "Replacement-7").await);
	}

	#[tokio::test]
	async fn test_license_assignment() {
		let directory = LocalDirectory::in_memory();
		directory.create(request("jsmith")).await.unwrap();

		let user = directory
			.find_user("jsmith@corp.example.com")
			.await
			.unwrap()
			.unwrap();
		directory
			.assign_license(&user, "ENTERPRISEPACK", "US")
			.await
			.unwrap();

		let state = directory.state().await;
		assert!(state.licenses["jsmith"].contains("ENTERPRISEPACK"));
		assert_eq!(state.usage_locations["jsmith"], "US");
		assert!(directory
			.find_user("nobody@corp.example.com")
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_forwarding_requires_address() {
		let directory = LocalDirectory::in_memory();
		let identity = directory.create(request("jsmith")).await.unwrap();
		assert!(directory
			.set_forwarding(&identity, "not-an-address", true)
			.await
			.is_err());
		directory
			.set_forwarding(&identity, "manager@example.com", true)
			.await
			.unwrap();
		let state = directory.state().await;
		assert_eq!(state.forwarding["jsmith"].target, "manager@example.com");
		assert!(state.forwarding["jsmith"].keep_copy);
	}

	#[tokio::test]
	async fn test_state_persists_across_open() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");

		{
			let directory = LocalDirectory::open(&path).await.unwrap();
			directory.create(request("jsmith")).await.unwrap();
			directory.add_to_group("jsmith", "VPN").await.unwrap();
		}

		let reopened = LocalDirectory::open(&path).await.unwrap();
		let identity = reopened.lookup("jsmith").await.unwrap().unwrap();
		assert!(identity.groups.contains("VPN"));

		let raw = tokio::fs::read_to_string(&path).await.unwrap();
		assert!(!raw.contains("Initial-Secret-9"));
	}

	#[tokio::test]
	async fn test_open_rejects_corrupt_state() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state.json");
		tokio::fs::write(&path, b"{ not json").await.unwrap();
		assert!(LocalDirectory::open(&path).await.is_err());
	}
}
