// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity model shared by the workflows and the client implementations.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::credential::TemporaryCredential;

/// One onboarding request, as supplied on the command line or as a batch row.
///
/// Field names follow the batch CSV header:
/// `FirstName,LastName,Department,Title,Manager,StartDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmployeeRecord {
	pub first_name: String,
	pub last_name: String,
	pub department: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub manager: Option<String>,
	#[serde(default)]
	pub start_date: Option<NaiveDate>,
}

impl EmployeeRecord {
	pub fn display_name(&self) -> String {
		format!("{} {}", self.first_name.trim(), self.last_name.trim())
	}
}

/// A directory account.
///
/// The directory owns this record; workflows only read it back through
/// [`crate::DirectoryClient::lookup`] and mutate it through the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	pub username: String,
	pub principal_name: String,
	pub email: String,
	pub display_name: String,
	pub given_name: String,
	pub surname: String,
	pub enabled: bool,
	#[serde(default)]
	pub groups: BTreeSet<String>,
	#[serde(default)]
	pub home_directory: Option<PathBuf>,
	#[serde(default)]
	pub expires_on: Option<NaiveDate>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub department: Option<String>,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub manager: Option<String>,
	pub ou: String,
	#[serde(default)]
	pub must_change_password: bool,
}

impl Identity {
	pub fn is_member_of(&self, group: &str) -> bool {
		self.groups.iter().any(|g| g.eq_ignore_ascii_case(group))
	}
}

/// Fields for a new directory account.
#[derive(Debug, Clone)]
pub struct NewIdentity {
	pub username: String,
	pub principal_name: String,
	pub email: String,
	pub display_name: String,
	pub given_name: String,
	pub surname: String,
	pub department: String,
	pub title: String,
	pub manager: Option<String>,
	pub ou: String,
	pub initial_password: TemporaryCredential,
	pub must_change_password: bool,
}

impl NewIdentity {
	/// The account this request produces once the directory accepts it.
	pub fn to_identity(&self) -> Identity {
		Identity {
			username: self.username.clone(),
			principal_name: self.principal_name.clone(),
			email: self.email.clone(),
			display_name: self.display_name.clone(),
			given_name: self.given_name.clone(),
			surname: self.surname.clone(),
			enabled: true,
			groups: BTreeSet::new(),
			home_directory: None,
			expires_on: None,
			description: None,
			department: Some(self.department.clone()).filter(|d| !d.is_empty()),
			title: Some(self.title.clone()).filter(|t| !t.is_empty()),
			manager: self.manager.clone(),
			ou: self.ou.clone(),
			must_change_password: self.must_change_password,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRight {
	Read,
	Modify,
	FullControl,
}

impl fmt::Display for AccessRight {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AccessRight::Read => write!(f, "read"),
			AccessRight::Modify => write!(f, "modify"),
			AccessRight::FullControl => write!(f, "full_control"),
		}
	}
}

/// An access-control entry on a home resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRule {
	/// Qualified account name, e.g. `CORP\jsmith`.
	pub principal: String,
	pub right: AccessRight,
	/// Whether child objects inherit the entry.
	pub inherited: bool,
}

/// A home folder bound 1:1 to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeResource {
	pub path: PathBuf,
	pub access: AccessRule,
}

/// The cloud-suite view of a synchronized account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudUser {
	pub id: String,
	pub principal_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingRule {
	pub target: String,
	/// Keep a copy in the original mailbox.
	pub keep_copy: bool,
}
