// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for employee lifecycle provisioning.
//!
//! This crate provides:
//! - The identity model shared by every workflow ([`Identity`], [`NewIdentity`],
//!   [`EmployeeRecord`])
//! - The narrow client interfaces the workflows drive ([`DirectoryClient`],
//!   [`HomeProvisioner`], [`MailClient`], [`LicenseClient`])
//! - Deterministic naming rules for usernames, principals and share paths
//! - [`TemporaryCredential`], a redacted, zeroizing wrapper for generated secrets

pub mod client;
pub mod credential;
pub mod error;
pub mod model;
pub mod naming;

pub use client::{DirectoryClient, HomeProvisioner, LicenseClient, MailClient};
pub use credential::{TemporaryCredential, REDACTED};
pub use error::{ClientError, ClientResult};
pub use model::{
	AccessRight, AccessRule, CloudUser, EmployeeRecord, ForwardingRule, HomeResource, Identity,
	NewIdentity,
};
pub use naming::{
	archive_path_for, derive_username, email_for, home_path_for, principal_name_for,
	qualified_account_for, with_suffix, NamingError, MAX_USERNAME_LEN,
};
