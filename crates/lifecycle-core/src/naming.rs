// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deterministic naming rules for accounts and their resources.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

/// Longest logon name the directory accepts.
pub const MAX_USERNAME_LEN: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
	#[error("first name is empty")]
	EmptyFirstName,

	#[error("last name has no usable characters")]
	EmptyLastName,
}

fn sanitize(value: &str) -> String {
	value
		.chars()
		.filter(|c| c.is_ascii_alphanumeric())
		.map(|c| c.to_ascii_lowercase())
		.collect()
}

/// Derive the base username: first initial plus last name, lower-cased, with
/// everything except ASCII letters and digits removed.
///
/// The initial is the first character of the trimmed first name as written.
/// If that character is not ASCII alphanumeric it is stripped with the rest,
/// so `("Émile", "Zola")` becomes `zola`, never a later letter of the first
/// name. `("John", "Smith")` becomes `jsmith`; `("Mary", "O'Brien-Lee")`
/// becomes `mobrienlee`. The result is cut to [`MAX_USERNAME_LEN`].
pub fn derive_username(first_name: &str, last_name: &str) -> Result<String, NamingError> {
	let initial = first_name
		.trim()
		.chars()
		.next()
		.ok_or(NamingError::EmptyFirstName)?;

	let last = sanitize(last_name);
	if last.is_empty() {
		return Err(NamingError::EmptyLastName);
	}

	let mut username = sanitize(&initial.to_string());
	username.push_str(&last);
	username.truncate(MAX_USERNAME_LEN);
	Ok(username)
}

/// Append a numeric disambiguator, shortening the base so the result still
/// fits in [`MAX_USERNAME_LEN`]. A suffix of `0` returns the base unchanged.
pub fn with_suffix(base: &str, suffix: u32) -> String {
	if suffix == 0 {
		return base.to_string();
	}
	let suffix = suffix.to_string();
	let keep = MAX_USERNAME_LEN.saturating_sub(suffix.len()).min(base.len());
	format!("{}{}", &base[..keep], suffix)
}

pub fn principal_name_for(username: &str, domain: &str) -> String {
	format!("{username}@{domain}")
}

pub fn email_for(username: &str, email_domain: &str) -> String {
	format!("{username}@{email_domain}")
}

/// `NETBIOS\username`, the account form used in access rules.
pub fn qualified_account_for(netbios_name: &str, username: &str) -> String {
	format!("{netbios_name}\\{username}")
}

/// `base/username`
pub fn home_path_for(base: &Path, username: &str) -> PathBuf {
	base.join(username)
}

/// `archive_base/username_YYYYMMDD`
pub fn archive_path_for(archive_base: &Path, username: &str, date: NaiveDate) -> PathBuf {
	archive_base.join(format!("{}_{}", username, date.format("%Y%m%d")))
}
