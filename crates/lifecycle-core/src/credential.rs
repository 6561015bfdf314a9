// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generated account secrets.
//!
//! [`TemporaryCredential`] wraps a password produced for a new or offboarded
//! account. It:
//!
//! - Never appears in logs (redacted Debug/Display)
//! - Serializes as `"[REDACTED]"`
//! - Is zeroized from memory on drop
//! - Requires an explicit `.expose()` call to read the value

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Serializer};
use zeroize::Zeroize;

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// Length of generated credentials.
pub const GENERATED_LENGTH: usize = 20;

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!#$%&*+-=?@^_";

pub struct TemporaryCredential {
	inner: String,
}

impl TemporaryCredential {
	pub fn new(inner: String) -> Self {
		Self { inner }
	}

	/// Generate a random credential that satisfies common directory complexity
	/// rules: at least one upper-case letter, lower-case letter, digit and
	/// symbol. Look-alike characters (`0`, `O`, `1`, `l`, `I`) are excluded.
	pub fn generate() -> Self {
		let mut rng = rand::thread_rng();
		let classes = [UPPER, LOWER, DIGITS, SYMBOLS];
		let all: Vec<u8> = classes.concat();

		let mut bytes: Vec<u8> = classes
			.iter()
			.map(|class| class[rng.gen_range(0..class.len())])
			.collect();
		while bytes.len() < GENERATED_LENGTH {
			bytes.push(all[rng.gen_range(0..all.len())]);
		}
		bytes.shuffle(&mut rng);

		let inner = bytes.iter().map(|b| *b as char).collect();
		bytes.zeroize();
		Self { inner }
	}

	/// Explicitly access the secret value.
	pub fn expose(&self) -> &str {
		&self.inner
	}
}

impl Clone for TemporaryCredential {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl Drop for TemporaryCredential {
	fn drop(&mut self) {
		self.inner.zeroize();
	}
}

impl fmt::Debug for TemporaryCredential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("TemporaryCredential")
			.field(&REDACTED)
			.finish()
	}
}

impl fmt::Display for TemporaryCredential {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl Serialize for TemporaryCredential {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_meets_complexity() {
		for _ in 0..200 {
			let credential = TemporaryCredential::generate();
			let value = credential.expose();
			assert_eq!(value.len(), GENERATED_LENGTH);
			assert!(value.bytes().any(|b| UPPER.contains(&b)));
			assert!(value.bytes().any(|b| LOWER.contains(&b)));
			assert!(value.bytes().any(|b| DIGITS.contains(&b)));
			assert!(value.bytes().any(|b| SYMBOLS.contains(&b)));
		}
	}

	#[test]
	fn test_generate_is_not_repeated() {
		let a = TemporaryCredential::generate();
		let b = TemporaryCredential::generate();
		assert_ne!(a.expose(), b.expose());
	}

	#[test]
	fn test_debug_and_display_are_redacted() {
		let credential = TemporaryCredential::new("hunter2".to_string());
		assert_eq!(
			format!("{:?}", credential),
			"TemporaryCredential(\"[REDACTED]\")"
		);
		assert_eq!(format!("{}", credential), "[REDACTED]");
	}

	#[test]
	fn test_serialize_is_redacted() {
		let credential = TemporaryCredential::new("hunter2".to_string());
		let json = serde_json::to_string(&credential).unwrap();
		assert_eq!(json, "\"[REDACTED]\"");
	}

	#[test]
	fn test_expose_returns_value() {
		let credential = TemporaryCredential::new("hunter2".to_string());
		assert_eq!(credential.expose(), "hunter2");
		assert_eq!(credential.clone().expose(), "hunter2");
	}
}
