// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Log entries and their text rendering.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
	Info,
	Warn,
	Error,
	/// A step completed. Rendered separately from `Info` so operators can scan
	/// for what actually happened.
	Success,
}

impl fmt::Display for LogLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			LogLevel::Info => "INFO",
			LogLevel::Warn => "WARN",
			LogLevel::Error => "ERROR",
			LogLevel::Success => "SUCCESS",
		};
		f.write_str(s)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
	pub timestamp: DateTime<Utc>,
	pub level: LogLevel,
	pub message: String,
}

impl LogEntry {
	pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
		Self {
			timestamp: Utc::now(),
			level,
			message: message.into(),
		}
	}

	/// `[2026-01-01 09:00:00] [INFO] message`, newline-terminated. Embedded
	/// newlines are escaped so one entry is always one line.
	pub fn to_line(&self) -> String {
		let message = self.message.replace('\r', "\\r").replace('\n', "\\n");
		format!(
			"[{}] [{}] {}\n",
			self.timestamp.format("%Y-%m-%d %H:%M:%S"),
			self.level,
			message
		)
	}
}
