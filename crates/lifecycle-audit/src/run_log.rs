// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-run log context.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::entry::{LogEntry, LogLevel};
use crate::error::{AuditError, AuditResult};

struct FileHandle {
	path: PathBuf,
	file: File,
}

/// Append-only log for one workflow run.
///
/// Every entry is written to the run's file and flushed before the logging
/// call returns, then mirrored to `tracing`. Dropping the log on any exit path
/// therefore loses nothing. A failing write never fails the workflow; it is
/// reported once through `tracing` and the entry is still kept in memory.
pub struct RunLog {
	run_id: Uuid,
	kind: String,
	subject: String,
	started_at: DateTime<Utc>,
	handle: Option<FileHandle>,
	entries: Vec<LogEntry>,
	write_failed: bool,
}

impl RunLog {
	/// Open `<log_dir>/<kind>_<subject>_<YYYYMMDD_HHMMSS>.log`, creating the
	/// directory if needed. A name already taken within the same second gets a
	/// numeric suffix instead of being appended to.
	pub async fn create(log_dir: &Path, kind: &str, subject: &str) -> AuditResult<Self> {
		tokio::fs::create_dir_all(log_dir)
			.await
			.map_err(|e| AuditError::CreateDir {
				path: log_dir.to_path_buf(),
				source: e,
			})?;

		let started_at = Utc::now();
		let stem = format!(
			"{}_{}_{}",
			sanitize_component(kind),
			sanitize_component(subject),
			started_at.format("%Y%m%d_%H%M%S")
		);

		let (path, file) = create_unique(log_dir, &stem, "log").await?;

		tracing::debug!(path = %path.display(), kind, subject, "opened run log");

		Ok(Self {
			run_id: Uuid::new_v4(),
			kind: kind.to_string(),
			subject: subject.to_string(),
			started_at,
			handle: Some(FileHandle { path, file }),
			entries: Vec::new(),
			write_failed: false,
		})
	}

	/// A log that only keeps entries in memory and mirrors them to `tracing`.
	pub fn in_memory(kind: &str, subject: &str) -> Self {
		Self {
			run_id: Uuid::new_v4(),
			kind: kind.to_string(),
			subject: subject.to_string(),
			started_at: Utc::now(),
			handle: None,
			entries: Vec::new(),
			write_failed: false,
		}
	}

	pub fn run_id(&self) -> Uuid {
		self.run_id
	}

	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn subject(&self) -> &str {
		&self.subject
	}

	pub fn started_at(&self) -> DateTime<Utc> {
		self.started_at
	}

	/// The backing file, if any.
	pub fn path(&self) -> Option<&Path> {
		self.handle.as_ref().map(|h| h.path.as_path())
	}

	pub fn entries(&self) -> &[LogEntry] {
		&self.entries
	}

	pub fn count(&self, level: LogLevel) -> usize {
		self.entries.iter().filter(|e| e.level == level).count()
	}

	pub async fn info(&mut self, message: impl Into<String>) {
		self.record(LogLevel::Info, message).await;
	}

	pub async fn warn(&mut self, message: impl Into<String>) {
		self.record(LogLevel::Warn, message).await;
	}

	pub async fn error(&mut self, message: impl Into<String>) {
		self.record(LogLevel::Error, message).await;
	}

	pub async fn success(&mut self, message: impl Into<String>) {
		self.record(LogLevel::Success, message).await;
	}

	pub async fn record(&mut self, level: LogLevel, message: impl Into<String>) {
		let entry = LogEntry::new(level, message);
		mirror(&self.run_id, &self.subject, &entry);

		if let Err(e) = self.write_line(&entry.to_line()).await {
			if !self.write_failed {
				tracing::warn!(run_id = %self.run_id, error = %e, "run log write failed; continuing with console output only");
				self.write_failed = true;
			}
		}

		self.entries.push(entry);
	}

	async fn write_line(&mut self, line: &str) -> AuditResult<()> {
		let Some(handle) = self.handle.as_mut() else {
			return Ok(());
		};

		handle
			.file
			.write_all(line.as_bytes())
			.await
			.map_err(|e| AuditError::Write {
				path: handle.path.clone(),
				source: e,
			})?;

		handle.file.flush().await.map_err(|e| AuditError::Write {
			path: handle.path.clone(),
			source: e,
		})
	}

	/// Flush the file to disk and return its path.
	pub async fn close(mut self) -> AuditResult<Option<PathBuf>> {
		match self.handle.take() {
			Some(handle) => {
				handle.file.sync_all().await.map_err(|e| AuditError::Write {
					path: handle.path.clone(),
					source: e,
				})?;
				Ok(Some(handle.path))
			}
			None => Ok(None),
		}
	}
}

fn mirror(run_id: &Uuid, subject: &str, entry: &LogEntry) {
	match entry.level {
		LogLevel::Info => tracing::info!(run_id = %run_id, subject, "{}", entry.message),
		LogLevel::Success => {
			tracing::info!(run_id = %run_id, subject, outcome = "success", "{}", entry.message)
		}
		LogLevel::Warn => tracing::warn!(run_id = %run_id, subject, "{}", entry.message),
		LogLevel::Error => tracing::error!(run_id = %run_id, subject, "{}", entry.message),
	}
}

/// Keep file name components to `[A-Za-z0-9._-]`.
/// Create `<dir>/<stem>.<ext>`, or `<stem>_2.<ext>` and so on when the name is
/// taken. Existing files are never opened for writing.
pub(crate) async fn create_unique(dir: &Path, stem: &str, ext: &str) -> AuditResult<(PathBuf, File)> {
	let mut attempt = 1u32;
	loop {
		let name = if attempt == 1 {
			format!("{stem}.{ext}")
		} else {
			format!("{stem}_{attempt}.{ext}")
		};
		let path = dir.join(name);
		match OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(&path)
			.await
		{
			Ok(file) => return Ok((path, file)),
			Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && attempt < 100 => {
				attempt += 1;
			}
			Err(e) => return Err(AuditError::Open { path, source: e }),
		}
	}
}

pub(crate) fn sanitize_component(value: &str) -> String {
	let cleaned: String = value
		.trim()
		.chars()
		.map(|c| {
			if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
				c
			} else {
				'_'
			}
		})
		.collect();
	let cleaned = cleaned.trim_matches('.').to_string();
	if cleaned.is_empty() {
		"unknown".to_string()
	} else {
		cleaned
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_create_names_file_after_kind_and_subject() {
		let dir = tempfile::tempdir().unwrap();
		let log = RunLog::create(dir.path(), "onboard", "jsmith").await.unwrap();
		let name = log
			.path()
			.unwrap()
			.file_name()
			.unwrap()
			.to_string_lossy()
			.to_string();
		assert!(name.starts_with("onboard_jsmith_"));
		assert!(name.ends_with(".log"));
	}

	#[tokio::test]
	async fn test_entries_are_written_in_order() {
		let dir = tempfile::tempdir().unwrap();
		let mut log = RunLog::create(dir.path(), "offboard", "jsmith")
			.await
			.unwrap();
		log.info("starting").await;
		log.warn("group removal failed").await;
		log.success("done").await;
		let path = log.close().await.unwrap().unwrap();

		let content = tokio::fs::read_to_string(&path).await.unwrap();
		let lines: Vec<&str> = content.lines().collect();
		assert_eq!(lines.len(), 3);
		assert!(lines[0].contains("[INFO] starting"));
		assert!(lines[1].contains("[WARN] group removal failed"));
		assert!(lines[2].contains("[SUCCESS] done"));
	}

	#[tokio::test]
	async fn test_dropped_log_keeps_written_entries() {
		let dir = tempfile::tempdir().unwrap();
		let path = {
			let mut log = RunLog::create(dir.path(), "onboard", "ajones")
				.await
				.unwrap();
			log.error("aborted").await;
			log.path().unwrap().to_path_buf()
		};
		let content = tokio::fs::read_to_string(&path).await.unwrap();
		assert!(content.contains("[ERROR] aborted"));
	}

	#[tokio::test]
	async fn test_same_second_collision_gets_suffix() {
		let dir = tempfile::tempdir().unwrap();
		let first = RunLog::create(dir.path(), "onboard", "jsmith").await.unwrap();
		let second = RunLog::create(dir.path(), "onboard", "jsmith").await.unwrap();
		assert_ne!(first.path(), second.path());
	}

	#[tokio::test]
	async fn test_creates_missing_directory() {
		let dir = tempfile::tempdir().unwrap();
		let nested = dir.path().join("a").join("b");
		let log = RunLog::create(&nested, "batch", "row-1").await.unwrap();
		assert!(log.path().unwrap().starts_with(&nested));
	}

	#[tokio::test]
	async fn test_in_memory_counts_levels() {
		let mut log = RunLog::in_memory("onboard", "jsmith");
		log.warn("a").await;
		log.warn("b").await;
		log.info("c").await;
		assert!(log.path().is_none());
		assert_eq!(log.count(LogLevel::Warn), 2);
		assert_eq!(log.count(LogLevel::Error), 0);
		assert_eq!(log.entries().len(), 3);
		assert!(log.close().await.unwrap().is_none());
	}

	#[test]
	fn test_sanitize_component() {
		assert_eq!(sanitize_component("jsmith"), "jsmith");
		assert_eq!(sanitize_component("../etc/passwd"), "_etc_passwd");
		assert_eq!(sanitize_component("row 3"), "row_3");
		assert_eq!(sanitize_component("   "), "unknown");
	}
}
