// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Sequential batch onboarding from a CSV file.
//!
//! Each row runs in isolation with its own run log. A failing row becomes a
//! failure entry and the batch moves on to the next one.

use std::io::Read;
use std::path::{Path, PathBuf};

use lifecycle_audit::RunLog;
use lifecycle_core::{derive_username, EmployeeRecord};
use serde::Serialize;

use crate::error::ProvisioningError;
use crate::onboarding::{OnboardingResult, OnboardingWorkflow};

/// One data row of the batch input. Rows are numbered from 1, header
/// excluded.
#[derive(Debug, Clone)]
pub struct BatchRow {
	pub row: usize,
	pub record: Result<EmployeeRecord, String>,
}

/// Read `FirstName,LastName,Department,Title,Manager,StartDate` rows.
///
/// Failing to open the file or read its header is an error. A row that does
/// not deserialize is returned as a failed [`BatchRow`].
pub fn read_batch_csv(path: &Path) -> Result<Vec<BatchRow>, ProvisioningError> {
	let file = std::fs::File::open(path).map_err(|e| ProvisioningError::BatchInput {
		path: path.to_path_buf(),
		source: e.into(),
	})?;
	parse_batch_csv(file).map_err(|source| ProvisioningError::BatchInput {
		path: path.to_path_buf(),
		source,
	})
}

pub fn parse_batch_csv<R: Read>(reader: R) -> Result<Vec<BatchRow>, csv::Error> {
	let mut reader = csv::ReaderBuilder::new()
		.trim(csv::Trim::All)
		.flexible(true)
		.from_reader(reader);
	reader.headers()?;

	Ok(reader
		.deserialize::<EmployeeRecord>()
		.enumerate()
		.map(|(i, record)| BatchRow {
			row: i + 1,
			record: record.map_err(|e| e.to_string()),
		})
		.collect())
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BatchOutcome {
	Succeeded(Box<OnboardingResult>),
	Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
	pub row: usize,
	/// The derived username, or `row-N` when none could be derived.
	pub subject: String,
	pub log_path: Option<PathBuf>,
	pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
	pub entries: Vec<BatchEntry>,
	pub succeeded: usize,
	pub failed: usize,
}

impl BatchReport {
	fn push(&mut self, entry: BatchEntry) {
		match entry.outcome {
			BatchOutcome::Succeeded(_) => self.succeeded += 1,
			BatchOutcome::Failed { .. } => self.failed += 1,
		}
		self.entries.push(entry);
	}

	pub fn total(&self) -> usize {
		self.entries.len()
	}

	/// A non-empty batch where no row went through.
	pub fn all_failed(&self) -> bool {
		!self.entries.is_empty() && self.succeeded == 0
	}
}

pub struct BatchRunner<'a> {
	workflow: &'a OnboardingWorkflow,
	log_dir: PathBuf,
}

impl<'a> BatchRunner<'a> {
	pub fn new(workflow: &'a OnboardingWorkflow, log_dir: impl Into<PathBuf>) -> Self {
		Self {
			workflow,
			log_dir: log_dir.into(),
		}
	}

	/// Onboard every row in order. Per-row logs go to the runner's log
	/// directory; `log` receives one line per row and the totals.
	#[tracing::instrument(skip_all, fields(run_id = %log.run_id(), rows = rows.len()))]
	pub async fn run(&self, rows: Vec<BatchRow>, log: &mut RunLog) -> BatchReport {
		log.info(format!("Starting batch of {} records", rows.len()))
			.await;
		let mut report = BatchReport::default();

		for BatchRow { row, record } in rows {
			let entry = match record {
				Ok(record) => self.run_record(row, &record).await,
				Err(error) => BatchEntry {
					row,
					subject: format!("row-{row}"),
					log_path: None,
					outcome: BatchOutcome::Failed { error },
				},
			};

			match &entry.outcome {
				BatchOutcome::Succeeded(result) => {
					log.success(format!("Row {row}: onboarded {}", result.username))
						.await
				}
				BatchOutcome::Failed { error } => {
					log.error(format!("Row {row} ({}): {error}", entry.subject))
						.await
				}
			}
			report.push(entry);
		}

		log.info(format!(
			"Batch finished: {} succeeded, {} failed",
			report.succeeded, report.failed
		))
		.await;
		report
	}

	async fn run_record(&self, row: usize, record: &EmployeeRecord) -> BatchEntry {
		let subject = derive_username(&record.first_name, &record.last_name)
			.unwrap_or_else(|_| format!("row-{row}"));

		let mut log = match RunLog::create(&self.log_dir, "onboard", &subject).await {
			Ok(log) => log,
			Err(e) => {
				tracing::warn!(row, error = %e, "could not open run log; keeping entries in memory");
				RunLog::in_memory("onboard", &subject)
			}
		};

		let outcome = match self.workflow.run(record, &mut log).await {
			Ok(result) => BatchOutcome::Succeeded(Box::new(result)),
			Err(e) => BatchOutcome::Failed {
				error: e.to_string(),
			},
		};

		let log_path = match log.close().await {
			Ok(path) => path,
			Err(e) => {
				tracing::warn!(row, error = %e, "failed to sync run log");
				None
			}
		};

		BatchEntry {
			row,
			subject,
			log_path,
			outcome,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	const INPUT: &str = "\
FirstName,LastName,Department,Title,Manager,StartDate
John,Smith,Engineering,Engineer,Jane Doe,2026-02-01
 Ann , Lee ,Finance,,,
Bad,Row,Sales,Rep,,not-a-date
";

	#[test]
	fn test_parse_rows() {
		let rows = parse_batch_csv(INPUT.as_bytes()).unwrap();
		assert_eq!(rows.len(), 3);

		let first = rows[0].record.as_ref().unwrap();
		assert_eq!(rows[0].row, 1);
		assert_eq!(first.first_name, "John");
		assert_eq!(first.manager.as_deref(), Some("Jane Doe"));
		assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2026, 2, 1));

		let second = rows[1].record.as_ref().unwrap();
		assert_eq!(second.first_name, "Ann");
		assert_eq!(second.last_name, "Lee");
		assert!(second.manager.is_none());
		assert!(second.start_date.is_none());

		assert_eq!(rows[2].row, 3);
		assert!(rows[2].record.is_err());
	}

	#[test]
	fn test_missing_optional_columns() {
		let rows = parse_batch_csv("FirstName,LastName,Department\nJohn,Smith,Engineering\n".as_bytes())
			.unwrap();
		let record = rows[0].record.as_ref().unwrap();
		assert_eq!(record.title, "");
		assert!(record.manager.is_none());
	}

	#[test]
	fn test_read_missing_file() {
		let err = read_batch_csv(Path::new("/nonexistent/batch.csv")).unwrap_err();
		assert!(matches!(err, ProvisioningError::BatchInput { .. }));
	}

	#[test]
	fn test_report_all_failed() {
		let mut report = BatchReport::default();
		assert!(!report.all_failed());
		report.push(BatchEntry {
			row: 1,
			subject: "row-1".to_string(),
			log_path: None,
			outcome: BatchOutcome::Failed {
				error: "bad".to_string(),
			},
		});
		assert!(report.all_failed());
		assert_eq!(report.total(), 1);
		assert_eq!(report.failed, 1);
	}
}
