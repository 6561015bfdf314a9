// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod common;

use common::Harness;
use lifecycle_audit::RunLog;
use lifecycle_core::DirectoryClient;
use lifecycle_provisioning::{parse_batch_csv, read_batch_csv, BatchOutcome, BatchRunner};

const INPUT: &str = "\
FirstName,LastName,Department,Title,Manager,StartDate
John,Smith,Engineering,Engineer,Jane Doe,2026-02-01
Ann,Jones,Marketing,Analyst,,
Raj,Patel,Finance,Accountant,,2026-03-01
";

#[tokio::test]
async fn test_one_unknown_department_yields_one_failure() {
	let harness = Harness::new();
	let workflow = harness.onboarding();
	let runner = BatchRunner::new(&workflow, harness.log_dir());
	let mut log = RunLog::in_memory("batch", "input");

	let report = runner
		.run(parse_batch_csv(INPUT.as_bytes()).unwrap(), &mut log)
		.await;

	assert_eq!(report.total(), 3);
	assert_eq!(report.succeeded, 2);
	assert_eq!(report.failed, 1);
	assert!(!report.all_failed());

	let failed = &report.entries[1];
	assert_eq!(failed.row, 2);
	assert_eq!(failed.subject, "ajones");
	match &failed.outcome {
		BatchOutcome::Failed { error } => assert!(error.contains("Marketing")),
		other => panic!("expected failure, got {other:?}"),
	}

	assert!(harness.local.lookup("jsmith").await.unwrap().is_some());
	assert!(harness.local.lookup("ajones").await.unwrap().is_none());
	assert!(harness.local.lookup("rpatel").await.unwrap().is_some());
}

#[tokio::test]
async fn test_every_record_gets_its_own_log() {
	let harness = Harness::new();
	let workflow = harness.onboarding();
	let runner = BatchRunner::new(&workflow, harness.log_dir());
	let mut log = RunLog::in_memory("batch", "input");

	let report = runner
		.run(parse_batch_csv(INPUT.as_bytes()).unwrap(), &mut log)
		.await;

	let paths: Vec<_> = report
		.entries
		.iter()
		.map(|e| e.log_path.clone().unwrap())
		.collect();
	assert_eq!(paths.len(), 3);
	for (entry, path) in report.entries.iter().zip(&paths) {
		let name = path.file_name().unwrap().to_string_lossy().to_string();
		assert!(name.starts_with(&format!("onboard_{}_", entry.subject)));
	}

	let failed_log = std::fs::read_to_string(&paths[1]).unwrap();
	assert!(failed_log.contains("[ERROR]"));
	let ok_log = std::fs::read_to_string(&paths[0]).unwrap();
	assert!(!ok_log.contains("[ERROR]"));

	assert_eq!(log.entries().len(), 5);
}

#[tokio::test]
async fn test_malformed_rows_become_failure_entries() {
	let harness = Harness::new();
	let workflow = harness.onboarding();
	let runner = BatchRunner::new(&workflow, harness.log_dir());
	let mut log = RunLog::in_memory("batch", "input");

	let input = "\
FirstName,LastName,Department,Title,Manager,StartDate
John,Smith,Engineering,Engineer,,someday
Raj,Patel,Finance,Accountant,,
";
	let report = runner
		.run(parse_batch_csv(input.as_bytes()).unwrap(), &mut log)
		.await;

	assert_eq!(report.total(), 2);
	assert_eq!(report.failed, 1);
	assert_eq!(report.entries[0].subject, "row-1");
	assert!(report.entries[0].log_path.is_none());
	assert!(matches!(report.entries[1].outcome, BatchOutcome::Succeeded(_)));
}

#[tokio::test]
async fn test_batch_where_everything_fails() {
	let harness = Harness::new();
	let workflow = harness.onboarding();
	let runner = BatchRunner::new(&workflow, harness.log_dir());
	let mut log = RunLog::in_memory("batch", "input");

	let input = "\
FirstName,LastName,Department
John,Smith,Sales
Ann,Jones,Legal
";
	let report = runner
		.run(parse_batch_csv(input.as_bytes()).unwrap(), &mut log)
		.await;

	assert!(report.all_failed());
	assert_eq!(report.failed, 2);
	assert!(harness.local.state().await.identities.is_empty());
}

#[tokio::test]
async fn test_duplicate_names_in_one_batch_get_distinct_accounts() {
	let harness = Harness::new();
	let workflow = harness.onboarding();
	let runner = BatchRunner::new(&workflow, harness.log_dir());
	let mut log = RunLog::in_memory("batch", "input");

	let input = "\
FirstName,LastName,Department
John,Smith,Engineering
Jane,Smith,Finance
";
	let report = runner
		.run(parse_batch_csv(input.as_bytes()).unwrap(), &mut log)
		.await;

	let usernames: Vec<String> = report
		.entries
		.iter()
		.filter_map(|e| match &e.outcome {
			BatchOutcome::Succeeded(result) => Some(result.username.clone()),
			BatchOutcome::Failed { .. } => None,
		})
		.collect();
	assert_eq!(usernames, vec!["jsmith", "jsmith1"]);
}

#[tokio::test]
async fn test_reads_batch_from_file() {
	let harness = Harness::new();
	let path = harness.path().join("hires.csv");
	std::fs::write(&path, INPUT).unwrap();

	let rows = read_batch_csv(&path).unwrap();
	assert_eq!(rows.len(), 3);
	assert!(rows.iter().all(|r| r.record.is_ok()));
}
