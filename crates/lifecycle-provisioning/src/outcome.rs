// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-step outcomes reported by the workflows.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
	Succeeded,
	/// Some of the step's work failed and the rest went through.
	Partial,
	Failed,
	Skipped,
}

impl fmt::Display for StepStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StepStatus::Succeeded => write!(f, "succeeded"),
			StepStatus::Partial => write!(f, "partial"),
			StepStatus::Failed => write!(f, "failed"),
			StepStatus::Skipped => write!(f, "skipped"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
	pub step: String,
	pub status: StepStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub detail: Option<String>,
}

impl StepOutcome {
	pub fn new(step: &str, status: StepStatus, detail: Option<String>) -> Self {
		Self {
			step: step.to_string(),
			status,
			detail,
		}
	}

	pub fn succeeded(step: &str, detail: Option<String>) -> Self {
		Self::new(step, StepStatus::Succeeded, detail)
	}

	pub fn failed(step: &str, detail: Option<String>) -> Self {
		Self::new(step, StepStatus::Failed, detail)
	}

	pub fn skipped(step: &str, detail: Option<String>) -> Self {
		Self::new(step, StepStatus::Skipped, detail)
	}

	/// Status for a step made of independent items: all, some or none of
	/// which went through.
	pub fn from_counts(step: &str, succeeded: usize, failed: usize) -> Self {
		let status = match (succeeded, failed) {
			(0, 0) => StepStatus::Skipped,
			(_, 0) => StepStatus::Succeeded,
			(0, _) => StepStatus::Failed,
			_ => StepStatus::Partial,
		};
		Self::new(
			step,
			status,
			Some(format!("{succeeded} succeeded, {failed} failed")),
		)
	}
}

/// How a run that was not aborted ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
	Completed,
	CompletedWithWarnings,
}

impl WorkflowStatus {
	pub fn from_steps(steps: &[StepOutcome]) -> Self {
		let clean = steps
			.iter()
			.all(|s| matches!(s.status, StepStatus::Succeeded | StepStatus::Skipped));
		if clean {
			WorkflowStatus::Completed
		} else {
			WorkflowStatus::CompletedWithWarnings
		}
	}
}

impl fmt::Display for WorkflowStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			WorkflowStatus::Completed => write!(f, "completed"),
			WorkflowStatus::CompletedWithWarnings => write!(f, "completed with warnings"),
		}
	}
}
