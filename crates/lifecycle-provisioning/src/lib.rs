// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle workflows for employee identities.
//!
//! Provides a single code path for each lifecycle event:
//! - [`OnboardingWorkflow`]: create an identity and its resources from a role
//!   template
//! - [`OffboardingWorkflow`]: disable an identity, strip its access and
//!   archive its home folder
//! - [`BatchRunner`]: onboard many records from a CSV file, each in isolation
//!
//! Workflows talk to the outside world only through [`ProvisioningClients`]
//! and write every step to the [`lifecycle_audit::RunLog`] they are given.

pub mod batch;
pub mod clients;
pub mod error;
pub mod license;
pub mod offboarding;
pub mod onboarding;
pub mod outcome;

pub use batch::{
	parse_batch_csv, read_batch_csv, BatchEntry, BatchOutcome, BatchReport, BatchRow, BatchRunner,
};
pub use clients::ProvisioningClients;
pub use error::ProvisioningError;
pub use license::LicenseProvisioner;
pub use offboarding::{expiration_date, OffboardingRequest, OffboardingResult, OffboardingWorkflow};
pub use onboarding::{OnboardingResult, OnboardingState, OnboardingWorkflow};
pub use outcome::{StepOutcome, StepStatus, WorkflowStatus};
