// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use lifecycle_core::{DirectoryClient, HomeProvisioner, LicenseClient, MailClient};

/// The external systems a workflow drives.
#[derive(Clone)]
pub struct ProvisioningClients {
	pub directory: Arc<dyn DirectoryClient>,
	pub homes: Arc<dyn HomeProvisioner>,
	pub mail: Arc<dyn MailClient>,
	pub licenses: Arc<dyn LicenseClient>,
}
