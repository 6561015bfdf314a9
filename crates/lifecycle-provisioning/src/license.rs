// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! License assignment for newly created identities.

use std::sync::Arc;
use std::time::Duration;

use lifecycle_config::TenantConfig;
use lifecycle_core::{CloudUser, Identity, LicenseClient};

use crate::error::ProvisioningError;

/// Assigns a license SKU once the new account has had time to synchronize to
/// the cloud directory.
///
/// The wait is a single fixed delay. There is no polling and no retry: an
/// account that has not arrived after the delay is reported as a failed step.
pub struct LicenseProvisioner {
	client: Arc<dyn LicenseClient>,
	propagation_delay: Duration,
	usage_location: String,
}

impl LicenseProvisioner {
	pub fn new(client: Arc<dyn LicenseClient>, tenant: &TenantConfig) -> Self {
		Self {
			client,
			propagation_delay: tenant.license_propagation_delay(),
			usage_location: tenant.usage_location.clone(),
		}
	}

	pub fn propagation_delay(&self) -> Duration {
		self.propagation_delay
	}

	#[tracing::instrument(skip(self, identity), fields(principal = %identity.principal_name))]
	pub async fn assign(&self, identity: &Identity, sku: &str) -> Result<CloudUser, ProvisioningError> {
		if !self.propagation_delay.is_zero() {
			tracing::debug!(delay_secs = self.propagation_delay.as_secs(), "waiting for directory sync");
			tokio::time::sleep(self.propagation_delay).await;
		}

		let license_error = |message: String| ProvisioningError::License {
			username: identity.username.clone(),
			message,
		};

		let user = self
			.client
			.find_user(&identity.principal_name)
			.await
			.map_err(|e| license_error(e.to_string()))?
			.ok_or_else(|| {
				license_error(format!(
					"{} has not synchronized to the cloud directory",
					identity.principal_name
				))
			})?;

		self.client
			.assign_license(&user, sku, &self.usage_location)
			.await
			.map_err(|e| license_error(e.to_string()))?;

		tracing::info!(user_id = %user.id, sku, "license assigned");
		Ok(user)
	}
}
