use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use adpulse_platforms::{AdPlatform, PlatformAppConfig};

use crate::errors::{Error, Result};

use super::credentials_model::{CompanyOAuthApp, NewCompanyOAuthApp};
use super::credentials_traits::{CompanyOAuthAppRepositoryTrait, CredentialsServiceTrait};

/// Resolves company OAuth app credentials for platform clients.
pub struct CredentialsService {
    repository: Arc<dyn CompanyOAuthAppRepositoryTrait>,
}

impl CredentialsService {
    pub fn new(repository: Arc<dyn CompanyOAuthAppRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CredentialsServiceTrait for CredentialsService {
    async fn resolve_app_config(
        &self,
        company_id: &str,
        platform: AdPlatform,
    ) -> Result<PlatformAppConfig> {
        debug!(
            "Resolving OAuth app config for company {} on {}",
            company_id, platform
        );
        let app = self.get_active_app(company_id, platform).await?;
        Ok(app.to_platform_config())
    }

    async fn get_active_app(
        &self,
        company_id: &str,
        platform: AdPlatform,
    ) -> Result<CompanyOAuthApp> {
        self.repository
            .get_for_platform(company_id, platform)
            .await?
            .ok_or_else(|| Error::CredentialsMissing {
                company_id: company_id.to_string(),
                platform,
            })
    }

    async fn register_app(&self, new_app: NewCompanyOAuthApp) -> Result<CompanyOAuthApp> {
        self.repository.upsert(new_app).await
    }

    async fn list_apps(&self, company_id: &str) -> Result<Vec<CompanyOAuthApp>> {
        self.repository.list_for_company(company_id).await
    }

    async fn remove_app(&self, company_id: &str, platform: AdPlatform) -> Result<()> {
        self.repository.delete(company_id, platform).await
    }
}
