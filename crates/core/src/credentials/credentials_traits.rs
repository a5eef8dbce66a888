use async_trait::async_trait;

use adpulse_platforms::{AdPlatform, PlatformAppConfig};

use crate::errors::Result;

use super::credentials_model::{CompanyOAuthApp, NewCompanyOAuthApp};

/// Trait for OAuth app credential persistence.
#[async_trait]
pub trait CompanyOAuthAppRepositoryTrait: Send + Sync {
    /// Fetch the active OAuth app for a company/platform pair, if any.
    async fn get_for_platform(
        &self,
        company_id: &str,
        platform: AdPlatform,
    ) -> Result<Option<CompanyOAuthApp>>;

    /// Register or replace a company's OAuth app for a platform.
    async fn upsert(&self, new_app: NewCompanyOAuthApp) -> Result<CompanyOAuthApp>;

    /// List all OAuth apps registered for a company.
    async fn list_for_company(&self, company_id: &str) -> Result<Vec<CompanyOAuthApp>>;

    async fn delete(&self, company_id: &str, platform: AdPlatform) -> Result<()>;
}

/// Trait for resolving credentials into client configuration.
#[async_trait]
pub trait CredentialsServiceTrait: Send + Sync {
    /// Resolve the platform client config for a company.
    ///
    /// Errors with `CredentialsMissing` when the company has no active
    /// OAuth app for the platform.
    async fn resolve_app_config(
        &self,
        company_id: &str,
        platform: AdPlatform,
    ) -> Result<PlatformAppConfig>;

    /// Fetch the active OAuth app, erroring when none is registered.
    async fn get_active_app(
        &self,
        company_id: &str,
        platform: AdPlatform,
    ) -> Result<CompanyOAuthApp>;

    async fn register_app(&self, new_app: NewCompanyOAuthApp) -> Result<CompanyOAuthApp>;

    async fn list_apps(&self, company_id: &str) -> Result<Vec<CompanyOAuthApp>>;

    async fn remove_app(&self, company_id: &str, platform: AdPlatform) -> Result<()>;
}
