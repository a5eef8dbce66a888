use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use adpulse_platforms::AdPlatform;

use crate::errors::Result;

use super::connections_model::{AdConnection, NewAdConnection};
use super::connections_traits::{AdConnectionRepositoryTrait, ConnectionsServiceTrait};

/// Manages the lifecycle of ad-platform connections.
pub struct ConnectionsService {
    repository: Arc<dyn AdConnectionRepositoryTrait>,
}

impl ConnectionsService {
    pub fn new(repository: Arc<dyn AdConnectionRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ConnectionsServiceTrait for ConnectionsService {
    async fn establish(&self, new_connection: NewAdConnection) -> Result<AdConnection> {
        let connection = self.repository.create(new_connection).await?;
        info!(
            "Established {} connection {} for company {} (account {})",
            connection.platform,
            connection.id,
            connection.company_id,
            connection.external_account_id
        );
        Ok(connection)
    }

    async fn get_connection(&self, connection_id: &str) -> Result<AdConnection> {
        self.repository.get_by_id(connection_id).await
    }

    async fn list_connections(
        &self,
        company_id: &str,
        platform: Option<AdPlatform>,
    ) -> Result<Vec<AdConnection>> {
        self.repository.list_for_company(company_id, platform).await
    }

    async fn disconnect(&self, connection_id: &str) -> Result<()> {
        info!("Removing connection {}", connection_id);
        self.repository.delete(connection_id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;
    use uuid::Uuid;

    use super::super::connections_model::{SyncStatus, TokenUpdate};
    use super::*;
    use crate::errors::{DatabaseError, Error};

    #[derive(Default)]
    struct StubConnections {
        rows: Mutex<Vec<AdConnection>>,
    }

    #[async_trait]
    impl AdConnectionRepositoryTrait for StubConnections {
        async fn get_by_id(&self, connection_id: &str) -> Result<AdConnection> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == connection_id)
                .cloned()
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(connection_id.to_string()))
                })
        }

        async fn list_for_company(
            &self,
            company_id: &str,
            platform: Option<AdPlatform>,
        ) -> Result<Vec<AdConnection>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.company_id == company_id)
                .filter(|c| platform.map_or(true, |p| c.platform == p))
                .cloned()
                .collect())
        }

        async fn list_company_ids(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn create(&self, new_connection: NewAdConnection) -> Result<AdConnection> {
            let now = Utc::now();
            let connection = AdConnection {
                id: Uuid::new_v4().to_string(),
                company_id: new_connection.company_id,
                platform: new_connection.platform,
                external_account_id: new_connection.external_account_id,
                account_name: new_connection.account_name,
                access_token: new_connection.access_token,
                refresh_token: new_connection.refresh_token,
                token_expires_at: new_connection.token_expires_at,
                sync_status: SyncStatus::Idle,
                last_sync_at: None,
                sync_error: None,
                created_at: now,
                updated_at: now,
            };
            self.rows.lock().unwrap().push(connection.clone());
            Ok(connection)
        }

        async fn update_tokens(
            &self,
            connection_id: &str,
            _tokens: TokenUpdate,
        ) -> Result<AdConnection> {
            self.get_by_id(connection_id).await
        }

        async fn set_status(
            &self,
            connection_id: &str,
            _status: SyncStatus,
            _error: Option<String>,
        ) -> Result<AdConnection> {
            self.get_by_id(connection_id).await
        }

        async fn delete(&self, connection_id: &str) -> Result<()> {
            self.rows.lock().unwrap().retain(|c| c.id != connection_id);
            Ok(())
        }
    }

    fn new_connection(company_id: &str, platform: AdPlatform) -> NewAdConnection {
        NewAdConnection {
            company_id: company_id.to_string(),
            platform,
            external_account_id: format!("acct-{}", platform),
            account_name: "Main account".to_string(),
            access_token: "token".to_string(),
            refresh_token: None,
            token_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_connections_applies_platform_filter() {
        let svc = ConnectionsService::new(Arc::new(StubConnections::default()));
        svc.establish(new_connection("company-1", AdPlatform::Google))
            .await
            .unwrap();
        svc.establish(new_connection("company-1", AdPlatform::Meta))
            .await
            .unwrap();

        let all = svc.list_connections("company-1", None).await.unwrap();
        assert_eq!(all.len(), 2);

        let google = svc
            .list_connections("company-1", Some(AdPlatform::Google))
            .await
            .unwrap();
        assert_eq!(google.len(), 1);
        assert_eq!(google[0].platform, AdPlatform::Google);
    }

    #[tokio::test]
    async fn test_disconnect_removes_the_connection() {
        let svc = ConnectionsService::new(Arc::new(StubConnections::default()));
        let connection = svc
            .establish(new_connection("company-1", AdPlatform::TikTok))
            .await
            .unwrap();

        svc.disconnect(&connection.id).await.unwrap();

        let remaining = svc.list_connections("company-1", None).await.unwrap();
        assert!(remaining.is_empty());
    }
}
