//! Application state for the Admin API service.

use std::sync::Arc;

use encore_core::{
    AdminQueryService, NotificationIngestor, RevenueAggregator, SubscriptionMutationService,
    WebhookVerifier,
};
use encore_db::{
    MemoryNotificationStore, MemorySubscriptionStore, NotificationStore, Repositories,
    SubscriptionStore,
};

use crate::config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Subscription records and history
    pub subscriptions: Arc<dyn SubscriptionStore>,
    /// Ingested provider notifications
    pub notifications: Arc<dyn NotificationStore>,
    /// Admin lifecycle commands
    pub mutations: Arc<SubscriptionMutationService<dyn SubscriptionStore>>,
    /// Status filtering
    pub queries: AdminQueryService,
    /// Revenue reporting
    pub revenue: Arc<RevenueAggregator>,
    /// Webhook verification and storage
    pub ingestor: Arc<NotificationIngestor<dyn NotificationStore>>,
    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state over the given stores
    pub fn new(
        subscriptions: Arc<dyn SubscriptionStore>,
        notifications: Arc<dyn NotificationStore>,
        config: Config,
    ) -> Self {
        let mutations =
            SubscriptionMutationService::new(subscriptions.clone(), config.core.clone());
        let ingestor = NotificationIngestor::new(
            notifications.clone(),
            WebhookVerifier::new(config.webhook_secret.clone()),
        );
        Self {
            subscriptions,
            notifications,
            mutations: Arc::new(mutations),
            queries: AdminQueryService::new(config.core.expiring_soon_days),
            revenue: Arc::new(RevenueAggregator::new(config.core.revenue.clone())),
            ingestor: Arc::new(ingestor),
            config: Arc::new(config),
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(repos: Repositories, config: Config) -> Self {
        Self::new(
            Arc::new(repos.subscriptions),
            Arc::new(repos.notifications),
            config,
        )
    }

    /// State backed by process-local stores
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            Arc::new(MemorySubscriptionStore::new()),
            Arc::new(MemoryNotificationStore::new()),
            config,
        )
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
