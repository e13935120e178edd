use std::sync::Arc;

use chrono::Utc;

use crate::models::InteractionRequest;
use crate::stores::{CatalogStore, InteractionStore};

/// Records watch events feeding future personalization
///
/// Recording must never fail the caller: persistence failures are logged
/// and swallowed, never retried synchronously.
pub struct InteractionRecorder {
    catalog: Arc<dyn CatalogStore>,
    interactions: Arc<dyn InteractionStore>,
}

impl InteractionRecorder {
    pub fn new(catalog: Arc<dyn CatalogStore>, interactions: Arc<dyn InteractionStore>) -> Self {
        Self {
            catalog,
            interactions,
        }
    }

    /// Appends the interaction and bumps the item's view counter
    pub async fn record(&self, request: InteractionRequest) {
        let record = request.into_record(Utc::now());
        let user_id = record.user_id;
        let item_id = record.item_id;
        let recorded_at = record.recorded_at;

        if let Err(e) = self.interactions.append(record).await {
            tracing::warn!(
                user_id = %user_id,
                item_id = %item_id,
                error = %e,
                "Failed to append interaction record"
            );
        }

        if let Err(e) = self.catalog.record_view(item_id, recorded_at).await {
            tracing::warn!(
                item_id = %item_id,
                error = %e,
                "Failed to bump view counter"
            );
        }

        tracing::debug!(user_id = %user_id, item_id = %item_id, "Interaction recorded");
    }
}
