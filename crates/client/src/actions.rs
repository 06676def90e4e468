//! Endpoints that are not plain CRUD on a collection.
use api_types::assistant::{AssistantStatistics, CreditsUpdate, ProductMetadataUpdate, TopEntry};
use api_types::broadcast::BroadcastSend;
use api_types::loan::LoanStatistics;
use api_types::trip::{DriverLocation, OptimizationLog, Trip};
use api_types::vfd::{VfdReceipt, VfdReceiptGenerate};
use api_types::wallet::WalletTopUp;
use api_types::{ActionAck, ItemId, ItemResponse, ListResponse};
use engine::{ListParams, LocationSource, ServiceError};

use crate::error::ApiError;
use crate::{Client, paths};

impl Client {
    /// Ask the backend to reorder the stops of a trip.
    pub async fn trips_optimize(&self, trip_id: ItemId) -> Result<ActionAck, ApiError> {
        self.post_empty(&format!("{}/{trip_id}/optimize", paths::TRIPS))
            .await
    }

    pub async fn trip_optimization_logs(
        &self,
        params: &ListParams,
    ) -> Result<ListResponse<OptimizationLog>, ApiError> {
        self.get(paths::TRIP_OPTIMIZATION_LOGS, &params.to_query())
            .await
    }

    /// Trips currently on the road.
    pub async fn tracking_active(&self) -> Result<Vec<Trip>, ApiError> {
        let trips: ItemResponse<Vec<Trip>> = self
            .get(&format!("{}/active", paths::TRIP_TRACKING), &[])
            .await?;
        Ok(trips.into_inner())
    }

    pub async fn tracking_location(&self, trip_id: ItemId) -> Result<DriverLocation, ApiError> {
        let location: ItemResponse<DriverLocation> = self
            .get(&format!("{}/{trip_id}/location", paths::TRIP_TRACKING), &[])
            .await?;
        Ok(location.into_inner())
    }

    pub async fn tracking_complete(&self, trip_id: ItemId) -> Result<ActionAck, ApiError> {
        self.post_empty(&format!("{}/{trip_id}/complete", paths::TRIP_TRACKING))
            .await
    }

    pub async fn vfd_generate(&self, receipt: &VfdReceiptGenerate) -> Result<VfdReceipt, ApiError> {
        let created: ItemResponse<VfdReceipt> = self.post(paths::VFD_GENERATE, receipt).await?;
        Ok(created.into_inner())
    }

    pub async fn wallet_top_up(
        &self,
        user_uuid: &str,
        top_up: &WalletTopUp,
    ) -> Result<ActionAck, ApiError> {
        self.post(&format!("{}/{user_uuid}/wallets", paths::USERS), top_up)
            .await
    }

    pub async fn broadcast_send(&self, broadcast: &BroadcastSend) -> Result<ActionAck, ApiError> {
        self.post(paths::BROADCAST_SEND, broadcast).await
    }

    pub async fn broadcast_resend(&self, broadcast_id: ItemId) -> Result<ActionAck, ApiError> {
        self.post_empty(&format!("{}/{broadcast_id}/resend", paths::BROADCASTS))
            .await
    }

    pub async fn ai_statistics(&self) -> Result<AssistantStatistics, ApiError> {
        let stats: ItemResponse<AssistantStatistics> = self
            .get(&format!("{}/statistics", paths::AI_ASSISTANT), &[])
            .await?;
        Ok(stats.into_inner())
    }

    pub async fn ai_top_filters(&self) -> Result<Vec<TopEntry>, ApiError> {
        let rows: ItemResponse<Vec<TopEntry>> = self
            .get(&format!("{}/top-filters", paths::AI_ASSISTANT), &[])
            .await?;
        Ok(rows.into_inner())
    }

    pub async fn ai_top_exclusions(&self) -> Result<Vec<TopEntry>, ApiError> {
        let rows: ItemResponse<Vec<TopEntry>> = self
            .get(&format!("{}/top-exclusions", paths::AI_ASSISTANT), &[])
            .await?;
        Ok(rows.into_inner())
    }

    pub async fn ai_update_credits(
        &self,
        user_id: ItemId,
        update: &CreditsUpdate,
    ) -> Result<ActionAck, ApiError> {
        self.put(&format!("{}/user-credits/{user_id}", paths::AI_ASSISTANT), update)
            .await
    }

    pub async fn ai_update_product_metadata(
        &self,
        product_id: ItemId,
        update: &ProductMetadataUpdate,
    ) -> Result<ActionAck, ApiError> {
        self.put(
            &format!("{}/product-metadata/{product_id}", paths::AI_ASSISTANT),
            update,
        )
        .await
    }

    /// Delete several orders in one request (`ids[0]=..&ids[1]=..`).
    pub async fn orders_delete(&self, ids: &[ItemId]) -> Result<(), ApiError> {
        let query: Vec<(String, String)> = ids
            .iter()
            .enumerate()
            .map(|(index, id)| (format!("ids[{index}]"), id.to_string()))
            .collect();
        self.delete_with_query(paths::ORDERS_DELETE, &query).await
    }

    pub async fn seller_loan_statistics(&self) -> Result<LoanStatistics, ApiError> {
        let stats: ItemResponse<LoanStatistics> =
            self.get(paths::SELLER_LOAN_STATISTICS, &[]).await?;
        Ok(stats.into_inner())
    }
}

impl LocationSource for Client {
    async fn location(&self, trip_id: ItemId) -> Result<DriverLocation, ServiceError> {
        Ok(self.tracking_location(trip_id).await?)
    }
}
