use bazaryo_core::DashboardStats;
use reqwest::Method;
use tracing::instrument;

use super::AdminApi;
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

impl AdminApi for BazaryoClient {
    #[instrument(skip(self))]
    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let request = self
            .request(Method::GET, &["admin", "stats"], Auth::Required)
            .await?;
        self.send(request).await
    }
}
