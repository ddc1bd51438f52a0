use bazaryo_core::forms::ProfileUpdate;
use bazaryo_core::{User, UserFilter, UserId};
use reqwest::Method;
use tracing::instrument;

use super::UserApi;
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

impl UserApi for BazaryoClient {
    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<User, ApiError> {
        let request = self
            .request(Method::GET, &["users", "me"], Auth::Required)
            .await?;
        self.send(request).await
    }

    #[instrument(skip(self, update))]
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let request = self
            .request(Method::PUT, &["users", "me"], Auth::Required)
            .await?
            .json(update);
        self.send(request).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, ApiError> {
        let request = self
            .request(Method::GET, &["users"], Auth::Required)
            .await?
            .query(filter);
        self.send(request).await
    }

    #[instrument(skip(self, id), fields(user_id = %id))]
    async fn delete_user(&self, id: &UserId) -> Result<(), ApiError> {
        let request = self
            .request(Method::DELETE, &["users", id.as_str()], Auth::Required)
            .await?;
        self.send_empty(request).await
    }
}
