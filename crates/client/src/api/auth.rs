use bazaryo_core::User;
use bazaryo_core::forms::{LoginRequest, RegistrationRequest};
use reqwest::Method;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, instrument};

use super::AuthApi;
use crate::client::{Auth, BazaryoClient};
use crate::error::ApiError;

/// Body of a successful login or registration.
#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

impl BazaryoClient {
    async fn authenticate(
        &self,
        segment: &str,
        body: &impl serde::Serialize,
    ) -> Result<User, ApiError> {
        let request = self
            .request(Method::POST, &["auth", segment], Auth::Optional)
            .await?
            .json(body);
        let response: AuthResponse = self.send(request).await?;

        self.set_token(SecretString::from(response.token)).await;
        info!(user_id = %response.user.id, role = %response.user.role, "Signed in");
        Ok(response.user)
    }
}

impl AuthApi for BazaryoClient {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        self.authenticate("login", request).await
    }

    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    async fn register(&self, request: &RegistrationRequest) -> Result<User, ApiError> {
        self.authenticate("register", request).await
    }

    #[instrument(skip(self))]
    async fn logout(&self) {
        self.clear_token().await;
    }
}
