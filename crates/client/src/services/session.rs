//! Sign-in state: login, registration, profile and logout.

use std::sync::Arc;

use bazaryo_core::forms::{
    FormErrors, LoginForm, ProfileForm, RegistrationForm, registration_landing,
};
use bazaryo_core::{Route, User};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use super::ActionFailed;
use crate::api::{AuthApi, UserApi};

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
const UPDATE_PROFILE_FAILED: &str = "Failed to update profile.";
const LOAD_USER_FAILED: &str = "Could not load your account.";

#[derive(Debug, Error)]
pub enum SessionError {
    /// The form did not validate; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] FormErrors),

    #[error(transparent)]
    Failed(#[from] ActionFailed),
}

impl SessionError {
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Per-field messages, when the form was rejected locally.
    #[must_use]
    pub const fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            Self::Failed(_) => None,
        }
    }
}

/// A successful login or registration.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: User,
    /// Where to navigate next.
    pub route: Route,
}

/// The signed-in user. Clones share state.
pub struct Session<A> {
    api: A,
    user: Arc<watch::Sender<Option<User>>>,
}

impl<A: Clone> Clone for Session<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            user: Arc::clone(&self.user),
        }
    }
}

impl<A: AuthApi + UserApi> Session<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        let (user, _) = watch::channel(None);
        Self {
            api,
            user: Arc::new(user),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }

    /// Sign in. Lands on `from` when given, otherwise on the role's
    /// dashboard.
    ///
    /// # Errors
    ///
    /// [`SessionError::Invalid`] without a network call when the form is
    /// incomplete; otherwise the backend's message or
    /// "Login failed. Please check your credentials.".
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        form: &LoginForm,
        from: Option<Route>,
    ) -> Result<SignedIn, SessionError> {
        let request = form.validate()?;
        let user = self
            .api
            .login(&request)
            .await
            .map_err(|e| ActionFailed::new(e, LOGIN_FAILED))?;

        info!(user_id = %user.id, role = %user.role, "Signed in");
        let route = from.unwrap_or_else(|| user.role.landing_route());
        self.user.send_replace(Some(user.clone()));
        Ok(SignedIn { user, route })
    }

    /// Create an account and sign in. Customers land on their profile,
    /// everyone else on the home page.
    ///
    /// # Errors
    ///
    /// [`SessionError::Invalid`] with every failing field of the active
    /// variant; otherwise the backend's message or
    /// "Registration failed. Please try again.".
    #[instrument(skip_all, fields(role = %form.role()))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<SignedIn, SessionError> {
        let request = form.validate()?;
        let user = self
            .api
            .register(&request)
            .await
            .map_err(|e| ActionFailed::new(e, REGISTRATION_FAILED))?;

        info!(user_id = %user.id, "Registered");
        let route = registration_landing(user.role);
        self.user.send_replace(Some(user.clone()));
        Ok(SignedIn { user, route })
    }

    /// Reload the signed-in user. An auth failure signs the session out.
    ///
    /// # Errors
    ///
    /// The backend's message or a generic fallback.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<User, ActionFailed> {
        match self.api.current_user().await {
            Ok(user) => {
                self.user.send_replace(Some(user.clone()));
                Ok(user)
            }
            Err(e) => {
                if e.is_auth() {
                    warn!(error = %e, "Session is no longer valid");
                    self.user.send_replace(None);
                }
                Err(ActionFailed::new(e, LOAD_USER_FAILED))
            }
        }
    }

    /// Save the profile form, then reload the user. A failed reload falls
    /// back to the user the save returned.
    ///
    /// # Errors
    ///
    /// [`SessionError::Invalid`] when a required field is empty; otherwise
    /// the backend's message or "Failed to update profile.".
    #[instrument(skip_all)]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<User, SessionError> {
        let update = form.validate()?;
        let saved = self
            .api
            .update_profile(&update)
            .await
            .map_err(|e| ActionFailed::new(e, UPDATE_PROFILE_FAILED))?;
        info!("Updated profile");
        match self.refresh().await {
            Ok(user) => Ok(user),
            Err(e) => {
                warn!(error = %e, "User reload failed after profile update");
                self.user.send_if_modified(|current| match current {
                    Some(_) => {
                        *current = Some(saved.clone());
                        true
                    }
                    None => false,
                });
                Ok(saved)
            }
        }
    }

    /// Forget the token and the user.
    pub async fn logout(&self) {
        self.api.logout().await;
        self.user.send_replace(None);
        info!("Signed out");
    }
}
