//! Login, signup, logout and profile updates.
//!
//! Successful login or signup stores the token and user in the
//! [`SessionHandle`](crate::SessionHandle) and sends the user home. Server
//! error messages are returned as-is; there is no refresh or remember-me.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;
use tryla_core::Email;

use crate::client::{ApiClient, Auth};
use crate::error::{ApiError, ValidationError};
use crate::notify::Route;
use crate::session::Session;
use crate::types::{AuthResponse, LoginRequest, ProfileUpdate, SignupRequest, User, UserPayload};

impl ApiClient {
    /// Log in with email and password (`POST /auth/login`).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email (nothing is sent),
    /// the backend's error for rejected credentials, or a session error if
    /// the session cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: SecretString) -> Result<User, ApiError> {
        let request = LoginRequest {
            email: parse_email(email)?,
            password,
        };
        let response: AuthResponse = self
            .send_json(Method::POST, &["auth", "login"], Auth::Public, Some(&request))
            .await?;
        self.start_session(response).await
    }

    /// Create an account and log in (`POST /auth/signup`).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name or malformed email
    /// (nothing is sent), the backend's error if signup is refused, or a
    /// session error if the session cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: SecretString,
    ) -> Result<User, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Name").into());
        }
        let request = SignupRequest {
            name: name.to_string(),
            email: parse_email(email)?,
            password,
        };
        let response: AuthResponse = self
            .send_json(Method::POST, &["auth", "signup"], Auth::Public, Some(&request))
            .await?;
        self.start_session(response).await
    }

    /// Forget the session, in memory and on disk, and go home.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed; the
    /// in-memory session is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let cleared = self.session().end().await;
        tracing::info!("logged out");
        self.sink().navigate(Route::Home);
        cleared.map_err(ApiError::from)
    }

    /// Update the logged-in user's profile (`PUT /users/update-profile`).
    ///
    /// The returned user replaces the one held by the session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotAuthenticated` without a session, or the
    /// backend's error if the update is rejected.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let payload: UserPayload = self
            .send_json(
                Method::PUT,
                &["users", "update-profile"],
                Auth::Bearer,
                Some(update),
            )
            .await?;
        let user = User::from(payload);
        self.session().replace_user(user.clone()).await?;
        Ok(user)
    }

    /// The logged-in user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.session().user().await
    }

    async fn start_session(&self, response: AuthResponse) -> Result<User, ApiError> {
        let user = response.user.clone();
        tracing::info!(user_id = %user.id, admin = user.is_admin(), "logged in");
        self.session()
            .begin(Session::new(response.token, response.user))
            .await?;
        self.sink().navigate(Route::Home);
        Ok(user)
    }
}

fn parse_email(input: &str) -> Result<Email, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::MissingField("Email"));
    }
    Ok(Email::parse(input)?)
}
