//! Account endpoints: login, registration and password flows.

use super::{read_json, read_message, require_session, ApiClient, ApiError};
use crate::auth::{AuthContext, Session};
use crate::validation::{check_password_confirmation, validate, PasswordFlow, SchemaName};
use reqwest::Method;
use serde_json::json;
use tracing::info;

/// A self-service signup request.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Either `faculty` or `supporting_staff`
    pub role: String,
}

pub const REGISTERED_MESSAGE: &str =
    "Account set up successful! Please check your email to verify your account.";

impl ApiClient {
    /// Logs in and installs the issued session in `auth`.
    ///
    /// # Returns
    /// * `Ok(Session)` - The session now held by `auth`
    /// * `Err(ApiError)` - Validation failure, or the backend's reason
    ///   ("Invalid credentials" when it gives none)
    pub async fn login(
        &self,
        auth: &mut AuthContext,
        email: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        let body = json!({ "email": email, "password": password });
        if let Some(errors) = validate(&body, SchemaName::Login) {
            return Err(errors.into());
        }

        let response = self
            .send_json(
                &AuthContext::anonymous(),
                Method::POST,
                &["auth", "login"],
                &body,
                "Invalid credentials",
            )
            .await?;
        let session: Session = read_json(response).await?;
        auth.acquire(session.clone());
        Ok(session)
    }

    /// Creates an account; the user must verify their email before login.
    pub async fn register(&self, registration: &Registration) -> Result<String, ApiError> {
        let body = serde_json::to_value(registration).unwrap_or_default();
        if let Some(errors) = validate(&body, SchemaName::Signup) {
            return Err(errors.into());
        }
        self.send_json(
            &AuthContext::anonymous(),
            Method::POST,
            &["auth", "register"],
            &body,
            "Registration failed",
        )
        .await?;
        info!(role = %registration.role, "Account registered");
        Ok(REGISTERED_MESSAGE.to_string())
    }

    /// Completes an account from an invitation token.
    pub async fn join_invitation(
        &self,
        token: &str,
        username: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        let form = json!({ "username": username, "password": password });
        if let Some(errors) = validate(&form, SchemaName::JoinInvitation) {
            return Err(errors.into());
        }
        let body = json!({ "token": token, "username": username, "password": password });
        self.send_json(
            &AuthContext::anonymous(),
            Method::POST,
            &["auth", "join-invitation"],
            &body,
            "Registration failed",
        )
        .await?;
        Ok(REGISTERED_MESSAGE.to_string())
    }

    /// Requests a password reset email.
    ///
    /// The backend's own reason is not shown on failure, so unknown
    /// addresses and transport errors read the same.
    pub async fn forgot_password(&self, email: &str) -> Result<String, ApiError> {
        match self
            .send_json(
                &AuthContext::anonymous(),
                Method::POST,
                &["auth", "forgot-password"],
                &json!({ "email": email }),
                "",
            )
            .await
        {
            Ok(_) => Ok("Password reset link sent to your email.".to_string()),
            Err(ApiError::Backend { status, .. }) => Err(ApiError::Backend {
                status,
                message: "Failed to send reset link. User not found.".to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Sets a new password from an emailed reset token.
    pub async fn reset_password(
        &self,
        token: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<String, ApiError> {
        check_password_confirmation(password, confirmation, PasswordFlow::Reset)
            .map_err(|message| ApiError::PasswordMismatch { message })?;

        match self
            .send_json(
                &AuthContext::anonymous(),
                Method::POST,
                &["auth", "reset-password", token],
                &json!({ "password": password }),
                "",
            )
            .await
        {
            Ok(_) => Ok("Password reset successfully.".to_string()),
            Err(ApiError::Backend { status, .. }) => Err(ApiError::Backend {
                status,
                message: "Failed to reset password. Link may be expired.".to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Changes the logged-in user's password.
    pub async fn change_password(
        &self,
        auth: &AuthContext,
        current: &str,
        new: &str,
        confirmation: &str,
    ) -> Result<String, ApiError> {
        check_password_confirmation(new, confirmation, PasswordFlow::Change)
            .map_err(|message| ApiError::PasswordMismatch { message })?;

        let body = json!({ "currentPassword": current, "newPassword": new });
        if let Some(errors) = validate(&body, SchemaName::ChangePassword) {
            return Err(errors.into());
        }
        require_session(auth)?;

        self.send_json(
            auth,
            Method::POST,
            &["auth", "change-password"],
            &body,
            "Failed to change password",
        )
        .await?;
        Ok("Password changed successfully".to_string())
    }

    /// Confirms an email address from the emailed token.
    pub async fn verify_email(&self, token: &str) -> Result<String, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }
        let url = self.endpoint(&["auth", "verify-email", token])?;
        let builder = self.request(&AuthContext::anonymous(), Method::GET, url.clone());
        let response = self
            .dispatch(
                builder,
                &Method::GET,
                &url,
                "Verification failed. The link may be invalid or expired.",
            )
            .await?;
        Ok(read_message(response, "Email verified successfully!").await)
    }
}
