use crate::error::AuthError;
use crate::models::user;

/// Notification collaborator for password-reset delivery.
///
/// Fire-and-forget from the core's perspective: a send failure is logged by
/// the caller and never rolls back token creation.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a password-reset token to the user's email address.
    async fn send_password_reset(&self, user: &user::Model, token: &str)
        -> Result<(), AuthError>;
}

/// Development mailer: records that a reset email would have been sent.
///
/// The token itself is never logged.
pub struct TracingMailer;

#[async_trait::async_trait]
impl Mailer for TracingMailer {
    async fn send_password_reset(
        &self,
        user: &user::Model,
        _token: &str,
    ) -> Result<(), AuthError> {
        tracing::info!(user_id = user.id, email = %user.email, "password reset email dispatched");
        Ok(())
    }
}
