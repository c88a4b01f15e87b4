use std::future::Future;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::error::{AuthError, FieldError};
use crate::mailer::Mailer;
use crate::storage::StorageBackend;

pub mod auth;
pub mod users;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageBackend>,
    pub mailer: Arc<dyn Mailer>,
}

/// Retry budget for conditional updates hitting storage contention.
const MAX_STORAGE_RETRIES: u32 = 3;

/// Retry an operation a bounded number of times when the storage layer
/// reports contention (SQLite busy, serialization failure). All other
/// error kinds are terminal for the request.
pub(crate) async fn with_retry<T, F, Fut>(op: F) -> Result<T, AuthError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, AuthError>>,
{
    let mut last: Option<sea_orm::DbErr> = None;
    for _ in 0..MAX_STORAGE_RETRIES {
        match op().await {
            Err(AuthError::Database(e)) if is_transient(&e) => {
                tracing::warn!(error = %e, "storage contention, retrying");
                last = Some(e);
            }
            other => return other,
        }
    }
    Err(AuthError::Internal(format!(
        "storage contention persisted after {} attempts: {}",
        MAX_STORAGE_RETRIES,
        last.map(|e| e.to_string()).unwrap_or_default()
    )))
}

fn is_transient(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked")
        || msg.contains("database table is locked")
        || msg.contains("could not serialize")
        || msg.contains("deadlock")
}

/// Lowercase + trim an email for case-insensitive storage and lookup.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal well-formedness check; full address validation is the mail
/// system's job.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Validate a new password + confirmation pair, pushing field errors.
pub(crate) fn check_password_pair(
    password: &str,
    confirmation: &str,
    min_length: usize,
    errors: &mut Vec<FieldError>,
) {
    if password.len() < min_length {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", min_length),
        ));
    }
    if password != confirmation {
        errors.push(FieldError::new(
            "password_confirmation",
            "Password confirmation does not match",
        ));
    }
}
