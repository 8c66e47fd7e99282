//! Event dispatcher - turns user events into email jobs.
//!
//! Runs as a background task next to the HTTP server. For a reset
//! request it also issues the reset token, so the stored token and the
//! emailed link always agree.

use std::sync::Arc;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{UserEvent, UserEventKind};
use crate::config::Config;
use crate::domain::User;
use crate::jobs::EmailJob;
use crate::services::TokenService;

/// Spawn the dispatcher task. It runs until the sending side of the
/// channel is dropped.
pub fn spawn_dispatcher(
    mut receiver: mpsc::UnboundedReceiver<UserEvent>,
    tokens: Arc<dyn TokenService>,
    mut email_storage: PostgresStorage<EmailJob>,
    config: Config,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = receiver.recv().await {
            let job = match build_email(&event, tokens.as_ref(), &config).await {
                Ok(job) => job,
                Err(e) => {
                    tracing::error!(kind = ?event.kind, user = %event.user.id, "failed to prepare email: {}", e);
                    continue;
                }
            };

            if let Err(e) = email_storage.push(job).await {
                tracing::error!(kind = ?event.kind, user = %event.user.id, "failed to enqueue email: {}", e);
            }
        }
        tracing::debug!("event dispatcher stopped");
    })
}

async fn build_email(
    event: &UserEvent,
    tokens: &dyn TokenService,
    config: &Config,
) -> crate::errors::AppResult<EmailJob> {
    match event.kind {
        UserEventKind::AccountConfirmation => Ok(confirmation_email(&event.user)),
        UserEventKind::PasswordResetRequest => {
            let token = tokens.issue(event.user.id).await?;
            let link = format!(
                "{}/password/reset/{}",
                config.public_base_url.trim_end_matches('/'),
                token.secret
            );
            Ok(reset_request_email(&event.user, &link))
        }
        UserEventKind::PasswordResetComplete => Ok(reset_complete_email(&event.user)),
    }
}

fn confirmation_email(user: &User) -> EmailJob {
    EmailJob::new(
        user.email.clone(),
        "Welcome to Nestpoint - confirm your account",
        format!(
            "Hi {},\n\nYour Nestpoint account has been created.\n\
             If this wasn't you, please contact support.\n",
            user.name
        ),
    )
}

fn reset_request_email(user: &User, link: &str) -> EmailJob {
    EmailJob::new(
        user.email.clone(),
        "Reset your Nestpoint password",
        format!(
            "Hi {},\n\nA password reset was requested for your account.\n\
             Open the link below to choose a new password:\n\n{}\n\n\
             If you didn't request this, you can ignore this email.\n",
            user.name, link
        ),
    )
}

fn reset_complete_email(user: &User) -> EmailJob {
    EmailJob::new(
        user.email.clone(),
        "Your Nestpoint password was changed",
        format!(
            "Hi {},\n\nYour password was just changed.\n\
             If this wasn't you, reset it again immediately.\n",
            user.name
        ),
    )
}
