//! Single-use password-reset token.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Reset token issued when a password reset is requested. The `secret`
/// is what gets emailed; the row is deleted once the reset completes.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let token = ResetToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            secret: "s".to_string(),
            expires_at: now,
            created_at: now - Duration::hours(1),
        };
        assert!(token.is_expired(now));
        assert!(!token.is_expired(now - Duration::seconds(1)));
    }
}
