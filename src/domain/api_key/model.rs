use chrono::{DateTime, Utc};

/// An issued API key.
///
/// Only the SHA-256 hash of the secret is kept; the plaintext exists
/// solely in the response to the create call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub secret_hash: String,
    pub last4: String,
    /// Owning user. Set at creation and never reassigned.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// A key loaded for deletion, together with the team of its owner so that
/// instance-level policy can be evaluated without another round-trip.
#[derive(Clone, Debug)]
pub struct LockedApiKey {
    pub key: ApiKey,
    pub owner_team_id: Option<String>,
}
