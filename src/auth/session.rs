use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Non-sensitive identity data, persisted alongside the session token so a
/// returning user is recognized without another login round trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub name: String,
    /// Unix epoch milliseconds, as issued by the backend.
    pub expires_at: u64,
    /// Canonical backend identifier. Optional because older accounts predate it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A fully authenticated identity. Exists only once authentication is
/// complete; replaced on every transition, never patched.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserSummary,
    token: SecretString,
}

impl Session {
    #[must_use]
    pub fn new(user: UserSummary, token: SecretString) -> Self {
        Self { user, token }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// Whether the backend-issued expiry is already in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64);

        self.user.expires_at <= now_millis
    }
}

/// Partial authentication: credentials were accepted but a second factor is
/// still outstanding. Carries its own short-lived token, distinct from a
/// session token. At most one of {`Session`, `PendingChallenge`} exists.
#[derive(Debug, Clone)]
pub struct PendingChallenge {
    token: SecretString,
    /// Ties the challenge to the timer started for it; a timer firing against
    /// a different generation is stale and must be ignored.
    pub(crate) generation: u64,
}

impl PendingChallenge {
    pub(crate) fn new(token: SecretString, generation: u64) -> Self {
        Self { token, generation }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_session_expiry() {
        let user = UserSummary {
            name: "Ada".to_string(),
            expires_at: 1,
            id: Some("u-1".to_string()),
        };
        let session = Session::new(user.clone(), SecretString::from("jwt"));
        assert!(session.is_expired());

        let fresh = Session::new(
            UserSummary {
                expires_at: u64::MAX,
                ..user
            },
            SecretString::from("jwt"),
        );
        assert!(!fresh.is_expired());
        assert_eq!(fresh.token().expose_secret(), "jwt");
    }

    #[test]
    fn test_user_summary_roundtrip() {
        let user = UserSummary {
            name: "Ada".to_string(),
            expires_at: 42,
            id: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        // No id field when absent, matching what the backend omits.
        assert!(!json.contains("id"));
        let back: UserSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, user);
    }
}
