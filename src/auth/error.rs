use thiserror::Error;

/// Typed outcomes for every state-changing authentication operation. A failed
/// mutation leaves prior state untouched; the variant tells the presentation
/// layer which message to show.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid verification code")]
    InvalidCode,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("verification code expired, log in again")]
    ChallengeExpired,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("credential store error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("credential store record error: {0}")]
    Persist(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid email or password"
        );
        assert_eq!(
            AuthError::InvalidRequest("code is required".to_string()).to_string(),
            "invalid request: code is required"
        );
        assert_eq!(
            AuthError::Api {
                status: 503,
                message: "maintenance".to_string()
            }
            .to_string(),
            "unexpected response (503): maintenance"
        );
    }
}
