use serde::{Deserialize, Serialize};

/// Login response marker selecting the two-factor challenge path.
pub const STATUS_2FA_REQUIRED: &str = "2FA_REQUIRED";

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub name: String,
    pub token: String,
    /// Unix epoch milliseconds.
    pub expires_at: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl LoginResponse {
    /// Any status other than `2FA_REQUIRED` (or no status at all) is a full
    /// login success.
    #[must_use]
    pub fn requires_two_factor(&self) -> bool {
        self.status.as_deref() == Some(STATUS_2FA_REQUIRED)
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TwoFactorRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetup {
    /// otpauth:// enrollment URL, rendered as a QR code outside this crate.
    pub qr_code: String,
    /// Base32 secret for manual authenticator entry.
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Shape of 4xx bodies from the auth endpoints: `{"error": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
