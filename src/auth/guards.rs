use crate::auth::AuthService;

/// Login entry point; denials redirect here.
pub const LOGIN_ROUTE: &str = "/auth";

/// Verdict of an admission gate. Pure data; the routing layer performs the
/// redirect itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(&'static str),
}

impl GateDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Admits only fully authenticated sessions (settings, watchlist and the
/// like).
#[must_use]
pub fn require_authenticated(service: &AuthService) -> GateDecision {
    if service.is_authenticated() {
        GateDecision::Allow
    } else {
        GateDecision::Redirect(LOGIN_ROUTE)
    }
}

/// Admits only an in-flight two-factor challenge, keeping the verification
/// screen out of reach of deep links.
#[must_use]
pub fn require_two_factor(service: &AuthService) -> GateDecision {
    if service.has_pending_challenge() {
        GateDecision::Allow
    } else {
        GateDecision::Redirect(LOGIN_ROUTE)
    }
}
