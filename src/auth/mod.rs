//! Client-side session and two-factor state. `AuthService` is the only
//! writer of the session cell and the credential store; every other component
//! reads. Transitions keep the in-memory state and the persisted records in
//! lockstep, and at most one of {session, pending challenge} exists at any
//! point.

pub mod error;
pub mod guards;
pub mod session;
pub mod state;
pub mod store;
mod timer;

pub use self::error::AuthError;
pub use self::session::{PendingChallenge, Session, UserSummary};

use self::{state::SessionCell, store::CredentialStore};
use crate::api::{
    types::{LoginRequest, LoginResponse, RegisterRequest, TwoFactorSetup},
    ApiClient,
};
use secrecy::SecretString;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, info, instrument, warn};

/// How long a pending challenge stays valid before the user is sent back to
/// the login entry point. Matches the five-minute lifetime of the temporary
/// token the backend issues.
pub const CHALLENGE_WINDOW: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_url: String,
    pub state_file: PathBuf,
    pub challenge_window: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(api_url: impl Into<String>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            api_url: api_url.into(),
            state_file: state_file.into(),
            challenge_window: CHALLENGE_WINDOW,
        }
    }
}

/// What a successful `login` call produced.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated(Session),
    /// Credentials accepted, second factor outstanding. A pending challenge
    /// is now active and counting down.
    TwoFactorRequired,
}

/// Out-of-band notifications the service raises on its own, not in response
/// to a caller's request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    ChallengeExpired,
}

/// Orchestrates login, registration and the two-factor flows. Cheap to
/// clone; all clones share state.
#[derive(Debug, Clone)]
pub struct AuthService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
pub(crate) struct Inner {
    api: ApiClient,
    store: CredentialStore,
    cell: SessionCell,
    phase: Mutex<Phase>,
    events: broadcast::Sender<AuthEvent>,
    challenge_window: Duration,
}

#[derive(Debug, Default)]
struct Phase {
    challenge: Option<PendingChallenge>,
    timer: Option<JoinHandle<()>>,
    /// Monotonic counter tying each timer to its challenge.
    generations: u64,
    /// Set when the last challenge ran out rather than being resolved or
    /// cancelled; cleared on the next phase transition.
    expired: bool,
}

impl AuthService {
    /// Open the credential store and rehydrate any persisted state before
    /// anything else can observe the cell, so a restart does not transiently
    /// appear unauthenticated. Must run inside a tokio runtime: rehydrating a
    /// pending challenge restarts its countdown task.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let store = CredentialStore::open(&config.state_file)?;
        let api = ApiClient::new(&config.api_url, store.clone())?;

        let (events, _) = broadcast::channel(16);

        let service = Self {
            inner: Arc::new(Inner {
                api,
                store,
                cell: SessionCell::new(None),
                phase: Mutex::new(Phase::default()),
                events,
                challenge_window: config.challenge_window,
            }),
        };

        service.rehydrate()?;

        Ok(service)
    }

    fn rehydrate(&self) -> Result<(), AuthError> {
        let store = &self.inner.store;

        if let Some(token) = store.session_token() {
            match store.user_summary()? {
                Some(user) => {
                    let session = Session::new(user, token);
                    if session.is_expired() {
                        info!("persisted session expired, clearing records");
                        store.clear()?;
                    } else {
                        debug!("rehydrated session for {}", session.user.name);
                        self.inner.cell.set(Some(session));
                    }
                }
                // Token without its summary is a torn record; drop it.
                None => store.clear()?,
            }
        } else if let Some(token) = store.challenge_token() {
            debug!("rehydrated pending two-factor challenge");
            self.install_challenge(token);
        }

        Ok(())
    }

    /// Log in with email and password. Three outcomes: a full session, a
    /// pending two-factor challenge, or `InvalidCredentials` with no state
    /// change.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.inner.api.login(&request).await?;

        if response.requires_two_factor() {
            let token = SecretString::from(response.token);
            self.inner.store.set_challenge(&token)?;
            // A challenge displaces any prior session.
            self.inner.cell.set(None);
            self.install_challenge(token);

            info!("two-factor verification required");
            Ok(LoginOutcome::TwoFactorRequired)
        } else {
            let session = session_from(response);
            self.install_session(session.clone())?;

            info!("logged in as {}", session.user.name);
            Ok(LoginOutcome::Authenticated(session))
        }
    }

    /// Stateless passthrough; no session side effects. Returns the backend's
    /// plain-text confirmation.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        self.inner.api.register(&request).await
    }

    /// Submit the six-digit code for the active challenge. On success the
    /// challenge is promoted into a session; on `InvalidCode` or
    /// `InvalidRequest` it survives untouched and the countdown continues,
    /// so the caller may retry until expiry.
    #[instrument(skip(self, code))]
    pub async fn verify_two_factor(&self, code: &str) -> Result<Session, AuthError> {
        {
            let phase = self.lock_phase();
            if phase.challenge.is_none() {
                // A countdown that ran out reads differently than a duplicate
                // or deep-linked verify with nothing to verify.
                return Err(if phase.expired {
                    AuthError::ChallengeExpired
                } else {
                    AuthError::Unauthenticated
                });
            }
        }

        let response = self.inner.api.verify_two_factor(code).await?;

        let session = session_from(response);
        self.install_session(session.clone())?;

        info!("two-factor verification complete for {}", session.user.name);
        Ok(session)
    }

    /// Produce enrollment material (otpauth URL plus manual secret). Requires
    /// a full session; stateless on the client.
    #[instrument(skip(self))]
    pub async fn setup_two_factor(&self) -> Result<TwoFactorSetup, AuthError> {
        self.require_session()?;
        self.forget_session_on_rejection(self.inner.api.setup_two_factor().await)
    }

    /// Turn the account-level 2FA flag on. The flag is server-owned; neither
    /// session nor challenge state changes here.
    #[instrument(skip(self, code))]
    pub async fn enable_two_factor(&self, code: &str) -> Result<String, AuthError> {
        self.require_session()?;
        let result = self.inner.api.enable_two_factor(code).await;
        self.forget_session_on_rejection(result)
            .map(|response| response.message)
    }

    /// Turn the account-level 2FA flag off.
    #[instrument(skip(self, code))]
    pub async fn disable_two_factor(&self, code: &str) -> Result<String, AuthError> {
        self.require_session()?;
        let result = self.inner.api.disable_two_factor(code).await;
        self.forget_session_on_rejection(result)
            .map(|response| response.message)
    }

    /// Abandon the active challenge (the "back to login" path). A no-op when
    /// none is active; the persisted record is cleared either way.
    #[instrument(skip(self))]
    pub fn cancel_challenge(&self) -> Result<(), AuthError> {
        {
            let mut phase = self.lock_phase();
            if let Some(handle) = phase.timer.take() {
                handle.abort();
            }
            phase.challenge = None;
            phase.expired = false;
        }

        self.inner.store.clear_challenge()
    }

    /// Destroy session, challenge and every persisted record, regardless of
    /// current phase. Idempotent. In-memory state is cleared before touching
    /// the store so a storage failure cannot leave the user logged in.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        {
            let mut phase = self.lock_phase();
            if let Some(handle) = phase.timer.take() {
                handle.abort();
            }
            phase.challenge = None;
            phase.expired = false;
        }

        self.inner.cell.set(None);
        self.inner.store.clear()?;

        info!("logged out");
        Ok(())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.cell.is_authenticated()
    }

    #[must_use]
    pub fn has_pending_challenge(&self) -> bool {
        self.lock_phase().challenge.is_some()
    }

    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.cell.current()
    }

    /// Watch receiver over the session cell; observes the current value
    /// immediately and every transition after.
    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<Option<Session>> {
        self.inner.cell.subscribe()
    }

    /// Receiver for proactive notifications such as `ChallengeExpired`.
    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    /// Persist and install a full session, displacing any pending challenge.
    /// The store is written first so a failure leaves prior state untouched.
    fn install_session(&self, session: Session) -> Result<(), AuthError> {
        self.inner.store.set_session(session.token(), &session.user)?;

        {
            let mut phase = self.lock_phase();
            if let Some(handle) = phase.timer.take() {
                handle.abort();
            }
            phase.challenge = None;
            phase.expired = false;
        }

        self.inner.cell.set(Some(session));
        Ok(())
    }

    /// Install a challenge and start its countdown, replacing any previous
    /// challenge and timer. The caller has already persisted the token.
    fn install_challenge(&self, token: SecretString) {
        let mut phase = self.lock_phase();

        if let Some(handle) = phase.timer.take() {
            handle.abort();
        }

        phase.generations += 1;
        phase.expired = false;
        let generation = phase.generations;
        phase.challenge = Some(PendingChallenge::new(token, generation));
        phase.timer = Some(timer::start(
            Arc::downgrade(&self.inner),
            self.inner.challenge_window,
            generation,
        ));
    }

    fn require_session(&self) -> Result<(), AuthError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    /// A 401 on a session-bearing endpoint means the backend no longer honors
    /// the token; drop the local session so the gates deny from now on.
    fn forget_session_on_rejection<T>(
        &self,
        result: Result<T, AuthError>,
    ) -> Result<T, AuthError> {
        if matches!(result, Err(AuthError::Unauthenticated)) {
            warn!("session rejected by backend, clearing local records");
            self.inner.cell.set(None);
            if let Err(e) = self.inner.store.clear() {
                warn!("failed to clear rejected session records: {}", e);
            }
        }

        result
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.inner.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    /// Expiry path, called from the countdown task. Idempotent: a fire racing
    /// a resolution that already replaced or removed the challenge is a no-op.
    fn expire_challenge(&self, generation: u64) {
        {
            let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);

            let is_current = phase
                .challenge
                .as_ref()
                .is_some_and(|challenge| challenge.generation == generation);

            if !is_current {
                debug!("stale challenge timer ignored");
                return;
            }

            phase.challenge = None;
            phase.timer = None;
            phase.expired = true;
        }

        if let Err(e) = self.store.clear_challenge() {
            warn!("failed to clear expired challenge record: {}", e);
        }

        info!("two-factor window elapsed, returning to login");
        let _ = self.events.send(AuthEvent::ChallengeExpired);
    }
}

fn session_from(response: LoginResponse) -> Session {
    let token = SecretString::from(response.token);

    Session::new(
        UserSummary {
            name: response.name,
            expires_at: response.expires_at,
            id: response.id,
        },
        token,
    )
}
