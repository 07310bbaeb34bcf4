use crate::auth::{error::AuthError, session::UserSummary};
use secrecy::{ExposeSecret, SecretString};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use tracing::debug;

const SESSION_TOKEN: &str = "session_token";
const SESSION_USER: &str = "session_user";
const CHALLENGE_TOKEN: &str = "challenge_token";

/// Durable key/value mirror of the in-memory authentication state. Every
/// mutation rewrites the backing file before returning, so memory and disk
/// never diverge after an operation completes.
///
/// Cheap to clone; all clones share the same map and file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl CredentialStore {
    /// Open the store at `path`, loading any persisted records. A missing
    /// file is an empty store; a corrupt one is an error rather than silent
    /// data loss.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            HashMap::new()
        };

        debug!("credential store at {}", path.display());

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                values: Mutex::new(values),
            }),
        })
    }

    /// Token to attach to an outbound request: the session token when fully
    /// authenticated, else the challenge token mid two-factor, else nothing.
    #[must_use]
    pub fn bearer_token(&self) -> Option<SecretString> {
        let values = self.lock();

        values
            .get(SESSION_TOKEN)
            .or_else(|| values.get(CHALLENGE_TOKEN))
            .map(|token| SecretString::from(token.as_str()))
    }

    #[must_use]
    pub fn session_token(&self) -> Option<SecretString> {
        self.lock()
            .get(SESSION_TOKEN)
            .map(|token| SecretString::from(token.as_str()))
    }

    #[must_use]
    pub fn challenge_token(&self) -> Option<SecretString> {
        self.lock()
            .get(CHALLENGE_TOKEN)
            .map(|token| SecretString::from(token.as_str()))
    }

    /// Persisted user summary, if a session record exists.
    pub fn user_summary(&self) -> Result<Option<UserSummary>, AuthError> {
        self.lock()
            .get(SESSION_USER)
            .map(|raw| serde_json::from_str(raw).map_err(AuthError::from))
            .transpose()
    }

    /// Install a full session, displacing any pending challenge record.
    pub fn set_session(
        &self,
        token: &SecretString,
        user: &UserSummary,
    ) -> Result<(), AuthError> {
        let mut values = self.lock();
        let mut staged = values.clone();
        staged.insert(SESSION_TOKEN.to_string(), token.expose_secret().to_string());
        staged.insert(SESSION_USER.to_string(), serde_json::to_string(user)?);
        staged.remove(CHALLENGE_TOKEN);
        self.persist(&staged)?;
        *values = staged;
        Ok(())
    }

    /// Install a pending-challenge token, displacing any session records.
    pub fn set_challenge(&self, token: &SecretString) -> Result<(), AuthError> {
        let mut values = self.lock();
        let mut staged = values.clone();
        staged.insert(
            CHALLENGE_TOKEN.to_string(),
            token.expose_secret().to_string(),
        );
        staged.remove(SESSION_TOKEN);
        staged.remove(SESSION_USER);
        self.persist(&staged)?;
        *values = staged;
        Ok(())
    }

    /// Remove the pending-challenge record only.
    pub fn clear_challenge(&self) -> Result<(), AuthError> {
        let mut values = self.lock();
        let mut staged = values.clone();
        staged.remove(CHALLENGE_TOKEN);
        self.persist(&staged)?;
        *values = staged;
        Ok(())
    }

    /// Remove every record. Used on logout regardless of current phase.
    pub fn clear(&self) -> Result<(), AuthError> {
        let mut values = self.lock();
        self.persist(&HashMap::new())?;
        values.clear();
        Ok(())
    }

    /// Write the staged map to disk. Callers only commit the staged values to
    /// the shared map once this returns Ok, so a failed write leaves the
    /// in-memory state on the prior records.
    fn persist(&self, values: &HashMap<String, String>) -> Result<(), AuthError> {
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(values)?;
        fs::write(&self.inner.path, contents)?;

        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
