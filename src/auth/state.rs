use crate::auth::session::Session;
use tokio::sync::watch;

/// Single holder of "who is logged in". Backed by a watch channel: every
/// write is multicast to all receivers, and a fresh subscriber observes the
/// latest value immediately rather than only future transitions. Write access
/// is crate-private; only the authentication service mutates the cell.
#[derive(Debug)]
pub struct SessionCell {
    tx: watch::Sender<Option<Session>>,
}

impl SessionCell {
    pub(crate) fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Snapshot of the current session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// New receiver; `borrow()` on it yields the current value right away.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub(crate) fn set(&self, session: Option<Session>) {
        // send_replace delivers even when no receiver is currently attached.
        self.tx.send_replace(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::UserSummary;
    use secrecy::SecretString;

    fn session(name: &str) -> Session {
        Session::new(
            UserSummary {
                name: name.to_string(),
                expires_at: u64::MAX,
                id: None,
            },
            SecretString::from("jwt"),
        )
    }

    #[test]
    fn test_subscriber_sees_latest_value_immediately() {
        let cell = SessionCell::new(None);
        cell.set(Some(session("Ada")));

        // Subscribed after the write, still observes it.
        let rx = cell.subscribe();
        assert_eq!(rx.borrow().as_ref().unwrap().user.name, "Ada");
    }

    #[tokio::test]
    async fn test_subscriber_notified_on_change() {
        let cell = SessionCell::new(None);
        let mut rx = cell.subscribe();

        cell.set(Some(session("Ada")));
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_some());

        cell.set(None);
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(!cell.is_authenticated());
    }

    #[test]
    fn test_set_without_subscribers_does_not_error() {
        let cell = SessionCell::new(None);
        cell.set(Some(session("Ada")));
        assert!(cell.is_authenticated());
    }
}
