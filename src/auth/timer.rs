use std::{sync::Weak, time::Duration};
use tokio::{task::JoinHandle, time::sleep};
use tracing::debug;

use super::Inner;

/// Countdown for one pending challenge. Sleeps for the window, then asks the
/// service to expire the challenge it was started for. Holds only a weak
/// reference so a dropped service also ends the countdown; resolution paths
/// abort the task before it fires.
pub(super) fn start(inner: Weak<Inner>, window: Duration, generation: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(window).await;

        match inner.upgrade() {
            Some(inner) => inner.expire_challenge(generation),
            None => debug!("auth service gone before challenge window elapsed"),
        }
    })
}
