//! One-shot registration signal.

use tokio::sync::watch;

/// Set once, awaited by any number of tasks.
///
/// Waiting after the signal was set resolves immediately.
#[derive(Debug)]
pub struct RegistrationSignal {
    tx: watch::Sender<bool>,
}

impl RegistrationSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Set the signal. Returns `true` only for the call that set it.
    pub fn set(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until the signal is set. No timeout.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for RegistrationSignal {
    fn default() -> Self {
        Self::new()
    }
}
