//! Session signal shared between the auth collaborator and the cart.

use tokio::sync::watch;

use crate::auth::{AuthState, BearerToken};

/// Publishing side of the session signal, owned by the auth collaborator.
#[derive(Debug)]
pub struct SessionSignal {
    sender: watch::Sender<AuthState>,
}

impl SessionSignal {
    /// Creates a signal starting in `initial`.
    #[must_use]
    pub fn new(initial: AuthState) -> Self {
        let (sender, _receiver) = watch::channel(initial);

        Self { sender }
    }

    /// Publishes a new state. Listeners are only woken if it differs.
    pub fn publish(&self, state: AuthState) {
        self.sender.send_if_modified(|current| {
            if *current == state {
                return false;
            }

            *current = state;
            true
        });
    }

    /// Publishes an authenticated state.
    pub fn sign_in(&self, token: BearerToken) {
        self.publish(AuthState::from_token(Some(token)));
    }

    /// Publishes the guest state.
    pub fn sign_out(&self) {
        self.publish(AuthState::Guest);
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> AuthState {
        self.sender.borrow().clone()
    }

    /// Subscribes to future changes.
    #[must_use]
    pub fn listen(&self) -> SessionListener {
        SessionListener {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new(AuthState::Guest)
    }
}

/// Receiving side of the session signal.
#[derive(Debug, Clone)]
pub struct SessionListener {
    receiver: watch::Receiver<AuthState>,
}

impl SessionListener {
    /// Current state, marking it as seen.
    pub fn current(&mut self) -> AuthState {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next change. Returns `None` once the signal is dropped.
    pub async fn changed(&mut self) -> Option<AuthState> {
        self.receiver.changed().await.ok()?;

        Some(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listeners_see_changes_in_order() {
        let signal = SessionSignal::default();
        let mut listener = signal.listen();

        signal.sign_in(BearerToken::new("token"));

        assert_eq!(
            listener.changed().await,
            Some(AuthState::Authenticated(BearerToken::new("token")))
        );

        signal.sign_out();

        assert_eq!(listener.changed().await, Some(AuthState::Guest));
    }

    #[tokio::test]
    async fn republishing_the_same_state_does_not_wake_listeners() {
        let signal = SessionSignal::default();
        let mut listener = signal.listen();

        signal.sign_out();
        drop(signal);

        assert_eq!(listener.changed().await, None);
    }
}
