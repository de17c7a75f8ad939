//! Cart Facade
//!
//! The surface UI code talks to: reactive cart state, a loading flag and the
//! cart operations, each announced to the visitor through a [`Notifier`].

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use mockall::automock;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use grove::{
    cart::Cart,
    items::{ItemPatch, LineItem, LineItemId},
    requests::AddItemRequest,
    sources::ItemSources,
};

use crate::{
    auth::{AuthState, BearerToken, SessionListener},
    synchronizer::{CartError, CartSynchronizer},
};

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// The operation completed.
    Success,

    /// The operation failed; the message says why.
    Failure,
}

/// Transient message for the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Success or failure.
    pub level: NotificationLevel,
    /// Text shown to the visitor.
    pub message: String,
}

impl Notification {
    /// Success message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Failure message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Failure,
            message: message.into(),
        }
    }
}

/// Receives visitor-facing notifications.
#[automock]
pub trait Notifier: Send + Sync {
    /// Shows `notification`.
    fn notify(&self, notification: Notification);
}

/// Notifier that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!(text = %notification.message, "cart notification"),
            NotificationLevel::Failure => warn!(text = %notification.message, "cart notification"),
        }
    }
}

/// Counts one in-flight call for as long as it lives.
struct Loading<'a> {
    in_flight: &'a watch::Sender<usize>,
}

impl<'a> Loading<'a> {
    fn start(in_flight: &'a watch::Sender<usize>) -> Self {
        in_flight.send_modify(|count| *count = count.saturating_add(1));

        Self { in_flight }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.in_flight
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}

/// Reactive cart API.
pub struct CartFacade {
    synchronizer: Arc<CartSynchronizer>,
    notifier: Arc<dyn Notifier>,
    in_flight: watch::Sender<usize>,
}

impl Debug for CartFacade {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartFacade")
            .field("synchronizer", &self.synchronizer)
            .field("in_flight", &*self.in_flight.borrow())
            .finish_non_exhaustive()
    }
}

impl CartFacade {
    /// Creates a facade over `synchronizer`.
    pub fn new(synchronizer: Arc<CartSynchronizer>, notifier: Arc<dyn Notifier>) -> Self {
        let (in_flight, _receiver) = watch::channel(0);

        Self {
            synchronizer,
            notifier,
            in_flight,
        }
    }

    /// Items of the held cart.
    pub fn items(&self) -> Vec<LineItem> {
        self.synchronizer.cart().into_items()
    }

    /// The held cart.
    pub fn cart(&self) -> Cart {
        self.synchronizer.cart()
    }

    /// `true` while any cart call is running.
    pub fn loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    /// Receiver of in-flight call counts.
    pub fn watch_loading(&self) -> watch::Receiver<usize> {
        self.in_flight.subscribe()
    }

    /// Receiver notified whenever the held cart changes.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.synchronizer.subscribe()
    }

    /// Initial load. Authenticated sessions fetch (or drain into) the
    /// backend cart; guests already hold the local cart.
    ///
    /// # Errors
    ///
    /// Returns the refresh failure after notifying it.
    pub async fn mount(&self) -> Result<(), CartError> {
        if !self.synchronizer.auth_state().await.is_authenticated() {
            return Ok(());
        }

        let _loading = Loading::start(&self.in_flight);
        let result = self.synchronizer.refresh().await;

        if let Err(error) = &result {
            self.notify_failure(error);
        }

        result
    }

    /// Adds an item and announces the outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's error after notifying it; nothing is rolled
    /// back.
    pub async fn add(
        &self,
        request: &AddItemRequest,
        sources: &ItemSources,
    ) -> Result<(), CartError> {
        let _loading = Loading::start(&self.in_flight);
        let result = self.synchronizer.add(request, sources).await;

        self.announce(result, "Added to cart")
    }

    /// Patches an item and announces the outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's error after notifying it.
    pub async fn update(&self, id: &LineItemId, patch: &ItemPatch) -> Result<(), CartError> {
        let _loading = Loading::start(&self.in_flight);
        let result = self.synchronizer.update(id, patch).await;

        self.announce(result, "Cart updated")
    }

    /// Removes an item and announces the outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's error after notifying it.
    pub async fn remove(&self, id: &LineItemId) -> Result<(), CartError> {
        let _loading = Loading::start(&self.in_flight);
        let result = self.synchronizer.remove(id).await;

        self.announce(result, "Removed from cart")
    }

    /// Empties the cart and announces the outcome.
    ///
    /// # Errors
    ///
    /// Returns the operation's error after notifying it.
    pub async fn clear(&self) -> Result<(), CartError> {
        let _loading = Loading::start(&self.in_flight);
        let result = self.synchronizer.clear().await;

        self.announce(result, "Cart cleared")
    }

    /// Switches to the authenticated cart, draining the guest cart.
    ///
    /// # Errors
    ///
    /// Returns the drain failure after notifying it.
    pub async fn sign_in(&self, token: BearerToken) -> Result<(), CartError> {
        self.apply_session(AuthState::from_token(Some(token))).await
    }

    /// Switches back to the guest cart.
    ///
    /// # Errors
    ///
    /// Propagates synchronizer errors after notifying them.
    pub async fn sign_out(&self) -> Result<(), CartError> {
        self.apply_session(AuthState::Guest).await
    }

    /// Applies every session change published on `listener` until the
    /// signal is dropped.
    pub fn follow_session(self: Arc<Self>, mut listener: SessionListener) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = listener.current();

            if let Err(error) = self.apply_session(initial).await {
                warn!(%error, "failed to apply initial session");
            }

            while let Some(state) = listener.changed().await {
                if let Err(error) = self.apply_session(state).await {
                    warn!(%error, "failed to apply session change");
                }
            }
        })
    }

    async fn apply_session(&self, state: AuthState) -> Result<(), CartError> {
        let _loading = Loading::start(&self.in_flight);
        let result = self.synchronizer.set_auth(state).await;

        if let Err(error) = &result {
            self.notify_failure(error);
        }

        result
    }

    fn announce(&self, result: Result<(), CartError>, success: &str) -> Result<(), CartError> {
        match &result {
            Ok(()) => self.notifier.notify(Notification::success(success)),
            Err(error) => self.notify_failure(error),
        }

        result
    }

    fn notify_failure(&self, error: &CartError) {
        warn!(%error, "cart operation failed");

        self.notifier
            .notify(Notification::failure(error.user_message()));
    }
}
