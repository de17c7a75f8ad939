//! Cart Synchronizer
//!
//! Decides per operation whether the cart lives on this device or on the
//! backend, routes the operation accordingly and publishes the resulting
//! cart. While authenticated the held cart is always the backend's latest
//! snapshot; while a guest it is the local table.
//!
//! Signing in drains the guest cart: every pending local item is replayed to
//! the backend as an add, in insertion order, and the final snapshot is
//! adopted.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use thiserror::Error;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, instrument, warn};

use grove::{
    LocalCartError, ValidationError,
    cart::Cart,
    ids::ServerItemId,
    items::{ItemPatch, LineItem, LineItemId},
    normalizer::normalize,
    requests::AddItemRequest,
    sources::ItemSources,
};

use crate::{
    auth::{AuthState, BearerToken, Transition},
    gateway::{CartGateway, GatewayError, RemoteCart},
    storage::LocalCartStore,
};

/// Message shown when the backend gives no usable reason for a failure.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The request or patch is malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The guest table rejected the operation.
    #[error(transparent)]
    Local(#[from] LocalCartError),

    /// The backend call failed; the held cart is unchanged.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A server-backed cart was addressed with a locally generated id.
    #[error("cart item {0} has not been saved to the server")]
    TemporaryId(LineItemId),

    /// The session changed while the request was in flight; its response was
    /// discarded.
    #[error("session changed before the cart response arrived")]
    SessionChanged,
}

impl CartError {
    /// Message suitable for showing to the visitor.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Gateway(error) => error.message().unwrap_or(GENERIC_FAILURE),
            _ => GENERIC_FAILURE,
        }
    }
}

/// How concurrently issued remote responses are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseOrdering {
    /// Every response replaces the held cart in arrival order.
    #[default]
    LastResponseWins,

    /// A response to an older request than the last applied one is dropped.
    DiscardStale,
}

/// Where an operation is routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartMode {
    /// Local table, no network.
    Guest,

    /// Backend cart, authenticated with the token.
    Server(BearerToken),
}

impl CartMode {
    /// Chooses the mode for the given authentication state.
    #[must_use]
    pub fn select(auth: &AuthState) -> Self {
        match auth.token() {
            Some(token) => Self::Server(token.clone()),
            None => Self::Guest,
        }
    }
}

/// Session epoch and request sequence captured when a remote call is issued.
#[derive(Debug, Clone, Copy)]
struct Ticket {
    epoch: u64,
    sequence: u64,
}

/// Single writer of the held cart and of the persisted guest cart.
pub struct CartSynchronizer {
    gateway: Arc<dyn CartGateway>,
    local: Mutex<LocalCartStore>,
    auth: RwLock<AuthState>,
    held: watch::Sender<Cart>,
    ordering: ResponseOrdering,
    epoch: AtomicU64,
    issued: AtomicU64,
    applied: AtomicU64,
}

impl Debug for CartSynchronizer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CartSynchronizer")
            .field("held", &*self.held.borrow())
            .field("ordering", &self.ordering)
            .finish_non_exhaustive()
    }
}

impl CartSynchronizer {
    /// Creates a guest-mode synchronizer holding the restored local cart.
    pub fn new(gateway: Arc<dyn CartGateway>, local: LocalCartStore) -> Self {
        let (held, _receiver) = watch::channel(Cart::local(local.items().to_vec()));

        Self {
            gateway,
            local: Mutex::new(local),
            auth: RwLock::new(AuthState::Guest),
            held,
            ordering: ResponseOrdering::default(),
            epoch: AtomicU64::new(0),
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Sets how concurrent remote responses are applied.
    #[must_use]
    pub fn with_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Current held cart.
    pub fn cart(&self) -> Cart {
        self.held.borrow().clone()
    }

    /// Receiver notified whenever the held cart is replaced.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.held.subscribe()
    }

    /// Current authentication state.
    pub async fn auth_state(&self) -> AuthState {
        self.auth.read().await.clone()
    }

    /// Adds an item.
    ///
    /// Guests get the item normalized from `sources` and merged into the
    /// local table. Authenticated visitors have the raw request sent to the
    /// backend; `sources` is not consulted.
    ///
    /// # Errors
    ///
    /// Validation errors are raised before any storage or network access.
    /// Backend errors leave the held cart untouched.
    #[instrument(skip_all, fields(kind = %request.kind))]
    pub async fn add(
        &self,
        request: &AddItemRequest,
        sources: &ItemSources,
    ) -> Result<(), CartError> {
        request.target()?;

        let auth = self.auth.read().await;

        match CartMode::select(&auth) {
            CartMode::Guest => {
                let item = normalize(request, sources)?;

                let mut local = self.local.lock().await;
                let id = local.upsert(item);

                debug!(%id, "added item to guest cart");
                self.publish_local(&local);

                Ok(())
            }
            CartMode::Server(token) => {
                let ticket = self.ticket();
                drop(auth);

                let request = AddItemRequest {
                    quantity: request.effective_quantity(),
                    ..request.clone()
                };

                let snapshot = self.gateway.add(&token, &request).await?;

                self.apply_remote(ticket, snapshot)
            }
        }
    }

    /// Patches an item.
    ///
    /// # Errors
    ///
    /// - [`CartError::Local`] for unknown or invalid guest updates.
    /// - [`CartError::TemporaryId`] when a server cart is addressed with a
    ///   local id.
    /// - [`CartError::Validation`] for patches that cannot apply.
    /// - [`CartError::Gateway`] when the backend rejects the update.
    #[instrument(skip_all, fields(%id))]
    pub async fn update(&self, id: &LineItemId, patch: &ItemPatch) -> Result<(), CartError> {
        let auth = self.auth.read().await;

        match CartMode::select(&auth) {
            CartMode::Guest => {
                let mut local = self.local.lock().await;
                local.update(id, patch)?;

                self.publish_local(&local);

                Ok(())
            }
            CartMode::Server(token) => {
                let item = Self::server_id(id)?;

                let kind = self.held.borrow().find(id).map(LineItem::kind);

                match kind {
                    Some(kind) => patch.validate_for(kind)?,
                    None if patch.is_empty() => return Err(ValidationError::EmptyPatch.into()),
                    None => {}
                }

                let ticket = self.ticket();
                drop(auth);

                let snapshot = self
                    .gateway
                    .update(&token, item, &patch.normalized())
                    .await?;

                self.apply_remote(ticket, snapshot)
            }
        }
    }

    /// Removes an item.
    ///
    /// # Errors
    ///
    /// - [`CartError::Local`] for unknown guest items.
    /// - [`CartError::TemporaryId`] when a server cart is addressed with a
    ///   local id.
    /// - [`CartError::Gateway`] when the backend rejects the removal.
    #[instrument(skip_all, fields(%id))]
    pub async fn remove(&self, id: &LineItemId) -> Result<(), CartError> {
        let auth = self.auth.read().await;

        match CartMode::select(&auth) {
            CartMode::Guest => {
                let mut local = self.local.lock().await;
                local.remove(id)?;

                self.publish_local(&local);

                Ok(())
            }
            CartMode::Server(token) => {
                let item = Self::server_id(id)?;
                let ticket = self.ticket();
                drop(auth);

                let snapshot = self.gateway.remove(&token, item).await?;

                self.apply_remote(ticket, snapshot)
            }
        }
    }

    /// Empties the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Gateway`] when the backend rejects the request.
    #[instrument(skip_all)]
    pub async fn clear(&self) -> Result<(), CartError> {
        let auth = self.auth.read().await;

        match CartMode::select(&auth) {
            CartMode::Guest => {
                let mut local = self.local.lock().await;
                local.clear();

                self.publish_local(&local);

                Ok(())
            }
            CartMode::Server(token) => {
                let ticket = self.ticket();
                drop(auth);

                let snapshot = self.gateway.clear(&token).await?;

                self.apply_remote(ticket, snapshot)
            }
        }
    }

    /// Brings the held cart up to date.
    ///
    /// Authenticated: drains pending local items if there are any, otherwise
    /// fetches the backend's cart. Guest: republishes the local table.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Gateway`] when the backend cannot be reached.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<(), CartError> {
        let auth = self.auth.read().await;

        match CartMode::select(&auth) {
            CartMode::Guest => {
                let local = self.local.lock().await;
                self.publish_local(&local);

                Ok(())
            }
            CartMode::Server(token) => {
                let mut local = self.local.lock().await;

                if !local.is_empty() {
                    return self.drain(&token, &mut local).await;
                }

                drop(local);

                let ticket = self.ticket();
                drop(auth);

                let snapshot = self.gateway.fetch(&token).await?;

                self.apply_remote(ticket, snapshot)
            }
        }
    }

    /// Applies a change of authentication state.
    ///
    /// Signing in drains the guest cart. Signing out resets the held cart to
    /// an empty local cart, discarding any items a drain left behind; nothing
    /// is pulled back from the backend. A refreshed token is swapped in place.
    ///
    /// # Errors
    ///
    /// Returns the first item the backend rejected during the drain. Accepted
    /// items are gone from the local table; rejected ones stay there for the
    /// next [`Self::refresh`].
    #[instrument(skip_all)]
    pub async fn set_auth(&self, next: AuthState) -> Result<(), CartError> {
        let mut auth = self.auth.write().await;
        let transition = Transition::between(&auth, &next);

        match transition {
            Transition::Unchanged => Ok(()),
            Transition::TokenRefreshed => {
                *auth = next;
                info!("session token refreshed");

                Ok(())
            }
            Transition::SignedOut => {
                *auth = next;
                self.epoch.fetch_add(1, Ordering::SeqCst);
                info!("signed out, cart is local");

                let mut local = self.local.lock().await;

                if !local.is_empty() {
                    warn!(items = local.items().len(), "discarding undrained guest items");
                    local.clear();
                }

                self.publish_local(&local);

                Ok(())
            }
            Transition::SignedIn => {
                let Some(token) = next.token().cloned() else {
                    return Ok(());
                };

                *auth = next;
                self.epoch.fetch_add(1, Ordering::SeqCst);
                info!("signed in, cart is server-backed");

                let mut local = self.local.lock().await;

                self.drain(&token, &mut local).await
            }
        }
    }

    /// Replays every pending local item to the backend, in order.
    ///
    /// An item the backend rejects stays in the local table and the replay
    /// moves on to the next one; the first rejection is returned once every
    /// item has been tried. If nothing was accepted the backend's cart is
    /// fetched instead, falling back to an empty server cart.
    ///
    /// Callers hold the auth lock, so the session cannot change mid-drain.
    async fn drain(&self, token: &BearerToken, local: &mut LocalCartStore) -> Result<(), CartError> {
        let pending: Vec<LineItem> = local.items().to_vec();

        if pending.is_empty() {
            let ticket = self.ticket();
            let snapshot = self.gateway.fetch(token).await?;

            return self.apply_remote(ticket, snapshot);
        }

        info!(items = pending.len(), "draining guest cart");

        let mut last = None;
        let mut rejected = None;

        for item in pending {
            let ticket = self.ticket();

            match self.gateway.add(token, &item.to_add_request()).await {
                Ok(snapshot) => {
                    if let Err(error) = local.remove(&item.id) {
                        warn!(%error, "replayed item vanished from guest cart");
                    }

                    last = Some((ticket, snapshot));
                }
                Err(error) => {
                    warn!(%error, id = %item.id, "backend rejected guest item, keeping it");
                    rejected.get_or_insert(error);
                }
            }
        }

        let Some(error) = rejected else {
            local.clear();

            return match last {
                Some((ticket, snapshot)) => self.apply_remote(ticket, snapshot),
                None => Ok(()),
            };
        };

        warn!(remaining = local.items().len(), "guest cart only partly drained");

        match last {
            Some((ticket, snapshot)) => self.apply_remote(ticket, snapshot)?,
            None => {
                let ticket = self.ticket();

                let snapshot = match self.gateway.fetch(token).await {
                    Ok(snapshot) => snapshot,
                    Err(fetch_error) => {
                        warn!(error = %fetch_error, "failed to fetch cart after drain");
                        RemoteCart::default()
                    }
                };

                self.apply_remote(ticket, snapshot)?;
            }
        }

        Err(error.into())
    }

    fn server_id(id: &LineItemId) -> Result<ServerItemId, CartError> {
        id.server().ok_or(CartError::TemporaryId(*id))
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch.load(Ordering::SeqCst),
            sequence: self.issued.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    fn publish_local(&self, local: &LocalCartStore) {
        self.held.send_replace(Cart::local(local.items().to_vec()));
    }

    /// Replaces the held cart with a backend snapshot, unless the session has
    /// moved on or, under [`ResponseOrdering::DiscardStale`], a newer response
    /// was already applied.
    fn apply_remote(&self, ticket: Ticket, snapshot: RemoteCart) -> Result<(), CartError> {
        let mut outcome = Ok(());

        // The checks run under the watch lock so a concurrent sign-out cannot
        // slip its publish between them and ours.
        self.held.send_if_modified(|held| {
            if ticket.epoch != self.epoch.load(Ordering::SeqCst) {
                debug!(sequence = ticket.sequence, "discarding response from previous session");
                outcome = Err(CartError::SessionChanged);

                return false;
            }

            if self.ordering == ResponseOrdering::DiscardStale {
                let newest = self.applied.fetch_max(ticket.sequence, Ordering::SeqCst);

                if newest > ticket.sequence {
                    debug!(
                        sequence = ticket.sequence,
                        newest, "discarding stale cart response"
                    );

                    return false;
                }
            }

            *held = snapshot.into_cart();

            true
        });

        outcome
    }
}
