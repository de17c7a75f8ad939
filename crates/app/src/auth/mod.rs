//! Authentication state
//!
//! Authentication itself happens elsewhere; the cart only needs to know
//! whether a bearer token is present and when that changes.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use zeroize::Zeroize;

mod session;

pub use session::{SessionListener, SessionSignal};

/// Opaque bearer credential issued by the auth collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token. Surrounding whitespace is dropped.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let mut token = token.into();
        let trimmed = token.trim().to_string();

        token.zeroize();

        Self(trimmed)
    }

    /// Returns the raw token for use in an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token carries no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Drop for BearerToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Debug for BearerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Whether the visitor currently holds a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    /// No session; the cart is local.
    #[default]
    Guest,
    /// Signed in with the given token.
    Authenticated(BearerToken),
}

impl AuthState {
    /// Builds the state from an optional token; empty tokens count as absent.
    #[must_use]
    pub fn from_token(token: Option<BearerToken>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Self::Authenticated(token),
            _ => Self::Guest,
        }
    }

    /// Returns the bearer token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&BearerToken> {
        match self {
            Self::Guest => None,
            Self::Authenticated(token) => Some(token),
        }
    }

    /// Returns `true` if a token is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Change between two authentication states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Guest to authenticated: the guest cart must be drained.
    SignedIn,

    /// Authenticated to guest: the held cart resets to an empty guest cart.
    SignedOut,

    /// Still authenticated, with a different token.
    TokenRefreshed,

    /// Nothing changed.
    Unchanged,
}

impl Transition {
    /// Classifies the move from `previous` to `next`.
    #[must_use]
    pub fn between(previous: &AuthState, next: &AuthState) -> Self {
        match (previous, next) {
            (AuthState::Guest, AuthState::Guest) => Self::Unchanged,
            (AuthState::Guest, AuthState::Authenticated(_)) => Self::SignedIn,
            (AuthState::Authenticated(_), AuthState::Guest) => Self::SignedOut,
            (AuthState::Authenticated(old), AuthState::Authenticated(new)) if old == new => {
                Self::Unchanged
            }
            (AuthState::Authenticated(_), AuthState::Authenticated(_)) => Self::TokenRefreshed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(token: &str) -> AuthState {
        AuthState::Authenticated(BearerToken::new(token))
    }

    #[test]
    fn transitions() {
        let guest = AuthState::Guest;

        assert_eq!(Transition::between(&guest, &guest), Transition::Unchanged);
        assert_eq!(
            Transition::between(&guest, &signed_in("a")),
            Transition::SignedIn
        );
        assert_eq!(
            Transition::between(&signed_in("a"), &guest),
            Transition::SignedOut
        );
        assert_eq!(
            Transition::between(&signed_in("a"), &signed_in("a")),
            Transition::Unchanged
        );
        assert_eq!(
            Transition::between(&signed_in("a"), &signed_in("b")),
            Transition::TokenRefreshed
        );
    }

    #[test]
    fn blank_tokens_are_guests() {
        assert_eq!(
            AuthState::from_token(Some(BearerToken::new("   "))),
            AuthState::Guest
        );
        assert!(AuthState::from_token(Some(BearerToken::new(" t "))).is_authenticated());
    }

    #[test]
    fn token_is_redacted_in_debug_output() {
        let token = BearerToken::new("secret-value");

        assert_eq!(token.expose(), "secret-value");
        assert!(!format!("{token:?}").contains("secret"));
    }
}
