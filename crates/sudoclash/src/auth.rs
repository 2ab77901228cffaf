//! Authentication hook for validating player identity.
//!
//! Sudoclash does not own accounts. The server calls an [`Authenticator`]
//! with the token from the `AUTHENTICATE` packet and uses the returned
//! [`PlayerId`] for the rest of the connection.

use std::sync::atomic::{AtomicU32, Ordering};

use sudoclash_protocol::PlayerId;

use crate::SudoclashError;

/// Longest token a guest may present.
pub const MAX_GUEST_TOKEN_LEN: usize = 64;

/// Validates a client's auth token and returns their identity.
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// connection task for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use sudoclash::{Authenticator, SudoclashError};
/// use sudoclash_protocol::PlayerId;
///
/// /// Uses the token itself as the player id.
/// struct NumericAuthenticator;
///
/// impl Authenticator for NumericAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, SudoclashError> {
///         let id: u32 = token
///             .parse()
///             .map_err(|_| SudoclashError::AuthFailed("token must be a number".into()))?;
///         Ok(PlayerId(id))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Returns the player behind `token`, or
    /// [`SudoclashError::AuthFailed`].
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, SudoclashError>> + Send;
}

/// Lets anyone in: every accepted token gets a fresh player id.
///
/// Tokens must be non-empty and at most [`MAX_GUEST_TOKEN_LEN`] bytes.
/// Ids start at 1; 0 is the "no player" value on the wire.
#[derive(Debug)]
pub struct GuestAuthenticator {
    next_id: AtomicU32,
}

impl GuestAuthenticator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU32::new(1),
        }
    }
}

impl Default for GuestAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

impl Authenticator for GuestAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, SudoclashError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SudoclashError::AuthFailed("empty token".into()));
        }
        if token.len() > MAX_GUEST_TOKEN_LEN {
            return Err(SudoclashError::AuthFailed(format!(
                "token longer than {MAX_GUEST_TOKEN_LEN} bytes"
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Ok(PlayerId(id))
    }
}
