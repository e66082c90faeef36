//! Process-wide holder of the current access token.

// self
use crate::{_prelude::*, auth::AccessToken};

/// Single-slot token holder with atomic replace semantics.
///
/// The store starts empty and is shared by reference (`Arc<TokenStore>`) between the refresh
/// coordinator, which writes it, and the auth injector, which reads it. Readers observe either
/// no token or the last committed one; a write never becomes partially visible.
#[derive(Debug, Default)]
pub struct TokenStore(RwLock<Option<AccessToken>>);
impl TokenStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store seeded with a token obtained elsewhere (e.g. a login mutation).
	pub fn with_token(token: impl Into<AccessToken>) -> Self {
		Self(RwLock::new(Some(token.into())))
	}

	/// Returns a snapshot of the latest committed token.
	pub fn get(&self) -> Option<AccessToken> {
		self.0.read().clone()
	}

	/// Atomically replaces the stored token.
	pub fn set(&self, token: impl Into<AccessToken>) {
		*self.0.write() = Some(token.into());
	}

	/// Drops the stored token, returning the previous one.
	pub fn clear(&self) -> Option<AccessToken> {
		self.0.write().take()
	}

	/// Returns `true` when no token is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_none()
	}
}
