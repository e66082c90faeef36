//! Pipeline stage that attaches the stored bearer token.

// self
use crate::{
	_prelude::*,
	link::{Link, LinkFuture, Next},
	operation::{AUTHORIZATION, Operation},
	store::TokenStore,
};

/// Copies the current token into the `Authorization` header.
///
/// The injector only reads the store; renewal always completes upstream in the refresh gate.
#[derive(Clone, Debug)]
pub struct AuthInjector {
	store: Arc<TokenStore>,
}
impl AuthInjector {
	/// Creates an injector reading from `store`.
	pub fn new(store: Arc<TokenStore>) -> Self {
		Self { store }
	}

	/// Sets `Authorization: Bearer <token>` when a token is stored and removes the header
	/// otherwise.
	pub fn decorate(&self, mut operation: Operation) -> Operation {
		match self.store.get() {
			Some(token) => operation.set_header(AUTHORIZATION, token.bearer()),
			None => {
				operation.remove_header(AUTHORIZATION);
			},
		}

		operation
	}
}
impl Link for AuthInjector {
	fn name(&self) -> &'static str {
		"auth_injector"
	}

	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		next.run(self.decorate(operation))
	}
}
