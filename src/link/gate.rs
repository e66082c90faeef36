//! Pipeline stage that holds operations until the access token is usable.

// self
use crate::{
	_prelude::*,
	link::{Link, LinkFuture, Next},
	operation::Operation,
	refresh::RefreshCoordinator,
};

/// Runs [`RefreshCoordinator::ensure_valid`] before forwarding; a refresh failure
/// short-circuits the chain and the operation is never sent.
#[derive(Clone, Debug)]
pub struct RefreshGate {
	coordinator: Arc<RefreshCoordinator>,
}
impl RefreshGate {
	/// Creates a gate backed by the shared coordinator.
	pub fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
		Self { coordinator }
	}
}
impl Link for RefreshGate {
	fn name(&self) -> &'static str {
		"refresh_gate"
	}

	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		Box::pin(async move {
			self.coordinator.ensure_valid().await?;

			next.run(operation).await
		})
	}
}
