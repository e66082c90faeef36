//! Terminal send primitive of the link chain.

// self
use crate::{
	_prelude::*,
	error::TransportError,
	operation::{GraphqlResponse, Operation},
};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<GraphqlResponse, TransportError>> + 'a + Send>>;

/// Serializes an operation, delivers it to the GraphQL endpoint, and parses the response.
///
/// Implementations report delivery failures and non-success statuses as [`TransportError`];
/// a well-formed response carrying application errors is returned as `Ok`.
pub trait Transport
where
	Self: Send + Sync,
{
	/// Sends the operation with its accumulated headers.
	fn send(&self, operation: Operation) -> TransportFuture<'_>;
}
