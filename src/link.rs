//! Ordered request pipeline.
//!
//! A [`LinkChain`] is an explicit list of [`Link`] stages followed by a terminal
//! [`Transport`]. Each stage receives the operation plus a [`Next`] cursor over the remaining
//! stages; it forwards by calling [`Next::run`] or short-circuits by returning an error
//! without doing so. Responses and errors travel back through the stages in reverse order.

pub mod auth;
pub mod gate;
pub mod observe;

pub use auth::*;
pub use gate::*;
pub use observe::*;

// self
use crate::{
	_prelude::*,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	operation::{GraphqlResponse, Operation},
	refresh::RefreshCoordinator,
	transport::Transport,
};

/// Boxed future returned by [`Link::call`] and [`Next::run`].
pub type LinkFuture<'a> = Pin<Box<dyn Future<Output = Result<GraphqlResponse>> + 'a + Send>>;

/// One stage of the request pipeline.
pub trait Link
where
	Self: Send + Sync,
{
	/// Stable stage name used in diagnostics.
	fn name(&self) -> &'static str;

	/// Handles `operation`, usually by forwarding it to `next`.
	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a>;
}

/// Cursor over the stages that follow the current one.
#[derive(Clone, Copy)]
pub struct Next<'a> {
	links: &'a [Arc<dyn Link>],
	transport: &'a dyn Transport,
}
impl<'a> Next<'a> {
	fn new(links: &'a [Arc<dyn Link>], transport: &'a dyn Transport) -> Self {
		Self { links, transport }
	}

	/// Runs the remaining stages and finally the transport.
	pub fn run(self, operation: Operation) -> LinkFuture<'a> {
		match self.links.split_first() {
			Some((head, tail)) => head.call(operation, Self::new(tail, self.transport)),
			None => {
				let transport = self.transport;

				Box::pin(async move { transport.send(operation).await.map_err(Error::from) })
			},
		}
	}

	/// Number of stages left before the transport.
	pub fn remaining(&self) -> usize {
		self.links.len()
	}
}
impl Debug for Next<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_list().entries(self.links.iter().map(|link| link.name())).finish()
	}
}

/// Fixed, ordered pipeline executed for every operation.
#[derive(Clone)]
pub struct LinkChain {
	links: Vec<Arc<dyn Link>>,
	transport: Arc<dyn Transport>,
}
impl LinkChain {
	/// Starts a custom chain that terminates in `transport`.
	pub fn builder(transport: Arc<dyn Transport>) -> LinkChainBuilder {
		LinkChainBuilder { links: Vec::new(), transport }
	}

	/// Builds the standard authenticated pipeline:
	/// refresh gate → error observer → auth injector → transport.
	pub fn authenticated(
		coordinator: Arc<RefreshCoordinator>,
		sink: Arc<dyn ObservationSink>,
		transport: Arc<dyn Transport>,
	) -> Self {
		let store = coordinator.store().clone();

		Self::builder(transport)
			.link(RefreshGate::new(coordinator))
			.link(ErrorObserver::new(sink))
			.link(AuthInjector::new(store))
			.build()
	}

	/// Stage names in execution order.
	pub fn stage_names(&self) -> Vec<&'static str> {
		self.links.iter().map(|link| link.name()).collect()
	}

	/// Sends `operation` through every stage.
	pub async fn execute(&self, operation: Operation) -> Result<GraphqlResponse> {
		const KIND: FlowKind = FlowKind::Operation;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result =
			span.instrument(Next::new(&self.links, self.transport.as_ref()).run(operation)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
impl Debug for LinkChain {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkChain").field("stages", &self.stage_names()).finish()
	}
}

/// Builder for [`LinkChain`] values.
pub struct LinkChainBuilder {
	links: Vec<Arc<dyn Link>>,
	transport: Arc<dyn Transport>,
}
impl LinkChainBuilder {
	/// Appends a stage; stages run in insertion order.
	pub fn link(mut self, link: impl 'static + Link) -> Self {
		self.links.push(Arc::new(link));

		self
	}

	/// Appends an already shared stage.
	pub fn shared_link(mut self, link: Arc<dyn Link>) -> Self {
		self.links.push(link);

		self
	}

	/// Finalizes the chain.
	pub fn build(self) -> LinkChain {
		LinkChain { links: self.links, transport: self.transport }
	}
}
impl Debug for LinkChainBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkChainBuilder").field("stages", &self.links.len()).finish()
	}
}
