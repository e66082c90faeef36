//! Authenticated GraphQL client assembled from the pipeline components.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	config::LinkConfig,
	error::RefreshError,
	http::ReqwestHttpClient,
	link::{LinkChain, ObservationSink, TracingSink},
	operation::{GraphqlResponse, Operation},
	refresh::{RefreshCoordinator, RefreshExchange},
	store::TokenStore,
	transport::Transport,
};

/// GraphQL client whose every operation passes through the authenticated link chain.
///
/// The client owns the token store, the refresh coordinator, and the chain
/// (refresh gate → error observer → auth injector → transport). Clones share all three.
#[derive(Clone, Debug)]
pub struct Client {
	/// Configuration the client was built from.
	pub config: LinkConfig,
	store: Arc<TokenStore>,
	coordinator: Arc<RefreshCoordinator>,
	chain: LinkChain,
}
impl Client {
	/// Creates a client backed by a cookie-aware reqwest transport and the tracing sink.
	pub fn new(config: LinkConfig) -> Result<Self> {
		let http = ReqwestHttpClient::from_config(&config)?;

		Ok(Self::with_http_client(config, http))
	}

	/// Creates a client reusing a caller-provided reqwest client.
	pub fn with_http_client(config: LinkConfig, http: ReqwestHttpClient) -> Self {
		let exchange = Arc::new(http.refresh_exchange(&config));
		let transport = Arc::new(http.transport(&config));
		let store = Arc::new(TokenStore::new());

		Self::with_parts(config, store, exchange, transport, Arc::new(TracingSink))
	}

	/// Creates a client from explicit components.
	pub fn with_parts(
		config: LinkConfig,
		store: Arc<TokenStore>,
		exchange: Arc<dyn RefreshExchange>,
		transport: Arc<dyn Transport>,
		sink: Arc<dyn ObservationSink>,
	) -> Self {
		let coordinator = Arc::new(
			RefreshCoordinator::new(store.clone(), exchange).with_checker(config.checker()),
		);
		let chain = LinkChain::authenticated(coordinator.clone(), sink, transport);

		Self { config, store, coordinator, chain }
	}

	/// Shared token store.
	pub fn store(&self) -> &Arc<TokenStore> {
		&self.store
	}

	/// Shared refresh coordinator.
	pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
		&self.coordinator
	}

	/// Link chain used for every operation.
	pub fn chain(&self) -> &LinkChain {
		&self.chain
	}

	/// Stores a token obtained out of band (e.g. from a login mutation).
	pub fn sign_in(&self, token: impl Into<AccessToken>) {
		self.store.set(token);
	}

	/// Forgets the stored token.
	pub fn sign_out(&self) {
		self.store.clear();
	}

	/// Restores a session from the refresh credential, e.g. at startup.
	pub async fn restore_session(&self) -> Result<AccessToken, RefreshError> {
		self.coordinator.refresh_now().await
	}

	/// Sends an operation through the chain.
	pub async fn execute(&self, operation: Operation) -> Result<GraphqlResponse> {
		self.chain.execute(operation).await
	}

	/// Convenience wrapper for a query with optional variables.
	pub async fn query(
		&self,
		query: impl Into<String>,
		variables: Option<serde_json::Value>,
	) -> Result<GraphqlResponse> {
		let mut operation = Operation::new(query);

		operation.variables = variables;

		self.execute(operation).await
	}
}
