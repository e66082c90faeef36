//! reqwest-backed refresh exchange and GraphQL transport.
//!
//! Both halves share one [`ReqwestClient`] with a cookie store enabled, so the session cookie
//! set by the server (typically the refresh credential) travels with every refresh exchange
//! and GraphQL request.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	config::LinkConfig,
	error::{ConfigError, RefreshError, TransportError},
	operation::{GraphqlResponse, Operation},
	refresh::{self, ExchangeFuture, RefreshExchange},
	transport::{Transport, TransportFuture},
};

const BODY_PREVIEW_LIMIT: usize = 512;

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`]. Enable its cookie store if the refresh
	/// credential lives in a cookie.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a cookie-aware client honoring the configured timeout and user agent.
	pub fn from_config(config: &LinkConfig) -> Result<Self, ConfigError> {
		config.validate()?;

		let mut builder = ReqwestClient::builder().cookie_store(true);

		if let Some(timeout) = config.request_timeout {
			builder = builder.timeout(timeout.unsigned_abs());
		}
		if let Some(user_agent) = config.user_agent.as_deref() {
			builder = builder.user_agent(user_agent);
		}

		Ok(Self(builder.build()?))
	}

	/// Refresh exchange posting to the configured refresh endpoint.
	pub fn refresh_exchange(&self, config: &LinkConfig) -> ReqwestRefreshExchange {
		ReqwestRefreshExchange {
			client: self.0.clone(),
			endpoint: config.refresh_endpoint.clone(),
			access_token_field: Arc::from(config.access_token_field.as_str()),
		}
	}

	/// GraphQL transport posting to the configured API endpoint.
	pub fn transport(&self, config: &LinkConfig) -> ReqwestTransport {
		ReqwestTransport { client: self.0.clone(), endpoint: config.api_endpoint.clone() }
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// `POST <refresh-url>` with cookies and an empty body; reads the token from the JSON reply.
#[derive(Clone, Debug)]
pub struct ReqwestRefreshExchange {
	client: ReqwestClient,
	endpoint: Url,
	access_token_field: Arc<str>,
}
impl RefreshExchange for ReqwestRefreshExchange {
	fn exchange(&self) -> ExchangeFuture {
		let client = self.client.clone();
		let endpoint = self.endpoint.clone();
		let field = self.access_token_field.clone();

		Box::pin(async move {
			let response = client
				.post(endpoint)
				.send()
				.await
				.map_err(|err| RefreshError::unreachable(err.to_string()))?;
			let status = response.status();

			if !status.is_success() {
				return Err(RefreshError::rejected(status.as_u16()));
			}

			let body = response.bytes().await.map_err(|err| RefreshError::Network {
				status: Some(status.as_u16()),
				message: err.to_string(),
			})?;

			refresh::parse_refresh_body(&body, &field)
		})
	}
}

/// Posts operations as JSON (`query`, `operationName`, `variables`) with their headers.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	endpoint: Url,
}
impl Transport for ReqwestTransport {
	fn send(&self, operation: Operation) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut request = self.client.post(self.endpoint.clone()).json(&operation);

			for (name, value) in &operation.headers {
				request = request.header(name.as_str(), value.as_str());
			}

			let response = request.send().await?;
			let status = response.status();
			let body = response.bytes().await?;

			if !status.is_success() {
				return Err(TransportError::Status {
					status: status.as_u16(),
					body: body_preview(&body),
				});
			}

			GraphqlResponse::from_slice(&body).map_err(|source| TransportError::Decode { source })
		})
	}
}

fn body_preview(body: &[u8]) -> String {
	String::from_utf8_lossy(body).chars().take(BODY_PREVIEW_LIMIT).collect()
}
