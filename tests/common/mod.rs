//! Shared fixtures for the integration suites.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::MockServer;
use time::{Duration, OffsetDateTime};
// self
use gql_auth_link::{
	auth::AccessToken,
	client::Client,
	config::LinkConfig,
	http::ReqwestHttpClient,
	link::{ObservationLog, ObservationSink},
	store::TokenStore,
};

/// Mints an unsigned JWT-shaped token expiring `offset` from now.
pub fn token_expiring_in(offset: Duration) -> AccessToken {
	let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(format!("{{\"userId\":1,\"exp\":{exp}}}"));

	AccessToken::new(format!("{header}.{payload}.signature"))
}

/// Builds a client against the mock server plus the log capturing its observations.
pub fn build_client(server: &MockServer, store: TokenStore) -> (Client, Arc<ObservationLog>) {
	let config = LinkConfig::from_urls(&server.url("/graphql"), &server.url("/refresh_token"))
		.expect("Mock endpoints should form a valid configuration.");
	let http = ReqwestHttpClient::from_config(&config).expect("Test HTTP client should build.");
	let log = Arc::new(ObservationLog::default());
	let sink: Arc<dyn ObservationSink> = log.clone();
	let client = Client::with_parts(
		config.clone(),
		Arc::new(store),
		Arc::new(http.refresh_exchange(&config)),
		Arc::new(http.transport(&config)),
		sink,
	);

	(client, log)
}
