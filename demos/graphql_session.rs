//! Demonstrates a GraphQL session whose expired access token is renewed once, transparently,
//! while several operations are in flight.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use gql_auth_link::{
	client::Client,
	config::LinkConfig,
	http::ReqwestHttpClient,
	operation::Operation,
	reqwest::Client as ReqwestClient,
};

// `{"alg":"HS256"}` / `{"userId":1,"exp":1}`: expired since 1970.
const EXPIRED: &str = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VySWQiOjEsImV4cCI6MX0.c2ln";
// `{"alg":"HS256"}` / `{"userId":1,"exp":4102444800}`: valid until 2100.
const FRESH: &str = "eyJhbGciOiJIUzI1NiJ9.eyJ1c2VySWQiOjEsImV4cCI6NDEwMjQ0NDgwMH0.c2ln";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let refresh_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh_token");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"ok\":true,\"accessToken\":\"{FRESH}\"}}"));
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/graphql").header("authorization", format!("Bearer {FRESH}"));
			then.status(200).json_body(json!({ "data": { "me": { "id": 1, "email": "a@b.c" } } }));
		})
		.await;
	let config = LinkConfig::from_urls(&server.url("/graphql"), &server.url("/refresh_token"))?;
	let http = ReqwestHttpClient::with_client(ReqwestClient::builder().cookie_store(true).build()?);
	let client = Client::with_http_client(config, http);

	client.sign_in(EXPIRED);

	let me = || {
		client.execute(Operation::new("query Me { me { id email } }").with_operation_name("Me"))
	};
	let (first, second, third) = tokio::join!(me(), me(), me());

	for response in [first?, second?, third?] {
		println!("Me: {}.", response.data.unwrap_or_default());
	}
	println!("Refresh exchanges: {}.", client.coordinator().metrics().exchanges());

	refresh_mock.assert_async().await;
	api_mock.assert_calls_async(3).await;

	Ok(())
}
