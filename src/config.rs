//! Endpoint configuration and renewal policy for an authenticated client.

// self
use crate::{
	_prelude::*, auth::ValidityChecker, error::ConfigError, refresh::DEFAULT_ACCESS_TOKEN_FIELD,
};

/// Immutable configuration consumed by [`Client`](crate::client::Client).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
	/// GraphQL endpoint every operation is posted to.
	pub api_endpoint: Url,
	/// Endpoint that trades the session cookie for a new access token.
	pub refresh_endpoint: Url,
	/// Field of the refresh response body holding the new token.
	pub access_token_field: String,
	/// Tokens expiring within this window are renewed before use.
	pub preemptive_window: Duration,
	/// Optional per-request timeout applied by the HTTP client.
	pub request_timeout: Option<Duration>,
	/// Optional `User-Agent` header.
	pub user_agent: Option<String>,
}
impl LinkConfig {
	/// Creates a new builder.
	pub fn builder() -> LinkConfigBuilder {
		LinkConfigBuilder::default()
	}

	/// Parses both endpoints and applies the default policy.
	pub fn from_urls(api_endpoint: &str, refresh_endpoint: &str) -> Result<Self, ConfigError> {
		Self::builder()
			.api_endpoint(parse_endpoint("api", api_endpoint)?)
			.refresh_endpoint(parse_endpoint("refresh", refresh_endpoint)?)
			.build()
	}

	/// Validity checker matching the configured preemptive window.
	pub fn checker(&self) -> ValidityChecker {
		ValidityChecker::with_preemptive_window(self.preemptive_window)
	}

	/// Checks the invariants enforced by [`LinkConfigBuilder::build`], e.g. for values
	/// deserialized directly.
	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_endpoint("api", &self.api_endpoint)?;
		validate_endpoint("refresh", &self.refresh_endpoint)?;

		if self.access_token_field.trim().is_empty() {
			return Err(ConfigError::EmptyAccessTokenField);
		}
		if let Some(timeout) = self.request_timeout.filter(|timeout| !timeout.is_positive()) {
			return Err(ConfigError::NonPositiveTimeout { timeout });
		}

		Ok(())
	}
}

/// Builder for [`LinkConfig`] values.
#[derive(Debug)]
pub struct LinkConfigBuilder {
	/// GraphQL endpoint.
	pub api_endpoint: Option<Url>,
	/// Refresh endpoint.
	pub refresh_endpoint: Option<Url>,
	/// Refresh response token field.
	pub access_token_field: String,
	/// Preemptive renewal window.
	pub preemptive_window: Duration,
	/// Per-request timeout.
	pub request_timeout: Option<Duration>,
	/// `User-Agent` header.
	pub user_agent: Option<String>,
}
impl Default for LinkConfigBuilder {
	fn default() -> Self {
		Self {
			api_endpoint: None,
			refresh_endpoint: None,
			access_token_field: DEFAULT_ACCESS_TOKEN_FIELD.into(),
			preemptive_window: Duration::ZERO,
			request_timeout: None,
			user_agent: None,
		}
	}
}
impl LinkConfigBuilder {
	/// Sets the GraphQL endpoint.
	pub fn api_endpoint(mut self, url: Url) -> Self {
		self.api_endpoint = Some(url);

		self
	}

	/// Sets the refresh endpoint.
	pub fn refresh_endpoint(mut self, url: Url) -> Self {
		self.refresh_endpoint = Some(url);

		self
	}

	/// Overrides the refresh response token field (defaults to `accessToken`).
	pub fn access_token_field(mut self, field: impl Into<String>) -> Self {
		self.access_token_field = field.into();

		self
	}

	/// Renews tokens this long before they expire (defaults to zero; negative values clamp).
	pub fn preemptive_window(mut self, window: Duration) -> Self {
		self.preemptive_window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Applies a per-request timeout to both the refresh exchange and GraphQL requests; must be
	/// positive.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Sets the `User-Agent` header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<LinkConfig, ConfigError> {
		let api_endpoint =
			self.api_endpoint.ok_or(ConfigError::MissingEndpoint { endpoint: "api" })?;
		let refresh_endpoint =
			self.refresh_endpoint.ok_or(ConfigError::MissingEndpoint { endpoint: "refresh" })?;
		let config = LinkConfig {
			api_endpoint,
			refresh_endpoint,
			access_token_field: self.access_token_field,
			preemptive_window: self.preemptive_window,
			request_timeout: self.request_timeout,
			user_agent: self.user_agent,
		};

		config.validate()?;

		Ok(config)
	}
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
	Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint { endpoint: name, source })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	match url.scheme() {
		"http" | "https" => Ok(()),
		_ => Err(ConfigError::UnsupportedScheme { endpoint: name, url: url.to_string() }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn from_urls_applies_defaults() {
		let config = LinkConfig::from_urls(
			"http://localhost:4000/graphql",
			"http://localhost:4000/refresh_token",
		)
		.expect("Local endpoints should be accepted.");

		assert_eq!(config.access_token_field, "accessToken");
		assert_eq!(config.preemptive_window, Duration::ZERO);
		assert_eq!(config.refresh_endpoint.path(), "/refresh_token");
		assert_eq!(config.checker(), ValidityChecker::default());
	}

	#[test]
	fn builder_rejects_missing_and_invalid_endpoints() {
		let err = LinkConfig::builder()
			.refresh_endpoint(Url::parse("https://api.example.com/refresh").expect("Valid URL."))
			.build()
			.expect_err("Missing API endpoint should be rejected.");

		assert!(matches!(err, ConfigError::MissingEndpoint { endpoint: "api" }));

		let err = LinkConfig::from_urls("not a url", "https://api.example.com/refresh")
			.expect_err("Unparseable endpoint should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { endpoint: "api", .. }));

		let err = LinkConfig::from_urls("https://api.example.com/graphql", "ftp://example.com/r")
			.expect_err("Non-HTTP scheme should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { endpoint: "refresh", .. }));
	}

	#[test]
	fn builder_validates_policy_fields() {
		let base = || {
			LinkConfig::builder()
				.api_endpoint(Url::parse("https://api.example.com/graphql").expect("Valid URL."))
				.refresh_endpoint(
					Url::parse("https://api.example.com/refresh").expect("Valid URL."),
				)
		};
		let err = base().access_token_field("  ").build().expect_err("Blank field is invalid.");

		assert!(matches!(err, ConfigError::EmptyAccessTokenField));

		let config = base()
			.access_token_field("token")
			.preemptive_window(Duration::seconds(-3))
			.request_timeout(Duration::seconds(10))
			.build()
			.expect("Custom policy should be accepted.");

		assert_eq!(config.access_token_field, "token");
		assert_eq!(config.preemptive_window, Duration::ZERO);
		assert_eq!(config.request_timeout, Some(Duration::seconds(10)));
	}

	#[test]
	fn builder_rejects_non_positive_timeouts() {
		for timeout in [Duration::ZERO, Duration::seconds(-5)] {
			let err = LinkConfig::builder()
				.api_endpoint(Url::parse("https://api.example.com/graphql").expect("Valid URL."))
				.refresh_endpoint(
					Url::parse("https://api.example.com/refresh").expect("Valid URL."),
				)
				.request_timeout(timeout)
				.build()
				.expect_err("Non-positive timeout should be rejected.");

			assert!(matches!(err, ConfigError::NonPositiveTimeout { timeout: t } if t == timeout));
		}
	}
}
