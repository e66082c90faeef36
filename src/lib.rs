//! Authenticated GraphQL request pipeline: bearer injection, single-flight access-token
//! renewal, and transport-aware error observation composed as an ordered link chain.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
#[cfg(feature = "reqwest")] pub mod client;
pub mod config;
pub mod error;
#[cfg(feature = "reqwest")] pub mod http;
pub mod link;
pub mod obs;
pub mod operation;
pub mod refresh;
pub mod store;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and token fixtures for tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::auth::AccessToken;

	/// Mints an unsigned JWT-shaped token whose payload carries the provided claims.
	pub fn mint_token(claims: serde_json::Value) -> AccessToken {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		AccessToken::new(format!("{header}.{payload}.signature"))
	}

	/// Mints a token that expires `offset` after the current instant (negative for the past).
	pub fn token_expiring_in(offset: Duration) -> AccessToken {
		let exp = (OffsetDateTime::now_utc() + offset).unix_timestamp();

		mint_token(serde_json::json!({ "sub": "user-1", "exp": exp }))
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
