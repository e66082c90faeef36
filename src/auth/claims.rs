//! Local (unverified) decoding of JWT payload claims.
//!
//! The server remains the authority on signatures; the client only needs the `exp` claim to
//! decide when to renew, so decoding never touches the network.

// crates.io
use base64::{
	Engine as _,
	engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD},
};
use serde_json::{Map, Number, Value};
use time::PrimitiveDateTime;
// self
use crate::_prelude::*;

/// Errors raised while decoding a token's payload segment.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// The token does not contain a payload segment.
	#[error("Token is missing its payload segment.")]
	MissingPayload,
	/// The payload segment is not valid base64.
	#[error("Token payload is not valid base64.")]
	Base64(#[from] base64::DecodeError),
	/// The payload is not a JSON object.
	#[error("Token payload is not a JSON object.")]
	Json(#[from] serde_json::Error),
	/// The `exp` claim is not a finite number.
	#[error("Token expiry claim is out of range.")]
	ExpiryOutOfRange,
}

/// Claims decoded from a token payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Claims {
	/// Expiry instant from the `exp` claim; `None` means the token does not expire.
	pub expires_at: Option<OffsetDateTime>,
	/// Every other claim, uninterpreted.
	pub other: Map<String, Value>,
}
impl Claims {
	/// Decodes the payload (second) segment of a compact JWT.
	pub fn decode(token: &str) -> Result<Self, DecodeError> {
		let payload = token.split('.').nth(1).ok_or(DecodeError::MissingPayload)?;
		let payload = payload.trim_end_matches('=');

		if payload.is_empty() {
			return Err(DecodeError::MissingPayload);
		}

		let bytes = URL_SAFE_NO_PAD.decode(payload).or_else(|_| STANDARD_NO_PAD.decode(payload))?;
		let mut other = serde_json::from_slice::<Map<String, Value>>(&bytes)?;
		let expires_at = match other.remove("exp") {
			None | Some(Value::Null) => None,
			Some(Value::Number(exp)) => Some(expiry_from_number(&exp)?),
			Some(_) => return Err(DecodeError::ExpiryOutOfRange),
		};

		Ok(Self { expires_at, other })
	}

	/// Returns `true` if the token is expired at `instant` (expiry inclusive).
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|exp| instant >= exp)
	}
}

// Instants beyond the representable range saturate: far-future expiries never lapse and
// far-past ones are already expired.
fn expiry_from_number(exp: &Number) -> Result<OffsetDateTime, DecodeError> {
	if let Some(secs) = exp.as_i64() {
		return Ok(OffsetDateTime::from_unix_timestamp(secs)
			.unwrap_or_else(|_| saturated_instant(secs > 0)));
	}

	let secs = exp.as_f64().filter(|secs| secs.is_finite()).ok_or(DecodeError::ExpiryOutOfRange)?;
	let nanos = (secs * 1_000_000_000.0) as i128;

	Ok(OffsetDateTime::from_unix_timestamp_nanos(nanos)
		.unwrap_or_else(|_| saturated_instant(secs > 0.0)))
}

fn saturated_instant(future: bool) -> OffsetDateTime {
	if future { PrimitiveDateTime::MAX.assume_utc() } else { PrimitiveDateTime::MIN.assume_utc() }
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;
	use crate::_preludet::mint_token;

	#[test]
	fn decodes_expiry_and_keeps_other_claims() {
		let token = mint_token(serde_json::json!({ "exp": 1_700_000_000, "userId": 7 }));
		let claims = Claims::decode(token.expose()).expect("Minted token should decode.");

		assert_eq!(claims.expires_at, Some(datetime!(2023-11-14 22:13:20 UTC)));
		assert_eq!(claims.other.get("userId"), Some(&Value::from(7)));
		assert!(!claims.other.contains_key("exp"));
	}

	#[test]
	fn missing_or_null_expiry_means_non_expiring() {
		let absent = Claims::decode(mint_token(serde_json::json!({ "sub": "a" })).expose())
			.expect("Token without exp should decode.");
		let null = Claims::decode(mint_token(serde_json::json!({ "exp": null })).expose())
			.expect("Token with null exp should decode.");

		assert_eq!(absent.expires_at, None);
		assert_eq!(null.expires_at, None);
		assert!(!absent.is_expired_at(OffsetDateTime::now_utc()));
	}

	#[test]
	fn fractional_expiry_is_supported() {
		let claims = Claims::decode(mint_token(serde_json::json!({ "exp": 10.5 })).expose())
			.expect("Fractional exp should decode.");

		assert_eq!(
			claims.expires_at,
			Some(OffsetDateTime::UNIX_EPOCH + Duration::milliseconds(10_500))
		);
	}

	#[test]
	fn malformed_tokens_are_rejected() {
		assert!(matches!(Claims::decode("no-dots-here"), Err(DecodeError::MissingPayload)));
		assert!(matches!(Claims::decode("a..c"), Err(DecodeError::MissingPayload)));
		assert!(matches!(Claims::decode("a.!!!.c"), Err(DecodeError::Base64(_))));

		let not_json = format!("a.{}.c", URL_SAFE_NO_PAD.encode("not json"));

		assert!(matches!(Claims::decode(&not_json), Err(DecodeError::Json(_))));

		let string_exp = mint_token(serde_json::json!({ "exp": "tomorrow" }));

		assert!(matches!(Claims::decode(string_exp.expose()), Err(DecodeError::ExpiryOutOfRange)));
	}

	#[test]
	fn out_of_range_expiry_saturates() {
		let decode = |exp: Value| {
			Claims::decode(mint_token(serde_json::json!({ "exp": exp })).expose())
				.expect("Numeric exp should decode.")
				.expires_at
		};
		let latest = Some(PrimitiveDateTime::MAX.assume_utc());
		let earliest = Some(PrimitiveDateTime::MIN.assume_utc());

		assert_eq!(decode(Value::from(253_402_300_800_i64)), latest);
		assert_eq!(decode(Value::from(1e12)), latest);
		assert_eq!(decode(Value::from(u64::MAX)), latest);
		assert_eq!(decode(Value::from(i64::MIN)), earliest);
		assert_eq!(decode(Value::from(-1e15)), earliest);
	}

	#[test]
	fn expiry_is_inclusive() {
		let claims = Claims { expires_at: Some(datetime!(2025-01-01 0:00 UTC)), other: Map::new() };

		assert!(claims.is_expired_at(datetime!(2025-01-01 0:00 UTC)));
		assert!(!claims.is_expired_at(datetime!(2024-12-31 23:59:59 UTC)));
	}
}
