//! Expiry-based validity classification for the stored access token.

// self
use crate::{_prelude::*, auth::AccessToken};

/// Classification of the token currently held by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenValidity {
	/// No token is stored; the request proceeds unauthenticated.
	Absent,
	/// The token decodes and is outside its expiry window.
	Usable,
	/// The token expires within the preemptive window.
	Expiring,
	/// The token's expiry instant has passed.
	Expired,
	/// The token cannot be decoded.
	Malformed,
}
impl TokenValidity {
	/// Returns `true` when the request may proceed without a refresh.
	pub const fn is_valid(self) -> bool {
		matches!(self, Self::Absent | Self::Usable)
	}

	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Absent => "absent",
			Self::Usable => "usable",
			Self::Expiring => "expiring",
			Self::Expired => "expired",
			Self::Malformed => "malformed",
		}
	}
}
impl Display for TokenValidity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Pure validity check driven by the token's `exp` claim.
///
/// An absent token counts as valid so the first request can go out unauthenticated and let
/// the server decide. A non-zero preemptive window renews tokens shortly before they expire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidityChecker {
	preemptive_window: Duration,
}
impl ValidityChecker {
	/// Creates a checker that renews tokens `window` before their expiry.
	pub fn with_preemptive_window(window: Duration) -> Self {
		Self { preemptive_window: if window.is_negative() { Duration::ZERO } else { window } }
	}

	/// Configured preemptive window.
	pub fn preemptive_window(&self) -> Duration {
		self.preemptive_window
	}

	/// Classifies `token` at `now`.
	pub fn classify_at(&self, token: Option<&AccessToken>, now: OffsetDateTime) -> TokenValidity {
		let Some(token) = token else {
			return TokenValidity::Absent;
		};
		let Ok(claims) = token.claims() else {
			return TokenValidity::Malformed;
		};
		let Some(expires_at) = claims.expires_at else {
			return TokenValidity::Usable;
		};

		if now >= expires_at {
			TokenValidity::Expired
		} else if !self.preemptive_window.is_zero()
			&& expires_at - now <= self.preemptive_window
		{
			TokenValidity::Expiring
		} else {
			TokenValidity::Usable
		}
	}

	/// Classifies `token` against the current wall clock.
	pub fn classify(&self, token: Option<&AccessToken>) -> TokenValidity {
		self.classify_at(token, OffsetDateTime::now_utc())
	}

	/// Returns `true` if the request may proceed at `now` without a refresh.
	pub fn is_valid_at(&self, token: Option<&AccessToken>, now: OffsetDateTime) -> bool {
		self.classify_at(token, now).is_valid()
	}

	/// Returns `true` if the request may proceed without a refresh.
	pub fn is_valid(&self, token: Option<&AccessToken>) -> bool {
		self.classify(token).is_valid()
	}
}
