//! Single-flight access-token renewal.
//!
//! [`RefreshCoordinator::ensure_valid`] runs before every outgoing operation. A usable (or
//! absent) token returns immediately. Otherwise the caller attaches to the one pending
//! exchange, starting it if none is in flight. The pending exchange lives in a
//! mutex-guarded slot as a cloneable shared future tagged with a generation number. The
//! exchange commits the new token to the [`TokenStore`], clears its own slot, and only then
//! releases every waiter with the same result. Inside a tokio runtime the exchange runs as
//! its own task, so it settles even if every waiter is dropped. A failed exchange leaves the
//! store untouched, so the next operation re-evaluates validity and may start a brand-new
//! exchange.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use futures_util::future::{FutureExt, Shared};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenValidity, ValidityChecker},
	error::RefreshError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenStore,
};

/// Default name of the token field in the refresh response body.
pub const DEFAULT_ACCESS_TOKEN_FIELD: &str = "accessToken";

/// Owned future returned by [`RefreshExchange::exchange`].
pub type ExchangeFuture =
	Pin<Box<dyn Future<Output = Result<AccessToken, RefreshError>> + 'static + Send>>;

/// Network exchange that trades session credentials (e.g. a refresh cookie) for a new
/// access token.
///
/// The returned future must own everything it touches: the coordinator shares it between
/// all waiting operations, and it can outlive the caller that started it.
pub trait RefreshExchange
where
	Self: 'static + Send + Sync,
{
	/// Starts one exchange.
	fn exchange(&self) -> ExchangeFuture;
}

type SharedExchange = Shared<ExchangeFuture>;

#[derive(Clone)]
struct PendingRefresh {
	generation: u64,
	future: SharedExchange,
}

#[derive(Default)]
struct PendingSlot {
	current: Option<PendingRefresh>,
	next_generation: u64,
}
impl PendingSlot {
	fn settle(slot: &Mutex<Self>, generation: u64) {
		let mut slot = slot.lock();

		if slot.current.as_ref().is_some_and(|pending| pending.generation == generation) {
			slot.current = None;
		}
	}
}

enum Attachment {
	Started(PendingRefresh),
	Joined(PendingRefresh),
}
impl Attachment {
	fn into_future(self) -> SharedExchange {
		match self {
			Self::Started(pending) | Self::Joined(pending) => pending.future,
		}
	}
}

/// Coordinates token renewal so at most one exchange is in flight at any time.
pub struct RefreshCoordinator {
	store: Arc<TokenStore>,
	checker: ValidityChecker,
	exchange: Arc<dyn RefreshExchange>,
	pending: Arc<Mutex<PendingSlot>>,
	metrics: Arc<RefreshMetrics>,
}
impl RefreshCoordinator {
	/// Creates a coordinator that renews tokens held in `store` through `exchange`.
	pub fn new(store: Arc<TokenStore>, exchange: Arc<dyn RefreshExchange>) -> Self {
		Self {
			store,
			checker: ValidityChecker::default(),
			exchange,
			pending: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Replaces the validity checker (e.g. to renew tokens ahead of expiry).
	pub fn with_checker(mut self, checker: ValidityChecker) -> Self {
		self.checker = checker;

		self
	}

	/// Token store written by successful exchanges.
	pub fn store(&self) -> &Arc<TokenStore> {
		&self.store
	}

	/// Validity checker applied before each operation.
	pub fn checker(&self) -> ValidityChecker {
		self.checker
	}

	/// Shared counters for this coordinator.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	/// Classifies the token currently held by the store.
	pub fn validity(&self) -> TokenValidity {
		self.checker.classify(self.store.get().as_ref())
	}

	/// Returns `true` while an exchange is in flight.
	pub fn is_refreshing(&self) -> bool {
		self.pending.lock().current.is_some()
	}

	/// Ensures the stored token may be used, renewing it first when it is expired, expiring,
	/// or malformed.
	///
	/// Concurrent callers share one exchange and all receive its result. An absent token is
	/// treated as valid and never triggers an exchange.
	pub async fn ensure_valid(&self) -> Result<(), RefreshError> {
		self.metrics.record_check();

		if self.validity().is_valid() {
			return Ok(());
		}

		match self.attach_if_invalid() {
			Some(attachment) => self.await_attachment(attachment, "ensure_valid").await.map(|_| ()),
			None => Ok(()),
		}
	}

	/// Renews the token regardless of its current validity, joining any exchange already in
	/// flight.
	///
	/// Useful for restoring a session from the refresh credential at startup or after the
	/// server rejected the current token.
	pub async fn refresh_now(&self) -> Result<AccessToken, RefreshError> {
		let attachment = self.attach();

		self.await_attachment(attachment, "refresh_now").await
	}

	async fn await_attachment(
		&self,
		attachment: Attachment,
		stage: &'static str,
	) -> Result<AccessToken, RefreshError> {
		if matches!(attachment, Attachment::Joined(_)) {
			obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Joined);
		}

		FlowSpan::new(FlowKind::Refresh, stage).instrument(attachment.into_future()).await
	}

	// Check-or-create runs under one lock so no second exchange can start while one is
	// pending. The lock is never held across an await.
	fn attach_if_invalid(&self) -> Option<Attachment> {
		let mut slot = self.pending.lock();

		if let Some(joined) = self.join(&slot) {
			return Some(joined);
		}
		// A refresh may have settled between the caller's check and this lock.
		if self.validity().is_valid() {
			return None;
		}

		Some(self.start(&mut slot))
	}

	fn attach(&self) -> Attachment {
		let mut slot = self.pending.lock();

		self.join(&slot).unwrap_or_else(|| self.start(&mut slot))
	}

	fn join(&self, slot: &PendingSlot) -> Option<Attachment> {
		let pending = slot.current.clone()?;

		self.metrics.record_join();

		Some(Attachment::Joined(pending))
	}

	fn start(&self, slot: &mut PendingSlot) -> Attachment {
		let generation = slot.next_generation;

		slot.next_generation = slot.next_generation.wrapping_add(1);

		let pending = PendingRefresh { generation, future: self.start_exchange(generation) };

		slot.current = Some(pending.clone());

		Attachment::Started(pending)
	}

	fn start_exchange(&self, generation: u64) -> SharedExchange {
		let exchange = self.exchange.exchange();
		let store = self.store.clone();
		let pending = self.pending.clone();
		let metrics = self.metrics.clone();

		metrics.record_exchange();
		obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Attempt);

		let settle = async move {
			let result = exchange.await;

			match &result {
				Ok(token) => {
					store.set(token.clone());
					metrics.record_success();
					obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Success);
				},
				Err(err) => {
					metrics.record_failure();
					obs::record_flow_outcome(FlowKind::Refresh, FlowOutcome::Failure);
					log_refresh_failure(err);
				},
			}

			PendingSlot::settle(&pending, generation);

			result
		};
		let driven: ExchangeFuture = match tokio::runtime::Handle::try_current() {
			Ok(runtime) => {
				let task = runtime.spawn(settle);

				Box::pin(async move {
					task.await.unwrap_or_else(|err| {
						Err(RefreshError::unreachable(format!("refresh task failed ({err})")))
					})
				})
			},
			// Outside a tokio runtime the waiters drive the exchange themselves.
			Err(_) => Box::pin(settle),
		};

		driven.shared()
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("checker", &self.checker)
			.field("refreshing", &self.is_refreshing())
			.field("metrics", &self.metrics)
			.finish()
	}
}

/// Extracts the access token from a refresh response body.
///
/// The body must be a JSON object whose `field` holds a non-empty string.
pub fn parse_refresh_body(body: &[u8], field: &str) -> Result<AccessToken, RefreshError> {
	let value = serde_json::from_slice::<Value>(body)
		.map_err(|err| RefreshError::Shape { message: format!("body is not JSON ({err})") })?;

	match value.get(field) {
		Some(Value::String(token)) if !token.is_empty() => Ok(AccessToken::new(token.as_str())),
		Some(_) =>
			Err(RefreshError::Shape { message: format!("`{field}` is not a non-empty string") }),
		None => Err(RefreshError::Shape { message: format!("`{field}` is missing") }),
	}
}

fn log_refresh_failure(err: &RefreshError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(
		error = %err,
		status = ?err.status(),
		"Refresh token is invalid; re-authentication is required."
	);
	#[cfg(not(feature = "tracing"))]
	let _ = err;
}
