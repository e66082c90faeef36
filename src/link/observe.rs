//! Diagnostic stage that classifies completed operations and reports them to a sink.

// self
use crate::{
	_prelude::*,
	link::{Link, LinkFuture, Next},
	operation::{GraphqlErrorEntry, GraphqlResponse, Operation},
};

/// Classification of one completed operation.
#[derive(Debug)]
pub enum Observation<'a> {
	/// The transport failed (or a later stage rejected the operation).
	TransportFailure {
		/// Operation label.
		operation: &'a str,
		/// Error returned by the remaining chain.
		error: &'a Error,
	},
	/// The server answered with domain-level errors.
	ApplicationErrors {
		/// Operation label.
		operation: &'a str,
		/// Error entries from the response.
		errors: &'a [GraphqlErrorEntry],
	},
	/// The server answered without errors.
	Success {
		/// Operation label.
		operation: &'a str,
	},
}
impl Observation<'_> {
	/// Returns the observation kind.
	pub fn kind(&self) -> ObservationKind {
		match self {
			Self::TransportFailure { .. } => ObservationKind::TransportFailure,
			Self::ApplicationErrors { .. } => ObservationKind::ApplicationErrors,
			Self::Success { .. } => ObservationKind::Success,
		}
	}

	/// Operation label the observation refers to.
	pub fn operation(&self) -> &str {
		match self {
			Self::TransportFailure { operation, .. }
			| Self::ApplicationErrors { operation, .. }
			| Self::Success { operation } => *operation,
		}
	}
}

/// Field-less discriminant of [`Observation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObservationKind {
	/// See [`Observation::TransportFailure`].
	TransportFailure,
	/// See [`Observation::ApplicationErrors`].
	ApplicationErrors,
	/// See [`Observation::Success`].
	Success,
}

/// Destination for classified outcomes.
pub trait ObservationSink
where
	Self: Send + Sync,
{
	/// Records one observation. Must not block.
	fn record(&self, observation: &Observation<'_>);
}

/// Sink that writes observations as `tracing` events (no-op without the `tracing` feature).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;
impl ObservationSink for TracingSink {
	fn record(&self, observation: &Observation<'_>) {
		#[cfg(feature = "tracing")]
		{
			match observation {
				Observation::TransportFailure { operation, error } => {
					tracing::warn!(operation, error = %error, "GraphQL operation failed.");
				},
				Observation::ApplicationErrors { operation, errors } =>
					for entry in errors.iter() {
						tracing::warn!(
							operation,
							message = entry.message.as_str(),
							path = ?entry.path,
							"GraphQL operation returned an error."
						);
					},
				Observation::Success { operation } => {
					tracing::trace!(operation, "GraphQL operation succeeded.");
				},
			}
		}
		#[cfg(not(feature = "tracing"))]
		let _ = observation;
	}
}

/// Owned copy of an [`Observation`] kept by [`ObservationLog`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObservationRecord {
	/// Operation label.
	pub operation: String,
	/// Observation kind.
	pub kind: ObservationKind,
	/// Error messages (transport error text or application error messages).
	pub messages: Vec<String>,
}

/// In-memory sink that keeps every observation, useful for tests and status panels.
#[derive(Debug, Default)]
pub struct ObservationLog(Mutex<Vec<ObservationRecord>>);
impl ObservationLog {
	/// Returns a snapshot of the recorded observations.
	pub fn records(&self) -> Vec<ObservationRecord> {
		self.0.lock().clone()
	}

	/// Drains the recorded observations.
	pub fn take(&self) -> Vec<ObservationRecord> {
		std::mem::take(&mut *self.0.lock())
	}
}
impl ObservationSink for ObservationLog {
	fn record(&self, observation: &Observation<'_>) {
		let messages = match observation {
			Observation::TransportFailure { error, .. } => vec![error.to_string()],
			Observation::ApplicationErrors { errors, .. } =>
				errors.iter().map(|entry| entry.message.clone()).collect(),
			Observation::Success { .. } => Vec::new(),
		};

		self.0.lock().push(ObservationRecord {
			operation: observation.operation().to_owned(),
			kind: observation.kind(),
			messages,
		});
	}
}

/// Stage that reports each outcome to a sink without altering or retrying it.
#[derive(Clone)]
pub struct ErrorObserver {
	sink: Arc<dyn ObservationSink>,
}
impl ErrorObserver {
	/// Creates an observer reporting to `sink`.
	pub fn new(sink: Arc<dyn ObservationSink>) -> Self {
		Self { sink }
	}

	/// Classifies an outcome.
	pub fn classify<'a>(
		operation: &'a str,
		outcome: &'a Result<GraphqlResponse>,
	) -> Observation<'a> {
		match outcome {
			Err(error) => Observation::TransportFailure { operation, error },
			Ok(response) if response.has_errors() =>
				Observation::ApplicationErrors { operation, errors: &response.errors },
			Ok(_) => Observation::Success { operation },
		}
	}

	/// Classifies an outcome and hands it to the sink.
	pub fn observe(&self, operation: &str, outcome: &Result<GraphqlResponse>) {
		self.sink.record(&Self::classify(operation, outcome));
	}
}
impl Default for ErrorObserver {
	fn default() -> Self {
		Self::new(Arc::new(TracingSink))
	}
}
impl Debug for ErrorObserver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ErrorObserver(..)")
	}
}
impl Link for ErrorObserver {
	fn name(&self) -> &'static str {
		"error_observer"
	}

	fn call<'a>(&'a self, operation: Operation, next: Next<'a>) -> LinkFuture<'a> {
		Box::pin(async move {
			let label = operation.label().to_owned();
			let outcome = next.run(operation).await;

			self.observe(&label, &outcome);

			outcome
		})
	}
}
