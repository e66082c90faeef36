//! GraphQL operation and response models carried through the link chain.

// crates.io
use serde_json::Value;
// self
use crate::_prelude::*;

/// Lower-cased name of the header carrying the bearer token.
pub const AUTHORIZATION: &str = "authorization";

/// One outgoing GraphQL request plus the headers accumulated by the links.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Operation {
	/// GraphQL document text.
	pub query: String,
	/// Operation name, when the document declares several.
	#[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
	pub operation_name: Option<String>,
	/// Variables object.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub variables: Option<Value>,
	/// Request headers keyed by lower-cased name; never serialized into the body.
	#[serde(skip)]
	pub headers: BTreeMap<String, String>,
}
impl Operation {
	/// Creates an operation for the given document.
	pub fn new(query: impl Into<String>) -> Self {
		Self {
			query: query.into(),
			operation_name: None,
			variables: None,
			headers: BTreeMap::new(),
		}
	}

	/// Sets the operation name.
	pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
		self.operation_name = Some(name.into());

		self
	}

	/// Sets the variables object.
	pub fn with_variables(mut self, variables: Value) -> Self {
		self.variables = Some(variables);

		self
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
		self.set_header(name, value);

		self
	}

	/// Adds or replaces a header in place.
	pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
		self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
	}

	/// Removes a header, returning its previous value.
	pub fn remove_header(&mut self, name: &str) -> Option<String> {
		self.headers.remove(&name.to_ascii_lowercase())
	}

	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}

	/// Label used in spans and logs.
	pub fn label(&self) -> &str {
		self.operation_name.as_deref().unwrap_or("anonymous")
	}
}

/// Standard GraphQL response envelope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphqlResponse {
	/// Result data; `None` when execution failed before producing any.
	#[serde(default)]
	pub data: Option<Value>,
	/// Application-level errors reported by the server.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub errors: Vec<GraphqlErrorEntry>,
	/// Server-defined extensions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extensions: Option<Value>,
}
impl GraphqlResponse {
	/// Parses a response body, reporting the JSON path of any mismatch.
	pub fn from_slice(body: &[u8]) -> Result<Self, serde_path_to_error::Error<serde_json::Error>> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
	}

	/// Returns `true` when the server reported at least one application error.
	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}
}

/// One entry of a GraphQL `errors` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
	/// Human-readable description.
	pub message: String,
	/// Source locations in the document.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub locations: Vec<SourceLocation>,
	/// Response path the error is attached to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<Vec<Value>>,
	/// Server-defined extensions (error codes, etc.).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub extensions: Option<Value>,
}

/// Line/column pair inside a GraphQL document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
	/// One-based line.
	pub line: u32,
	/// One-based column.
	pub column: u32,
}
