//! Error types for routing and navigation.
//!
//! Two layers: [`RouterError`] covers configuration defects and dispatch
//! failures, while [`NavigationCondition`] is the structured, HTTP-status
//! shaped value produced for not-found, redirect and server-error
//! situations. A condition is not always thrown — it can travel through
//! route parameters and survive into a rendered response for diagnostics.

use thiserror::Error;

/// A structured navigation outcome carrying an HTTP-status-like field.
///
/// Redirections (`[300, 400)`) are control-flow signals rather than
/// failures; client errors are `[400, 500)`, server errors `>= 500`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status})")]
pub struct NavigationCondition {
	/// HTTP-status-like classification of the condition.
	pub status: u16,
	/// Human-readable description.
	pub message: String,
	/// Target or offending URL, when one exists.
	pub url: Option<String>,
}

impl NavigationCondition {
	/// Creates a condition with the given status and message.
	pub fn new(status: u16, message: impl Into<String>) -> Self {
		Self {
			status,
			message: message.into(),
			url: None,
		}
	}

	/// Attaches a URL to the condition.
	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());
		self
	}

	/// A 404 condition for an unmatched path.
	pub fn not_found(path: &str) -> Self {
		Self::new(404, format!("no route matches path '{}'", path)).with_url(path)
	}

	/// A redirection condition pointing at `url`.
	pub fn redirect(url: impl Into<String>, status: u16) -> Self {
		let url = url.into();
		Self::new(status, format!("redirect to '{}'", url)).with_url(url)
	}

	/// A 500 condition for an internal failure.
	pub fn internal(message: impl Into<String>) -> Self {
		Self::new(500, message)
	}

	/// Status in `[400, 500)`.
	pub fn is_client_error(&self) -> bool {
		(400..500).contains(&self.status)
	}

	/// Status in `[300, 400)`.
	pub fn is_redirection(&self) -> bool {
		(300..400).contains(&self.status)
	}

	/// Status `>= 500`.
	pub fn is_server_error(&self) -> bool {
		self.status >= 500
	}
}

/// Errors produced by route registration and navigation dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
	/// A route with the same name is already registered.
	#[error("route '{0}' is already registered")]
	DuplicateRoute(String),

	/// No route is registered under the given name.
	#[error("route '{0}' is not registered")]
	UnknownRoute(String),

	/// The path expression could not be compiled.
	#[error("malformed path expression '{expression}': {reason}")]
	MalformedExpression {
		/// The offending expression.
		expression: String,
		/// Why compilation failed.
		reason: String,
	},

	/// A reserved route (`error` / `notFound`) is required but missing.
	#[error("reserved route '{0}' is not registered")]
	MissingReservedRoute(&'static str),

	/// No registered route matches the given path.
	#[error("no route matches path '{0}'")]
	NoMatchingRoute(String),

	/// A navigation condition raised as an error.
	#[error(transparent)]
	Condition(#[from] NavigationCondition),
}

impl RouterError {
	/// The HTTP-status-like field, present only on condition errors.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Condition(condition) => Some(condition.status),
			_ => None,
		}
	}

	/// True iff the error carries a status in `[400, 500)`.
	pub fn is_client_error(&self) -> bool {
		matches!(self.status(), Some(status) if (400..500).contains(&status))
	}

	/// True iff the error carries a status in `[300, 400)`.
	pub fn is_redirection(&self) -> bool {
		matches!(self.status(), Some(status) if (300..400).contains(&status))
	}

	/// True iff the error carries a status `>= 500`.
	pub fn is_server_error(&self) -> bool {
		matches!(self.status(), Some(status) if status >= 500)
	}

	/// True for registration-time defects: duplicate or unknown route
	/// names, malformed expressions, and missing reserved routes.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			Self::DuplicateRoute(_)
				| Self::UnknownRoute(_)
				| Self::MalformedExpression { .. }
				| Self::MissingReservedRoute(_)
		)
	}
}
