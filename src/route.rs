//! Route definitions.
//!
//! A [`Route`] binds a unique name and a compiled [`PathExpression`] to an
//! opaque controller/view pair plus a closed set of per-route options.
//! Routes are immutable values; the router shares them as `Arc<Route>`.

use crate::error::RouterError;
use crate::manager::NavigationOptions;
use crate::params::RouteParams;
use crate::pattern::PathExpression;

/// Per-route navigation options, passed through to the page manager.
///
/// A closed configuration set; per-call [`NavigationOptions`] may override
/// any field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
	/// Only update the current page instead of a full mount.
	pub only_update: bool,
	/// Scroll to the top after the navigation settles.
	pub autoscroll: bool,
	/// Allow single-page-application handling for this route.
	pub allow_spa: bool,
	/// Identifier of the document view to render into.
	pub document_view: Option<String>,
	/// Identifier of the managed root view.
	pub managed_root_view: Option<String>,
	/// Identifier of the view adapter.
	pub view_adapter: Option<String>,
}

impl Default for RouteOptions {
	fn default() -> Self {
		Self {
			only_update: false,
			autoscroll: true,
			allow_spa: true,
			document_view: None,
			managed_root_view: None,
			view_adapter: None,
		}
	}
}

impl RouteOptions {
	/// Merges per-call overrides over these defaults, producing the
	/// effective options for one navigation.
	pub fn merge(&self, overrides: &NavigationOptions) -> RouteOptions {
		RouteOptions {
			only_update: overrides.only_update.unwrap_or(self.only_update),
			autoscroll: overrides.autoscroll.unwrap_or(self.autoscroll),
			allow_spa: overrides.allow_spa.unwrap_or(self.allow_spa),
			document_view: overrides
				.document_view
				.clone()
				.or_else(|| self.document_view.clone()),
			managed_root_view: overrides
				.managed_root_view
				.clone()
				.or_else(|| self.managed_root_view.clone()),
			view_adapter: overrides
				.view_adapter
				.clone()
				.or_else(|| self.view_adapter.clone()),
		}
	}
}

/// A named mapping of a path expression to a controller/view pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
	name: String,
	expression: PathExpression,
	controller: String,
	view: String,
	options: RouteOptions,
}

impl Route {
	/// The unique route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The original path expression string.
	pub fn path_expression(&self) -> &str {
		self.expression.source()
	}

	/// The compiled expression.
	pub fn expression(&self) -> &PathExpression {
		&self.expression
	}

	/// The opaque controller identifier.
	pub fn controller(&self) -> &str {
		&self.controller
	}

	/// The opaque view identifier.
	pub fn view(&self) -> &str {
		&self.view
	}

	/// The per-route options.
	pub fn options(&self) -> &RouteOptions {
		&self.options
	}

	/// Tests a concrete path against this route's expression.
	pub fn matches(&self, path: &str) -> bool {
		self.expression.matches(path)
	}

	/// Extracts path and query parameters from a concrete path.
	pub fn extract_parameters(&self, path: &str) -> RouteParams {
		self.expression.extract_parameters(path)
	}

	/// Generates a concrete path for this route from `params`.
	pub fn to_path(&self, params: &RouteParams) -> String {
		self.expression.to_path(params)
	}
}

/// Constructs [`Route`] instances, validating the path expression.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFactory;

impl RouteFactory {
	/// Creates a route from its parts.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MalformedExpression`] when the path
	/// expression does not compile; registration is the only place a bad
	/// expression can surface.
	pub fn create_route(
		&self,
		name: &str,
		path_expression: &str,
		controller: &str,
		view: &str,
		options: RouteOptions,
	) -> Result<Route, RouterError> {
		let expression = PathExpression::parse(path_expression)?;
		Ok(Route {
			name: name.to_string(),
			expression,
			controller: controller.to_string(),
			view: view.to_string(),
			options,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn route(expression: &str) -> Route {
		RouteFactory
			.create_route("home", expression, "HomeController", "HomeView", RouteOptions::default())
			.unwrap()
	}

	#[test]
	fn test_accessors() {
		let route = route("/home/:userId");
		assert_eq!(route.name(), "home");
		assert_eq!(route.path_expression(), "/home/:userId");
		assert_eq!(route.controller(), "HomeController");
		assert_eq!(route.view(), "HomeView");
		assert!(route.options().autoscroll);
	}

	#[test]
	fn test_factory_rejects_malformed_expression() {
		let result = RouteFactory.create_route(
			"bad",
			"no-leading-slash",
			"Controller",
			"View",
			RouteOptions::default(),
		);
		assert!(matches!(result, Err(RouterError::MalformedExpression { .. })));
	}

	#[test]
	fn test_matching_delegates_to_expression() {
		let route = route("/home/:userId");
		assert!(route.matches("/home/42"));
		assert!(!route.matches("/away/42"));
		assert_eq!(route.extract_parameters("/home/42").get_str("userId"), Some("42"));
	}

	#[test]
	fn test_options_merge() {
		let defaults = RouteOptions::default();
		let overrides = NavigationOptions {
			autoscroll: Some(false),
			document_view: Some("CustomDocument".to_string()),
			..NavigationOptions::default()
		};
		let merged = defaults.merge(&overrides);
		assert!(!merged.autoscroll);
		assert!(merged.allow_spa);
		assert!(!merged.only_update);
		assert_eq!(merged.document_view.as_deref(), Some("CustomDocument"));
	}
}
