//! Environment-independent router core.
//!
//! [`RouterCore`] owns the route registry and implements the navigation
//! dispatch protocol: path lookup, parameter extraction, lifecycle events
//! around the page manager, and the reserved error/not-found flows. It has
//! no notion of a browser; the client specialization in [`crate::client`]
//! wraps it with a [`crate::window::Window`] capability.
//!
//! Dispatch is cooperative and unserialized: concurrent `route` calls
//! proceed independently and whichever render settles last is the one left
//! active at the rendering boundary. The registry is mutated during a
//! single-writer configuration phase and read-only afterwards; the
//! `RwLock` makes that safe on multi-threaded hosts too.

use crate::error::{NavigationCondition, RouterError};
use crate::events::{Dispatcher, RouterEvent};
use crate::manager::{NavigationAction, NavigationOptions, PageManager, PageResponse};
use crate::params::RouteParams;
use crate::pattern::strip_query;
use crate::route::{Route, RouteFactory, RouteOptions};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Reserved name of the route rendering error pages.
pub const RESERVED_ERROR: &str = "error";

/// Reserved name of the route rendering not-found pages.
pub const RESERVED_NOT_FOUND: &str = "notFound";

/// URL fragments used to build absolute URLs. All fields may be empty;
/// the most recent [`RouterCore::init`] call wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterConfig {
	/// Protocol including the trailing colon, e.g. `https:`.
	pub protocol: String,
	/// Host, e.g. `www.example.com`.
	pub host: String,
	/// Application root path mounted under the host, e.g. `/app`.
	pub root: String,
	/// Language path fragment appended after the root, e.g. `/en`.
	pub language_part: String,
}

impl RouterConfig {
	/// The origin, `protocol//host`, or empty when either part is unset.
	pub fn domain(&self) -> String {
		if self.protocol.is_empty() || self.host.is_empty() {
			String::new()
		} else {
			format!("{}//{}", self.protocol, self.host)
		}
	}

	/// Domain plus root and language fragments.
	pub fn base_url(&self) -> String {
		format!("{}{}{}", self.domain(), self.root, self.language_part)
	}
}

/// A resolved navigation target: the matched route, its extracted
/// parameters and the concrete path they came from.
#[derive(Debug, Clone)]
pub struct RouteInfo {
	/// The matched route.
	pub route: Arc<Route>,
	/// Extracted parameters, query overrides applied.
	pub params: RouteParams,
	/// The concrete path that was resolved.
	pub path: String,
}

/// The environment-independent router: registry plus dispatch protocol.
///
/// Usable directly once per server request; wrapped by
/// [`crate::client::ClientRouter`] for long-lived client sessions.
pub struct RouterCore {
	page_manager: Arc<dyn PageManager>,
	dispatcher: Arc<dyn Dispatcher>,
	factory: RouteFactory,
	routes: RwLock<Vec<Arc<Route>>>,
	config: RwLock<RouterConfig>,
}

impl std::fmt::Debug for RouterCore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let names: Vec<String> = self
			.routes
			.read()
			.iter()
			.map(|route| route.name().to_string())
			.collect();
		f.debug_struct("RouterCore")
			.field("routes", &names)
			.field("config", &*self.config.read())
			.finish()
	}
}

impl RouterCore {
	/// Creates a router over the given collaborators with an empty
	/// registry and default config.
	pub fn new(page_manager: Arc<dyn PageManager>, dispatcher: Arc<dyn Dispatcher>) -> Self {
		Self {
			page_manager,
			dispatcher,
			factory: RouteFactory,
			routes: RwLock::new(Vec::new()),
			config: RwLock::new(RouterConfig::default()),
		}
	}

	/// Stores the URL fragments used to build absolute URLs. Safe to call
	/// repeatedly; the last call wins.
	pub fn init(&self, config: RouterConfig) {
		*self.config.write() = config;
	}

	/// A snapshot of the current config.
	pub fn config(&self) -> RouterConfig {
		self.config.read().clone()
	}

	/// The configured base URL.
	pub fn base_url(&self) -> String {
		self.config.read().base_url()
	}

	/// The configured origin.
	pub fn domain(&self) -> String {
		self.config.read().domain()
	}

	/// Registers a route.
	///
	/// # Errors
	///
	/// [`RouterError::DuplicateRoute`] when `name` is already registered;
	/// [`RouterError::MalformedExpression`] when the expression does not
	/// compile. Registration is atomic: a failed `add` leaves the registry
	/// untouched.
	pub fn add(
		&self,
		name: &str,
		path_expression: &str,
		controller: &str,
		view: &str,
		options: RouteOptions,
	) -> Result<(), RouterError> {
		let mut routes = self.routes.write();
		if routes.iter().any(|route| route.name() == name) {
			return Err(RouterError::DuplicateRoute(name.to_string()));
		}
		let route = self
			.factory
			.create_route(name, path_expression, controller, view, options)?;
		debug!(name, path_expression, "route registered");
		routes.push(Arc::new(route));
		Ok(())
	}

	/// Removes a route by name; a no-op for unknown names.
	pub fn remove(&self, name: &str) {
		self.routes.write().retain(|route| route.name() != name);
	}

	/// Looks up a route by name.
	pub fn get_route(&self, name: &str) -> Option<Arc<Route>> {
		self.routes
			.read()
			.iter()
			.find(|route| route.name() == name)
			.cloned()
	}

	/// Builds an absolute URL for a named route.
	///
	/// # Errors
	///
	/// [`RouterError::UnknownRoute`] when `name` is not registered.
	pub fn link(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
		let route = self
			.get_route(name)
			.ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;
		Ok(format!("{}{}", self.base_url(), route.to_path(params)))
	}

	/// Resolves a concrete path to its route and parameters.
	///
	/// The first registered match wins when several expressions cover the
	/// same path.
	///
	/// # Errors
	///
	/// [`RouterError::NoMatchingRoute`] when nothing matches.
	pub fn route_info_for(&self, path: &str) -> Result<RouteInfo, RouterError> {
		let route = self
			.match_route(strip_query(path))
			.ok_or_else(|| RouterError::NoMatchingRoute(path.to_string()))?;
		let params = route.extract_parameters(path);
		Ok(RouteInfo {
			route,
			params,
			path: path.to_string(),
		})
	}

	/// Navigates to a concrete path.
	///
	/// The query is stripped for lookup; extraction sees the full path so
	/// query parameters override same-named path parameters. An unmatched
	/// path is not an error here: a 404 condition is synthesized and the
	/// navigation delegated to [`Self::handle_not_found`].
	pub async fn route(
		&self,
		path: &str,
		options: NavigationOptions,
		action: NavigationAction,
	) -> Result<PageResponse, RouterError> {
		match self.match_route(strip_query(path)) {
			Some(route) => {
				let params = route.extract_parameters(path);
				self.handle(route, params, options, action, path.to_string())
					.await
			}
			None => {
				debug!(path, "no route matched, delegating to not-found flow");
				let mut params = RouteParams::new();
				params.set_condition(NavigationCondition::not_found(path));
				self.handle_not_found(params, options).await
			}
		}
	}

	/// Dispatches the reserved `error` route.
	///
	/// # Errors
	///
	/// Rejects with [`RouterError::MissingReservedRoute`] when no `error`
	/// route is registered — an unrecoverable configuration defect, not a
	/// degraded response.
	pub async fn handle_error(
		&self,
		params: RouteParams,
		options: NavigationOptions,
	) -> Result<PageResponse, RouterError> {
		self.handle_reserved(RESERVED_ERROR, params, options).await
	}

	/// Dispatches the reserved `notFound` route; same contract as
	/// [`Self::handle_error`].
	pub async fn handle_not_found(
		&self,
		params: RouteParams,
		options: NavigationOptions,
	) -> Result<PageResponse, RouterError> {
		self.handle_reserved(RESERVED_NOT_FOUND, params, options).await
	}

	/// True iff the error carries a status in `[400, 500)`.
	pub fn is_client_error(&self, error: &RouterError) -> bool {
		error.is_client_error()
	}

	/// True iff the error carries a status in `[300, 400)`.
	pub fn is_redirection(&self, error: &RouterError) -> bool {
		error.is_redirection()
	}

	async fn handle_reserved(
		&self,
		name: &'static str,
		params: RouteParams,
		options: NavigationOptions,
	) -> Result<PageResponse, RouterError> {
		let route = self
			.get_route(name)
			.ok_or(RouterError::MissingReservedRoute(name))?;
		let path = route.to_path(&params);
		self.handle(route, params, options, NavigationAction::Error, path)
			.await
	}

	/// Fires `before_handle_route`, awaits the page manager, applies the
	/// per-call status override, merges any condition threaded through
	/// `params` into the response and fires `after_handle_route`. A
	/// page-manager rejection propagates; no AFTER event fires for it.
	async fn handle(
		&self,
		route: Arc<Route>,
		params: RouteParams,
		options: NavigationOptions,
		action: NavigationAction,
		path: String,
	) -> Result<PageResponse, RouterError> {
		let merged = route.options().merge(&options);
		self.dispatcher.fire(
			RouterEvent::BeforeHandleRoute {
				route: Arc::clone(&route),
				params: params.clone(),
				path: path.clone(),
				options: merged.clone(),
			},
			true,
		);

		let mut response = self
			.page_manager
			.manage(route.controller(), route.view(), &merged, &params, &action)
			.await?;
		if let Some(status) = options.http_status {
			response.status = status;
		}
		if let Some(condition) = params.condition() {
			response.error = Some(condition.clone());
		}

		self.dispatcher.fire(
			RouterEvent::AfterHandleRoute {
				route,
				params,
				path,
				response: response.clone(),
				options: merged,
			},
			true,
		);
		Ok(response)
	}

	fn match_route(&self, clean_path: &str) -> Option<Arc<Route>> {
		self.routes
			.read()
			.iter()
			.find(|route| route.matches(clean_path))
			.cloned()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::events::{AFTER_HANDLE_ROUTE, BEFORE_HANDLE_ROUTE};
	use async_trait::async_trait;
	use parking_lot::Mutex;

	/// Page manager double that renders a marker string, or fails with a
	/// preset error for a chosen controller.
	struct StubPageManager {
		fail_controller: Option<(String, RouterError)>,
	}

	impl StubPageManager {
		fn ok() -> Arc<Self> {
			Arc::new(Self {
				fail_controller: None,
			})
		}

		fn failing(controller: &str, error: RouterError) -> Arc<Self> {
			Arc::new(Self {
				fail_controller: Some((controller.to_string(), error)),
			})
		}
	}

	#[async_trait]
	impl PageManager for StubPageManager {
		async fn manage(
			&self,
			controller: &str,
			view: &str,
			_options: &RouteOptions,
			_params: &RouteParams,
			_action: &NavigationAction,
		) -> Result<PageResponse, RouterError> {
			if let Some((failing, error)) = &self.fail_controller {
				if failing == controller {
					return Err(error.clone());
				}
			}
			Ok(PageResponse::ok(format!("{}:{}", controller, view)))
		}
	}

	#[derive(Default)]
	struct RecordingDispatcher {
		fired: Mutex<Vec<&'static str>>,
	}

	impl Dispatcher for RecordingDispatcher {
		fn fire(&self, event: RouterEvent, _allow_unhandled: bool) {
			self.fired.lock().push(event.name());
		}
	}

	fn router() -> (Arc<RouterCore>, Arc<RecordingDispatcher>) {
		let dispatcher = Arc::new(RecordingDispatcher::default());
		let core = Arc::new(RouterCore::new(StubPageManager::ok(), dispatcher.clone()));
		(core, dispatcher)
	}

	#[test]
	fn test_add_duplicate_name_fails() {
		let (core, _) = router();
		core.add("home", "/", "Home", "HomeView", RouteOptions::default())
			.unwrap();
		let result = core.add("home", "/other", "Other", "OtherView", RouteOptions::default());
		assert!(matches!(result, Err(RouterError::DuplicateRoute(_))));
	}

	#[test]
	fn test_remove_unknown_is_noop_and_reuse_works() {
		let (core, _) = router();
		core.remove("missing");
		core.add("home", "/", "Home", "HomeView", RouteOptions::default())
			.unwrap();
		core.remove("home");
		core.add("home", "/", "Home", "HomeView", RouteOptions::default())
			.unwrap();
		assert!(core.get_route("home").is_some());
	}

	#[test]
	fn test_link_builds_absolute_url() {
		let (core, _) = router();
		core.init(RouterConfig {
			protocol: "https:".to_string(),
			host: "www.example.com".to_string(),
			root: "/app".to_string(),
			language_part: String::new(),
		});
		core.add("detail", "/home/:userId", "Detail", "DetailView", RouteOptions::default())
			.unwrap();

		let params = RouteParams::from_pairs([("userId", "42")]);
		assert_eq!(
			core.link("detail", &params).unwrap(),
			"https://www.example.com/app/home/42"
		);
		assert!(matches!(
			core.link("unknownRoute", &RouteParams::new()),
			Err(RouterError::UnknownRoute(_))
		));
	}

	#[test]
	fn test_init_is_repeatable_last_wins() {
		let (core, _) = router();
		core.init(RouterConfig {
			protocol: "http:".to_string(),
			host: "old.example.com".to_string(),
			..RouterConfig::default()
		});
		core.init(RouterConfig {
			protocol: "https:".to_string(),
			host: "new.example.com".to_string(),
			..RouterConfig::default()
		});
		assert_eq!(core.domain(), "https://new.example.com");
	}

	#[test]
	fn test_first_registered_match_wins() {
		let (core, _) = router();
		core.add("first", "/:page", "First", "FirstView", RouteOptions::default())
			.unwrap();
		core.add("second", "/about", "Second", "SecondView", RouteOptions::default())
			.unwrap();

		let info = core.route_info_for("/about").unwrap();
		assert_eq!(info.route.name(), "first");
	}

	#[test]
	fn test_route_info_for_unmatched_path_fails() {
		let (core, _) = router();
		let result = core.route_info_for("/nowhere");
		assert!(matches!(result, Err(RouterError::NoMatchingRoute(_))));
	}

	#[tokio::test]
	async fn test_route_fires_events_in_order() {
		let (core, dispatcher) = router();
		core.add("home", "/home/:userId", "Home", "HomeView", RouteOptions::default())
			.unwrap();

		let response = core
			.route("/home/1", NavigationOptions::default(), NavigationAction::default())
			.await
			.unwrap();
		assert_eq!(response.content.as_deref(), Some("Home:HomeView"));
		assert_eq!(response.status, 200);
		assert_eq!(
			*dispatcher.fired.lock(),
			vec![BEFORE_HANDLE_ROUTE, AFTER_HANDLE_ROUTE]
		);
	}

	#[tokio::test]
	async fn test_unmatched_path_resolves_through_not_found_route() {
		let (core, _) = router();
		core.add(RESERVED_NOT_FOUND, "/not-found", "NotFound", "NotFoundView", RouteOptions::default())
			.unwrap();

		let response = core
			.route("/missing-path", NavigationOptions::default(), NavigationAction::default())
			.await
			.unwrap();
		assert_eq!(response.content.as_deref(), Some("NotFound:NotFoundView"));
		// The synthesized 404 condition survives into the response.
		assert_eq!(response.error.as_ref().map(|e| e.status), Some(404));
	}

	#[tokio::test]
	async fn test_unmatched_path_without_not_found_route_rejects() {
		let (core, _) = router();
		let result = core
			.route("/missing-path", NavigationOptions::default(), NavigationAction::default())
			.await;
		assert_eq!(result, Err(RouterError::MissingReservedRoute(RESERVED_NOT_FOUND)));
	}

	#[tokio::test]
	async fn test_handle_error_without_error_route_rejects() {
		let (core, _) = router();
		let result = core
			.handle_error(RouteParams::new(), NavigationOptions::default())
			.await;
		assert_eq!(result, Err(RouterError::MissingReservedRoute(RESERVED_ERROR)));
	}

	#[tokio::test]
	async fn test_page_manager_failure_propagates_without_after_event() {
		let dispatcher = Arc::new(RecordingDispatcher::default());
		let manager = StubPageManager::failing(
			"Broken",
			RouterError::from(NavigationCondition::internal("render failed")),
		);
		let core = RouterCore::new(manager, dispatcher.clone());
		core.add("broken", "/broken", "Broken", "BrokenView", RouteOptions::default())
			.unwrap();

		let result = core
			.route("/broken", NavigationOptions::default(), NavigationAction::default())
			.await;
		assert!(result.as_ref().err().map(|e| e.is_server_error()).unwrap_or(false));
		assert_eq!(*dispatcher.fired.lock(), vec![BEFORE_HANDLE_ROUTE]);
	}

	#[tokio::test]
	async fn test_query_overrides_reach_page_manager_params() {
		struct CapturingManager {
			captured: Mutex<Option<RouteParams>>,
		}

		#[async_trait]
		impl PageManager for CapturingManager {
			async fn manage(
				&self,
				_controller: &str,
				_view: &str,
				_options: &RouteOptions,
				params: &RouteParams,
				_action: &NavigationAction,
			) -> Result<PageResponse, RouterError> {
				*self.captured.lock() = Some(params.clone());
				Ok(PageResponse::ok(""))
			}
		}

		let manager = Arc::new(CapturingManager {
			captured: Mutex::new(None),
		});
		let core = RouterCore::new(manager.clone(), Arc::new(RecordingDispatcher::default()));
		core.add("pair", "/:first/:second", "Pair", "PairView", RouteOptions::default())
			.unwrap();

		core.route(
			"/abc/def?second=override&stuff=value",
			NavigationOptions::default(),
			NavigationAction::default(),
		)
		.await
		.unwrap();

		let params = manager.captured.lock().clone().unwrap();
		assert_eq!(params.get_str("first"), Some("abc"));
		assert_eq!(params.get_str("second"), Some("override"));
		assert_eq!(params.get_str("stuff"), Some("value"));
	}
}
