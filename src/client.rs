//! Client-side router.
//!
//! [`ClientRouter`] wraps a shared [`RouterCore`] with the concerns a
//! long-lived client session adds: reading the current URL from the
//! environment, pushing session-history entries, intercepting anchor
//! clicks and history pops, and degrading gracefully when the error flow
//! itself fails. It composes the core and a [`Window`] capability instead
//! of subclassing anything; everything environment-shaped goes through
//! the window trait so tests can drive it with an in-memory double.
//!
//! Failure handling is a single escalation ladder expressed as the
//! private [`DispatchOutcome`]: a navigation either settles with a
//! response, turns into a redirect, or bottoms out in a fatal error that
//! is reported to the injected last-resort handler while the caller still
//! receives a degraded response.

use crate::core::{RouteInfo, RouterConfig, RouterCore};
use crate::error::{NavigationCondition, RouterError};
use crate::manager::{NavigationAction, NavigationOptions, PageResponse};
use crate::params::RouteParams;
use crate::pattern::strip_query;
use crate::window::{AnchorClick, HistoryEntryState, Window};
use parking_lot::RwLock;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// How settled navigations are reflected in the address bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressBarMode {
	/// Session-history entries via the history API.
	History,
	/// The host lacks the history API; internal redirects fall back to
	/// full-page loads.
	Hash,
}

/// Last-resort handler invoked when the error flow itself fails, e.g.
/// when the reserved error route is missing or its controller rejects.
pub type FatalErrorHandler = Arc<dyn Fn(RouterError) + Send + Sync>;

/// How one dispatch attempt ended, before settling.
enum DispatchOutcome {
	/// A page manager produced a response.
	Handled(PageResponse),
	/// The navigation must continue at another URL.
	Redirect {
		url: String,
		status: u16,
		condition: NavigationCondition,
	},
	/// The escalation ladder is exhausted.
	Fatal(RouterError),
}

/// Which reserved flow an escalation step dispatches.
enum ReservedFlow {
	NotFound,
	Error,
}

/// Client specialization of the router: core dispatch plus address-bar,
/// history and event-binding duties.
pub struct ClientRouter {
	core: Arc<RouterCore>,
	window: Arc<dyn Window>,
	mode: RwLock<AddressBarMode>,
	fatal_handler: Option<FatalErrorHandler>,
	listening: AtomicBool,
}

impl ClientRouter {
	/// Creates a client router over a shared core and window.
	pub fn new(core: Arc<RouterCore>, window: Arc<dyn Window>) -> Self {
		Self {
			core,
			window,
			mode: RwLock::new(AddressBarMode::History),
			fatal_handler: None,
			listening: AtomicBool::new(false),
		}
	}

	/// Like [`Self::new`], with a last-resort fatal error handler.
	pub fn with_fatal_handler(
		core: Arc<RouterCore>,
		window: Arc<dyn Window>,
		fatal_handler: FatalErrorHandler,
	) -> Self {
		Self {
			fatal_handler: Some(fatal_handler),
			..Self::new(core, window)
		}
	}

	/// Configures the core from the window's origin plus the given root
	/// and language fragments, and picks the address-bar mode from the
	/// window's history support. Safe to call repeatedly.
	pub fn init(&self, root: impl Into<String>, language_part: impl Into<String>) {
		let domain = self.window.get_domain();
		let (protocol, host) = match domain.split_once("//") {
			Some((protocol, host)) => (protocol.to_string(), host.to_string()),
			None => (String::new(), domain),
		};
		self.core.init(RouterConfig {
			protocol,
			host,
			root: root.into(),
			language_part: language_part.into(),
		});
		*self.mode.write() = if self.window.has_history_api() {
			AddressBarMode::History
		} else {
			AddressBarMode::Hash
		};
	}

	/// The shared dispatch core.
	pub fn core(&self) -> &Arc<RouterCore> {
		&self.core
	}

	/// The active address-bar mode.
	pub fn mode(&self) -> AddressBarMode {
		*self.mode.read()
	}

	/// The configured base URL.
	pub fn base_url(&self) -> String {
		self.core.base_url()
	}

	/// The configured origin.
	pub fn domain(&self) -> String {
		self.core.domain()
	}

	/// Current route path relative to the base URL, query included.
	pub fn get_path(&self) -> String {
		self.route_path_of(&self.window.get_path())
	}

	/// Current full URL as the window reports it.
	pub fn get_url(&self) -> String {
		self.window.get_url()
	}

	/// Builds an absolute URL for a named route.
	pub fn link(&self, name: &str, params: &RouteParams) -> Result<String, RouterError> {
		self.core.link(name, params)
	}

	/// Resolves the window's current path to its route and parameters.
	pub fn get_current_route_info(&self) -> Result<RouteInfo, RouterError> {
		self.core.route_info_for(&self.get_path())
	}

	/// Navigates to a route path, escalating failures through the
	/// not-found/error flows and settling redirects.
	///
	/// Always resolves: the fatal branch reports through the injected
	/// handler and settles with a degraded status response.
	pub async fn route(
		&self,
		path: &str,
		options: NavigationOptions,
		action: NavigationAction,
	) -> Result<PageResponse, RouterError> {
		let outcome = match self.core.route(path, options.clone(), action).await {
			Ok(response) => DispatchOutcome::Handled(response),
			Err(err) => self.escalate(err, &options).await,
		};
		self.settle(outcome, options).await
	}

	/// Dispatches the reserved error route, reporting a failure of the
	/// flow itself to the fatal handler before propagating it.
	pub async fn handle_error(
		&self,
		params: RouteParams,
		options: NavigationOptions,
	) -> Result<PageResponse, RouterError> {
		match self.core.handle_error(params, options).await {
			Ok(response) => Ok(response),
			Err(err) => {
				self.notify_fatal(&err);
				Err(err)
			}
		}
	}

	/// Dispatches the reserved not-found route; a failure of that flow
	/// escalates into [`Self::handle_error`].
	pub async fn handle_not_found(
		&self,
		params: RouteParams,
		options: NavigationOptions,
	) -> Result<PageResponse, RouterError> {
		match self.core.handle_not_found(params, options.clone()).await {
			Ok(response) => Ok(response),
			Err(err) => {
				let mut error_params = RouteParams::new();
				error_params.set_condition(to_condition(&err));
				self.handle_error(error_params, options).await
			}
		}
	}

	/// Redirects to `url`. Internal URLs become a pushed history entry and
	/// an in-application navigation; everything else is a hard redirect.
	///
	/// Returns a boxed future: `route` re-enters `redirect` through a
	/// redirect outcome, and the explicit `dyn Future` cuts that cycle out
	/// of the compiler's opaque-future types.
	pub fn redirect<'a>(
		&'a self,
		url: &'a str,
		options: NavigationOptions,
		action: NavigationAction,
	) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
		Box::pin(async move {
			let Some(path) = self.internal_path(url) else {
				self.window.redirect_hard(url);
				return;
			};
			if *self.mode.read() != AddressBarMode::History {
				self.window.redirect_hard(url);
				return;
			}

			self.save_scroll_position();
			self.window.push_state(&HistoryEntryState::new(url), "", url);

			match self.route(&path, options, action).await {
				Ok(response) => debug!(url, status = response.status, "navigation settled"),
				Err(err) => error!(error = %err, url, "navigation failed"),
			}
		})
	}

	/// Starts intercepting history pops and anchor clicks. Idempotent;
	/// only the first call binds.
	pub fn listen(self: Arc<Self>) {
		if self.listening.swap(true, Ordering::SeqCst) {
			return;
		}

		let router = Arc::clone(&self);
		self.window.bind_pop_state(Box::new(move |state| {
			let router = Arc::clone(&router);
			tokio::spawn(async move {
				router.handle_pop_state(state).await;
			});
		}));

		let router = Arc::clone(&self);
		self.window.bind_click(Box::new(move |click| match router.click_route_target(click) {
			Some(url) => {
				let router = Arc::clone(&router);
				tokio::spawn(async move {
					let action = NavigationAction::Click { url: url.clone() };
					router.redirect(&url, NavigationOptions::default(), action).await;
				});
				true
			}
			None => false,
		}));
	}

	/// Handles a session-history pop: routes the window's current path and
	/// restores the entry's saved scroll offset once the render settled.
	pub async fn handle_pop_state(&self, state: Option<HistoryEntryState>) {
		let path = self.get_path();
		let autoscroll = self
			.core
			.route_info_for(&path)
			.map(|info| info.route.options().autoscroll)
			.unwrap_or(true);
		match self
			.route(&path, NavigationOptions::default(), NavigationAction::PopState)
			.await
		{
			Ok(_) => {
				if autoscroll {
					if let Some(scroll) = state.and_then(|entry| entry.scroll) {
						self.window.scroll_to(scroll.x, scroll.y);
					}
				}
			}
			Err(err) => error!(error = %err, path, "history pop navigation failed"),
		}
	}

	/// Decides whether an anchor click is routed internally, returning the
	/// absolute target URL when it is.
	///
	/// A click is left to the environment when an earlier listener already
	/// prevented it, a non-primary button was used, an explicit non-self
	/// target is declared, the URL leaves the application, no route
	/// matches, or the matched route opts out of single-page handling.
	pub fn click_route_target(&self, click: &AnchorClick) -> Option<String> {
		if click.default_prevented || click.button != 0 {
			return None;
		}
		if let Some(target) = &click.target {
			if target != "_self" {
				return None;
			}
		}
		let href = click.href.as_deref()?;
		if let Some((document_url, _)) = href.split_once('#') {
			// A hash link within the current document only moves inside it.
			if document_url.is_empty() {
				return None;
			}
			if let Some(target) = self.internal_path(document_url) {
				if strip_query(&target) == strip_query(&self.get_path()) {
					return None;
				}
			}
		}
		let path = self.internal_path(href)?;
		let info = self.core.route_info_for(&path).ok()?;
		if !info.route.options().allow_spa {
			return None;
		}
		Some(format!("{}{}", self.base_url(), path))
	}

	/// Stores the current scroll offset into the current history entry, so
	/// a later back navigation can restore it.
	fn save_scroll_position(&self) {
		let url = self.window.get_url();
		let state = HistoryEntryState::new(url.clone())
			.with_scroll(self.window.get_scroll_x(), self.window.get_scroll_y());
		self.window.replace_state(&state, "", &url);
	}

	/// Escalation ladder for a failed dispatch: redirections pass through,
	/// client errors try the not-found flow, configuration defects are
	/// fatal immediately, everything else tries the error flow.
	async fn escalate(&self, err: RouterError, options: &NavigationOptions) -> DispatchOutcome {
		match err {
			RouterError::Condition(condition) if condition.is_redirection() => {
				redirect_outcome(condition, self.base_url())
			}
			RouterError::Condition(condition) if condition.is_client_error() => {
				self.reserved_flow(ReservedFlow::NotFound, condition, options).await
			}
			err if err.is_configuration() => DispatchOutcome::Fatal(err),
			err => {
				let condition = to_condition(&err);
				self.reserved_flow(ReservedFlow::Error, condition, options).await
			}
		}
	}

	async fn reserved_flow(
		&self,
		flow: ReservedFlow,
		condition: NavigationCondition,
		options: &NavigationOptions,
	) -> DispatchOutcome {
		let status = condition.status;
		let mut params = RouteParams::new();
		params.set_condition(condition);
		let mut flow_options = options.clone();
		flow_options.http_status = Some(status);

		let result = match flow {
			ReservedFlow::NotFound => self.core.handle_not_found(params, flow_options).await,
			ReservedFlow::Error => self.core.handle_error(params, flow_options).await,
		};
		match result {
			Ok(response) => DispatchOutcome::Handled(response),
			Err(RouterError::Condition(condition)) if condition.is_redirection() => {
				redirect_outcome(condition, self.base_url())
			}
			Err(inner) => DispatchOutcome::Fatal(inner),
		}
	}

	async fn settle(
		&self,
		outcome: DispatchOutcome,
		options: NavigationOptions,
	) -> Result<PageResponse, RouterError> {
		match outcome {
			DispatchOutcome::Handled(response) => Ok(response),
			DispatchOutcome::Redirect {
				url,
				status,
				condition,
			} => {
				let mut redirect_options = options;
				redirect_options.http_status = Some(status);
				let action = NavigationAction::Redirect { url: url.clone() };
				self.redirect(&url, redirect_options, action).await;
				Ok(PageResponse::status(status).with_error(condition))
			}
			DispatchOutcome::Fatal(err) => {
				self.notify_fatal(&err);
				let status = err.status().unwrap_or(500);
				Ok(PageResponse::status(status).with_error(to_condition(&err)))
			}
		}
	}

	fn notify_fatal(&self, err: &RouterError) {
		match &self.fatal_handler {
			Some(handler) => handler(err.clone()),
			None => warn!(error = %err, "unhandled fatal router error"),
		}
	}

	/// Maps an absolute or domain-relative URL to a route path, or `None`
	/// when the URL leaves the application.
	fn internal_path(&self, url: &str) -> Option<String> {
		let base = self.base_url();
		if !base.is_empty() {
			if let Some(rest) = url.strip_prefix(&base) {
				// The base must end at a path boundary; otherwise a host
				// like `{host}.evil.io` would count as internal.
				if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
					return Some(normalize_path(rest));
				}
				return None;
			}
		}
		if url.starts_with('/') {
			return Some(self.route_path_of(url));
		}
		None
	}

	/// Strips the configured root and language fragments off a
	/// domain-relative path.
	fn route_path_of(&self, path: &str) -> String {
		let config = self.core.config();
		let prefix = format!("{}{}", config.root, config.language_part);
		let stripped = match path.strip_prefix(&prefix) {
			Some(rest) if rest.is_empty() || rest.starts_with(['/', '?', '#']) => rest,
			_ => path,
		};
		normalize_path(stripped)
	}
}

impl std::fmt::Debug for ClientRouter {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClientRouter")
			.field("core", &self.core)
			.field("mode", &*self.mode.read())
			.field("listening", &self.listening.load(Ordering::SeqCst))
			.finish()
	}
}

fn normalize_path(path: &str) -> String {
	if path.starts_with('/') {
		path.to_string()
	} else {
		format!("/{}", path)
	}
}

fn to_condition(err: &RouterError) -> NavigationCondition {
	match err {
		RouterError::Condition(condition) => condition.clone(),
		other => NavigationCondition::internal(other.to_string()),
	}
}

fn redirect_outcome(condition: NavigationCondition, fallback_url: String) -> DispatchOutcome {
	let url = condition.url.clone().unwrap_or(fallback_url);
	DispatchOutcome::Redirect {
		url,
		status: condition.status,
		condition,
	}
}
